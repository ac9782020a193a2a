//! AR9280 radar PHY error decoding
//!
//! The AR9280 reports pulses on both halves of an HT40 channel. Each radar
//! PHY error ends with a 10-byte status trailer:
//!
//! ```text
//! +------+-----------+-----+-----+-----+-----+------+
//! | code | rstamp LE | ctl | ext | pri | ext | info |
//! |      |   (u32)   | rssi| rssi| dur | dur |      |
//! +------+-----------+-----+-----+-----+-----+------+
//!    0       1..5       5     6     7     8     9
//! ```
//!
//! `info` bit 0 flags a pulse on the primary channel, bit 1 on the extension
//! channel. A primary pulse wins when both are set.
//!
//! Timestamps: `rstamp` is the low 32 bits of the TSF. With a radiotap TSFT
//! in the same frame it is extended against that. Without one the decoder
//! carries the high word itself: it starts at zero, and every time a stamp is
//! smaller than the previous one the counter has wrapped and the high word is
//! bumped. A TSFT-extended result resynchronises the carried high word.
//! Rejected frames leave the carried state untouched.

use super::tsf::extend_tsf32;
use super::{is_radar_phy_error, status_trailer, ChipKind, RadarPulseRecord};
use crate::error::DecodeError;
use crate::radiotap::FrameHeader;

mod layout {
    pub const TRAILER_LEN: usize = 10;
    pub const PHY_CODE: usize = 0;
    pub const RSTAMP: usize = 1;
    pub const RSSI_CTL: usize = 5;
    pub const RSSI_EXT: usize = 6;
    pub const DUR_PRI: usize = 7;
    pub const DUR_EXT: usize = 8;
    pub const PULSE_INFO: usize = 9;

    pub const PRI_CH_RADAR_FOUND: u8 = 0x01;
    pub const EXT_CH_RADAR_FOUND: u8 = 0x02;
}

#[derive(Debug, Clone, Default)]
pub struct Ar9280Decoder {
    /// High 32 bits of the rolling TSF
    tsf_high: u32,
    /// Low word of the last accepted pulse
    last_rstamp: Option<u32>,
}

impl Ar9280Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(
        &mut self,
        header: &FrameHeader,
        payload: &[u8],
    ) -> Result<RadarPulseRecord, DecodeError> {
        let trailer = status_trailer(ChipKind::Ar9280, header, payload, layout::TRAILER_LEN)?;

        let phy_code = trailer[layout::PHY_CODE];
        let pulse_info = trailer[layout::PULSE_INFO];
        if !is_radar_phy_error(phy_code) {
            return Err(DecodeError::NotARadarEvent {
                phy_code,
                pulse_info,
            });
        }

        let (rssi, duration) = if pulse_info & layout::PRI_CH_RADAR_FOUND != 0 {
            (trailer[layout::RSSI_CTL], trailer[layout::DUR_PRI])
        } else if pulse_info & layout::EXT_CH_RADAR_FOUND != 0 {
            (trailer[layout::RSSI_EXT], trailer[layout::DUR_EXT])
        } else {
            return Err(DecodeError::NotARadarEvent {
                phy_code,
                pulse_info,
            });
        };

        let rstamp = u32::from_le_bytes([
            trailer[layout::RSTAMP],
            trailer[layout::RSTAMP + 1],
            trailer[layout::RSTAMP + 2],
            trailer[layout::RSTAMP + 3],
        ]);
        let timestamp = self.extend(rstamp, header.fields.tsft);

        Ok(RadarPulseRecord {
            timestamp,
            freq_mhz: header.fields.freq_mhz(),
            rssi: rssi as i8,
            duration,
        })
    }

    fn extend(&mut self, rstamp: u32, tsft: Option<u64>) -> u64 {
        let timestamp = match tsft {
            Some(tsf) => extend_tsf32(rstamp, tsf),
            None => {
                if self.last_rstamp.map_or(false, |last| rstamp < last) {
                    self.tsf_high = self.tsf_high.wrapping_add(1);
                }
                (u64::from(self.tsf_high) << 32) | u64::from(rstamp)
            }
        };

        self.tsf_high = (timestamp >> 32) as u32;
        self.last_rstamp = Some(rstamp);
        timestamp
    }
}
