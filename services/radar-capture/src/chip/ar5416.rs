//! AR5416 radar PHY error decoding
//!
//! The AR5416 appends a 5-byte status trailer to each radar PHY error:
//!
//! ```text
//! +------+-----------+------+-----+
//! | code | rstamp LE | rssi | dur |
//! +------+-----------+------+-----+
//!    0       1..3       3      4
//! ```
//!
//! `rstamp` holds the low 15 bits of the TSF at the pulse. The decoder keeps
//! no state: the stamp is extended against the radiotap TSFT of the same
//! frame, so identical frames always decode identically.

use super::tsf::extend_tsf15;
use super::{is_radar_phy_error, status_trailer, ChipKind, RadarPulseRecord};
use crate::error::DecodeError;
use crate::radiotap::FrameHeader;

mod layout {
    pub const TRAILER_LEN: usize = 5;
    pub const PHY_CODE: usize = 0;
    pub const RSTAMP: usize = 1;
    pub const RSSI: usize = 3;
    pub const DURATION: usize = 4;
}

#[derive(Debug, Clone, Default)]
pub struct Ar5416Decoder;

impl Ar5416Decoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(
        &self,
        header: &FrameHeader,
        payload: &[u8],
    ) -> Result<RadarPulseRecord, DecodeError> {
        let trailer = status_trailer(ChipKind::Ar5416, header, payload, layout::TRAILER_LEN)?;

        let phy_code = trailer[layout::PHY_CODE];
        if !is_radar_phy_error(phy_code) {
            return Err(DecodeError::NotARadarEvent {
                phy_code,
                pulse_info: 0,
            });
        }

        let rstamp = u16::from_le_bytes([trailer[layout::RSTAMP], trailer[layout::RSTAMP + 1]]);
        let timestamp = match header.fields.tsft {
            Some(tsf) => extend_tsf15(rstamp, tsf),
            None => u64::from(rstamp & 0x7fff),
        };

        Ok(RadarPulseRecord {
            timestamp,
            freq_mhz: header.fields.freq_mhz(),
            rssi: trailer[layout::RSSI] as i8,
            duration: trailer[layout::DURATION],
        })
    }
}
