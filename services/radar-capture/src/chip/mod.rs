//! Chipset radar pulse decoding
//!
//! The radio does not identify itself in-band, so the chipset is chosen at
//! startup and every frame goes through the same decoder.

mod ar5416;
mod ar9280;
mod record;
mod tsf;

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::radiotap::FrameHeader;

pub use ar5416::Ar5416Decoder;
pub use ar9280::Ar9280Decoder;
pub use record::RadarPulseRecord;

/// HAL PHY error code for a radar pulse
pub const PHYERR_RADAR: u8 = 5;

/// HAL PHY error code for a radar pulse seen on the extension channel
pub const PHYERR_FALSE_RADAR_EXT: u8 = 24;

/// FCS length stripped when the radiotap flags say it is present
const FCS_LEN: usize = 4;

/// Supported chipsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipKind {
    Ar5416,
    Ar9280,
}

impl ChipKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ar5416 => "ar5416",
            Self::Ar9280 => "ar9280",
        }
    }
}

impl fmt::Display for ChipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChipKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ar5416" => Ok(Self::Ar5416),
            "ar9280" => Ok(Self::Ar9280),
            _ => Err(DecodeError::UnknownChip(s.to_string())),
        }
    }
}

/// Whether a HAL PHY error code is one of the radar subtypes
pub fn is_radar_phy_error(code: u8) -> bool {
    code == PHYERR_RADAR || code == PHYERR_FALSE_RADAR_EXT
}

/// Locate the `len`-byte status trailer at the end of `payload`.
///
/// Drops the FCS first when the header says the frame carries one.
fn status_trailer<'a>(
    chip: ChipKind,
    header: &FrameHeader,
    payload: &'a [u8],
    len: usize,
) -> Result<&'a [u8], DecodeError> {
    let fcs = if header.fields.fcs_at_end() { FCS_LEN } else { 0 };
    let needed = len + fcs;

    if payload.len() < needed {
        return Err(DecodeError::ShortPayload {
            chip,
            needed,
            available: payload.len(),
        });
    }

    let end = payload.len() - fcs;
    Ok(&payload[end - len..end])
}

/// Decoder for the configured chipset
///
/// Adding a chipset means one more `ChipKind` entry, one more variant here
/// and one more arm in each match.
#[derive(Debug, Clone)]
pub enum ChipDecoder {
    Ar5416(Ar5416Decoder),
    Ar9280(Ar9280Decoder),
}

impl ChipDecoder {
    pub fn new(kind: ChipKind) -> Self {
        match kind {
            ChipKind::Ar5416 => Self::Ar5416(Ar5416Decoder::new()),
            ChipKind::Ar9280 => Self::Ar9280(Ar9280Decoder::new()),
        }
    }

    pub fn kind(&self) -> ChipKind {
        match self {
            Self::Ar5416(_) => ChipKind::Ar5416,
            Self::Ar9280(_) => ChipKind::Ar9280,
        }
    }

    /// Decode the bytes following the radiotap header
    pub fn decode(
        &mut self,
        header: &FrameHeader,
        payload: &[u8],
    ) -> Result<RadarPulseRecord, DecodeError> {
        match self {
            Self::Ar5416(decoder) => decoder.decode(header, payload),
            Self::Ar9280(decoder) => decoder.decode(header, payload),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn test_chip_kind_names() {
        assert_eq!("ar5416".parse::<ChipKind>(), Ok(ChipKind::Ar5416));
        assert_eq!("AR9280".parse::<ChipKind>(), Ok(ChipKind::Ar9280));
        assert_eq!(ChipKind::Ar9280.to_string(), "ar9280");
        assert_eq!(
            "ar9300".parse::<ChipKind>(),
            Err(DecodeError::UnknownChip("ar9300".to_string()))
        );
    }

    #[test]
    fn test_decoder_kind() {
        assert_eq!(ChipDecoder::new(ChipKind::Ar5416).kind(), ChipKind::Ar5416);
        assert_eq!(ChipDecoder::new(ChipKind::Ar9280).kind(), ChipKind::Ar9280);
    }

    #[test]
    fn test_radar_phy_codes() {
        assert!(is_radar_phy_error(5));
        assert!(is_radar_phy_error(24));
        assert!(!is_radar_phy_error(0));
        assert!(!is_radar_phy_error(3));
    }

    #[test]
    fn test_status_trailer_strips_fcs() {
        let header = FrameBuilder::new().flags(crate::radiotap::FLAG_FCS_AT_END).header();
        let payload = [1, 2, 3, 0xde, 0xad, 0xbe, 0xef];
        let trailer = status_trailer(ChipKind::Ar5416, &header, &payload, 2).unwrap();
        assert_eq!(trailer, &[2, 3]);

        let err = status_trailer(ChipKind::Ar5416, &header, &payload[..5], 2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ShortPayload {
                chip: ChipKind::Ar5416,
                needed: 6,
                available: 5
            }
        );
    }

    #[test]
    fn test_dispatch_changes_interpretation() {
        let header = FrameBuilder::new().tsft(0x1_0000).freq(5500).header();
        let payload = ar9280_trailer(PHYERR_RADAR, 0x1234, (-70, -75), (12, 3), 0x01);

        let mut ar9280 = ChipDecoder::new(ChipKind::Ar9280);
        let mut ar5416 = ChipDecoder::new(ChipKind::Ar5416);

        let a = ar9280.decode(&header, &payload).unwrap();
        assert_eq!(a.duration, 12);
        assert_eq!(a.rssi, -70);

        // The AR5416 reads the last five bytes: code byte is the ctl rssi
        let b = ar5416.decode(&header, &payload);
        assert!(matches!(b, Err(DecodeError::NotARadarEvent { .. })));
    }

    #[test]
    fn test_dispatch_short_payload_for_wider_trailer() {
        let header = FrameBuilder::new().freq(5260).header();
        let payload = ar5416_trailer(PHYERR_RADAR, 0x0100, -40, 20);

        let mut ar5416 = ChipDecoder::new(ChipKind::Ar5416);
        let mut ar9280 = ChipDecoder::new(ChipKind::Ar9280);

        assert!(ar5416.decode(&header, &payload).is_ok());
        assert_eq!(
            ar9280.decode(&header, &payload),
            Err(DecodeError::ShortPayload {
                chip: ChipKind::Ar9280,
                needed: 10,
                available: 5
            })
        );
    }
}
