//! Optional radiotap fields used by the radar decoders
//!
//! Only the leading standard fields are walked. The walk stops at the first
//! field it cannot place inside the header; anything it did not reach stays
//! `None`.

/// Flags field bit: the frame carries its 4-byte FCS at the end
pub const FLAG_FCS_AT_END: u8 = 0x10;

/// Field layout: (presence bit, alignment, size in bytes)
const STANDARD_FIELDS: &[(u32, usize, usize)] = &[
    (0, 8, 8), // TSFT
    (1, 1, 1), // Flags
    (2, 1, 1), // Rate
    (3, 2, 4), // Channel (freq u16 + flags u16)
    (4, 1, 2), // FHSS
    (5, 1, 1), // Antenna signal dBm
];

const BIT_TSFT: u32 = 0;
const BIT_FLAGS: u32 = 1;
const BIT_CHANNEL: u32 = 3;
const BIT_ANTENNA_SIGNAL: u32 = 5;

/// Channel field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    /// Center frequency in MHz
    pub freq_mhz: u16,
    /// Channel flags (band, modulation)
    pub flags: u16,
}

/// Standard fields found in the header, if present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadiotapFields {
    /// 64-bit TSF of the receiving radio, microseconds
    pub tsft: Option<u64>,
    pub flags: Option<u8>,
    pub channel: Option<Channel>,
    /// Antenna signal in dBm
    pub antenna_signal: Option<i8>,
}

impl RadiotapFields {
    /// Whether the frame data ends with a 4-byte FCS
    pub fn fcs_at_end(&self) -> bool {
        self.flags.map_or(false, |f| f & FLAG_FCS_AT_END != 0)
    }

    /// Channel frequency, 0 when no channel field was present
    pub fn freq_mhz(&self) -> u16 {
        self.channel.map_or(0, |c| c.freq_mhz)
    }
}

fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}

fn le_u16(raw: &[u8]) -> u16 {
    u16::from_le_bytes([raw[0], raw[1]])
}

fn le_u64(raw: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&raw[..8]);
    u64::from_le_bytes(bytes)
}

/// Walk the fields announced by the first presence word.
///
/// `header` is the header bytes only (up to the declared length) and `start`
/// is the offset just past the last presence word. Alignment is relative to
/// the start of the header.
pub(super) fn walk(header: &[u8], present: u32, start: usize) -> RadiotapFields {
    let mut fields = RadiotapFields::default();
    let mut offset = start;

    for &(bit, align, size) in STANDARD_FIELDS {
        if present & (1 << bit) == 0 {
            continue;
        }

        offset = align_up(offset, align);
        let Some(raw) = header.get(offset..offset + size) else {
            break;
        };

        match bit {
            BIT_TSFT => fields.tsft = Some(le_u64(raw)),
            BIT_FLAGS => fields.flags = Some(raw[0]),
            BIT_CHANNEL => {
                fields.channel = Some(Channel {
                    freq_mhz: le_u16(&raw[0..2]),
                    flags: le_u16(&raw[2..4]),
                })
            }
            BIT_ANTENNA_SIGNAL => fields.antenna_signal = Some(raw[0] as i8),
            _ => {}
        }

        offset += size;
    }

    fields
}
