//! Radiotap header validation

use super::fields::{self, RadiotapFields};
use crate::error::DecodeError;

/// The only radiotap revision defined
pub const RADIOTAP_VERSION: u8 = 0;

/// Version, pad, length and the first presence word
pub const MIN_HEADER_LEN: usize = 8;

/// Presence bit 31: another presence word follows
const PRESENT_EXT: u32 = 1 << 31;

/// Parsed radiotap header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    /// Declared header length, i.e. offset of the first payload byte
    pub length: u16,
    /// Presence words in wire order, kept opaque
    pub present: Vec<u32>,
    /// Standard fields the decoders can use
    pub fields: RadiotapFields,
}

impl FrameHeader {
    /// First presence word
    pub fn present_word(&self) -> u32 {
        self.present.first().copied().unwrap_or(0)
    }
}

/// Parse and validate the radiotap header at the start of `frame`.
///
/// Returns the header and the payload offset. The version is checked before
/// anything else, so a bad version wins over a short buffer.
pub fn parse_header(frame: &[u8]) -> Result<(FrameHeader, usize), DecodeError> {
    let version = *frame.first().ok_or(DecodeError::TruncatedHeader {
        needed: MIN_HEADER_LEN,
        available: 0,
    })?;

    if version != RADIOTAP_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    if frame.len() < MIN_HEADER_LEN {
        return Err(DecodeError::TruncatedHeader {
            needed: MIN_HEADER_LEN,
            available: frame.len(),
        });
    }

    let length = u16::from_le_bytes([frame[2], frame[3]]);
    let header_len = length as usize;

    if header_len > frame.len() {
        return Err(DecodeError::TruncatedHeader {
            needed: header_len,
            available: frame.len(),
        });
    }

    // A declared length shorter than the fixed part can't hold a presence word
    if header_len < MIN_HEADER_LEN {
        return Err(DecodeError::TruncatedHeader {
            needed: MIN_HEADER_LEN,
            available: header_len,
        });
    }

    let header = &frame[..header_len];

    // Presence words must all fit inside the declared length
    let mut present = Vec::with_capacity(1);
    let mut offset = 4;
    loop {
        let Some(raw) = header.get(offset..offset + 4) else {
            return Err(DecodeError::TruncatedHeader {
                needed: offset + 4,
                available: header_len,
            });
        };
        let word = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        present.push(word);
        offset += 4;

        if word & PRESENT_EXT == 0 {
            break;
        }
    }

    let fields = fields::walk(header, present[0], offset);

    Ok((
        FrameHeader {
            version,
            length,
            present,
            fields,
        },
        header_len,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(extra: &[u8]) -> Vec<u8> {
        let mut frame = vec![0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        frame.extend_from_slice(extra);
        frame
    }

    #[test]
    fn test_minimal_header() {
        let frame = minimal(&[0xaa, 0xbb]);
        let (header, offset) = parse_header(&frame).unwrap();
        assert_eq!(offset, 8);
        assert_eq!(header.version, 0);
        assert_eq!(header.length, 8);
        assert_eq!(header.present, vec![0]);
        assert_eq!(header.fields, RadiotapFields::default());
        assert_eq!(&frame[offset..], &[0xaa, 0xbb]);
    }

    #[test]
    fn test_header_with_tsft_and_channel() {
        // present = TSFT | Flags | Rate | Channel, length 22
        let frame = hex::decode("000016000f000000efcdab89674523011002641490140102").unwrap();
        let (header, offset) = parse_header(&frame).unwrap();
        assert_eq!(offset, 22);
        assert_eq!(header.fields.tsft, Some(0x0123_4567_89ab_cdef));
        assert_eq!(header.fields.flags, Some(0x10));
        assert_eq!(header.fields.freq_mhz(), 5220);
        assert_eq!(&frame[offset..], &[0x01, 0x02]);
    }

    #[test]
    fn test_short_buffers_are_truncated() {
        for len in 0..MIN_HEADER_LEN {
            let frame = vec![0u8; len];
            assert!(
                matches!(parse_header(&frame), Err(DecodeError::TruncatedHeader { .. })),
                "len {}",
                len
            );
        }
    }

    #[test]
    fn test_declared_length_exceeds_buffer() {
        let mut frame = minimal(&[0u8; 4]);
        frame[2] = 13;
        assert_eq!(
            parse_header(&frame),
            Err(DecodeError::TruncatedHeader {
                needed: 13,
                available: 12
            })
        );

        frame[2] = 0xff;
        frame[3] = 0xff;
        assert!(matches!(
            parse_header(&frame),
            Err(DecodeError::TruncatedHeader { needed: 0xffff, .. })
        ));
    }

    #[test]
    fn test_declared_length_below_fixed_part() {
        let mut frame = minimal(&[]);
        frame[2] = 4;
        assert!(matches!(
            parse_header(&frame),
            Err(DecodeError::TruncatedHeader { .. })
        ));
    }

    #[test]
    fn test_bad_version_wins() {
        for version in 1..=u8::MAX {
            let mut frame = minimal(&[0u8; 16]);
            frame[0] = version;
            assert_eq!(
                parse_header(&frame),
                Err(DecodeError::UnsupportedVersion(version))
            );
            // Even a one-byte buffer reports the version
            assert_eq!(
                parse_header(&[version]),
                Err(DecodeError::UnsupportedVersion(version))
            );
        }
    }

    #[test]
    fn test_extended_presence_words() {
        // Two presence words, length 12
        let frame = [
            0x00, 0x00, 0x0c, 0x00, 0x00, 0x00, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x55,
        ];
        let (header, offset) = parse_header(&frame).unwrap();
        assert_eq!(offset, 12);
        assert_eq!(header.present, vec![0x8000_0000, 0x0000_0001]);
        assert_eq!(header.present_word(), 0x8000_0000);
    }

    #[test]
    fn test_presence_chain_past_declared_length() {
        // Extension bit set but the declared length stops after one word
        let frame = [0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(
            parse_header(&frame),
            Err(DecodeError::TruncatedHeader {
                needed: 12,
                available: 8
            })
        );
    }
}
