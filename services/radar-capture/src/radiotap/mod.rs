//! Radiotap header parsing
//!
//! Every captured frame starts with a radiotap header:
//! 1. Version byte (always 0) and a pad byte
//! 2. Total header length, u16 little-endian
//! 3. One or more 32-bit presence words (bit 31 chains another word)
//! 4. The optional fields announced by the presence words, naturally aligned
//!
//! Bytes after the declared length belong to the chipset decoders.

mod fields;
pub mod header;

pub use fields::FLAG_FCS_AT_END;
pub use header::{parse_header, FrameHeader};
