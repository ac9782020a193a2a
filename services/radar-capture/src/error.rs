//! Per-frame decode failures
//!
//! Every variant here is non-fatal: the pipeline logs it and moves on to the
//! next frame.

use thiserror::Error;

use crate::chip::ChipKind;

/// Reasons a frame did not produce a radar pulse record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported radiotap version {0}")]
    UnsupportedVersion(u8),

    #[error("truncated header: needs {needed} bytes, {available} available")]
    TruncatedHeader { needed: usize, available: usize },

    #[error("short payload for {chip}: needs {needed} bytes, {available} available")]
    ShortPayload {
        chip: ChipKind,
        needed: usize,
        available: usize,
    },

    #[error("not a radar event (phy error code {phy_code}, pulse info {pulse_info:#04x})")]
    NotARadarEvent { phy_code: u8, pulse_info: u8 },

    #[error("unknown chip '{0}'")]
    UnknownChip(String),
}

impl DecodeError {
    /// Short stable name, used for stats and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion(_) => "unsupported_version",
            Self::TruncatedHeader { .. } => "truncated_header",
            Self::ShortPayload { .. } => "short_payload",
            Self::NotARadarEvent { .. } => "not_a_radar_event",
            Self::UnknownChip(_) => "unknown_chip",
        }
    }
}
