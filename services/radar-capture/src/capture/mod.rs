//! Capture sources
//!
//! A source hands out one raw radiotap frame at a time, blocking until the
//! next one is available:
//! - `OfflineSource` replays a classic pcap file
//! - `LiveSource` reads a monitor-mode interface through libpcap (feature `live`)

#[cfg(feature = "live")]
mod live;
mod offline;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

#[cfg(feature = "live")]
pub use live::{LiveConfig, LiveSource};
pub use offline::OfflineSource;

/// Coarse capture filter: rx status PHY error with a radar PHY error code.
/// Offsets are into the atheros vendor radiotap header.
pub const RADAR_FILTER: &str = "radio[73] == 0x2 && (radio[72] == 5 || radio[72] == 24)";

/// Link type of radiotap-prefixed 802.11 frames
pub const DLT_IEEE802_11_RADIO: u32 = 127;

/// One captured frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Captured bytes (may be shorter than the frame on air)
    pub data: Vec<u8>,
    /// Length of the frame on air
    pub orig_len: u32,
    /// Capture time, when the source records one
    pub captured_at: Option<DateTime<Utc>>,
}

impl RawFrame {
    pub fn new(data: Vec<u8>) -> Self {
        let orig_len = data.len() as u32;
        Self {
            data,
            orig_len,
            captured_at: None,
        }
    }

    /// Number of bytes actually captured
    pub fn caplen(&self) -> usize {
        self.data.len()
    }
}

/// Fatal capture failures; these end the run
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open capture file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pcap error: {0}")]
    Pcap(#[from] pcap_file::PcapError),

    #[error("unsupported link type {0}, expected radiotap (127)")]
    LinkType(u32),

    #[error("capture device error: {0}")]
    Device(String),

    #[error("live capture is not built in (rebuild with --features live)")]
    LiveUnsupported,
}

/// Blocking pull of the next frame.
///
/// `Ok(None)` is end of stream. Errors are fatal.
pub trait CaptureSource {
    fn next_frame(&mut self) -> Result<Option<RawFrame>, CaptureError>;
}

impl<S: CaptureSource + ?Sized> CaptureSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<RawFrame>, CaptureError> {
        (**self).next_frame()
    }
}

/// In-memory replay, in order
impl CaptureSource for std::vec::IntoIter<RawFrame> {
    fn next_frame(&mut self) -> Result<Option<RawFrame>, CaptureError> {
        Ok(self.next())
    }
}

/// Capture time from seconds and sub-second nanoseconds
pub(crate) fn capture_time(secs: i64, nanos: u32) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, nanos).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_in_order() {
        let frames = vec![RawFrame::new(vec![1]), RawFrame::new(vec![2, 2])];
        let mut source = frames.into_iter();
        assert_eq!(source.next_frame().unwrap().unwrap().data, vec![1]);
        assert_eq!(source.next_frame().unwrap().unwrap().caplen(), 2);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_capture_time() {
        let ts = capture_time(1_700_000_000, 500_000_000).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }
}
