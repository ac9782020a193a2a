//! Capture file replay

use pcap_file::pcap::PcapReader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use super::{capture_time, CaptureError, CaptureSource, RawFrame, DLT_IEEE802_11_RADIO};

/// Reads radiotap frames from a classic pcap stream
pub struct OfflineSource<R: Read> {
    reader: PcapReader<R>,
    frames_read: u64,
}

impl OfflineSource<BufReader<File>> {
    /// Open a capture file
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let file = File::open(path).map_err(|source| CaptureError::Open {
            path: path.display().to_string(),
            source,
        })?;

        info!("Replaying capture file {}", path.display());
        Self::new(BufReader::new(file))
    }
}

impl<R: Read> OfflineSource<R> {
    /// Wrap a pcap byte stream; the link type must be radiotap
    pub fn new(reader: R) -> Result<Self, CaptureError> {
        let reader = PcapReader::new(reader)?;
        let pcap_header = reader.header();

        let datalink = u32::from(pcap_header.datalink);
        if datalink != DLT_IEEE802_11_RADIO {
            return Err(CaptureError::LinkType(datalink));
        }

        debug!(
            "pcap v{}.{}, snaplen {}",
            pcap_header.version_major, pcap_header.version_minor, pcap_header.snaplen
        );

        Ok(Self {
            reader,
            frames_read: 0,
        })
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl<R: Read> CaptureSource for OfflineSource<R> {
    fn next_frame(&mut self) -> Result<Option<RawFrame>, CaptureError> {
        let packet = match self.reader.next_packet() {
            None => {
                debug!("End of capture after {} frames", self.frames_read);
                return Ok(None);
            }
            Some(packet) => packet?,
        };

        self.frames_read += 1;

        let captured_at = capture_time(
            packet.timestamp.as_secs() as i64,
            packet.timestamp.subsec_nanos(),
        );

        Ok(Some(RawFrame {
            data: packet.data.into_owned(),
            orig_len: packet.orig_len,
            captured_at,
        }))
    }
}
