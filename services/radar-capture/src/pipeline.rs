//! Capture → radiotap → chip decoder → sink
//!
//! One frame at a time, in arrival order. Bad frames are logged and skipped;
//! only capture and sink failures end the run.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::capture::{CaptureError, CaptureSource, RawFrame};
use crate::chip::{ChipDecoder, RadarPulseRecord};
use crate::error::DecodeError;
use crate::radiotap::parse_header;
use crate::sink::{RecordSink, SinkError};

/// Bytes of a rejected frame shown in debug logs
const HEX_PREVIEW_LEN: usize = 32;

/// Interval between progress reports
const STATS_INTERVAL: Duration = Duration::from_secs(10);

/// Fatal pipeline failures
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_seen: u64,
    pub records_emitted: u64,
    pub unsupported_version: u64,
    pub truncated_header: u64,
    pub short_payload: u64,
    pub not_a_radar_event: u64,
    pub unknown_chip: u64,
}

impl PipelineStats {
    pub fn record_rejection(&mut self, error: &DecodeError) {
        match error {
            DecodeError::UnsupportedVersion(_) => self.unsupported_version += 1,
            DecodeError::TruncatedHeader { .. } => self.truncated_header += 1,
            DecodeError::ShortPayload { .. } => self.short_payload += 1,
            DecodeError::NotARadarEvent { .. } => self.not_a_radar_event += 1,
            DecodeError::UnknownChip(_) => self.unknown_chip += 1,
        }
    }

    pub fn rejected(&self) -> u64 {
        self.unsupported_version
            + self.truncated_header
            + self.short_payload
            + self.not_a_radar_event
            + self.unknown_chip
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frames: {} | Pulses: {} | Rejected: {} (version: {}, header: {}, payload: {}, not radar: {})",
            self.frames_seen,
            self.records_emitted,
            self.rejected(),
            self.unsupported_version,
            self.truncated_header,
            self.short_payload,
            self.not_a_radar_event
        )
    }
}

/// Drives frames from a capture source through the decoder into a sink
pub struct Pipeline<S, K> {
    source: S,
    decoder: ChipDecoder,
    sink: K,
    stop: Arc<AtomicBool>,
    stats: PipelineStats,
}

impl<S: CaptureSource, K: RecordSink> Pipeline<S, K> {
    pub fn new(source: S, decoder: ChipDecoder, sink: K, stop: Arc<AtomicBool>) -> Self {
        Self {
            source,
            decoder,
            sink,
            stop,
            stats: PipelineStats::default(),
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Run until end of stream, stop request, or a fatal error
    pub fn run(mut self) -> Result<PipelineStats, PipelineError> {
        info!("Decoding radar pulses as {}", self.decoder.kind());

        let mut last_stats_time = Instant::now();

        while !self.stop.load(Ordering::SeqCst) {
            let Some(frame) = self.source.next_frame()? else {
                info!("End of capture stream");
                break;
            };

            self.handle_frame(&frame)?;

            if last_stats_time.elapsed() >= STATS_INTERVAL {
                info!("[Pipeline] {}", self.stats);
                last_stats_time = Instant::now();
            }
        }

        info!("Pipeline finished. {}", self.stats);
        Ok(self.stats)
    }

    /// Decode one frame and emit the record if there is one
    pub fn handle_frame(&mut self, frame: &RawFrame) -> Result<(), SinkError> {
        self.stats.frames_seen += 1;

        match self.decode_frame(frame) {
            Ok(record) => {
                trace!("Pulse: {}", record);
                self.sink.emit(&record)?;
                self.stats.records_emitted += 1;
            }
            Err(e) => {
                self.stats.record_rejection(&e);
                let preview = &frame.data[..frame.data.len().min(HEX_PREVIEW_LEN)];
                debug!(
                    kind = e.kind(),
                    frame = self.stats.frames_seen,
                    caplen = frame.caplen(),
                    orig_len = frame.orig_len,
                    captured_at = ?frame.captured_at,
                    "Skipping frame: {} [{}]",
                    e,
                    hex::encode(preview)
                );
            }
        }

        Ok(())
    }

    fn decode_frame(&mut self, frame: &RawFrame) -> Result<RadarPulseRecord, DecodeError> {
        let (header, payload_offset) = parse_header(&frame.data)?;
        trace!(
            "Radiotap header: len={}, present={:#010x}",
            header.length,
            header.present_word()
        );
        self.decoder.decode(&header, &frame.data[payload_offset..])
    }
}
