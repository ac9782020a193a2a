//! Live capture from a monitor-mode interface via libpcap
//!
//! libpcap is read on a dedicated thread; frames cross to the pipeline over a
//! bounded channel. The capture thread blocks when the pipeline falls behind,
//! so frames are never reordered or dropped in-process.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use pcap::{Active, Capture, Linktype};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{capture_time, CaptureError, CaptureSource, RawFrame};

/// How long `next_frame` waits before re-checking the stop flag
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// libpcap read timeout in milliseconds
const READ_TIMEOUT_MS: i32 = 1000;

/// Live capture configuration
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub interface: String,
    pub snaplen: i32,
    pub filter: String,
    pub channel_capacity: usize,
}

/// Frames forwarded by the capture thread
type CaptureItem = Result<RawFrame, CaptureError>;

/// Live radiotap capture
pub struct LiveSource {
    frame_rx: Receiver<CaptureItem>,
    stop: Arc<AtomicBool>,
    frames_captured: Arc<AtomicU64>,
}

impl LiveSource {
    /// Open the interface and start the capture thread.
    ///
    /// Open, datalink and filter errors are reported here, before any frame
    /// is read. Setting `stop` ends the stream at the next poll.
    pub fn open(config: LiveConfig, stop: Arc<AtomicBool>) -> Result<Self, CaptureError> {
        info!("===========================================");
        info!("  Starting live radiotap capture");
        info!("===========================================");
        info!("  Interface: {}", config.interface);
        info!("  Snaplen: {}", config.snaplen);
        info!("  Filter: {}", config.filter);

        let capture = open_capture(&config)?;

        let (frame_tx, frame_rx) = bounded::<CaptureItem>(config.channel_capacity);
        let frames_captured = Arc::new(AtomicU64::new(0));

        let thread_stop = stop.clone();
        let thread_frames = frames_captured.clone();
        thread::Builder::new()
            .name("pcap-capture".to_string())
            .spawn(move || run_capture(capture, thread_stop, thread_frames, frame_tx))
            .map_err(|e| CaptureError::Device(format!("failed to spawn capture thread: {}", e)))?;

        Ok(Self {
            frame_rx,
            stop,
            frames_captured,
        })
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured.load(Ordering::Relaxed)
    }
}

fn open_capture(config: &LiveConfig) -> Result<Capture<Active>, CaptureError> {
    let device_error = |e: pcap::Error| CaptureError::Device(format!("{}: {}", config.interface, e));

    let mut capture = Capture::from_device(config.interface.as_str())
        .map_err(device_error)?
        .promisc(true)
        .snaplen(config.snaplen)
        .timeout(READ_TIMEOUT_MS)
        .open()
        .map_err(device_error)?;

    capture
        .set_datalink(Linktype::IEEE802_11_RADIOTAP)
        .map_err(device_error)?;

    capture
        .filter(&config.filter, true)
        .map_err(device_error)?;

    Ok(capture)
}

/// Capture loop (runs in dedicated thread)
fn run_capture(
    mut capture: Capture<Active>,
    stop: Arc<AtomicBool>,
    frames_captured: Arc<AtomicU64>,
    frame_tx: Sender<CaptureItem>,
) {
    info!("Live capture started");

    while !stop.load(Ordering::SeqCst) {
        match capture.next_packet() {
            Ok(packet) => {
                frames_captured.fetch_add(1, Ordering::Relaxed);

                let ts = packet.header.ts;
                let frame = RawFrame {
                    data: packet.data.to_vec(),
                    orig_len: packet.header.len,
                    captured_at: capture_time(ts.tv_sec as i64, (ts.tv_usec as u32) * 1000),
                };

                if frame_tx.send(Ok(frame)).is_err() {
                    debug!("Frame channel closed, stopping capture");
                    break;
                }
            }
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => {
                error!("Capture read error: {}", e);
                let _ = frame_tx.send(Err(CaptureError::Device(e.to_string())));
                break;
            }
        }
    }

    match capture.stats() {
        Ok(stats) => info!(
            "Live capture stopped. Received: {}, dropped by kernel: {}, dropped by interface: {}",
            stats.received, stats.dropped, stats.if_dropped
        ),
        Err(e) => info!("Live capture stopped ({})", e),
    }
}

impl CaptureSource for LiveSource {
    fn next_frame(&mut self) -> Result<Option<RawFrame>, CaptureError> {
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(None);
            }

            match self.frame_rx.recv_timeout(POLL_INTERVAL) {
                Ok(item) => return item.map(Some),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Capture thread exited after {} frames", self.frames_captured());
                    return Ok(None);
                }
            }
        }
    }
}

impl Drop for LiveSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}
