//! Normalized radar pulse record

use serde::Serialize;
use std::fmt;

/// One decoded radar pulse, independent of the chipset that saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RadarPulseRecord {
    /// Reconstructed 64-bit TSF of the pulse, microseconds
    pub timestamp: u64,

    /// Channel center frequency in MHz (0 if the capture did not say)
    pub freq_mhz: u16,

    /// Reported signal strength, chip scale
    pub rssi: i8,

    /// Pulse duration, chip units
    pub duration: u8,
}

impl fmt::Display for RadarPulseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ts: {}, freq={}, rssi={}, dur={}",
            self.timestamp, self.freq_mhz, self.rssi, self.duration
        )
    }
}
