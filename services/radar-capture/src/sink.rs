//! Output sinks for decoded pulses

use std::io::Write;
use thiserror::Error;

use crate::chip::RadarPulseRecord;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accepts records one at a time, in arrival order
pub trait RecordSink {
    fn emit(&mut self, record: &RadarPulseRecord) -> Result<(), SinkError>;
}

impl<K: RecordSink + ?Sized> RecordSink for Box<K> {
    fn emit(&mut self, record: &RadarPulseRecord) -> Result<(), SinkError> {
        (**self).emit(record)
    }
}

/// Collects records in memory
impl RecordSink for Vec<RadarPulseRecord> {
    fn emit(&mut self, record: &RadarPulseRecord) -> Result<(), SinkError> {
        self.push(*record);
        Ok(())
    }
}

/// `ts: .., freq=.., rssi=.., dur=..` lines
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for TextSink<W> {
    fn emit(&mut self, record: &RadarPulseRecord) -> Result<(), SinkError> {
        writeln!(self.out, "{}", record)?;
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON object per line
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn emit(&mut self, record: &RadarPulseRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RadarPulseRecord {
        RadarPulseRecord {
            timestamp: 42,
            freq_mhz: 5320,
            rssi: -7,
            duration: 11,
        }
    }

    #[test]
    fn test_text_sink() {
        let mut sink = TextSink::new(Vec::new());
        sink.emit(&record()).unwrap();
        sink.emit(&record()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "ts: 42, freq=5320, rssi=-7, dur=11\nts: 42, freq=5320, rssi=-7, dur=11\n"
        );
    }

    #[test]
    fn test_json_sink() {
        let mut sink = JsonSink::new(Vec::new());
        sink.emit(&record()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"timestamp\":42,\"freq_mhz\":5320,\"rssi\":-7,\"duration\":11}\n"
        );
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<RadarPulseRecord> = Vec::new();
        sink.emit(&record()).unwrap();
        assert_eq!(sink, vec![record()]);
    }
}
