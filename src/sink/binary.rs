use crate::error::TraceError;
use crate::sink::{Measurement, Sink};
use bytemuck::bytes_of;
use spdlog::warn;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends raw fixed-size measurement records to a writer, for consumption by
/// an external simulation or analysis harness.
///
/// Write failures never reach the instrumented data path: the first one is
/// logged, the rest only counted.
pub struct BinarySink<W: Write> {
    writer: W,
    dropped: u64,
}

impl BinarySink<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| TraceError::SinkCreate {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> BinarySink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, dropped: 0 }
    }

    /// Measurements lost to write failures.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl<W: Write> Sink for BinarySink<W> {
    fn emit(&mut self, measurement: &Measurement) {
        if let Err(err) = self.writer.write_all(bytes_of(measurement)) {
            if self.dropped == 0 {
                warn!("[cell-trace] sink write failed: {}", err);
            }
            self.dropped += 1;
        }
    }
}

impl<W: Write> Drop for BinarySink<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
