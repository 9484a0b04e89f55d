mod binary;
mod log;
mod stats;

pub use binary::BinarySink;
pub use log::LogSink;
pub use stats::StatsSink;

use crate::clock::Timestamp;
use crate::config::SinkChoice;
use crate::error::TraceError;
use crate::ids::CellKind;
use bytemuck::{Pod, Zeroable};

/// What a measurement describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Outcome {
    /// Cell accepted into a connection's outbuf.
    Queued = 0,
    /// Every byte of the cell confirmed written to the kernel.
    Delivered = 1,
}

/// One emitted measurement. Fixed shape, no free-form payload.
///
/// `cell_id` is only unique within its `kind`: Fixed and Var cells draw from
/// separate id streams. `elapsed_ns` is zero when either timestamp is
/// unknown; consumers must read that as "unknown", not as a zero-length wait.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct Measurement {
    pub conn_id: u64,
    pub enqueue_ts: Timestamp,
    pub completion_ts: Timestamp,
    pub elapsed_ns: i64,
    pub cell_id: u32,
    pub kind: u32,
    pub outcome: u32,
    pub _pad: u32,
}

impl Measurement {
    pub fn new(
        conn_id: u64,
        cell_id: u32,
        kind: CellKind,
        enqueue_ts: Timestamp,
        completion_ts: Timestamp,
        outcome: Outcome,
    ) -> Self {
        let elapsed_ns = if enqueue_ts.is_unknown() || completion_ts.is_unknown() {
            0
        } else {
            completion_ts.nanos_since(enqueue_ts)
        };
        Self {
            conn_id,
            enqueue_ts,
            completion_ts,
            elapsed_ns,
            cell_id,
            kind: kind.as_u32(),
            outcome: outcome as u32,
            _pad: 0,
        }
    }

    #[inline(always)]
    pub fn delivered(&self) -> bool {
        self.outcome == Outcome::Delivered as u32
    }
}

/// Destination for emitted measurements.
///
/// Implementations are interchangeable; the tracer never depends on which one
/// is wired in.
pub trait Sink {
    fn emit(&mut self, measurement: &Measurement);
}

/// Discards every measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl Sink for NullSink {
    #[inline(always)]
    fn emit(&mut self, _measurement: &Measurement) {}
}

impl Sink for Box<dyn Sink> {
    fn emit(&mut self, measurement: &Measurement) {
        (**self).emit(measurement);
    }
}

/// Collects measurements for inspection. Used by tests and harnesses.
impl Sink for Vec<Measurement> {
    fn emit(&mut self, measurement: &Measurement) {
        self.push(*measurement);
    }
}

/// Resolve the configured sink once at startup.
pub fn build_sink(choice: &SinkChoice) -> Result<Box<dyn Sink>, TraceError> {
    Ok(match choice {
        SinkChoice::Null => Box::new(NullSink),
        SinkChoice::Log => Box::new(LogSink),
        SinkChoice::Binary(path) => Box::new(BinarySink::create(path)?),
    })
}
