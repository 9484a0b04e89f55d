mod clock;
mod config;
mod error;
mod ids;
mod ledger;
pub mod measure;
mod sampler;
mod sink;
mod tracer;

pub use crate::clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use crate::config::{SinkChoice, TraceConfig};
pub use crate::error::TraceError;
pub use crate::ids::{CellKind, IdAllocator};
pub use crate::ledger::{CellRecord, ConnectionLedger, DuplicateCell};
pub use crate::sampler::Sampler;
pub use crate::sink::{
    BinarySink, LogSink, Measurement, NullSink, Outcome, Sink, StatsSink, build_sink,
};
pub use crate::tracer::{CellTag, CellTracer};
