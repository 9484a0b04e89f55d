use crate::sink::{Measurement, Sink};
use spdlog::debug;

/// Formats each measurement as one line in the operational log.
///
/// Line shape: `[cell-trace] <enqueue_ts> <completion_ts> <elapsed_ns>
/// id=<id> conn=<conn> <state>`, where unknown timestamps print as `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl Sink for LogSink {
    fn emit(&mut self, m: &Measurement) {
        let state = if m.delivered() {
            "written to kernel"
        } else {
            "waiting in outbuf"
        };
        debug!(
            "[cell-trace] {}.{} {}.{} {} id={} conn={} {}",
            m.enqueue_ts.sec,
            m.enqueue_ts.nsec,
            m.completion_ts.sec,
            m.completion_ts.nsec,
            m.elapsed_ns,
            m.cell_id,
            m.conn_id,
            state
        );
    }
}
