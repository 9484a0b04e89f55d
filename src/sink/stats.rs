use crate::measure::LatencyRecorder;
use crate::sink::{Measurement, Sink};
use spdlog::info;

/// Wraps another sink and aggregates delivered latencies into a histogram,
/// logging a summary every `report_interval` deliveries.
pub struct StatsSink<S> {
    name: String,
    report_interval: usize,
    inner: S,
    recorder: LatencyRecorder,
    delivered: usize,
}

impl<S: Sink> StatsSink<S> {
    pub fn new(name: impl Into<String>, report_interval: usize, inner: S) -> Self {
        assert!(report_interval > 0, "report_interval must be greater than 0");
        Self {
            name: name.into(),
            report_interval,
            inner,
            recorder: LatencyRecorder::new(),
            delivered: 0,
        }
    }

    pub fn recorder(&self) -> &LatencyRecorder {
        &self.recorder
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Sink> Sink for StatsSink<S> {
    fn emit(&mut self, measurement: &Measurement) {
        if measurement.delivered() {
            self.recorder.record_ns(measurement.elapsed_ns);
            self.delivered += 1;
            if self.delivered.is_multiple_of(self.report_interval) {
                info!(
                    "[{}] delivery latency: {}",
                    self.name,
                    self.recorder.format_stats()
                );
            }
        }
        self.inner.emit(measurement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::ids::CellKind;
    use crate::sink::Outcome;

    #[test]
    fn test_only_deliveries_recorded_and_passed_through() {
        let mut sink = StatsSink::new("test", 100, Vec::new());

        let queued = Measurement::new(
            1,
            1,
            CellKind::Fixed,
            Timestamp::new(1, 0),
            Timestamp::new(1, 100),
            Outcome::Queued,
        );
        let delivered = Measurement::new(
            1,
            1,
            CellKind::Fixed,
            Timestamp::new(1, 0),
            Timestamp::new(1, 5000),
            Outcome::Delivered,
        );
        sink.emit(&queued);
        sink.emit(&delivered);

        assert_eq!(sink.recorder().stats().count, 1);
        assert_eq!(sink.into_inner().len(), 2);
    }
}
