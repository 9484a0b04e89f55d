use std::path::PathBuf;

/// Which sink receives measurements. Resolved once at startup by
/// [`build_sink`](crate::build_sink).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SinkChoice {
    /// Discard everything.
    #[default]
    Null,
    /// One formatted line per measurement in the operational log.
    Log,
    /// Raw records appended to a file for an external analysis harness.
    Binary(PathBuf),
}

/// Tracing configuration.
///
/// Reloading at runtime is safe: [`CellTracer::reinit`](crate::CellTracer::reinit)
/// resets sampling state without touching cells already in flight.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Master switch. When false every tracer operation is a no-op.
    pub enabled: bool,
    /// Track one cell out of every `sample_every_n`. Values below 1 disable
    /// tracking entirely.
    pub sample_every_n: i32,
    pub sink: SinkChoice,
}

impl TraceConfig {
    /// Sampling threshold with misconfiguration clamped out: anything below 1
    /// becomes 0, which the sampler reads as "trace nothing". The hot path
    /// never sees an invalid threshold.
    pub fn effective_every_n(&self) -> u32 {
        if self.sample_every_n < 1 {
            0
        } else {
            self.sample_every_n as u32
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sample_every_n: 1,
            sink: SinkChoice::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_threshold_clamps_to_trace_nothing() {
        for n in [0, -1, i32::MIN] {
            let config = TraceConfig {
                enabled: true,
                sample_every_n: n,
                sink: SinkChoice::Null,
            };
            assert_eq!(config.effective_every_n(), 0);
        }
    }

    #[test]
    fn test_valid_threshold_passes_through() {
        let config = TraceConfig {
            enabled: true,
            sample_every_n: 100,
            sink: SinkChoice::Null,
        };
        assert_eq!(config.effective_every_n(), 100);
    }
}
