use hdrhistogram::Histogram;

const MAX_NANOS: u64 = 1_000_000_000_000;

/// Summary of recorded delivery latencies, all values in nanoseconds.
#[derive(Debug, Clone, Default)]
pub struct LatencySummary {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
}

/// Aggregates delivery latencies into an HdrHistogram.
///
/// Unknown latencies (zero or negative, from cells with an unknown timestamp)
/// are dropped rather than polluting the distribution.
pub struct LatencyRecorder {
    histogram: Histogram<u64>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        // Range: 1ns to 1,000s, 3 significant figures
        let histogram = Histogram::<u64>::new_with_bounds(1, MAX_NANOS, 3).unwrap();
        Self { histogram }
    }

    pub fn record_ns(&mut self, nanos: i64) {
        if nanos <= 0 {
            return;
        }
        let nanos = (nanos as u64).min(MAX_NANOS);
        // Cannot fail after clamping into the histogram's range.
        self.histogram.record(nanos).unwrap();
    }

    pub fn reset(&mut self) {
        self.histogram.reset();
    }

    pub fn stats(&self) -> LatencySummary {
        let count = self.histogram.len();
        if count == 0 {
            return LatencySummary::default();
        }

        LatencySummary {
            count,
            min: self.histogram.min(),
            max: self.histogram.max(),
            mean: self.histogram.mean(),
            p50: self.histogram.value_at_quantile(0.5),
            p90: self.histogram.value_at_quantile(0.9),
            p99: self.histogram.value_at_quantile(0.99),
            p999: self.histogram.value_at_quantile(0.999),
        }
    }

    pub fn format_stats(&self) -> String {
        let stats = self.stats();
        if stats.count == 0 {
            return "no samples yet".into();
        }

        format!(
            "count={}\tmin={}\tmax={}\tmean={}\tp50={}\tp90={}\tp99={}\tp999={}",
            stats.count,
            format_nanos(stats.min as f64),
            format_nanos(stats.max as f64),
            format_nanos(stats.mean),
            format_nanos(stats.p50 as f64),
            format_nanos(stats.p90 as f64),
            format_nanos(stats.p99 as f64),
            format_nanos(stats.p999 as f64),
        )
    }
}

impl Default for LatencyRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn format_nanos(nanos: f64) -> String {
    if nanos < 1000.0 {
        format!("{:.0}ns", nanos)
    } else if nanos < 1_000_000.0 {
        format!("{:.1}us", nanos / 1000.0)
    } else if nanos < 1_000_000_000.0 {
        format!("{:.1}ms", nanos / 1_000_000.0)
    } else {
        format!("{:.2}s", nanos / 1_000_000_000.0)
    }
}
