use cell_trace::{CellKind, CellTracer, Measurement, NullSink, SinkChoice, TraceConfig};

fn config(sample_every_n: i32) -> TraceConfig {
    TraceConfig {
        enabled: true,
        sample_every_n,
        sink: SinkChoice::Null,
    }
}

#[test]
fn test_exactly_k_tracked_per_window() {
    for n in [1i32, 2, 5, 100] {
        let mut tracer: CellTracer<NullSink> = CellTracer::new(&config(n), NullSink);
        for k in 1..=3 {
            let tracked = (0..n)
                .filter(|_| tracer.on_cell_read(1, CellKind::Fixed).is_tracked())
                .count();
            assert_eq!(tracked, 1, "window {} with n={}", k, n);
        }
    }
}

#[test]
fn test_carry_over_does_not_drift() {
    // 1000 reads at n=3 must track exactly 333, the remainder carrying over.
    let mut tracer: CellTracer<NullSink> = CellTracer::new(&config(3), NullSink);
    let tracked = (0..1000)
        .filter(|_| tracer.on_cell_read(1, CellKind::Fixed).is_tracked())
        .count();
    assert_eq!(tracked, 333);
}

#[test]
fn test_every_read_tracked_at_one() {
    let mut tracer: CellTracer<NullSink> = CellTracer::new(&config(1), NullSink);
    for i in 1..=10u32 {
        let tag = tracer.on_cell_read(1, CellKind::Fixed);
        assert_eq!(tag.id, i);
    }
}

#[test]
fn test_untracked_reads_cost_no_ids() {
    // With n=2 the id sequence must stay dense over the tracked half.
    let mut tracer: CellTracer<Vec<Measurement>> = CellTracer::new(&config(2), Vec::new());
    let ids: Vec<u32> = (0..8)
        .map(|_| tracer.on_cell_read(1, CellKind::Fixed).id)
        .collect();
    assert_eq!(ids, vec![0, 1, 0, 2, 0, 3, 0, 4]);
}

#[test]
fn test_nonpositive_threshold_traces_nothing() {
    for n in [0, -5] {
        let mut tracer: CellTracer<NullSink> = CellTracer::new(&config(n), NullSink);
        let tracked = (0..100)
            .filter(|_| tracer.on_cell_read(1, CellKind::Fixed).is_tracked())
            .count();
        assert_eq!(tracked, 0);
    }
}
