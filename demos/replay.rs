use cell_trace::{CellKind, CellTracer, SinkChoice, StatsSink, TraceConfig, build_sink};
use clap::Parser;
use spdlog::info;

/// Replays a synthetic cell schedule through the tracer and prints the
/// delivery latency histogram.
#[derive(Parser, Debug)]
struct Args {
    /// Number of cells to replay
    #[arg(long, default_value_t = 100_000)]
    cells: u64,

    /// Track one cell out of every N
    #[arg(long, default_value_t = 100)]
    sample_every_n: i32,

    /// Number of simulated connections
    #[arg(long, default_value_t = 8)]
    connections: u64,

    /// Cell wire size in bytes
    #[arg(long, default_value_t = 514)]
    wire_size: usize,

    /// Log a latency summary every N deliveries
    #[arg(long, default_value_t = 1000)]
    report_interval: usize,
}

fn main() {
    let args = Args::parse();

    let config = TraceConfig {
        enabled: true,
        sample_every_n: args.sample_every_n,
        sink: SinkChoice::Log,
    };
    let sink = StatsSink::new(
        "replay",
        args.report_interval,
        build_sink(&config.sink).expect("log sink needs no resources"),
    );
    let mut tracer = CellTracer::new(&config, sink);

    // Simulated outbuf depth per connection.
    let mut queued = vec![0usize; args.connections as usize];
    let mut rng: u64 = 0x2545F4914F6CDD1D;

    for i in 0..args.cells {
        rng ^= rng << 13;
        rng ^= rng >> 7;
        rng ^= rng << 17;

        let conn = i % args.connections;
        let kind = if rng % 16 == 0 {
            CellKind::Var
        } else {
            CellKind::Fixed
        };

        let tag = tracer.on_cell_read(conn, kind);
        let depth = queued[conn as usize];
        tracer.on_cell_enqueued(conn, tag, args.wire_size, depth);
        queued[conn as usize] = depth + args.wire_size;

        // Every few cells the kernel drains a chunk of some connection.
        if rng % 4 == 0 {
            let drain_conn = rng % args.connections;
            let backlog = queued[drain_conn as usize];
            let amount = backlog.min(args.wire_size * 3);
            if amount > 0 {
                tracer.on_bytes_flushed(drain_conn, amount);
                queued[drain_conn as usize] = backlog - amount;
            }
        }
    }

    // Drain whatever is left so every tracked cell gets delivered.
    for conn in 0..args.connections {
        let backlog = queued[conn as usize];
        if backlog > 0 {
            tracer.on_bytes_flushed(conn, backlog);
        }
    }

    info!(
        "[replay] done. anomalies: {}, latency: {}",
        tracer.anomaly_count(),
        tracer.sink().recorder().format_stats()
    );
}
