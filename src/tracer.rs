use crate::clock::{Clock, SystemClock, Timestamp};
use crate::config::TraceConfig;
use crate::ids::{CellKind, IdAllocator};
use crate::ledger::{CellRecord, ConnectionLedger};
use crate::sampler::Sampler;
use crate::sink::{Measurement, NullSink, Outcome, Sink};
use fxhash::FxHashMap;
use spdlog::{debug, info, warn};

/// Identity handed back to the transport when a cell is read from an inbuf.
///
/// The transport attaches it to the cell and passes it back, unchanged, when
/// the cell is appended to an outbuf. An id of 0 means the cell is untracked
/// and every later operation on it is free. Ids are only unique within a
/// kind, so the tag carries both; the kind is meaningless when untracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellTag {
    pub id: u32,
    pub kind: CellKind,
    pub ts: Timestamp,
}

impl CellTag {
    pub const UNTRACKED: CellTag = CellTag {
        id: 0,
        kind: CellKind::Fixed,
        ts: Timestamp::UNKNOWN,
    };

    #[inline(always)]
    pub fn is_tracked(&self) -> bool {
        self.id != 0
    }
}

/// Tracks sampled cells from inbuf read to full kernel write, per connection.
///
/// Per record the lifecycle is absent -> enqueued -> delivered. A record
/// enters at [`on_cell_enqueued`](Self::on_cell_enqueued) with its absolute
/// end offset in the outbuf, every flush notification advances all records of
/// that connection by the flushed amount, and a record crossing zero is
/// removed and reported exactly once.
///
/// Single-threaded by design: one event loop drives reads, writes, and flush
/// notifications for the connections it owns, so the tracer does no locking.
/// On a transport with per-worker connection ownership, give each worker its
/// own tracer; a single connection's events must never reach two instances.
pub struct CellTracer<S: Sink = NullSink, C: Clock = SystemClock> {
    enabled: bool,
    sampler: Sampler,
    ids: IdAllocator,
    connections: FxHashMap<u64, ConnectionLedger>,
    sink: S,
    clock: C,
    anomalies: u64,
}

impl<S: Sink> CellTracer<S, SystemClock> {
    pub fn new(config: &TraceConfig, sink: S) -> Self {
        Self::with_clock(config, sink, SystemClock)
    }
}

impl<S: Sink, C: Clock> CellTracer<S, C> {
    pub fn with_clock(config: &TraceConfig, sink: S, clock: C) -> Self {
        let every_n = config.effective_every_n();
        info!(
            "[cell-trace] (re)init cell tracing. enabled: {}, n: {}",
            config.enabled, every_n
        );
        Self {
            enabled: config.enabled,
            sampler: Sampler::new(every_n),
            ids: IdAllocator::new(),
            connections: FxHashMap::default(),
            sink,
            clock,
            anomalies: 0,
        }
    }

    /// Re-read sampling configuration, e.g. after a config reload. Resets the
    /// sampler but leaves cells already in flight untouched.
    pub fn reinit(&mut self, config: &TraceConfig) {
        let every_n = config.effective_every_n();
        self.enabled = config.enabled;
        self.sampler.reset(every_n);
        info!(
            "[cell-trace] (re)init cell tracing. enabled: {}, n: {}",
            self.enabled, every_n
        );
    }

    /// Called when a cell is read from a connection's inbuf.
    ///
    /// Returns the tag the transport must attach to the cell. Most cells come
    /// back untracked; one out of every `sample_every_n` gets an id and a
    /// timestamp (unknown if the clock read failed, never an error).
    pub fn on_cell_read(&mut self, conn_id: u64, kind: CellKind) -> CellTag {
        if !self.enabled {
            return CellTag::UNTRACKED;
        }
        if !self.sampler.hit() {
            return CellTag::UNTRACKED;
        }

        let id = self.ids.allocate(kind);
        let ts = self.clock.now();
        debug!(
            "[cell-trace] {}.{} {:?} id={} read from connection {} inbuf",
            ts.sec, ts.nsec, kind, id, conn_id
        );
        CellTag { id, kind, ts }
    }

    /// Called when a tracked cell is appended to a connection's outbuf, with
    /// the outbuf depth immediately before the append.
    ///
    /// The record's flush target is `queued_bytes + wire_size`: the absolute
    /// offset at which the cell's last byte leaves the buffer, reached exactly
    /// when cumulative flushes drain the cell and everything ahead of it.
    /// Also emits a `Queued` measurement for the time spent between inbuf and
    /// outbuf.
    ///
    /// An id already in flight for this connection is an anomaly (double
    /// enqueue, or the id counter wrapped into a live record): the call is
    /// logged, counted, and changes nothing.
    pub fn on_cell_enqueued(
        &mut self,
        conn_id: u64,
        tag: CellTag,
        wire_size: usize,
        queued_bytes: usize,
    ) {
        if !self.enabled || !tag.is_tracked() {
            return;
        }

        let ledger = self.connections.entry(conn_id).or_default();
        let record = CellRecord {
            id: tag.id,
            kind: tag.kind,
            enqueued_at: tag.ts,
            remaining: queued_bytes as i64 + wire_size as i64,
        };
        if let Err(dup) = ledger.insert(record) {
            warn!(
                "[cell-trace] {:?} id={} already in our state for connection {}",
                dup.kind, dup.id, conn_id
            );
            self.anomalies += 1;
            return;
        }

        let now = self.clock.now();
        self.sink.emit(&Measurement::new(
            conn_id,
            tag.id,
            tag.kind,
            tag.ts,
            now,
            Outcome::Queued,
        ));
    }

    /// Called when the transport reports `amount` bytes flushed to the kernel
    /// for a connection.
    ///
    /// Every in-flight record for that connection advances by `amount`;
    /// records fully drained are removed and reported exactly once. A
    /// connection with no ledger is a silent no-op (never tracked, or already
    /// drained).
    pub fn on_bytes_flushed(&mut self, conn_id: u64, amount: usize) {
        if !self.enabled {
            return;
        }
        let Some(ledger) = self.connections.get_mut(&conn_id) else {
            return;
        };

        let now = self.clock.now();
        let sink = &mut self.sink;
        ledger.apply_flush(amount as i64, |record| {
            sink.emit(&Measurement::new(
                conn_id,
                record.id,
                record.kind,
                record.enqueued_at,
                now,
                Outcome::Delivered,
            ));
        });
    }

    /// Rejected double enqueues seen so far.
    pub fn anomaly_count(&self) -> u64 {
        self.anomalies
    }

    /// Cells currently in flight for a connection.
    pub fn tracked_cells(&self, conn_id: u64) -> usize {
        self.connections.get(&conn_id).map_or(0, ConnectionLedger::len)
    }

    /// Unflushed bytes remaining for one in-flight cell.
    pub fn remaining_bytes(&self, conn_id: u64, kind: CellKind, cell_id: u32) -> Option<i64> {
        self.connections
            .get(&conn_id)?
            .get(kind, cell_id)
            .map(|record| record.remaining)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
