use crate::clock::Timestamp;
use crate::ids::CellKind;
use fxhash::FxHashMap;
use std::collections::hash_map::Entry;
use thiserror::Error;

/// One tracked cell in flight toward the transport.
#[derive(Debug, Clone, Copy)]
pub struct CellRecord {
    pub id: u32,
    pub kind: CellKind,
    /// When the cell was read from the inbuf. May be unknown.
    pub enqueued_at: Timestamp,
    /// Bytes left before this cell is fully flushed: the cell's absolute end
    /// offset in the outbuf at enqueue time, minus every flush since. Signed,
    /// the final flush may overshoot below zero.
    pub remaining: i64,
}

/// Rejected insert: the id is already tracked for this connection and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cell {kind:?} id {id} already in flight")]
pub struct DuplicateCell {
    pub kind: CellKind,
    pub id: u32,
}

/// In-flight records for one connection.
///
/// Keyed by `(kind, id)`: each kind has its own id stream starting at 1, so
/// a Fixed cell and a Var cell may legitimately carry the same bare id.
#[derive(Debug, Default)]
pub struct ConnectionLedger {
    records: FxHashMap<(CellKind, u32), CellRecord>,
}

impl ConnectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A record with the same kind and id already in flight
    /// is left untouched and the insert is rejected.
    pub fn insert(&mut self, record: CellRecord) -> Result<(), DuplicateCell> {
        match self.records.entry((record.kind, record.id)) {
            Entry::Occupied(_) => Err(DuplicateCell {
                kind: record.kind,
                id: record.id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Subtract `amount` from every record, removing those that reach zero
    /// and handing each removed record to `on_delivered`.
    ///
    /// `retain` visits each entry exactly once and removes safely while
    /// iterating, so no record is skipped or reported twice.
    pub fn apply_flush(&mut self, amount: i64, mut on_delivered: impl FnMut(CellRecord)) {
        self.records.retain(|_, record| {
            record.remaining -= amount;
            if record.remaining <= 0 {
                on_delivered(*record);
                false
            } else {
                true
            }
        });
    }

    pub fn get(&self, kind: CellKind, id: u32) -> Option<&CellRecord> {
        self.records.get(&(kind, id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, remaining: i64) -> CellRecord {
        kind_record(CellKind::Fixed, id, remaining)
    }

    fn kind_record(kind: CellKind, id: u32, remaining: i64) -> CellRecord {
        CellRecord {
            id,
            kind,
            enqueued_at: Timestamp::UNKNOWN,
            remaining,
        }
    }

    #[test]
    fn test_duplicate_insert_rejected_and_original_kept() {
        let mut ledger = ConnectionLedger::new();
        ledger.insert(record(7, 100)).unwrap();
        assert_eq!(
            ledger.insert(record(7, 999)),
            Err(DuplicateCell {
                kind: CellKind::Fixed,
                id: 7
            })
        );
        assert_eq!(ledger.get(CellKind::Fixed, 7).unwrap().remaining, 100);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_same_id_different_kind_is_not_a_duplicate() {
        let mut ledger = ConnectionLedger::new();
        ledger.insert(kind_record(CellKind::Fixed, 1, 50)).unwrap();
        ledger.insert(kind_record(CellKind::Var, 1, 80)).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(CellKind::Fixed, 1).unwrap().remaining, 50);
        assert_eq!(ledger.get(CellKind::Var, 1).unwrap().remaining, 80);
    }

    #[test]
    fn test_flush_decrements_all_records() {
        let mut ledger = ConnectionLedger::new();
        ledger.insert(record(1, 50)).unwrap();
        ledger.insert(record(2, 80)).unwrap();

        ledger.apply_flush(30, |_| panic!("nothing should complete"));
        assert_eq!(ledger.get(CellKind::Fixed, 1).unwrap().remaining, 20);
        assert_eq!(ledger.get(CellKind::Fixed, 2).unwrap().remaining, 50);
    }

    #[test]
    fn test_flush_removes_and_reports_completed() {
        let mut ledger = ConnectionLedger::new();
        ledger.insert(record(1, 10)).unwrap();
        ledger.insert(record(2, 30)).unwrap();
        ledger.insert(record(3, 100)).unwrap();

        let mut delivered = Vec::new();
        ledger.apply_flush(40, |r| delivered.push(r.id));
        delivered.sort_unstable();

        assert_eq!(delivered, vec![1, 2]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(CellKind::Fixed, 3).unwrap().remaining, 60);
    }

    #[test]
    fn test_overshoot_is_allowed() {
        let mut ledger = ConnectionLedger::new();
        ledger.insert(record(1, 10)).unwrap();

        let mut seen = Vec::new();
        ledger.apply_flush(1000, |r| seen.push(r.remaining));
        assert_eq!(seen, vec![-990]);
        assert!(ledger.is_empty());
    }
}
