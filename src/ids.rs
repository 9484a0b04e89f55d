/// Cell flavors that receive independent id streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Fixed-size cell.
    Fixed,
    /// Variable-length cell.
    Var,
}

impl CellKind {
    /// Wire encoding used in emitted measurement records.
    #[inline(always)]
    pub fn as_u32(self) -> u32 {
        match self {
            CellKind::Fixed => 0,
            CellKind::Var => 1,
        }
    }

    #[inline(always)]
    fn index(self) -> usize {
        self.as_u32() as usize
    }
}

/// Issues monotonically increasing cell ids, one stream per kind.
///
/// Ids start at 1; 0 is the "untracked" sentinel and is never issued, so the
/// counter skips it on wraparound. Collisions with records still in flight
/// after a wrap are caught at enqueue time as duplicates.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: [u32; 2],
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: [1, 1] }
    }

    pub fn allocate(&mut self, kind: CellKind) -> u32 {
        let slot = &mut self.next[kind.index()];
        let id = *slot;
        *slot = slot.wrapping_add(1);
        if *slot == 0 {
            *slot = 1;
        }
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streams_are_independent() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(CellKind::Fixed), 1);
        assert_eq!(ids.allocate(CellKind::Var), 1);
        assert_eq!(ids.allocate(CellKind::Fixed), 2);
        assert_eq!(ids.allocate(CellKind::Var), 2);
        assert_eq!(ids.allocate(CellKind::Fixed), 3);
    }

    #[test]
    fn test_wraparound_skips_zero() {
        let mut ids = IdAllocator::new();
        ids.next[0] = u32::MAX;
        assert_eq!(ids.allocate(CellKind::Fixed), u32::MAX);
        assert_eq!(ids.allocate(CellKind::Fixed), 1);
    }
}
