//! Live per-park occupancy counters.
//!
//! Counters are advisory display state for connected viewers, not derived
//! from the session table; the frontend adds to them as vehicles pay and
//! each operator logout resets their park to zero.

use std::collections::HashMap;

use dashmap::DashMap;

/// Concurrent map of park zone -> current occupancy count.
#[derive(Debug, Default)]
pub struct OccupancyBoard {
    counts: DashMap<String, i64>,
}

impl OccupancyBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to a park's counter, returning the new value.
    pub fn add(&self, park_zone: &str, amount: i64) -> i64 {
        let mut entry = self.counts.entry(park_zone.to_string()).or_insert(0);
        *entry += amount;
        *entry
    }

    /// Reset a park's counter to zero.
    pub fn reset(&self, park_zone: &str) {
        self.counts.insert(park_zone.to_string(), 0);
    }

    /// Snapshot of all counters, for broadcasting to viewers.
    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let board = OccupancyBoard::new();
        assert_eq!(board.add("P4", 2), 2);
        assert_eq!(board.add("P4", 3), 5);
        assert_eq!(board.add("P1", 1), 1);
    }

    #[test]
    fn test_reset_zeroes_single_park() {
        let board = OccupancyBoard::new();
        board.add("P4", 7);
        board.add("P1", 2);
        board.reset("P4");

        let snapshot = board.snapshot();
        assert_eq!(snapshot.get("P4"), Some(&0));
        assert_eq!(snapshot.get("P1"), Some(&2));
    }

    #[test]
    fn test_reset_unknown_park_creates_zero_entry() {
        let board = OccupancyBoard::new();
        board.reset("P9");
        assert_eq!(board.snapshot().get("P9"), Some(&0));
    }
}
