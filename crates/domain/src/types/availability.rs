//! Availability primitives
//!
//! Ephemeral values produced fresh on every availability query; nothing in
//! this module is persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A half-open busy interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Half-open overlap: `[s1,e1)` and `[s2,e2)` overlap iff
    /// `s1 < e2 && s2 < e1`. Intervals that merely touch do not overlap.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

/// One bookable slot in a working day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

/// A calendar date with its ordered slot sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDay {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, hour, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn adjacent_intervals_do_not_overlap() {
        let busy = BusyInterval::new(at(10), at(11));

        assert!(!busy.overlaps(at(9), at(10)));
        assert!(!busy.overlaps(at(11), at(12)));
    }

    #[test]
    fn containment_overlaps_both_directions() {
        let busy = BusyInterval::new(at(10), at(11));

        // Slot fully containing the busy interval
        assert!(busy.overlaps(at(9), at(12)));
        // Slot fully contained inside the busy interval
        let wide = BusyInterval::new(at(9), at(17));
        assert!(wide.overlaps(at(10), at(11)));
    }

    #[test]
    fn partial_edge_overlap_counts() {
        let busy = BusyInterval::new(at(10), at(12));

        assert!(busy.overlaps(at(9), at(11)));
        assert!(busy.overlaps(at(11), at(13)));
    }
}
