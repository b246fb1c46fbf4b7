use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvalidIntervalError {
    #[error("Interval start: {0} must be before interval end: {1}")]
    StartNotBeforeEnd(i64, i64),
}

/// Half-open timespan `[start_ts, end_ts)` in epoch millis.
/// Invariant: `start_ts < end_ts`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    start_ts: i64,
    end_ts: i64,
}

impl TimeInterval {
    pub fn new(start_ts: i64, end_ts: i64) -> Result<Self, InvalidIntervalError> {
        if start_ts >= end_ts {
            return Err(InvalidIntervalError::StartNotBeforeEnd(start_ts, end_ts));
        }
        Ok(Self { start_ts, end_ts })
    }

    pub fn start_ts(&self) -> i64 {
        self.start_ts
    }

    pub fn end_ts(&self) -> i64 {
        self.end_ts
    }

    pub fn duration_millis(&self) -> i64 {
        self.end_ts - self.start_ts
    }

    /// Half-open intersection test: touching intervals do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        self.start_ts < other.end_ts && other.start_ts < self.end_ts
    }

    /// Expands the interval symmetrically by `padding` millis on each side.
    pub fn padded(&self, padding: i64) -> Self {
        Self {
            start_ts: self.start_ts - padding,
            end_ts: self.end_ts + padding,
        }
    }

    /// Overlap of two intervals, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start_ts = std::cmp::max(self.start_ts, other.start_ts);
        let end_ts = std::cmp::min(self.end_ts, other.end_ts);
        if start_ts < end_ts {
            Some(Self { start_ts, end_ts })
        } else {
            None
        }
    }

    fn touches_or_overlaps(&self, other: &Self) -> bool {
        self.start_ts <= other.end_ts && other.start_ts <= self.end_ts
    }
}

/// Sorted, coalesced busy time. Intervals are guaranteed to be ordered by
/// `start_ts` and pairwise disjoint, so a chronological candidate walk can
/// probe with an early exit.
#[derive(Debug, Default, PartialEq)]
pub struct BusyIntervals {
    intervals: VecDeque<TimeInterval>,
}

impl BusyIntervals {
    pub fn new(mut intervals: Vec<TimeInterval>) -> Self {
        intervals.sort_by_key(|i| i.start_ts);

        let mut coalesced: VecDeque<TimeInterval> = VecDeque::with_capacity(intervals.len());
        for interval in intervals {
            match coalesced.back_mut() {
                Some(last) if last.touches_or_overlaps(&interval) => {
                    last.end_ts = std::cmp::max(last.end_ts, interval.end_ts);
                }
                _ => coalesced.push_back(interval),
            }
        }

        Self {
            intervals: coalesced,
        }
    }

    /// Whether `candidate` intersects any busy interval.
    pub fn blocks(&self, candidate: &TimeInterval) -> bool {
        for busy in &self.intervals {
            if busy.start_ts >= candidate.end_ts {
                break;
            }
            if busy.intersects(candidate) {
                return true;
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn inner(self) -> VecDeque<TimeInterval> {
        self.intervals
    }
}

impl AsRef<VecDeque<TimeInterval>> for BusyIntervals {
    fn as_ref(&self) -> &VecDeque<TimeInterval> {
        &self.intervals
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn iv(start: i64, end: i64) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    #[test]
    fn rejects_empty_and_reversed_intervals() {
        assert!(TimeInterval::new(5, 5).is_err());
        assert!(TimeInterval::new(10, 5).is_err());
        assert!(TimeInterval::new(5, 6).is_ok());
    }

    #[test]
    fn half_open_intervals_do_not_intersect_when_touching() {
        assert!(!iv(0, 10).intersects(&iv(10, 20)));
        assert!(iv(0, 11).intersects(&iv(10, 20)));
        assert!(iv(12, 14).intersects(&iv(10, 20)));
    }

    #[test]
    fn padding_is_symmetric() {
        let padded = iv(100, 200).padded(15);
        assert_eq!(padded.start_ts(), 85);
        assert_eq!(padded.end_ts(), 215);
    }

    #[test]
    fn coalesces_overlapping_and_touching_intervals() {
        let busy = BusyIntervals::new(vec![iv(5, 10), iv(1, 7), iv(10, 14), iv(20, 30)]);
        let inner = busy.inner();
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[0], iv(1, 14));
        assert_eq!(inner[1], iv(20, 30));
    }

    #[test]
    fn keeps_disjoint_intervals_sorted() {
        let busy = BusyIntervals::new(vec![iv(40, 50), iv(0, 2), iv(10, 20)]);
        let inner = busy.inner();
        assert_eq!(inner.len(), 3);
        assert_eq!(inner[0], iv(0, 2));
        assert_eq!(inner[2], iv(40, 50));
    }

    #[test]
    fn blocks_probes_with_early_exit() {
        let busy = BusyIntervals::new(vec![iv(0, 10), iv(30, 40)]);
        assert!(busy.blocks(&iv(5, 15)));
        assert!(busy.blocks(&iv(35, 36)));
        assert!(!busy.blocks(&iv(10, 30)));
        assert!(!busy.blocks(&iv(40, 100)));
    }

    #[test]
    fn empty_busy_blocks_nothing() {
        let busy = BusyIntervals::new(Vec::new());
        assert!(busy.is_empty());
        assert!(!busy.blocks(&iv(0, 1000)));
    }
}
