//! Sample filtering applied by position sources before delivery.
//!
//! Consumers treat every delivered sample as authoritative and current, so
//! the source is responsible for keeping the stream clean:
//!
//! - Samples older than the last delivered one are dropped (ordering)
//! - Samples at the same coordinate as the last one are dropped (dedup)
//! - Samples arriving sooner than `min_interval` are dropped (rate limit)
//! - Samples that moved less than `min_distance_m` are dropped

use chrono::Duration as ChronoDuration;

use super::types::{Position, WatchOptions};
use crate::coord::distance_m;

/// Coordinates closer than this (in degrees) count as the same fix.
pub const DEDUP_TOLERANCE_DEG: f64 = 1e-7;

/// Why a sample was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    /// The sample should be delivered.
    Accept,
    /// Older than the last delivered sample.
    OutOfOrder,
    /// Same coordinate as the last delivered sample.
    Duplicate,
    /// Arrived before the minimum interval elapsed.
    TooSoon,
    /// Moved less than the minimum distance.
    TooClose,
}

/// Stateful filter that decides which samples reach subscribers.
#[derive(Debug, Clone)]
pub struct SampleFilter {
    min_interval: ChronoDuration,
    min_distance_m: f64,
    last_delivered: Option<Position>,
}

impl SampleFilter {
    /// Create a filter for the given watch options.
    pub fn new(options: &WatchOptions) -> Self {
        Self {
            min_interval: ChronoDuration::from_std(options.min_interval)
                .unwrap_or_else(|_| ChronoDuration::zero()),
            min_distance_m: options.min_distance_m.max(0.0),
            last_delivered: None,
        }
    }

    /// Check a sample and, if accepted, record it as the last delivered.
    pub fn offer(&mut self, sample: &Position) -> FilterVerdict {
        let verdict = self.check(sample);
        if verdict == FilterVerdict::Accept {
            self.last_delivered = Some(*sample);
        }
        verdict
    }

    /// The most recent sample that passed the filter.
    pub fn last_delivered(&self) -> Option<&Position> {
        self.last_delivered.as_ref()
    }

    fn check(&self, sample: &Position) -> FilterVerdict {
        let Some(last) = self.last_delivered.as_ref() else {
            return FilterVerdict::Accept;
        };

        if sample.timestamp < last.timestamp {
            return FilterVerdict::OutOfOrder;
        }
        if sample
            .coordinate
            .approx_eq(&last.coordinate, DEDUP_TOLERANCE_DEG)
        {
            return FilterVerdict::Duplicate;
        }
        if sample.timestamp - last.timestamp < self.min_interval {
            return FilterVerdict::TooSoon;
        }
        if self.min_distance_m > 0.0
            && distance_m(&last.coordinate, &sample.coordinate) < self.min_distance_m
        {
            return FilterVerdict::TooClose;
        }

        FilterVerdict::Accept
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::coord::Coordinate;

    fn sample(lat: f64, lon: f64, secs: i64) -> Position {
        let ts = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        Position::at(Coordinate::new(lat, lon), Some(5.0), ts)
    }

    fn filter(interval_ms: u64, distance_m: f64) -> SampleFilter {
        SampleFilter::new(
            &WatchOptions::default()
                .with_min_interval(Duration::from_millis(interval_ms))
                .with_min_distance_m(distance_m),
        )
    }

    #[test]
    fn test_first_sample_always_accepted() {
        let mut f = filter(1000, 100.0);
        assert_eq!(f.offer(&sample(-29.34, -49.72, 0)), FilterVerdict::Accept);
        assert!(f.last_delivered().is_some());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut f = filter(0, 0.0);
        f.offer(&sample(-29.34, -49.72, 10));
        assert_eq!(
            f.offer(&sample(-29.35, -49.72, 5)),
            FilterVerdict::OutOfOrder
        );
        // Last delivered unchanged
        assert_eq!(f.last_delivered().unwrap().coordinate.latitude, -29.34);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut f = filter(0, 0.0);
        f.offer(&sample(-29.34, -49.72, 0));
        assert_eq!(
            f.offer(&sample(-29.34, -49.72, 5)),
            FilterVerdict::Duplicate
        );
    }

    #[test]
    fn test_rate_limiting() {
        let mut f = filter(2000, 0.0);
        f.offer(&sample(-29.34, -49.72, 0));
        assert_eq!(f.offer(&sample(-29.35, -49.72, 1)), FilterVerdict::TooSoon);
        assert_eq!(f.offer(&sample(-29.35, -49.72, 2)), FilterVerdict::Accept);
    }

    #[test]
    fn test_min_distance() {
        let mut f = filter(0, 50.0);
        f.offer(&sample(-29.34, -49.72, 0));
        // ~11 m north
        assert_eq!(
            f.offer(&sample(-29.3399, -49.72, 1)),
            FilterVerdict::TooClose
        );
        // ~111 m north
        assert_eq!(f.offer(&sample(-29.339, -49.72, 2)), FilterVerdict::Accept);
    }

    #[test]
    fn test_same_timestamp_accepted_when_moved() {
        let mut f = filter(0, 0.0);
        f.offer(&sample(-29.34, -49.72, 0));
        assert_eq!(f.offer(&sample(-29.341, -49.72, 0)), FilterVerdict::Accept);
    }
}
