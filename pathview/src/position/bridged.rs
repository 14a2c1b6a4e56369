//! Position source bridged from a host platform callback.
//!
//! Mobile hosts receive location fixes through a native callback. The host
//! keeps the [`PositionFeed`] half and pushes each fix into it; the
//! [`BridgedPositionSource`] half is handed to the session and fans the fixes
//! out to subscribers, filtering per subscription.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::filter::{FilterVerdict, SampleFilter};
use super::stream::{PositionStream, PositionUpdate};
use super::types::{Position, PositionError, WatchOptions};
use super::{PositionFuture, PositionSource};

struct Subscriber {
    tx: mpsc::UnboundedSender<PositionUpdate>,
    cancellation: CancellationToken,
    filter: SampleFilter,
}

impl Subscriber {
    fn is_live(&self) -> bool {
        !self.cancellation.is_cancelled() && !self.tx.is_closed()
    }
}

#[derive(Default)]
struct FeedState {
    subscribers: Vec<Subscriber>,
    latest_fix: Option<PositionUpdate>,
}

impl FeedState {
    /// Replace the one-shot answer unless `position` is older than it.
    fn record_fix(&mut self, position: Position) -> bool {
        match &self.latest_fix {
            Some(Ok(latest)) if position.timestamp < latest.timestamp => false,
            _ => {
                self.latest_fix = Some(Ok(position));
                true
            }
        }
    }
}

/// Host-side handle for pushing platform fixes into a [`BridgedPositionSource`].
#[derive(Clone)]
pub struct PositionFeed {
    state: Arc<Mutex<FeedState>>,
}

impl PositionFeed {
    /// Push a fix from the platform.
    ///
    /// The fix becomes the answer to one-shot fetches unless it is older than
    /// the current answer, and is offered to every live subscription. Returns
    /// how many subscribers received it.
    pub fn push(&self, position: Position) -> usize {
        let mut state = self.state.lock();
        if !state.record_fix(position) {
            trace!(coordinate = %position.coordinate, "Older fix kept out of one-shot answer");
        }
        state.subscribers.retain(Subscriber::is_live);

        let mut delivered = 0;
        for subscriber in state.subscribers.iter_mut() {
            match subscriber.filter.offer(&position) {
                FilterVerdict::Accept => {
                    if subscriber.tx.send(Ok(position)).is_ok() {
                        delivered += 1;
                    }
                }
                verdict => {
                    trace!(?verdict, coordinate = %position.coordinate, "Sample filtered");
                }
            }
        }
        delivered
    }

    /// Report a platform failure to every live subscription.
    ///
    /// Does not change the answer to one-shot fetches.
    pub fn push_error(&self, error: PositionError) -> usize {
        let mut state = self.state.lock();
        state.subscribers.retain(Subscriber::is_live);
        state
            .subscribers
            .iter()
            .filter(|s| s.tx.send(Err(error.clone())).is_ok())
            .count()
    }

    /// Set what the next one-shot fetch returns.
    pub fn set_fix(&self, fix: PositionUpdate) {
        self.state.lock().latest_fix = Some(fix);
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock();
        state.subscribers.retain(Subscriber::is_live);
        state.subscribers.len()
    }
}

/// Position source fed by a [`PositionFeed`].
pub struct BridgedPositionSource {
    state: Arc<Mutex<FeedState>>,
}

impl BridgedPositionSource {
    /// Create a source and the feed that drives it.
    pub fn new() -> (Self, PositionFeed) {
        let state = Arc::new(Mutex::new(FeedState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            PositionFeed { state },
        )
    }
}

impl PositionSource for BridgedPositionSource {
    fn subscribe(&self, options: WatchOptions) -> Result<PositionStream, PositionError> {
        let (stream, tx, cancellation) = PositionStream::channel();
        let mut state = self.state.lock();
        state.subscribers.retain(Subscriber::is_live);
        state.subscribers.push(Subscriber {
            tx,
            cancellation,
            filter: SampleFilter::new(&options),
        });
        tracing::debug!(
            accuracy = %options.accuracy,
            min_interval_ms = options.min_interval.as_millis() as u64,
            min_distance_m = options.min_distance_m,
            subscribers = state.subscribers.len(),
            "Position subscription started"
        );
        Ok(stream)
    }

    fn current(&self) -> PositionFuture<'_> {
        let fix = self.state.lock().latest_fix.clone();
        Box::pin(async move {
            fix.unwrap_or_else(|| Err(PositionError::Unavailable("no fix received yet".to_string())))
        })
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
        Position::at(Coordinate::new(lat, lon), None, ts)
    }

    fn options() -> WatchOptions {
        WatchOptions::default().with_min_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_current_without_fix_is_unavailable() {
        let (source, _feed) = BridgedPositionSource::new();
        let result = source.current().await;
        assert!(matches!(result, Err(PositionError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_current_returns_latest_push() {
        let (source, feed) = BridgedPositionSource::new();
        feed.push(sample(-29.34, -49.72, 0));
        feed.push(sample(-29.341, -49.72, 1));
        let fix = source.current().await.unwrap();
        assert_eq!(fix.coordinate.latitude, -29.341);
    }

    #[tokio::test]
    async fn test_out_of_order_push_keeps_newer_fix() {
        let (source, feed) = BridgedPositionSource::new();
        feed.push(sample(-29.34, -49.72, 10));
        feed.push(sample(-29.0, -49.0, 5));

        let fix = source.current().await.unwrap();
        assert_eq!(fix.coordinate, Coordinate::new(-29.34, -49.72));

        // Same timestamp still replaces
        feed.push(sample(-29.341, -49.72, 10));
        let fix = source.current().await.unwrap();
        assert_eq!(fix.coordinate, Coordinate::new(-29.341, -49.72));
    }

    #[tokio::test]
    async fn test_push_after_error_fix_replaces_it() {
        let (source, feed) = BridgedPositionSource::new();
        feed.set_fix(Err(PositionError::Timeout));
        feed.push(sample(-29.34, -49.72, 0));
        assert!(source.current().await.is_ok());
    }

    #[tokio::test]
    async fn test_set_fix_error() {
        let (source, feed) = BridgedPositionSource::new();
        feed.push(sample(-29.34, -49.72, 0));
        feed.set_fix(Err(PositionError::Timeout));
        assert_eq!(source.current().await, Err(PositionError::Timeout));
    }

    #[tokio::test]
    async fn test_push_reaches_subscriber() {
        let (source, feed) = BridgedPositionSource::new();
        let mut stream = source.subscribe(options()).unwrap();

        assert_eq!(feed.push(sample(-29.34, -49.72, 0)), 1);
        let update = stream.recv().await.unwrap().unwrap();
        assert_eq!(update.coordinate, Coordinate::new(-29.34, -49.72));
    }

    #[tokio::test]
    async fn test_duplicates_filtered_per_subscriber() {
        let (source, feed) = BridgedPositionSource::new();
        let _stream = source.subscribe(options()).unwrap();

        assert_eq!(feed.push(sample(-29.34, -49.72, 0)), 1);
        assert_eq!(feed.push(sample(-29.34, -49.72, 1)), 0);
        assert_eq!(feed.push(sample(-29.341, -49.72, -1)), 0); // out of order
    }

    #[tokio::test]
    async fn test_resubscribe_does_not_leak() {
        let (source, feed) = BridgedPositionSource::new();

        let first = source.subscribe(options()).unwrap();
        assert_eq!(feed.subscriber_count(), 1);
        drop(first);
        assert_eq!(feed.subscriber_count(), 0);

        let mut second = source.subscribe(options()).unwrap();
        assert_eq!(feed.subscriber_count(), 1);
        second.unsubscribe();
        assert_eq!(feed.subscriber_count(), 0);
        assert_eq!(feed.push(sample(-29.34, -49.72, 0)), 0);
    }

    #[tokio::test]
    async fn test_push_error_reaches_subscriber() {
        let (source, feed) = BridgedPositionSource::new();
        let mut stream = source.subscribe(options()).unwrap();

        assert_eq!(
            feed.push_error(PositionError::Unavailable("no signal".to_string())),
            1
        );
        assert!(matches!(
            stream.recv().await,
            Some(Err(PositionError::Unavailable(_)))
        ));
    }
}
