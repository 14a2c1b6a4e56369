//! Simulated position source.
//!
//! Produces a device walking in a straight line from a start coordinate to a
//! target at constant speed. Used by the CLI demo and for exercising the
//! camera pipeline without a platform location service.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use super::filter::{FilterVerdict, SampleFilter};
use super::stream::PositionStream;
use super::types::{Position, PositionError, WatchOptions};
use super::{PositionFuture, PositionSource};
use crate::coord::{distance_m, step_toward, Coordinate};

/// Shortest tick the simulator will run at.
const MIN_TICK: Duration = Duration::from_millis(100);

/// Default walking speed (metres per second).
pub const DEFAULT_SPEED_MPS: f64 = 1.4;

/// Default reported accuracy radius.
const DEFAULT_ACCURACY_M: f64 = 5.0;

/// Configuration for a simulated walk.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Where the walk starts.
    pub start: Coordinate,
    /// Where the walk ends.
    pub target: Coordinate,
    /// Speed in metres per second.
    pub speed_mps: f64,
    /// Accuracy radius reported on each sample.
    pub accuracy_m: f64,
}

impl SimulationConfig {
    /// Walk from `start` to `target` at the default speed.
    pub fn new(start: Coordinate, target: Coordinate) -> Self {
        Self {
            start,
            target,
            speed_mps: DEFAULT_SPEED_MPS,
            accuracy_m: DEFAULT_ACCURACY_M,
        }
    }

    /// Set the walking speed.
    pub fn with_speed_mps(mut self, speed_mps: f64) -> Self {
        self.speed_mps = speed_mps;
        self
    }
}

/// The simulated device.
///
/// Moves by elapsed time, so it covers the same ground however many
/// subscriptions advance it.
struct Walker {
    position: Coordinate,
    last_step: Option<Instant>,
}

impl Walker {
    fn advance(&mut self, target: &Coordinate, speed_mps: f64, now: Instant) -> Coordinate {
        if let Some(last) = self.last_step {
            let elapsed = now.saturating_duration_since(last);
            self.position = step_toward(&self.position, target, speed_mps * elapsed.as_secs_f64());
        }
        self.last_step = Some(now);
        self.position
    }
}

/// Position source that simulates a walk toward a target.
///
/// All subscriptions share one walker, so the device is in one place no
/// matter how many subscribers there are. The walk starts with the first
/// subscription tick.
pub struct SimulatedPositionSource {
    config: SimulationConfig,
    walker: Arc<Mutex<Walker>>,
}

impl SimulatedPositionSource {
    /// Create a simulator at the configured start.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            walker: Arc::new(Mutex::new(Walker {
                position: config.start,
                last_step: None,
            })),
            config,
        }
    }

    /// Where the simulated device is right now.
    pub fn position(&self) -> Coordinate {
        self.walker.lock().position
    }

    /// Whether the walk has reached its target.
    pub fn arrived(&self) -> bool {
        self.position() == self.config.target
    }

    fn sample(&self, coordinate: Coordinate) -> Position {
        Position::new(coordinate, Some(self.config.accuracy_m))
    }
}

impl PositionSource for SimulatedPositionSource {
    fn subscribe(&self, options: WatchOptions) -> Result<PositionStream, PositionError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| PositionError::Unavailable("no async runtime".to_string()))?;

        let (stream, tx, cancellation) = PositionStream::channel();
        let tick = options.min_interval.max(MIN_TICK);
        let walker = Arc::clone(&self.walker);
        let config = self.config;
        // The tick already enforces the interval; filter for dedup and distance only
        let mut filter = SampleFilter::new(&options.with_min_interval(Duration::ZERO));

        info!(
            start = %config.start,
            target = %config.target,
            distance_m = distance_m(&config.start, &config.target),
            tick_ms = tick.as_millis() as u64,
            "Simulated walk subscribed"
        );

        runtime.spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                tokio::select! {
                    biased;

                    _ = cancellation.cancelled() => {
                        debug!("Simulated walk subscription cancelled");
                        break;
                    }

                    now = interval.tick() => {
                        let coordinate = walker.lock().advance(&config.target, config.speed_mps, now);
                        let position = Position::new(coordinate, Some(config.accuracy_m));
                        if filter.offer(&position) != FilterVerdict::Accept {
                            continue;
                        }
                        if tx.send(Ok(position)).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(stream)
    }

    fn current(&self) -> PositionFuture<'_> {
        let position = self.sample(self.position());
        Box::pin(async move { Ok(position) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig::new(
            Coordinate::new(-29.34, -49.72),
            Coordinate::new(-29.3409, -49.7267),
        )
    }

    #[tokio::test]
    async fn test_current_starts_at_start() {
        let source = SimulatedPositionSource::new(config());
        let fix = source.current().await.unwrap();
        assert_eq!(fix.coordinate, Coordinate::new(-29.34, -49.72));
        assert!(!source.arrived());
    }

    #[tokio::test]
    async fn test_walk_moves_toward_target() {
        // Fast walker so a few ticks cover visible distance
        let source = SimulatedPositionSource::new(config().with_speed_mps(100.0));
        let mut stream = source
            .subscribe(WatchOptions::default().with_min_interval(Duration::from_millis(100)))
            .unwrap();

        let first = stream.recv().await.unwrap().unwrap();
        let second = stream.recv().await.unwrap().unwrap();

        let target = Coordinate::new(-29.3409, -49.7267);
        assert!(distance_m(&second.coordinate, &target) < distance_m(&first.coordinate, &target));
        assert!(second.timestamp >= first.timestamp);
    }

    #[tokio::test]
    async fn test_walk_arrives_and_goes_quiet() {
        let source = SimulatedPositionSource::new(config().with_speed_mps(100_000.0));
        let mut stream = source
            .subscribe(WatchOptions::default().with_min_interval(Duration::from_millis(100)))
            .unwrap();

        // The first tick reports the start, the second covers the whole walk
        let first = stream.recv().await.unwrap().unwrap();
        assert_eq!(first.coordinate, Coordinate::new(-29.34, -49.72));
        let second = stream.recv().await.unwrap().unwrap();
        assert_eq!(second.coordinate, Coordinate::new(-29.3409, -49.7267));
        assert!(source.arrived());

        // Duplicates at the target are filtered, so nothing else arrives
        let next = tokio::time::timeout(Duration::from_millis(350), stream.recv()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_extra_subscribers_do_not_speed_up_walk() {
        let started = std::time::Instant::now();
        let source = SimulatedPositionSource::new(config().with_speed_mps(100.0));
        let options = WatchOptions::default().with_min_interval(Duration::from_millis(100));
        let mut first = source.subscribe(options).unwrap();
        let mut second = source.subscribe(options).unwrap();

        for _ in 0..3 {
            first.recv().await.unwrap().unwrap();
        }
        second.unsubscribe();

        let walked = distance_m(&Coordinate::new(-29.34, -49.72), &source.position());
        let allowed = 100.0 * started.elapsed().as_secs_f64() + 1.0;
        assert!(walked > 0.0);
        assert!(walked <= allowed, "walked {walked} m, allowed {allowed} m");
    }

    #[test]
    fn test_walker_moves_by_elapsed_time() {
        let target = Coordinate::new(-29.3409, -49.7267);
        let mut walker = Walker {
            position: Coordinate::new(-29.34, -49.72),
            last_step: None,
        };
        let t0 = Instant::now();

        let start = walker.advance(&target, 10.0, t0);
        assert_eq!(start, Coordinate::new(-29.34, -49.72));
        // Two callers at the same instant do not move it twice
        let after = walker.advance(&target, 10.0, t0 + Duration::from_secs(1));
        let again = walker.advance(&target, 10.0, t0 + Duration::from_secs(1));
        assert_eq!(after, again);
        assert!((distance_m(&start, &after) - 10.0).abs() < 0.5);
    }

    #[test]
    fn test_subscribe_outside_runtime_fails() {
        let source = SimulatedPositionSource::new(config());
        assert!(matches!(
            source.subscribe(WatchOptions::default()),
            Err(PositionError::Unavailable(_))
        ));
    }
}
