//! Device position tracking.
//!
//! A [`PositionSource`] supplies two things:
//!
//! - A continuous, restartable [`PositionStream`] of samples
//! - A one-shot [`current`](PositionSource::current) fetch used for manual refresh
//!
//! Sources own stream hygiene. Every sample a subscriber receives has passed
//! a [`SampleFilter`], so consumers can treat each one as the authoritative
//! current position.
//!
//! # Sources
//!
//! - [`BridgedPositionSource`] - fed by a host's native location callback
//!   through a [`PositionFeed`]
//! - [`SimulatedPositionSource`] - walks toward a target at a fixed speed
//!
//! # Example
//!
//! ```ignore
//! use pathview::position::{BridgedPositionSource, PositionSource, WatchOptions};
//!
//! let (source, feed) = BridgedPositionSource::new();
//! let mut stream = source.subscribe(WatchOptions::default())?;
//!
//! // Platform callback
//! feed.push(position);
//!
//! while let Some(update) = stream.recv().await {
//!     // ...
//! }
//! ```

mod bridged;
mod filter;
mod simulated;
mod stream;
mod types;

pub use bridged::{BridgedPositionSource, PositionFeed};
pub use filter::{FilterVerdict, SampleFilter, DEDUP_TOLERANCE_DEG};
pub use simulated::{SimulatedPositionSource, SimulationConfig, DEFAULT_SPEED_MPS};
pub use stream::{PositionStream, PositionUpdate};
pub use types::{
    Accuracy, Position, PositionError, WatchOptions, DEFAULT_MIN_DISTANCE_M, DEFAULT_MIN_INTERVAL,
};

use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by one-shot position fetches.
pub type PositionFuture<'a> = Pin<Box<dyn Future<Output = Result<Position, PositionError>> + Send + 'a>>;

/// A supplier of device positions.
///
/// Uses `Pin<Box<dyn Future>>` so sources can be held as trait objects.
pub trait PositionSource: Send + Sync + 'static {
    /// Start a continuous subscription.
    ///
    /// Each call creates an independent subscription. Dropping the returned
    /// stream releases it.
    fn subscribe(&self, options: WatchOptions) -> Result<PositionStream, PositionError>;

    /// Fetch the current position once.
    fn current(&self) -> PositionFuture<'_>;
}
