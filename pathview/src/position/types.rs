//! Core data types for position tracking.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::Coordinate;

/// Default minimum interval between delivered samples (1 Hz).
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Default minimum movement between delivered samples.
///
/// Zero means every sample that passes the interval check is delivered.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 0.0;

/// A single reading of the device's geographic position.
///
/// Immutable once emitted. Each new sample supersedes the previous one; no
/// history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Where the device is.
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in metres, if the platform reported one.
    pub accuracy_m: Option<f64>,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// Create a sample stamped with the current time.
    pub fn new(coordinate: Coordinate, accuracy_m: Option<f64>) -> Self {
        Self {
            coordinate,
            accuracy_m,
            timestamp: Utc::now(),
        }
    }

    /// Create a sample with an explicit timestamp.
    pub fn at(coordinate: Coordinate, accuracy_m: Option<f64>, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            accuracy_m,
            timestamp,
        }
    }
}

/// Accuracy tier requested from the platform location service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Accuracy {
    /// Accurate to the nearest three kilometres.
    Lowest,
    /// Accurate to the nearest kilometre.
    Low,
    /// Accurate to within one hundred metres.
    Balanced,
    /// Accurate to within ten metres.
    High,
    /// The best accuracy the device offers.
    #[default]
    Highest,
    /// Highest accuracy plus sensor fusion for navigation.
    BestForNavigation,
}

impl Accuracy {
    /// Parse from a config file string.
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lowest" => Some(Accuracy::Lowest),
            "low" => Some(Accuracy::Low),
            "balanced" => Some(Accuracy::Balanced),
            "high" => Some(Accuracy::High),
            "highest" => Some(Accuracy::Highest),
            "navigation" | "best_for_navigation" => Some(Accuracy::BestForNavigation),
            _ => None,
        }
    }

    /// The string written back to the config file.
    pub fn as_config_str(&self) -> &'static str {
        match self {
            Accuracy::Lowest => "lowest",
            Accuracy::Low => "low",
            Accuracy::Balanced => "balanced",
            Accuracy::High => "high",
            Accuracy::Highest => "highest",
            Accuracy::BestForNavigation => "navigation",
        }
    }
}

impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_config_str())
    }
}

/// Options for a continuous position subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Requested accuracy tier.
    pub accuracy: Accuracy,
    /// Minimum time between delivered samples.
    pub min_interval: Duration,
    /// Minimum movement in metres between delivered samples.
    pub min_distance_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Highest,
            min_interval: DEFAULT_MIN_INTERVAL,
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
        }
    }
}

impl WatchOptions {
    /// Set the accuracy tier.
    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set the minimum interval between samples.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Set the minimum distance between samples.
    pub fn with_min_distance_m(mut self, min_distance_m: f64) -> Self {
        self.min_distance_m = min_distance_m;
        self
    }
}

/// Errors from position fetches and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// No fix could be obtained (no signal, service disabled).
    #[error("Position unavailable: {0}")]
    Unavailable(String),

    /// The platform did not produce a fix in time.
    #[error("Timed out waiting for a position fix")]
    Timeout,

    /// The subscription was cancelled or its source went away.
    #[error("Position subscription closed")]
    SubscriptionClosed,
}
