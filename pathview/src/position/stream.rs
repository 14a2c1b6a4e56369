//! Subscription handle for continuous position updates.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::types::{Position, PositionError};

/// One item of a position stream.
pub type PositionUpdate = Result<Position, PositionError>;

/// A live subscription to a [`PositionSource`](super::PositionSource).
///
/// The stream owns the subscription: dropping it (or calling
/// [`unsubscribe`](Self::unsubscribe)) cancels the producer side, so a
/// cancelled-then-resubscribed source never leaks the previous watch.
///
/// Yields `None` only after the subscription has been released or the
/// source shut down.
pub struct PositionStream {
    rx: mpsc::UnboundedReceiver<PositionUpdate>,
    cancellation: CancellationToken,
    guard: Option<DropGuard>,
}

impl PositionStream {
    /// Create a stream and the pieces its producer needs.
    ///
    /// The producer pushes updates into the returned sender and must stop
    /// when the returned token is cancelled.
    pub fn channel() -> (
        Self,
        mpsc::UnboundedSender<PositionUpdate>,
        CancellationToken,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancellation = CancellationToken::new();
        let stream = Self {
            rx,
            cancellation: cancellation.clone(),
            guard: Some(cancellation.clone().drop_guard()),
        };
        (stream, tx, cancellation)
    }

    /// Release the subscription.
    ///
    /// Idempotent and safe to call during teardown. Updates already queued
    /// are discarded.
    pub fn unsubscribe(&mut self) {
        if let Some(guard) = self.guard.take() {
            drop(guard);
            self.rx.close();
            tracing::debug!("Position subscription released");
        }
    }

    /// Whether the subscription is still live.
    pub fn is_active(&self) -> bool {
        self.guard.is_some() && !self.cancellation.is_cancelled()
    }

    /// Receive the next update.
    pub async fn recv(&mut self) -> Option<PositionUpdate> {
        if self.guard.is_none() {
            return None;
        }
        self.rx.recv().await
    }
}

impl Stream for PositionStream {
    type Item = PositionUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.guard.is_none() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

impl std::fmt::Debug for PositionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionStream")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::coord::Coordinate;

    #[tokio::test]
    async fn test_stream_yields_pushed_updates() {
        let (mut stream, tx, _token) = PositionStream::channel();
        let position = Position::new(Coordinate::new(-29.34, -49.72), None);
        tx.send(Ok(position)).unwrap();

        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received.coordinate, position.coordinate);
    }

    #[tokio::test]
    async fn test_drop_cancels_producer() {
        let (stream, _tx, token) = PositionStream::channel();
        assert!(!token.is_cancelled());
        drop(stream);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let (mut stream, tx, token) = PositionStream::channel();
        tx.send(Ok(Position::new(Coordinate::new(0.0, 0.0), None)))
            .unwrap();

        stream.unsubscribe();
        stream.unsubscribe();

        assert!(token.is_cancelled());
        assert!(!stream.is_active());
        assert!(stream.next().await.is_none());
        assert!(tx.send(Err(PositionError::Timeout)).is_err());
    }
}
