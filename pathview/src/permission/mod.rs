//! Foreground location permission.
//!
//! A [`PermissionGate`] asks its [`PermissionPrompt`] at most once per
//! session and caches the answer. Nothing location-related may start until
//! the gate reports [`PermissionState::Granted`].

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PermissionState {
    /// Location access allowed.
    Granted,
    /// Location access refused.
    Denied,
}

impl PermissionState {
    /// Whether location access is allowed.
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionState::Granted => write!(f, "granted"),
            PermissionState::Denied => write!(f, "denied"),
        }
    }
}

/// Boxed future returned by [`PermissionPrompt::request`].
pub type PermissionFuture<'a> = Pin<Box<dyn Future<Output = PermissionState> + Send + 'a>>;

/// Asks the user (or platform) for foreground location access.
pub trait PermissionPrompt: Send + Sync + 'static {
    /// Show the prompt and wait for the answer.
    fn request(&self) -> PermissionFuture<'_>;
}

/// Prompt with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticPrompt(PermissionState);

impl StaticPrompt {
    /// Always grants.
    pub fn granted() -> Self {
        Self(PermissionState::Granted)
    }

    /// Always denies.
    pub fn denied() -> Self {
        Self(PermissionState::Denied)
    }
}

impl PermissionPrompt for StaticPrompt {
    fn request(&self) -> PermissionFuture<'_> {
        let state = self.0;
        Box::pin(async move { state })
    }
}

/// Caches a single permission answer for the session.
pub struct PermissionGate<P: PermissionPrompt> {
    prompt: P,
    state: Mutex<Option<PermissionState>>,
}

impl<P: PermissionPrompt> PermissionGate<P> {
    /// Create a gate that has not asked yet.
    pub fn new(prompt: P) -> Self {
        Self {
            prompt,
            state: Mutex::new(None),
        }
    }

    /// The cached answer, if the prompt has been shown.
    pub async fn state(&self) -> Option<PermissionState> {
        *self.state.lock().await
    }

    /// Get the permission state, prompting only on the first call.
    ///
    /// Concurrent callers wait for the single in-flight prompt.
    pub async fn acquire(&self) -> PermissionState {
        let mut state = self.state.lock().await;
        if let Some(cached) = *state {
            return cached;
        }
        let answer = self.ask().await;
        *state = Some(answer);
        answer
    }

    /// Prompt again, replacing the cached answer.
    pub async fn reacquire(&self) -> PermissionState {
        let mut state = self.state.lock().await;
        let answer = self.ask().await;
        *state = Some(answer);
        answer
    }

    async fn ask(&self) -> PermissionState {
        let answer = self.prompt.request().await;
        match answer {
            PermissionState::Granted => info!("Location permission granted"),
            PermissionState::Denied => warn!("Location permission denied"),
        }
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Prompt that counts how often it is shown and flips its answer.
    struct CountingPrompt {
        calls: Arc<AtomicUsize>,
    }

    impl PermissionPrompt for CountingPrompt {
        fn request(&self) -> PermissionFuture<'_> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if n == 0 {
                    PermissionState::Denied
                } else {
                    PermissionState::Granted
                }
            })
        }
    }

    #[tokio::test]
    async fn test_static_prompt() {
        assert_eq!(StaticPrompt::granted().request().await, PermissionState::Granted);
        assert_eq!(StaticPrompt::denied().request().await, PermissionState::Denied);
    }

    #[tokio::test]
    async fn test_prompt_consulted_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = PermissionGate::new(CountingPrompt {
            calls: Arc::clone(&calls),
        });

        assert_eq!(gate.state().await, None);
        assert_eq!(gate.acquire().await, PermissionState::Denied);
        assert_eq!(gate.acquire().await, PermissionState::Denied);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.state().await, Some(PermissionState::Denied));
    }

    #[tokio::test]
    async fn test_reacquire_prompts_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = PermissionGate::new(CountingPrompt {
            calls: Arc::clone(&calls),
        });

        assert_eq!(gate.acquire().await, PermissionState::Denied);
        assert_eq!(gate.reacquire().await, PermissionState::Granted);
        assert_eq!(gate.acquire().await, PermissionState::Granted);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PermissionState::Granted.to_string(), "granted");
        assert!(!PermissionState::Denied.is_granted());
    }
}
