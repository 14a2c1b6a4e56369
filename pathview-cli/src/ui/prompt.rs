//! Location permission prompt for the terminal.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use pathview::permission::{PermissionFuture, PermissionPrompt, PermissionState};
use tracing::warn;

/// Asks on the terminal, or answers automatically when preset.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt {
    preset: Option<PermissionState>,
}

impl TerminalPrompt {
    /// Prompt interactively.
    pub fn interactive() -> Self {
        Self { preset: None }
    }

    /// Always answer `state` without asking.
    pub fn preset(state: PermissionState) -> Self {
        Self {
            preset: Some(state),
        }
    }
}

impl PermissionPrompt for TerminalPrompt {
    fn request(&self) -> PermissionFuture<'_> {
        let preset = self.preset;
        Box::pin(async move {
            if let Some(state) = preset {
                return state;
            }

            let answer = tokio::task::spawn_blocking(|| {
                Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Allow PathView to use your location?")
                    .default(true)
                    .interact()
            })
            .await;

            match answer {
                Ok(Ok(true)) => PermissionState::Granted,
                Ok(Ok(false)) => PermissionState::Denied,
                Ok(Err(e)) => {
                    warn!(error = %e, "Permission prompt failed, treating as denied");
                    PermissionState::Denied
                }
                Err(e) => {
                    warn!(error = %e, "Permission prompt task failed, treating as denied");
                    PermissionState::Denied
                }
            }
        })
    }
}
