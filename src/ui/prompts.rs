//! Confirmation prompt with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{DepcacheError, DepcacheResult};

/// Ask a yes/no question; returns `default` when nobody can answer
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> DepcacheResult<bool> {
    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| DepcacheError::Prompt(format!("prompt task failed: {}", e)))?
    .map_err(|e| DepcacheError::Prompt(e.to_string()))
}
