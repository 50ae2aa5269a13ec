//! Terminal output helpers
//!
//! Spinners and colors in an interactive terminal, plain `[OK]`/`[FAIL]`
//! lines in CI logs.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{section, step_error, step_info, step_ok, step_warn};
pub use progress::TaskSpinner;
pub use prompts::confirm;
