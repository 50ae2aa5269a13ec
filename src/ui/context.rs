//! Detects whether output goes to a person or a CI log

use std::io::IsTerminal;

/// Environment variables set by common CI providers
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TF_BUILD",
];

/// Output mode for the current process
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        let tty = std::io::stdout().is_terminal() && std::io::stderr().is_terminal();
        let ci = CI_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self {
            interactive: tty && !ci,
        }
    }

    /// Plain output (for tests and pipes)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Interactive output regardless of the environment
    #[cfg(test)]
    pub(crate) fn interactive() -> Self {
        Self { interactive: true }
    }

    /// Whether a person can answer prompts
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Whether spinners and colors should be used
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}
