//! Install command execution
//!
//! Runs the package manager's install command through the platform shell
//! and forwards its output to the log stream. Exit code zero is success.

use crate::error::{DepcacheError, DepcacheResult};
use crate::manager::ManagerConfig;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Performs the install step for a manager
#[async_trait]
pub trait InstallRunner: Send + Sync {
    /// Run the install, then the post-install hook if any
    async fn run(&self, config: &ManagerConfig) -> DepcacheResult<()>;
}

/// Install runner that executes the command line in a shell
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellInstallRunner;

#[async_trait]
impl InstallRunner for ShellInstallRunner {
    async fn run(&self, config: &ManagerConfig) -> DepcacheResult<()> {
        let command = config.command_line();
        info!("Running {}", command);

        let code = run_shell(&command, &config.working_directory).await?;
        if code != 0 {
            return Err(DepcacheError::Install { command, code });
        }

        if let Some(hook) = &config.post_install {
            info!("Running post-install hook: {}", hook.describe());
            hook.run(&config.working_directory).await?;
        }

        Ok(())
    }
}

/// Join command and options into one trimmed command line
pub fn command_line(command: &str, options: &str) -> String {
    format!("{} {}", command, options).trim().to_string()
}

/// Run `command_line` in a shell, streaming its output to the log.
/// Returns the exit code.
pub async fn run_shell(command_line: &str, working_directory: &Path) -> DepcacheResult<i32> {
    let (shell, flag) = if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };
    debug!("Executing: {} {} {:?}", shell, flag, command_line);

    let mut child = Command::new(shell)
        .arg(flag)
        .arg(command_line)
        .current_dir(working_directory)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DepcacheError::command_failed(command_line, e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    tokio::join!(
        forward_lines(stdout, false),
        forward_lines(stderr, true)
    );

    let status = child
        .wait()
        .await
        .map_err(|e| DepcacheError::command_failed(command_line, e))?;

    status.code().ok_or_else(|| DepcacheError::ProcessSignaled {
        command: command_line.to_string(),
    })
}

async fn forward_lines<R: AsyncRead + Unpin>(stream: Option<R>, is_stderr: bool) {
    let Some(stream) = stream else {
        return;
    };

    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if is_stderr => warn!("{}", line),
            Ok(Some(line)) => info!("{}", line),
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped reading command output: {}", e);
                break;
            }
        }
    }
}
