use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::ExitStatus;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{info, warn};

use crate::config::CheckConfig;
use crate::error::{CheckError, CheckResult};
use crate::paths::MANAGE_SCRIPT;

/// How a management-command run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed { exit_code: i32 },
    Signaled { signal: i32 },
    TimedOut { after_secs: u64 },
}

impl Outcome {
    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Success;
        }
        match status.code() {
            Some(code) => Self::Failed { exit_code: code },
            None => Self::Signaled {
                signal: status.signal().unwrap_or(0),
            },
        }
    }
}

/// Result of one management-command invocation.
pub struct RunOutcome {
    pub outcome: Outcome,
    pub duration: Duration,
}

/// Human-readable display string for the invocation.
fn format_command_display(interpreter: &Path, command: &str, dry_run: bool) -> String {
    let mut parts = vec![
        interpreter.display().to_string(),
        MANAGE_SCRIPT.to_string(),
        command.to_string(),
    ];
    if dry_run {
        parts.push("--dry-run".to_string());
    }
    parts.join(" ")
}

/// Run `<interpreter> manage.py <command>` with the project directory as the
/// child's working directory.
///
/// Stdout/stderr are inherited, so the scheduler keeps capturing the
/// command's own output. A missing project directory or interpreter fails the
/// spawn itself; there is no way to fall through and run from the wrong
/// directory.
pub async fn run_command(config: &CheckConfig, dry_run: bool) -> CheckResult<RunOutcome> {
    let interpreter = config.interpreter_path();
    let display = format_command_display(&interpreter, &config.command, dry_run);

    let mut cmd = Command::new(&interpreter);
    cmd.arg(MANAGE_SCRIPT).arg(&config.command);
    if dry_run {
        cmd.arg("--dry-run");
    }
    cmd.current_dir(&config.project_dir);

    info!(command = %display, cwd = %config.project_dir.display(), "invoking management command");
    let started = Instant::now();

    let mut child = cmd
        .spawn()
        .map_err(|e| CheckError::Spawn(format!("{display}: {e}")))?;

    let status = match config.timeout_secs {
        Some(secs) => {
            match tokio::time::timeout(Duration::from_secs(secs), child.wait()).await {
                Ok(status) => status.map_err(|e| CheckError::Spawn(format!("{display}: {e}")))?,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "failed to kill timed-out command");
                    }
                    return Ok(RunOutcome {
                        outcome: Outcome::TimedOut { after_secs: secs },
                        duration: started.elapsed(),
                    });
                }
            }
        }
        None => child
            .wait()
            .await
            .map_err(|e| CheckError::Spawn(format!("{display}: {e}")))?,
    };

    Ok(RunOutcome {
        outcome: Outcome::from_status(status),
        duration: started.elapsed(),
    })
}
