use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Args;
use tracing::{error, info};

use crate::config;
use crate::error::CheckResult;
use crate::invoke::{self, Outcome};
use crate::journal;
use crate::paths;
use crate::status;

#[derive(Args)]
pub struct RunArgs {
    /// Path to eventcheck.yaml (fixed defaults apply without one)
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Project directory holding manage.py (overrides config)
    #[arg(long, env = "EVENTCHECK_PROJECT_DIR")]
    project_dir: Option<PathBuf>,
    /// Journal file receiving one completion record per run (overrides config)
    #[arg(long, env = "EVENTCHECK_LOG_FILE")]
    log_file: Option<PathBuf>,
    /// Pass --dry-run to the management command
    #[arg(long)]
    dry_run: bool,
}

/// Run the notification check once: invoke the management command, append
/// the completion record, refresh the last-run status file.
///
/// The exit code follows the command's outcome. A journal-append failure
/// after a successful command is still a run failure: the completion record
/// is part of the contract.
pub async fn run_check(args: RunArgs) -> CheckResult<ExitCode> {
    let config = config::resolve(args.config.as_deref(), args.project_dir, args.log_file).await?;

    let started_at = Utc::now();
    let run = invoke::run_command(&config, args.dry_run).await?;

    match run.outcome {
        Outcome::Success => {
            info!(
                duration_ms = run.duration.as_millis() as u64,
                "notification check completed"
            );
        }
        outcome => {
            error!(?outcome, "notification check failed");
        }
    }

    journal::append(&config.log_file, run.outcome).await?;
    status::write(&paths::status_path(&config.log_file), started_at, &run).await;

    Ok(if run.outcome == Outcome::Success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use super::*;

    /// Project dir with a fake virtualenv interpreter at `venv/bin/python`.
    fn fake_project(interpreter_body: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(crate::paths::MANAGE_SCRIPT), "ignored\n").unwrap();
        let bin_dir = dir.path().join("venv/bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        let python = bin_dir.join("python");
        std::fs::write(&python, format!("#!/bin/sh\n{interpreter_body}")).unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();
        dir
    }

    fn args(project_dir: &Path, log_file: &Path) -> RunArgs {
        RunArgs {
            config: None,
            project_dir: Some(project_dir.to_path_buf()),
            log_file: Some(log_file.to_path_buf()),
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn successful_run_journals_and_writes_status() {
        let project = fake_project("exit 0\n");
        let log_file = project.path().join("cron.log");

        run_check(args(project.path(), &log_file)).await.unwrap();

        let journal = std::fs::read_to_string(&log_file).unwrap();
        assert_eq!(journal.lines().count(), 1);
        assert!(journal.contains("Notification check completed"));

        let status = std::fs::read_to_string(paths::status_path(&log_file)).unwrap();
        let status: serde_json::Value = serde_json::from_str(&status).unwrap();
        assert_eq!(status["outcome"], "completed");
    }

    #[tokio::test]
    async fn failed_run_still_journals() {
        let project = fake_project("exit 2\n");
        let log_file = project.path().join("cron.log");

        run_check(args(project.path(), &log_file)).await.unwrap();

        let journal = std::fs::read_to_string(&log_file).unwrap();
        assert_eq!(journal.lines().count(), 1);
        assert!(journal.contains("Notification check failed (exit code 2)"));
    }

    #[tokio::test]
    async fn missing_project_dir_writes_no_journal_line() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("cron.log");

        let err = run_check(args(Path::new("/nonexistent/project"), &log_file))
            .await
            .unwrap_err();

        assert!(matches!(err, crate::error::CheckError::Spawn(_)), "got: {err}");
        assert!(!log_file.exists());
    }

    #[tokio::test]
    async fn unwritable_journal_is_an_error() {
        let project = fake_project("exit 0\n");
        let log_file = project.path().join("no-such-dir/cron.log");

        let err = run_check(args(project.path(), &log_file)).await.unwrap_err();
        assert!(
            matches!(err, crate::error::CheckError::Journal(_)),
            "got: {err}"
        );
    }
}
