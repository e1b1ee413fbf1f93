use std::path::Path;

use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::{CheckError, CheckResult};
use crate::invoke::Outcome;

/// Timestamp shape of the journal lines, matching what the old cron entry
/// produced with `date`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_line(timestamp: &str, outcome: Outcome) -> String {
    match outcome {
        Outcome::Success => format!("{timestamp}: Notification check completed"),
        Outcome::Failed { exit_code } => {
            format!("{timestamp}: Notification check failed (exit code {exit_code})")
        }
        Outcome::Signaled { signal } => {
            format!("{timestamp}: Notification check failed (signal {signal})")
        }
        Outcome::TimedOut { after_secs } => {
            format!("{timestamp}: Notification check failed (timed out after {after_secs}s)")
        }
    }
}

/// Append one completion record to the journal.
///
/// Creates the file if absent and never truncates prior content. Exactly one
/// line is written per finished run, whatever the outcome was.
pub async fn append(path: &Path, outcome: Outcome) -> CheckResult<()> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let line = format_line(&timestamp, outcome);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| CheckError::Journal(format!("open {}: {e}", path.display())))?;
    file.write_all(format!("{line}\n").as_bytes())
        .await
        .map_err(|e| CheckError::Journal(format!("write {}: {e}", path.display())))?;
    Ok(())
}
