use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::invoke::{Outcome, RunOutcome};

#[derive(Debug, Serialize)]
struct RunStatus {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<i32>,
    #[serde(serialize_with = "serialize_iso")]
    started_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_iso")]
    finished_at: DateTime<Utc>,
    duration_ms: u64,
}

/// Serialize as ISO 8601 with millisecond precision.
fn serialize_iso<S: serde::Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

/// Write the last-run status file next to the journal.
///
/// Atomic write: temp file in the same directory, then rename. Best-effort;
/// the journal is the contract, so failures here only warn.
pub async fn write(path: &Path, started_at: DateTime<Utc>, run: &RunOutcome) {
    let (outcome, exit_code, signal) = match run.outcome {
        Outcome::Success => ("completed", Some(0), None),
        Outcome::Failed { exit_code } => ("failed", Some(exit_code), None),
        Outcome::Signaled { signal } => ("signaled", None, Some(signal)),
        Outcome::TimedOut { .. } => ("timeout", None, None),
    };
    let status = RunStatus {
        outcome,
        exit_code,
        signal,
        started_at,
        finished_at: Utc::now(),
        duration_ms: run.duration.as_millis() as u64,
    };

    let json = match serde_json::to_string_pretty(&status) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "failed to serialize run status");
            return;
        }
    };

    let tmp = path.with_extension("tmp");
    if let Err(e) = tokio::fs::write(&tmp, json.as_bytes()).await {
        warn!(error = %e, path = %tmp.display(), "failed to write status temp file");
        return;
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        warn!(error = %e, "failed to rename status file");
    }
}
