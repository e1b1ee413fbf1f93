use std::path::{Path, PathBuf};

/// Fixed deployment defaults; `eventcheck run` with no arguments uses these,
/// so the cron entry needs no parameters.
pub mod defaults {
    /// Project checkout that holds `manage.py`.
    pub const PROJECT_DIR: &str = "/srv/gestion";
    /// Virtualenv interpreter, relative to the project directory.
    pub const INTERPRETER: &str = "venv/bin/python";
    /// Management subcommand to invoke.
    pub const COMMAND: &str = "check_upcoming_events";
    /// Append-only completion journal.
    pub const LOG_FILE: &str = "/var/log/eventcheck/notification_check.log";
}

/// Management entry script expected inside the project directory.
pub const MANAGE_SCRIPT: &str = "manage.py";

/// The last-run status file lives next to the journal.
pub fn status_path(log_file: &Path) -> PathBuf {
    log_file.with_file_name("status.json")
}
