use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::config::{self, CheckConfig};
use crate::error::{CheckError, CheckResult};
use crate::paths::MANAGE_SCRIPT;

#[derive(Args)]
pub struct PreflightArgs {
    /// Path to eventcheck.yaml (fixed defaults apply without one)
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Project directory holding manage.py (overrides config)
    #[arg(long, env = "EVENTCHECK_PROJECT_DIR")]
    project_dir: Option<PathBuf>,
    /// Journal file receiving one completion record per run (overrides config)
    #[arg(long, env = "EVENTCHECK_LOG_FILE")]
    log_file: Option<PathBuf>,
}

/// Verify everything a run needs before cron fires it for real.
///
/// Collects all failures and reports them in a single error instead of
/// stopping at the first. `run` does not preflight; it fails at spawn time,
/// so the scheduled behavior stays unchanged.
pub async fn run_preflight(args: PreflightArgs) -> CheckResult<()> {
    let config = config::resolve(args.config.as_deref(), args.project_dir, args.log_file).await?;

    let mut errors = Vec::new();
    check_project_dir(&config, &mut errors);
    check_interpreter(&config, &mut errors);
    check_log_parent(&config.log_file, &mut errors);

    if errors.is_empty() {
        info!(project_dir = %config.project_dir.display(), "preflight ok");
        Ok(())
    } else {
        Err(CheckError::Preflight(errors.join("; ")))
    }
}

fn check_project_dir(config: &CheckConfig, errors: &mut Vec<String>) {
    let dir = &config.project_dir;
    if !dir.is_dir() {
        errors.push(format!("project directory not found: {}", dir.display()));
        return;
    }
    let manage = dir.join(MANAGE_SCRIPT);
    if !manage.exists() {
        errors.push(format!("{MANAGE_SCRIPT} not found: {}", manage.display()));
    }
}

fn check_interpreter(config: &CheckConfig, errors: &mut Vec<String>) {
    // Bare command names resolve via PATH; anything else against project_dir.
    if config.interpreter.components().count() == 1 {
        if which::which(&config.interpreter).is_err() {
            errors.push(format!(
                "interpreter not found on PATH: {}",
                config.interpreter.display()
            ));
        }
        return;
    }

    let path = config.interpreter_path();
    if !path.exists() {
        errors.push(format!("interpreter not found: {}", path.display()));
        return;
    }
    if let Ok(meta) = path.metadata()
        && meta.permissions().mode() & 0o111 == 0
    {
        errors.push(format!("interpreter is not executable: {}", path.display()));
    }
}

fn check_log_parent(log_file: &Path, errors: &mut Vec<String>) {
    if let Some(parent) = log_file.parent()
        && !parent.as_os_str().is_empty()
        && !parent.is_dir()
    {
        errors.push(format!("journal directory not found: {}", parent.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Project dir with manage.py and an executable fake interpreter.
    fn complete_project() -> (tempfile::TempDir, CheckConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANAGE_SCRIPT), "").unwrap();
        let bin_dir = dir.path().join("venv/bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        let python = bin_dir.join("python");
        std::fs::write(&python, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = CheckConfig {
            project_dir: dir.path().to_path_buf(),
            log_file: dir.path().join("cron.log"),
            ..CheckConfig::default()
        };
        (dir, config)
    }

    fn collect_errors(config: &CheckConfig) -> Vec<String> {
        let mut errors = Vec::new();
        check_project_dir(config, &mut errors);
        check_interpreter(config, &mut errors);
        check_log_parent(&config.log_file, &mut errors);
        errors
    }

    #[test]
    fn complete_project_passes() {
        let (_dir, config) = complete_project();
        assert!(collect_errors(&config).is_empty());
    }

    #[test]
    fn missing_everything_collects_all_failures() {
        let config = CheckConfig {
            project_dir: "/nonexistent/project".into(),
            log_file: "/nonexistent/logs/cron.log".into(),
            ..CheckConfig::default()
        };
        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 3, "got: {errors:?}");
        assert!(errors[0].contains("project directory not found"));
        assert!(errors[1].contains("interpreter not found"));
        assert!(errors[2].contains("journal directory not found"));
    }

    #[test]
    fn missing_manage_script_is_flagged() {
        let (dir, config) = complete_project();
        std::fs::remove_file(dir.path().join(MANAGE_SCRIPT)).unwrap();
        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1, "got: {errors:?}");
        assert!(errors[0].contains("manage.py not found"));
    }

    #[test]
    fn non_executable_interpreter_is_flagged() {
        let (dir, config) = complete_project();
        let python = dir.path().join("venv/bin/python");
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o644)).unwrap();
        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1, "got: {errors:?}");
        assert!(errors[0].contains("not executable"));
    }

    #[test]
    fn bare_interpreter_name_resolves_via_path() {
        let (_dir, mut config) = complete_project();
        config.interpreter = "sh".into();
        assert!(collect_errors(&config).is_empty());

        config.interpreter = "definitely-not-a-real-interpreter".into();
        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1, "got: {errors:?}");
        assert!(errors[0].contains("not found on PATH"));
    }
}
