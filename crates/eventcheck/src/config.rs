use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, CheckResult};
use crate::paths::defaults;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Directory the management command runs from.
    pub project_dir: PathBuf,
    /// Interpreter binary; relative paths resolve against `project_dir`.
    pub interpreter: PathBuf,
    /// Management subcommand passed to `manage.py`.
    pub command: String,
    /// Append-only journal receiving one completion record per run.
    pub log_file: PathBuf,
    /// Kill the management command after this many seconds. `None` = no limit.
    pub timeout_secs: Option<u64>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from(defaults::PROJECT_DIR),
            interpreter: PathBuf::from(defaults::INTERPRETER),
            command: defaults::COMMAND.to_string(),
            log_file: PathBuf::from(defaults::LOG_FILE),
            timeout_secs: None,
        }
    }
}

impl CheckConfig {
    /// Interpreter path with relative values anchored at the project directory,
    /// mirroring how the virtualenv lives inside the project checkout.
    pub fn interpreter_path(&self) -> PathBuf {
        if self.interpreter.is_relative() {
            self.project_dir.join(&self.interpreter)
        } else {
            self.interpreter.clone()
        }
    }

    /// Resolve `project_dir` and `log_file` against `config_dir` (the directory
    /// containing the YAML file). `interpreter` is left alone: it resolves
    /// against `project_dir` at invocation time.
    fn resolve_relative_paths(&mut self, config_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = config_dir.join(&*p);
            }
        };
        resolve(&mut self.project_dir);
        resolve(&mut self.log_file);
    }
}

/// Load a config from a YAML file.
///
/// Paths are not checked for existence here; `run` fails at spawn time and
/// `preflight` is the explicit existence check.
pub async fn load(path: &Path) -> CheckResult<CheckConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CheckError::Config(format!("read {}: {e}", path.display())))?;
    let mut config: CheckConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| CheckError::Config(format!("parse {}: {e}", path.display())))?;
    if let Some(config_dir) = path.parent() {
        config.resolve_relative_paths(config_dir);
    }
    Ok(config)
}

/// Load the config file if one was given, otherwise start from the fixed
/// defaults, then apply CLI / env overrides.
pub async fn resolve(
    config_path: Option<&Path>,
    project_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
) -> CheckResult<CheckConfig> {
    let mut config = match config_path {
        Some(path) => load(path).await?,
        None => CheckConfig::default(),
    };
    if let Some(dir) = project_dir {
        config.project_dir = dir;
    }
    if let Some(file) = log_file {
        config.log_file = file;
    }
    Ok(config)
}
