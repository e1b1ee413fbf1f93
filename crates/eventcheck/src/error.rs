#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("config error: {0}")]
    Config(String),

    #[error("spawn error: {0}")]
    Spawn(String),

    #[error("journal error: {0}")]
    Journal(String),

    #[error("preflight failed: {0}")]
    Preflight(String),
}

pub type CheckResult<T> = Result<T, CheckError>;
