mod preflight;
mod run;

pub use preflight::{PreflightArgs, run_preflight};
pub use run::{RunArgs, run_check};
