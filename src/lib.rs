pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod exit_codes;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{HttpProbe, ProcessRunner};
pub use crate::config::DeployConfig;
pub use crate::core::driver::DeployDriver;
pub use crate::domain::model::{CommandOutput, DeployReport, Profile, Step, StepOutcome};
pub use crate::utils::error::{DeployError, Result};
