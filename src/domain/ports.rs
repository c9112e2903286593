use crate::domain::model::{CommandOutput, Profile};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Resolved deployment settings the driver reads from.
pub trait ConfigProvider: Send + Sync {
    fn service_name(&self) -> &str;
    fn profile(&self) -> Profile;
    fn engine_binary(&self) -> &str;
    fn compose_file(&self) -> Option<&str>;
    fn project_name(&self) -> Option<&str>;
    fn command_timeout(&self) -> Duration;
    fn settle_duration(&self) -> Duration;
    fn prune_images(&self) -> bool;
    fn probe_url(&self) -> &str;
    fn probe_timeout(&self) -> Duration;
}

/// Executes container engine commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve `program` to an executable path without running it.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` with `args` to completion, capturing its output.
    ///
    /// A non-zero exit is still `Ok`; only spawn failures and timeouts are errors.
    async fn run(&self, program: &str, args: &[String], timeout: Duration)
        -> Result<CommandOutput>;
}

/// Checks whether the deployed service answers on its port.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns the HTTP status on any response; errors when unreachable.
    async fn probe(&self, url: &str, timeout: Duration) -> Result<u16>;
}
