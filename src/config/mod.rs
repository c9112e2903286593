pub mod toml_config;

pub use toml_config::DeployConfig;

#[cfg(feature = "cli")]
use crate::domain::model::Profile;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "compose-redeploy")]
#[command(about = "Tear down, rebuild, start and verify a docker compose service")]
pub struct CliConfig {
    /// Path to a TOML deploy file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Compose service to redeploy
    #[arg(long)]
    pub service: Option<String>,

    /// Teardown profile: selective or full-teardown
    #[arg(long)]
    pub profile: Option<Profile>,

    /// URL for the post-start HTTP reachability probe
    #[arg(long)]
    pub probe_url: Option<String>,

    /// Seconds to wait after start before the running check
    #[arg(long)]
    pub settle_seconds: Option<u64>,

    /// Skip pruning dangling images
    #[arg(long)]
    pub no_prune: bool,

    /// Print the planned steps without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Defaults, then the deploy file if given, then command-line overrides.
    pub fn resolve(&self) -> Result<DeployConfig> {
        let mut config = match &self.config {
            Some(path) => DeployConfig::from_file(path)?,
            None => DeployConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut DeployConfig) {
        if let Some(service) = &self.service {
            config.service.name = service.clone();
        }
        if let Some(profile) = self.profile {
            config.deploy.profile = profile;
        }
        if let Some(url) = &self.probe_url {
            config.probe.url = url.clone();
        }
        if let Some(seconds) = self.settle_seconds {
            config.deploy.settle_seconds = seconds;
        }
        if self.no_prune {
            config.deploy.prune_images = false;
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_no_flags_resolves_to_defaults() {
        let cli = CliConfig::parse_from(["compose-redeploy"]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.service_name(), "audio-converter");
        assert_eq!(config.profile(), Profile::Selective);
        assert!(!cli.dry_run);
        assert!(cli.report.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[service]
name = "from-file"

[deploy]
profile = "selective"
settle_seconds = 9
"#,
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = CliConfig::parse_from([
            "compose-redeploy",
            "--config",
            path.as_str(),
            "--profile",
            "full-teardown",
            "--settle-seconds",
            "1",
            "--no-prune",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.service_name(), "from-file");
        assert_eq!(config.profile(), Profile::FullTeardown);
        assert_eq!(config.settle_duration(), Duration::from_secs(1));
        assert!(!config.prune_images());
    }

    #[test]
    fn test_bad_profile_flag_is_rejected_by_parser() {
        let result = CliConfig::try_parse_from(["compose-redeploy", "--profile", "blue-green"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = CliConfig::parse_from(["compose-redeploy", "-c", "/no/such/deploy.toml"]);
        assert!(cli.resolve().is_err());
    }
}
