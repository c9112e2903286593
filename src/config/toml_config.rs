use crate::domain::model::Profile;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SERVICE_NAME: &str = "audio-converter";
pub const DEFAULT_ENGINE_BINARY: &str = "docker";
pub const DEFAULT_PROBE_URL: &str = "http://localhost:9001";
pub const DEFAULT_SETTLE_SECONDS: u64 = 5;
pub const DEFAULT_PROBE_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_COMMAND_TIMEOUT_SECONDS: u64 = 600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub service: ServiceConfig,
    pub engine: EngineConfig,
    pub deploy: DeploySection,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub name: String,
    pub compose_file: Option<String>,
    pub project_name: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVICE_NAME.to_string(),
            compose_file: None,
            project_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub binary: String,
    pub command_timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_ENGINE_BINARY.to_string(),
            command_timeout_seconds: DEFAULT_COMMAND_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeploySection {
    pub profile: Profile,
    pub settle_seconds: u64,
    pub prune_images: bool,
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            settle_seconds: DEFAULT_SETTLE_SECONDS,
            prune_images: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PROBE_URL.to_string(),
            timeout_seconds: DEFAULT_PROBE_TIMEOUT_SECONDS,
        }
    }
}

impl DeployConfig {
    /// Load a deploy file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DeployError::ConfigError {
            message: format!("cannot read '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a deploy file after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DeployError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> String {
        static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
        let re = PATTERN
            .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_service_name("service.name", &self.service.name)?;
        if let Some(file) = &self.service.compose_file {
            validation::validate_non_empty_string("service.compose_file", file)?;
        }
        if let Some(project) = &self.service.project_name {
            validation::validate_service_name("service.project_name", project)?;
        }

        validation::validate_non_empty_string("engine.binary", &self.engine.binary)?;
        validation::validate_range(
            "engine.command_timeout_seconds",
            self.engine.command_timeout_seconds,
            1,
            3600,
        )?;

        validation::validate_range("deploy.settle_seconds", self.deploy.settle_seconds, 0, 300)?;

        validation::validate_url("probe.url", &self.probe.url)?;
        validation::validate_range("probe.timeout_seconds", self.probe.timeout_seconds, 1, 3600)?;

        Ok(())
    }
}

impl ConfigProvider for DeployConfig {
    fn service_name(&self) -> &str {
        &self.service.name
    }

    fn profile(&self) -> Profile {
        self.deploy.profile
    }

    fn engine_binary(&self) -> &str {
        &self.engine.binary
    }

    fn compose_file(&self) -> Option<&str> {
        self.service.compose_file.as_deref()
    }

    fn project_name(&self) -> Option<&str> {
        self.service.project_name.as_deref()
    }

    fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.command_timeout_seconds)
    }

    fn settle_duration(&self) -> Duration {
        Duration::from_secs(self.deploy.settle_seconds)
    }

    fn prune_images(&self) -> bool {
        self.deploy.prune_images
    }

    fn probe_url(&self) -> &str {
        &self.probe.url
    }

    fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe.timeout_seconds)
    }
}

impl Validate for DeployConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
