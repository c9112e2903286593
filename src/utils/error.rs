use crate::domain::model::Step;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Command '{command}' timed out after {seconds}s")]
    CommandTimeout { command: String, seconds: u64 },

    #[error("Step '{step}' failed: {message}")]
    StepFailed {
        step: Step,
        message: String,
        hint: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Precondition,
    Engine,
    Network,
    Io,
}

impl DeployError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeployError::HttpError(_) => ErrorCategory::Network,
            DeployError::IoError(_) | DeployError::SerializationError(_) => ErrorCategory::Io,
            DeployError::ConfigError { .. } | DeployError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            DeployError::CommandTimeout { .. } => ErrorCategory::Engine,
            DeployError::StepFailed { step, .. } if step.is_precondition() => {
                ErrorCategory::Precondition
            }
            DeployError::StepFailed { .. } => ErrorCategory::Engine,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DeployError::StepFailed {
                hint: Some(hint), ..
            } => hint.clone(),
            DeployError::StepFailed { step, .. } => match step {
                Step::EngineBinary => "install Docker and make sure it is on PATH".to_string(),
                Step::ComposePlugin => {
                    "install the Docker Compose plugin (`docker compose version` must work)"
                        .to_string()
                }
                Step::Daemon => "start the Docker daemon and retry".to_string(),
                Step::Build => "fix the image build errors shown above and redeploy".to_string(),
                Step::Start => {
                    "check the compose file and port availability, then redeploy".to_string()
                }
                _ => "inspect the engine output above and redeploy".to_string(),
            },
            DeployError::ConfigError { .. } | DeployError::InvalidConfigValueError { .. } => {
                "check the deploy file and command-line flags".to_string()
            }
            DeployError::CommandTimeout { .. } => {
                "raise engine.command_timeout_seconds or check the engine for hangs".to_string()
            }
            DeployError::HttpError(_) => "check that the service port is reachable".to_string(),
            DeployError::IoError(_) | DeployError::SerializationError(_) => {
                "check file permissions and disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DeployError::StepFailed { step, message, .. } => {
                format!("Deployment failed at step '{}': {}", step, message)
            }
            DeployError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
