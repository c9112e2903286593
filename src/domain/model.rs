use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Teardown variant used before the rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Stop and remove only the named service's container.
    #[default]
    Selective,
    /// Bring the whole composition down, including images, volumes and orphans.
    #[serde(alias = "full")]
    FullTeardown,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Selective => "selective",
            Profile::FullTeardown => "full-teardown",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "selective" => Ok(Profile::Selective),
            "full-teardown" | "full" => Ok(Profile::FullTeardown),
            other => Err(format!(
                "unknown profile '{}', expected 'selective' or 'full-teardown'",
                other
            )),
        }
    }
}

/// One stage of a deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    EngineBinary,
    ComposePlugin,
    Daemon,
    StopService,
    RemoveService,
    ComposeDown,
    Build,
    Start,
    RunningCheck,
    HttpProbe,
    PruneImages,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::EngineBinary => "engine-binary",
            Step::ComposePlugin => "compose-plugin",
            Step::Daemon => "daemon",
            Step::StopService => "stop-service",
            Step::RemoveService => "remove-service",
            Step::ComposeDown => "compose-down",
            Step::Build => "build",
            Step::Start => "start",
            Step::RunningCheck => "running-check",
            Step::HttpProbe => "http-probe",
            Step::PruneImages => "prune-images",
        }
    }

    /// Preconditions run before anything mutates engine state.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Step::EngineBinary | Step::ComposePlugin | Step::Daemon)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a single step: success, an advisory warning, or a fatal stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Success,
    Warning {
        message: String,
    },
    Fatal {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
}

impl StepOutcome {
    pub fn warning(message: impl Into<String>) -> Self {
        StepOutcome::Warning {
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        StepOutcome::Fatal {
            message: message.into(),
            hint: None,
        }
    }

    pub fn fatal_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        StepOutcome::Fatal {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StepOutcome::Fatal { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, StepOutcome::Warning { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

/// Captured result of one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Short, single-line description of why the command failed.
    pub fn failure_summary(&self) -> String {
        let detail = self
            .stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("no error output");
        match self.exit_code {
            Some(code) => format!("exit code {}: {}", code, detail),
            None => format!("terminated by signal: {}", detail),
        }
    }
}

/// Everything observed during one deployment attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployReport {
    pub service: String,
    pub profile: Profile,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
}

impl DeployReport {
    pub fn new(service: impl Into<String>, profile: Profile) -> Self {
        Self {
            service: service.into(),
            profile,
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: Step, outcome: StepOutcome, duration: std::time::Duration) {
        self.steps.push(StepRecord {
            step,
            outcome,
            duration_ms: duration.as_millis() as u64,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn fatal(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.outcome.is_fatal())
    }

    pub fn warnings(&self) -> Vec<&StepRecord> {
        self.steps
            .iter()
            .filter(|record| record.outcome.is_warning())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.fatal().is_none()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            crate::exit_codes::OK
        } else {
            crate::exit_codes::FAILED
        }
    }

    pub fn executed_steps(&self) -> Vec<Step> {
        self.steps.iter().map(|record| record.step).collect()
    }

    /// Pretty JSON with a trailing newline, as written by `--report`.
    pub fn to_json_pretty(&self) -> crate::utils::error::Result<String> {
        let mut payload = serde_json::to_string_pretty(self)?;
        payload.push('\n');
        Ok(payload)
    }

    /// Turn a fatal step into an error, keeping successful reports intact.
    pub fn into_result(self) -> crate::utils::error::Result<Self> {
        if let Some(record) = self.fatal() {
            if let StepOutcome::Fatal { message, hint } = &record.outcome {
                return Err(crate::utils::error::DeployError::StepFailed {
                    step: record.step,
                    message: message.clone(),
                    hint: hint.clone(),
                });
            }
        }
        Ok(self)
    }
}
