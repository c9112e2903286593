use crate::core::compose;
use crate::core::plan::{deployment_plan, PlannedStep};
use crate::domain::model::{CommandOutput, DeployReport, Step, StepOutcome};
use crate::domain::ports::{CommandRunner, ConfigProvider, HealthProbe};
use crate::utils::error::Result;
use std::time::Instant;

/// Runs one teardown, rebuild, start and verify cycle for a compose service.
///
/// Steps run strictly in order and the first fatal outcome ends the run.
/// Nothing is rolled back: a failed build leaves the service torn down.
pub struct DeployDriver<C: ConfigProvider, R: CommandRunner, P: HealthProbe> {
    config: C,
    runner: R,
    probe: P,
}

impl<C: ConfigProvider, R: CommandRunner, P: HealthProbe> DeployDriver<C, R, P> {
    pub fn new(config: C, runner: R, probe: P) -> Self {
        Self {
            config,
            runner,
            probe,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn run(&self) -> DeployReport {
        let mut report = DeployReport::new(self.config.service_name(), self.config.profile());

        tracing::info!(
            "🚀 Redeploying '{}' (profile: {})",
            self.config.service_name(),
            self.config.profile()
        );
        if !self.config.prune_images() {
            tracing::info!("Image pruning disabled, skipping prune-images");
        }

        for planned in deployment_plan(&self.config) {
            // Give the container time to come up before checking it
            if planned.step == Step::RunningCheck {
                self.settle().await;
            }

            let started = Instant::now();
            tracing::debug!("▶ {}", planned.step);
            let outcome = self.execute(&planned).await;

            match &outcome {
                StepOutcome::Success => tracing::info!("✅ {}", planned.step),
                StepOutcome::Warning { message } => {
                    tracing::warn!("⚠️  {}: {}", planned.step, message)
                }
                StepOutcome::Fatal { message, .. } => {
                    tracing::error!("❌ {}: {}", planned.step, message)
                }
            }

            // No rollback: stop here and leave the engine as it is
            let fatal = outcome.is_fatal();
            report.record(planned.step, outcome, started.elapsed());
            if fatal {
                break;
            }
        }

        report.finish();
        report
    }

    async fn settle(&self) {
        let pause = self.config.settle_duration();
        if pause.is_zero() {
            return;
        }
        tracing::info!("⏳ Waiting {}s for the service to initialise", pause.as_secs());
        tokio::time::sleep(pause).await;
    }

    async fn execute(&self, planned: &PlannedStep) -> StepOutcome {
        match (planned.step, planned.args.as_deref()) {
            (Step::EngineBinary, _) => self.check_engine_binary(),
            (Step::HttpProbe, _) => self.probe_service().await,
            (Step::RunningCheck, Some(args)) => self.check_running(args).await,
            (Step::PruneImages, Some(args)) => self.prune(args).await,
            (Step::StopService | Step::RemoveService | Step::ComposeDown, Some(args)) => {
                self.teardown(planned.step, args).await
            }
            (step, Some(args)) => self.required(step, args).await,
            (step, None) => StepOutcome::fatal(format!("no command defined for step '{}'", step)),
        }
    }

    async fn engine(&self, args: &[String]) -> Result<CommandOutput> {
        self.runner
            .run(self.config.engine_binary(), args, self.config.command_timeout())
            .await
    }

    fn check_engine_binary(&self) -> StepOutcome {
        let binary = self.config.engine_binary();
        match self.runner.locate(binary) {
            Some(path) => {
                tracing::debug!("Found engine binary at {}", path.display());
                StepOutcome::Success
            }
            None => StepOutcome::fatal(format!("'{}' was not found on PATH", binary)),
        }
    }

    /// Commands whose failure aborts the run.
    async fn required(&self, step: Step, args: &[String]) -> StepOutcome {
        let what = match step {
            Step::ComposePlugin => "compose plugin is unavailable",
            Step::Daemon => "engine daemon is not responding",
            Step::Build => "image build failed",
            Step::Start => "service start failed",
            _ => "command failed",
        };

        match self.engine(args).await {
            Ok(output) if output.is_success() => StepOutcome::Success,
            Ok(output) => StepOutcome::fatal(format!("{} ({})", what, output.failure_summary())),
            Err(e) => StepOutcome::fatal(format!("{} ({})", what, e)),
        }
    }

    /// Teardown tolerates "nothing to stop/remove" and keeps going.
    async fn teardown(&self, step: Step, args: &[String]) -> StepOutcome {
        match self.engine(args).await {
            Ok(output) if output.is_success() => StepOutcome::Success,
            Ok(output) => StepOutcome::warning(format!(
                "nothing to clean up for '{}' ({})",
                self.config.service_name(),
                output.failure_summary()
            )),
            Err(e) => StepOutcome::warning(format!("{} did not complete: {}", step, e)),
        }
    }

    async fn check_running(&self, args: &[String]) -> StepOutcome {
        let service = self.config.service_name();
        let hint = format!("inspect the logs with: {}", compose::logs_hint(&self.config));

        match self.engine(args).await {
            Ok(output) if output.is_success() => {
                if compose::lists_service(&output.stdout, service) {
                    StepOutcome::Success
                } else {
                    StepOutcome::fatal_with_hint(
                        format!("service '{}' is not running", service),
                        hint,
                    )
                }
            }
            Ok(output) => StepOutcome::fatal_with_hint(
                format!("could not list running services ({})", output.failure_summary()),
                hint,
            ),
            Err(e) => StepOutcome::fatal_with_hint(
                format!("could not list running services ({})", e),
                hint,
            ),
        }
    }

    async fn probe_service(&self) -> StepOutcome {
        let url = self.config.probe_url();
        match self.probe.probe(url, self.config.probe_timeout()).await {
            Ok(status) => {
                tracing::debug!("Probe {} answered with HTTP {}", url, status);
                StepOutcome::Success
            }
            Err(e) => StepOutcome::warning(format!(
                "{} is not reachable yet, the service may still be initialising ({})",
                url, e
            )),
        }
    }

    /// The prune exit status is never checked.
    async fn prune(&self, args: &[String]) -> StepOutcome {
        match self.engine(args).await {
            Ok(output) if !output.is_success() => {
                tracing::debug!("Ignoring prune failure: {}", output.failure_summary())
            }
            Err(e) => tracing::debug!("Ignoring prune failure: {}", e),
            Ok(_) => {}
        }
        StepOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Profile;
    use crate::utils::error::DeployError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct MockConfig {
        profile: Profile,
    }

    impl ConfigProvider for MockConfig {
        fn service_name(&self) -> &str {
            "web"
        }

        fn profile(&self) -> Profile {
            self.profile
        }

        fn engine_binary(&self) -> &str {
            "docker"
        }

        fn compose_file(&self) -> Option<&str> {
            None
        }

        fn project_name(&self) -> Option<&str> {
            None
        }

        fn command_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }

        fn settle_duration(&self) -> Duration {
            Duration::ZERO
        }

        fn prune_images(&self) -> bool {
            true
        }

        fn probe_url(&self) -> &str {
            "http://127.0.0.1:9001"
        }

        fn probe_timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    /// Replies from a queue; records the arguments of every call.
    #[derive(Clone, Default)]
    struct QueueRunner {
        replies: Arc<Mutex<VecDeque<Result<CommandOutput>>>>,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl QueueRunner {
        fn with(replies: Vec<Result<CommandOutput>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                calls: Arc::default(),
            }
        }

        fn subcommands(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|args| args.iter().take(2).cloned().collect::<Vec<_>>().join(" "))
                .collect()
        }
    }

    #[async_trait]
    impl CommandRunner for QueueRunner {
        fn locate(&self, program: &str) -> Option<PathBuf> {
            Some(PathBuf::from("/usr/bin").join(program))
        }

        async fn run(
            &self,
            _program: &str,
            args: &[String],
            _timeout: Duration,
        ) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(args.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(CommandOutput::success()))
        }
    }

    struct FixedProbe(bool);

    #[async_trait]
    impl HealthProbe for FixedProbe {
        async fn probe(&self, _url: &str, _timeout: Duration) -> Result<u16> {
            if self.0 {
                Ok(200)
            } else {
                Err(DeployError::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )))
            }
        }
    }

    fn ok() -> Result<CommandOutput> {
        Ok(CommandOutput::success())
    }

    fn running(services: &str) -> Result<CommandOutput> {
        Ok(CommandOutput::success().with_stdout(services))
    }

    #[tokio::test]
    async fn test_selective_teardown_warnings_do_not_stop_run() {
        let runner = QueueRunner::with(vec![
            ok(),
            ok(),
            Ok(CommandOutput::failure(1, "no such service: web")),
            Err(DeployError::CommandTimeout {
                command: "docker compose rm".to_string(),
                seconds: 5,
            }),
            ok(),
            ok(),
            running("web\n"),
            ok(),
        ]);
        let driver = DeployDriver::new(
            MockConfig {
                profile: Profile::Selective,
            },
            runner.clone(),
            FixedProbe(true),
        );

        let report = driver.run().await;

        assert!(report.is_success());
        assert_eq!(report.warnings().len(), 2);
        assert_eq!(
            runner.subcommands(),
            vec![
                "compose version",
                "info",
                "compose stop",
                "compose rm",
                "compose build",
                "compose up",
                "compose ps",
                "image prune",
            ]
        );
    }

    #[tokio::test]
    async fn test_start_failure_is_fatal_and_skips_rest() {
        let runner = QueueRunner::with(vec![
            ok(),
            ok(),
            ok(),
            ok(),
            Ok(CommandOutput::failure(1, "port is already allocated")),
        ]);
        let driver = DeployDriver::new(
            MockConfig {
                profile: Profile::FullTeardown,
            },
            runner.clone(),
            FixedProbe(true),
        );

        let report = driver.run().await;

        assert_eq!(report.exit_code(), 1);
        let fatal = report.fatal().unwrap();
        assert_eq!(fatal.step, Step::Start);
        match &fatal.outcome {
            StepOutcome::Fatal { message, .. } => {
                assert!(message.contains("port is already allocated"))
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(runner.subcommands().last().unwrap(), "compose up");
        assert!(report.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_running_check_failure_has_logs_hint() {
        let runner = QueueRunner::with(vec![
            ok(),
            ok(),
            ok(),
            ok(),
            ok(),
            running("db\nweb-worker\n"),
        ]);
        let driver = DeployDriver::new(
            MockConfig {
                profile: Profile::FullTeardown,
            },
            runner,
            FixedProbe(true),
        );

        let err = driver.run().await.into_result().unwrap_err();

        match err {
            DeployError::StepFailed { step, hint, .. } => {
                assert_eq!(step, Step::RunningCheck);
                assert_eq!(
                    hint.as_deref(),
                    Some("inspect the logs with: docker compose logs web")
                );
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prune_failure_is_ignored() {
        let runner = QueueRunner::with(vec![
            ok(),
            ok(),
            ok(),
            ok(),
            ok(),
            running("web"),
            Ok(CommandOutput::failure(1, "prune already running")),
        ]);
        let driver = DeployDriver::new(
            MockConfig {
                profile: Profile::FullTeardown,
            },
            runner,
            FixedProbe(false),
        );

        let report = driver.run().await;

        assert!(report.is_success());
        let warnings: Vec<Step> = report.warnings().iter().map(|r| r.step).collect();
        assert_eq!(warnings, vec![Step::HttpProbe]);
        assert_eq!(report.steps.last().unwrap().step, Step::PruneImages);
        assert_eq!(report.steps.last().unwrap().outcome, StepOutcome::Success);
    }
}
