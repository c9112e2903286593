use crate::core::compose;
use crate::domain::model::{Profile, Step};
use crate::domain::ports::ConfigProvider;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub step: Step,
    /// Engine arguments, or `None` for steps that do not shell out.
    pub args: Option<Vec<String>>,
}

impl PlannedStep {
    fn engine(step: Step, args: Vec<String>) -> Self {
        Self {
            step,
            args: Some(args),
        }
    }

    fn local(step: Step) -> Self {
        Self { step, args: None }
    }
}

/// Ordered steps a full run would take when nothing fails.
pub fn deployment_plan<C: ConfigProvider + ?Sized>(config: &C) -> Vec<PlannedStep> {
    let mut plan = vec![
        PlannedStep::local(Step::EngineBinary),
        PlannedStep::engine(Step::ComposePlugin, compose::compose_version()),
        PlannedStep::engine(Step::Daemon, compose::daemon_info()),
    ];

    match config.profile() {
        Profile::Selective => {
            plan.push(PlannedStep::engine(
                Step::StopService,
                compose::stop_service(config),
            ));
            plan.push(PlannedStep::engine(
                Step::RemoveService,
                compose::remove_service(config),
            ));
        }
        Profile::FullTeardown => {
            plan.push(PlannedStep::engine(
                Step::ComposeDown,
                compose::compose_down(config),
            ));
        }
    }

    plan.push(PlannedStep::engine(Step::Build, compose::build_no_cache(config)));
    plan.push(PlannedStep::engine(Step::Start, compose::start_detached(config)));
    plan.push(PlannedStep::engine(
        Step::RunningCheck,
        compose::running_services(config),
    ));
    plan.push(PlannedStep::local(Step::HttpProbe));
    if config.prune_images() {
        plan.push(PlannedStep::engine(
            Step::PruneImages,
            compose::prune_dangling_images(),
        ));
    }

    plan
}

/// Human-readable dry-run listing.
pub fn render_plan<C: ConfigProvider + ?Sized>(config: &C) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Deployment plan for '{}' (profile: {})",
        config.service_name(),
        config.profile()
    );

    for (index, planned) in deployment_plan(config).iter().enumerate() {
        let detail = match (&planned.step, &planned.args) {
            (_, Some(args)) => format!("{} {}", config.engine_binary(), args.join(" ")),
            (Step::EngineBinary, None) => format!("locate '{}' on PATH", config.engine_binary()),
            (Step::HttpProbe, None) => format!(
                "GET {} (timeout {}s, advisory)",
                config.probe_url(),
                config.probe_timeout().as_secs()
            ),
            (_, None) => String::new(),
        };
        let _ = writeln!(out, "{:>2}. {:<15} {}", index + 1, planned.step.name(), detail);

        if planned.step == Step::Start {
            let _ = writeln!(
                out,
                "    (wait {}s before the running check)",
                config.settle_duration().as_secs()
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;

    fn steps(plan: &[PlannedStep]) -> Vec<Step> {
        plan.iter().map(|p| p.step).collect()
    }

    #[test]
    fn test_selective_plan_order() {
        let config = DeployConfig::default();
        let plan = deployment_plan(&config);

        assert_eq!(
            steps(&plan),
            vec![
                Step::EngineBinary,
                Step::ComposePlugin,
                Step::Daemon,
                Step::StopService,
                Step::RemoveService,
                Step::Build,
                Step::Start,
                Step::RunningCheck,
                Step::HttpProbe,
                Step::PruneImages,
            ]
        );
    }

    #[test]
    fn test_full_teardown_plan_without_prune() {
        let mut config = DeployConfig::default();
        config.deploy.profile = Profile::FullTeardown;
        config.deploy.prune_images = false;
        let plan = deployment_plan(&config);

        assert!(steps(&plan).contains(&Step::ComposeDown));
        assert!(!steps(&plan).contains(&Step::StopService));
        assert_eq!(plan.last().unwrap().step, Step::HttpProbe);
    }

    #[test]
    fn test_render_plan_shows_commands() {
        let config = DeployConfig::default();
        let rendered = render_plan(&config);

        assert!(rendered.contains("profile: selective"));
        assert!(rendered.contains("docker compose build --no-cache audio-converter"));
        assert!(rendered.contains("GET http://localhost:9001"));
        assert!(rendered.contains("wait 5s"));
    }
}
