//! Argument lists for every engine command the driver issues.
//!
//! Builders return the arguments passed after the engine binary, so the same
//! lists feed both the driver and the dry-run plan.

use crate::domain::ports::ConfigProvider;

/// `compose [-f FILE] [-p PROJECT] <subcommand...>`
fn compose_args<C: ConfigProvider + ?Sized>(config: &C, subcommand: &[&str]) -> Vec<String> {
    let mut args = vec!["compose".to_string()];
    if let Some(file) = config.compose_file() {
        args.push("-f".to_string());
        args.push(file.to_string());
    }
    if let Some(project) = config.project_name() {
        args.push("-p".to_string());
        args.push(project.to_string());
    }
    args.extend(subcommand.iter().map(|s| s.to_string()));
    args
}

pub fn compose_version() -> Vec<String> {
    vec!["compose".to_string(), "version".to_string()]
}

pub fn daemon_info() -> Vec<String> {
    vec!["info".to_string()]
}

pub fn stop_service<C: ConfigProvider + ?Sized>(config: &C) -> Vec<String> {
    compose_args(config, &["stop", config.service_name()])
}

pub fn remove_service<C: ConfigProvider + ?Sized>(config: &C) -> Vec<String> {
    compose_args(config, &["rm", "-f", config.service_name()])
}

pub fn compose_down<C: ConfigProvider + ?Sized>(config: &C) -> Vec<String> {
    compose_args(
        config,
        &["down", "--rmi", "all", "--volumes", "--remove-orphans"],
    )
}

pub fn build_no_cache<C: ConfigProvider + ?Sized>(config: &C) -> Vec<String> {
    compose_args(config, &["build", "--no-cache", config.service_name()])
}

pub fn start_detached<C: ConfigProvider + ?Sized>(config: &C) -> Vec<String> {
    compose_args(config, &["up", "-d", config.service_name()])
}

pub fn running_services<C: ConfigProvider + ?Sized>(config: &C) -> Vec<String> {
    compose_args(
        config,
        &["ps", "--services", "--filter", "status=running"],
    )
}

pub fn logs_hint<C: ConfigProvider + ?Sized>(config: &C) -> String {
    let mut parts = vec![config.engine_binary().to_string()];
    parts.extend(compose_args(config, &["logs", config.service_name()]));
    parts.join(" ")
}

pub fn prune_dangling_images() -> Vec<String> {
    vec!["image".to_string(), "prune".to_string(), "-f".to_string()]
}

/// True when `service` is one of the lines printed by `compose ps --services`.
pub fn lists_service(stdout: &str, service: &str) -> bool {
    stdout.lines().map(str::trim).any(|line| line == service)
}
