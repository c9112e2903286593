#![allow(dead_code)]

use async_trait::async_trait;
use compose_redeploy::domain::ports::CommandRunner;
use compose_redeploy::{CommandOutput, DeployConfig, DeployError, Profile, Result};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Fake engine: every command succeeds unless scripted otherwise.
#[derive(Clone)]
pub struct ScriptedRunner {
    binary_present: bool,
    running: Vec<String>,
    responses: Arc<Mutex<HashMap<String, CommandOutput>>>,
    timeouts: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    call_times: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            binary_present: true,
            running: Vec::new(),
            responses: Arc::default(),
            timeouts: Arc::default(),
            calls: Arc::default(),
            call_times: Arc::default(),
        }
    }

    pub fn without_binary(mut self) -> Self {
        self.binary_present = false;
        self
    }

    pub fn with_running(mut self, services: &[&str]) -> Self {
        self.running = services.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Script the reply for a command key such as `"compose build"` or `"info"`.
    pub fn reply(self, key: &str, output: CommandOutput) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), output);
        self
    }

    pub fn fail(self, key: &str, stderr: &str) -> Self {
        self.reply(key, CommandOutput::failure(1, stderr))
    }

    /// The command never finishes: `run` returns `CommandTimeout`.
    pub fn time_out(self, key: &str) -> Self {
        self.timeouts.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_keys(&self) -> Vec<String> {
        self.calls().iter().map(|args| command_key(args)).collect()
    }

    /// When the first call with this key was issued.
    pub fn issued_at(&self, key: &str) -> Option<Instant> {
        self.call_times
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, at)| *at)
    }
}

/// `compose [-f F] [-p P] sub ...` becomes `"compose sub"`; others use the first two words.
pub fn command_key(args: &[String]) -> String {
    if args.first().map(String::as_str) == Some("compose") {
        let mut rest = args[1..].iter();
        while let Some(arg) = rest.next() {
            if arg == "-f" || arg == "-p" {
                rest.next();
                continue;
            }
            return format!("compose {}", arg);
        }
        "compose".to_string()
    } else {
        args.iter().take(2).cloned().collect::<Vec<_>>().join(" ")
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.binary_present
            .then(|| PathBuf::from("/usr/bin").join(program))
    }

    async fn run(&self, _program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(args.to_vec());

        let key = command_key(args);
        self.call_times
            .lock()
            .unwrap()
            .push((key.clone(), Instant::now()));

        if self.timeouts.lock().unwrap().contains(&key) {
            return Err(DeployError::CommandTimeout {
                command: key,
                seconds: timeout.as_secs(),
            });
        }
        if let Some(output) = self.responses.lock().unwrap().get(&key) {
            return Ok(output.clone());
        }
        if key == "compose ps" {
            let listing = self.running.join("\n");
            return Ok(CommandOutput::success().with_stdout(listing));
        }
        Ok(CommandOutput::success())
    }
}

/// Config with no settle pause and the given probe URL.
pub fn test_config(profile: Profile, probe_url: &str) -> DeployConfig {
    let mut config = DeployConfig::default();
    config.deploy.profile = profile;
    config.deploy.settle_seconds = 0;
    config.probe.url = probe_url.to_string();
    config.probe.timeout_seconds = 2;
    config
}

/// A loopback URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}
