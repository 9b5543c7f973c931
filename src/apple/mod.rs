//! Apple Container adapter: dispatches high-level commands either to the
//! `container` binary or, in dummy mode, to a JSON-backed test double.

pub mod dummy;

use std::io::ErrorKind;
use std::process::Command;

use crate::errors::{Result, SugarError};

pub use dummy::DummyRuntime;

pub const CONTAINER_BIN: &str = "container";

/// Commands supported by the Apple Container CLI.
pub const STANDARD_COMMANDS: &[&str] = &[
    "build", "create", "down", "exec", "images", "kill", "logs", "pause", "ps", "pull", "push",
    "restart", "rm", "run", "start", "stop", "top", "unpause", "up", "version",
];

pub const EXPERIMENTAL_COMMANDS: &[&str] = &["attach", "cp", "ls", "scale", "wait", "watch"];

pub fn is_known_command(command: &str) -> bool {
    STANDARD_COMMANDS.contains(&command) || EXPERIMENTAL_COMMANDS.contains(&command)
}

enum Mode {
    Real,
    Dummy(DummyRuntime),
}

/// Unified interface over the Apple Container runtime. Real mode shells out
/// to the `container` binary per command; dummy mode mutates local state for
/// environments without the runtime.
pub struct AppleContainer {
    mode: Mode,
}

impl AppleContainer {
    pub fn new() -> Self {
        Self { mode: Mode::Real }
    }

    pub fn with_dummy(state_file: &str) -> Self {
        Self {
            mode: Mode::Dummy(DummyRuntime::new(state_file)),
        }
    }

    /// Execute one high-level command against the runtime, returning the
    /// resulting exit code. `restart` decomposes into `stop` then `start`,
    /// aborting if the stop fails.
    pub fn execute(
        &mut self,
        command: &str,
        services: &[String],
        extra_args: &[String],
    ) -> Result<i32> {
        if !is_known_command(command) {
            return Err(SugarError::invalid_parameter(format!(
                "Unknown container command: {}",
                command
            )));
        }
        if command == "restart" {
            let code = self.dispatch("stop", services, extra_args)?;
            if code != 0 {
                return Ok(code);
            }
            return self.dispatch("start", services, extra_args);
        }
        self.dispatch(command, services, extra_args)
    }

    fn dispatch(&mut self, command: &str, services: &[String], extra_args: &[String]) -> Result<i32> {
        match &mut self.mode {
            Mode::Real => real_execute(command, services, extra_args),
            Mode::Dummy(runtime) => dummy_execute(runtime, command, services),
        }
    }

    /// Access the dummy runtime, if running in dummy mode.
    pub fn dummy(&self) -> Option<&DummyRuntime> {
        match &self.mode {
            Mode::Dummy(runtime) => Some(runtime),
            Mode::Real => None,
        }
    }
}

impl Default for AppleContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shell out to the `container` binary, inheriting stdio. A missing binary is
/// reported as a distinct error rather than an unhandled fault.
fn real_execute(command: &str, services: &[String], extra_args: &[String]) -> Result<i32> {
    let mut args: Vec<String> = vec![command.to_string()];
    args.extend(services.iter().cloned());
    args.extend(extra_args.iter().cloned());

    tracing::debug!(?args, "invoking container runtime");
    match Command::new(CONTAINER_BIN).args(&args).status() {
        Ok(status) => Ok(status.code().unwrap_or(1)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SugarError::RuntimeNotFound),
        Err(e) => Err(SugarError::command_error(format!(
            "Error executing {}: {}",
            command, e
        ))),
    }
}

/// Simulate a subset of commands against the dummy runtime; anything the
/// double does not model is accepted as a no-op success.
fn dummy_execute(runtime: &mut DummyRuntime, command: &str, services: &[String]) -> Result<i32> {
    match command {
        "create" => {
            for service in services {
                runtime.create(service, &format!("image-{}", service))?;
            }
        }
        "start" => {
            for service in services {
                runtime.start(service)?;
            }
        }
        "stop" => {
            for service in services {
                runtime.stop(service)?;
            }
        }
        "pause" => {
            for service in services {
                runtime.pause(service)?;
            }
        }
        "unpause" => {
            for service in services {
                runtime.unpause(service)?;
            }
        }
        "rm" => {
            for service in services {
                runtime.remove(service)?;
            }
        }
        "ps" => {
            let containers = runtime.get_containers();
            if !containers.is_empty() {
                println!("CONTAINER ID\tIMAGE\t\tSTATUS");
                for (name, record) in containers {
                    let id: String = name.chars().take(12).collect();
                    println!("{}\t{}\t{}", id, record.image, record.status);
                }
            }
        }
        "down" => {
            let names: Vec<String> = runtime.get_containers().keys().cloned().collect();
            for name in names {
                runtime.remove(&name)?;
            }
        }
        _ => {}
    }
    Ok(0)
}
