//! Backend invoker: builds the argument vector for a container-engine CLI
//! call and runs exactly one child process per invocation.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::errors::{Result, SugarError};

pub const DOCKER_BIN: &str = "docker";

/// One subcommand family of the engine CLI (`docker swarm`, `docker service`,
/// `docker stack`, `docker node`). The prefix tokens are fixed per family;
/// everything else is assembled fresh for each call and never mutated after
/// the child is spawned.
#[derive(Debug, Clone)]
pub struct Backend {
    program: String,
    prefix: Vec<String>,
}

impl Backend {
    pub fn new(program: &str, prefix: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn swarm() -> Self {
        Self::new(DOCKER_BIN, &["swarm"])
    }

    pub fn service() -> Self {
        Self::new(DOCKER_BIN, &["service"])
    }

    pub fn stack(subcommand: &[&str]) -> Self {
        let mut prefix = vec!["stack"];
        prefix.extend_from_slice(subcommand);
        Self::new(DOCKER_BIN, &prefix)
    }

    pub fn node() -> Self {
        Self::new(DOCKER_BIN, &["node"])
    }

    /// Full ordered argument list for one invocation:
    /// `prefix ++ subcommand ++ options ++ targets ++ cmd_args`.
    /// Options precede positional targets because the engine CLI stops flag
    /// parsing at the first positional for several subcommands.
    pub fn command_vector(
        &self,
        subcommand: Option<&str>,
        options: &[String],
        targets: &[String],
        cmd_args: &[String],
    ) -> Vec<String> {
        let mut args = self.prefix.clone();
        if let Some(sub) = subcommand {
            args.push(sub.to_string());
        }
        args.extend(options.iter().cloned());
        args.extend(targets.iter().cloned());
        args.extend(cmd_args.iter().cloned());
        args
    }

    /// Spawn the backend with inherited stdout/stderr and wait for it.
    /// A nonzero child exit is not an error at this layer; it is returned as
    /// the status for the caller to judge.
    pub fn invoke(
        &self,
        subcommand: Option<&str>,
        options: &[String],
        targets: &[String],
        cmd_args: &[String],
    ) -> Result<i32> {
        let args = self.command_vector(subcommand, options, targets, cmd_args);
        tracing::debug!(program = %self.program, ?args, "invoking backend");
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| {
                SugarError::command_error(format!("Failed to run {}: {}", self.program, e))
            })?;
        Ok(status.code().unwrap_or(1))
    }

    /// Like [`invoke`], but feed `payload` to the child's standard input.
    /// Used for `stack deploy -c -` with a rendered compose document.
    pub fn invoke_with_stdin(
        &self,
        payload: &str,
        subcommand: Option<&str>,
        options: &[String],
        targets: &[String],
        cmd_args: &[String],
    ) -> Result<i32> {
        let args = self.command_vector(subcommand, options, targets, cmd_args);
        tracing::debug!(program = %self.program, ?args, "invoking backend with stdin payload");
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SugarError::command_error(format!("Failed to run {}: {}", self.program, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload.as_bytes()).map_err(|e| {
                SugarError::command_error(format!("Failed to write to {} stdin: {}", self.program, e))
            })?;
        }

        let status = child.wait().map_err(|e| {
            SugarError::command_error(format!("Failed to wait for {}: {}", self.program, e))
        })?;
        Ok(status.code().unwrap_or(1))
    }

    /// Run the backend capturing stdout, failing on nonzero exit with the
    /// captured stderr. For discovery calls whose output feeds a later step.
    pub fn capture(
        &self,
        subcommand: Option<&str>,
        options: &[String],
        targets: &[String],
        cmd_args: &[String],
    ) -> Result<String> {
        let args = self.command_vector(subcommand, options, targets, cmd_args);
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| {
                SugarError::command_error(format!("Failed to run {}: {}", self.program, e))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SugarError::command_error(format!(
                "{} {} failed: {}",
                self.program,
                args.join(" "),
                stderr
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run the backend capturing stdout and stderr separately, tolerating the
    /// listed exit codes. The engine reports some per-item failures via
    /// stderr content with exit code 1, so rollback passes `&[0, 1]`.
    pub fn capture_lenient(
        &self,
        subcommand: Option<&str>,
        options: &[String],
        targets: &[String],
        ok_codes: &[i32],
    ) -> Result<(String, String)> {
        let args = self.command_vector(subcommand, options, targets, &[]);
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| {
                SugarError::command_error(format!("Failed to run {}: {}", self.program, e))
            })?;
        let code = output.status.code().unwrap_or(-1);
        if !ok_codes.contains(&code) {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SugarError::command_error(format!(
                "{} {} exited with status {}: {}",
                self.program,
                args.join(" "),
                code,
                stderr
            )));
        }
        Ok((
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        ))
    }
}

/// Discover the service names belonging to a deployed stack via
/// `docker stack services <stack> --format {{.Name}}`.
pub fn stack_services(stack: &str) -> Result<Vec<String>> {
    let backend = Backend::stack(&["services"]);
    let output = backend.capture(
        None,
        &["--format".to_string(), "{{.Name}}".to_string()],
        &[stack.to_string()],
        &[],
    )?;
    let services: Vec<String> = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if services.is_empty() {
        return Err(SugarError::invalid_parameter(format!(
            "No services found in stack {}",
            stack
        )));
    }
    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_vector_orders_prefix_sub_options_targets() {
        let backend = Backend::service();
        let args = backend.command_vector(
            Some("logs"),
            &strings(&["--follow", "--tail", "50"]),
            &strings(&["demo_web"]),
            &[],
        );
        assert_eq!(args, strings(&["service", "logs", "--follow", "--tail", "50", "demo_web"]));
    }

    #[test]
    fn command_vector_stack_places_name_last() {
        let backend = Backend::stack(&["ps", "--quiet"]);
        let args = backend.command_vector(None, &[], &strings(&["demo"]), &[]);
        assert_eq!(args, strings(&["stack", "ps", "--quiet", "demo"]));
    }

    #[test]
    fn command_vector_deploy_prefix_keeps_stdin_marker() {
        let backend = Backend::stack(&["deploy", "-c", "-"]);
        let args = backend.command_vector(
            None,
            &strings(&["--with-registry-auth"]),
            &strings(&["demo"]),
            &[],
        );
        assert_eq!(
            args,
            strings(&["stack", "deploy", "-c", "-", "--with-registry-auth", "demo"])
        );
    }

    #[test]
    fn command_vector_appends_trailing_cmd_args() {
        let backend = Backend::swarm();
        let args = backend.command_vector(
            Some("init"),
            &strings(&["--advertise-addr", "192.168.1.1"]),
            &[],
            &strings(&["--force-new-cluster"]),
        );
        assert_eq!(
            args,
            strings(&["swarm", "init", "--advertise-addr", "192.168.1.1", "--force-new-cluster"])
        );
    }
}
