//! Per-family translation of CLI flags into backend invocations.

pub mod node;
pub mod service;
pub mod stack;
pub mod swarm;

use crate::backend::Backend;
use crate::errors::Result;
use crate::resolve::check_exclusive_targets;

/// Shared dispatch for the swarm/service/node families: reject mixed
/// service/node targets, then issue exactly one backend call.
pub fn call_family(
    backend: &Backend,
    subcommand: &str,
    services: &[String],
    nodes: &[String],
    options: &[String],
    cmd_args: &[String],
) -> Result<i32> {
    check_exclusive_targets(services, nodes)?;
    let targets = if !services.is_empty() { services } else { nodes };
    backend.invoke(Some(subcommand), options, targets, cmd_args)
}

/// Ordered backend tokens for the update-style flag set shared by
/// `swarm update` and `service update`.
pub fn update_flag_tokens(
    mut tokens: Vec<String>,
    detach: bool,
    quiet: bool,
    force: bool,
    rollback: bool,
    image: &str,
    replicas: &str,
    env_add: &str,
    label_add: &str,
) -> Vec<String> {
    if detach {
        tokens.push("--detach".to_string());
    }
    if quiet {
        tokens.push("--quiet".to_string());
    }
    if force {
        tokens.push("--force".to_string());
    }
    if rollback {
        tokens.push("--rollback".to_string());
    }
    if !image.is_empty() {
        tokens.push("--image".to_string());
        tokens.push(image.to_string());
    }
    if !replicas.is_empty() {
        tokens.push("--replicas".to_string());
        tokens.push(replicas.to_string());
    }
    for pair in env_add.split(',') {
        let pair = pair.trim();
        if !pair.is_empty() {
            tokens.push("--env-add".to_string());
            tokens.push(pair.to_string());
        }
    }
    for pair in label_add.split(',') {
        let pair = pair.trim();
        if !pair.is_empty() {
            tokens.push("--label-add".to_string());
            tokens.push(pair.to_string());
        }
    }
    tokens
}
