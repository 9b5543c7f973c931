//! Target-name and option-string resolution shared by all command families.

use crate::errors::{Result, SugarError};

pub const MSG_ERROR_SERVICES_NAME: &str =
    "Service name must be provided for this command (use --services service1,service2)";
pub const MSG_ERROR_NODES_NAME: &str = "Node name(s) must be provided";
pub const MSG_ERROR_STACK_NAME: &str = "Stack name must be provided";
pub const MSG_ERROR_SERVICES_AND_NODES: &str = "Give services or nodes arguments, not both.";

/// Split a raw `--options` string into ordered CLI tokens, respecting
/// shell-style quoting. An empty string yields an empty list; token order is
/// preserved since the backend is flag-order-sensitive for some subcommands.
pub fn split_options(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    shell_words::split(raw)
        .map_err(|e| SugarError::invalid_parameter(format!("Invalid --options string: {}", e)))
}

/// Resolve service names from a comma-separated `--services` value.
///
/// Explicit names are always required: swarm commands have no notion of "all
/// services", so a blank value is an invalid parameter and no process is
/// spawned. (`--all` only influences whole-stack discovery in rollback.)
pub fn resolve_services(services: &str) -> Result<Vec<String>> {
    let names = split_names(services);
    if names.is_empty() {
        return Err(SugarError::invalid_parameter(MSG_ERROR_SERVICES_NAME));
    }
    Ok(names)
}

/// Resolve node names from a comma-separated `--nodes` value. Node mutation
/// commands always require explicit names.
pub fn resolve_nodes(nodes: &str) -> Result<Vec<String>> {
    let names = split_names(nodes);
    if names.is_empty() {
        return Err(SugarError::invalid_parameter(MSG_ERROR_NODES_NAME));
    }
    Ok(names)
}

/// Reject a call that mixes service and node targets.
pub fn check_exclusive_targets(services: &[String], nodes: &[String]) -> Result<()> {
    if !services.is_empty() && !nodes.is_empty() {
        return Err(SugarError::invalid_parameter(MSG_ERROR_SERVICES_AND_NODES));
    }
    Ok(())
}

/// Prefix each name with `{stack}_` unless it already carries that prefix.
/// An empty stack name leaves the list untouched.
pub fn prepend_stack_name(stack: &str, names: Vec<String>) -> Vec<String> {
    if stack.is_empty() {
        return names;
    }
    let prefix = format!("{}_", stack);
    names
        .into_iter()
        .map(|name| {
            if name.starts_with(&prefix) {
                name
            } else {
                format!("{}{}", prefix, name)
            }
        })
        .collect()
}

/// Parse a comma-separated `service=replicas` list for `service scale`.
pub fn parse_scale_pairs(raw: &str) -> Result<Vec<String>> {
    let pairs = split_names(raw);
    if pairs.is_empty() {
        return Err(SugarError::invalid_parameter(
            "Services must be provided in format service=replicas[,..]",
        ));
    }
    for pair in &pairs {
        let valid = match pair.split_once('=') {
            Some((svc, replicas)) => {
                !svc.trim().is_empty() && replicas.trim().parse::<u64>().is_ok()
            }
            None => false,
        };
        if !valid {
            return Err(SugarError::invalid_parameter(format!(
                "Malformed service=replicas pair: {:?}",
                pair
            )));
        }
    }
    Ok(pairs)
}

/// Split a comma-separated list, trimming entries and dropping empty
/// fragments. The result never contains blank strings.
fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
