//! `sugar service`: swarm service commands, including the rollback
//! coordinator.

use crate::backend::{stack_services, Backend};
use crate::cli::{OptionsArg, ServicesArg, UpdateFlags};
use crate::commands::{call_family, update_flag_tokens};
use crate::errors::{Result, SugarError};
use crate::resolve::{parse_scale_pairs, prepend_stack_name, resolve_services, split_options};

pub fn create(options: &OptionsArg) -> Result<i32> {
    if options.options.trim().is_empty() {
        return Err(SugarError::invalid_parameter(
            "Options must be provided for \"create\". Include --name, image, etc. inside --options.",
        ));
    }
    let opts = split_options(&options.options)?;
    Backend::service().invoke(Some("create"), &opts, &[], &[])
}

pub fn inspect(services: &ServicesArg, options: &OptionsArg) -> Result<i32> {
    let names = resolve_services(&services.services)?;
    let opts = split_options(&options.options)?;
    call_family(&Backend::service(), "inspect", &names, &[], &opts, &[])
}

#[allow(clippy::too_many_arguments)]
pub fn logs(
    services: &ServicesArg,
    stack: &str,
    details: bool,
    follow: bool,
    no_resolve: bool,
    no_task_ids: bool,
    no_trunc: bool,
    raw: bool,
    since: &str,
    tail: &str,
    timestamps: bool,
    options: &OptionsArg,
) -> Result<i32> {
    let names = prepend_stack_name(stack, resolve_services(&services.services)?);

    let mut opts = split_options(&options.options)?;
    for (flag, enabled) in [
        ("--details", details),
        ("--follow", follow),
        ("--no-resolve", no_resolve),
        ("--no-task-ids", no_task_ids),
        ("--no-trunc", no_trunc),
        ("--raw", raw),
        ("--timestamps", timestamps),
    ] {
        if enabled {
            opts.push(flag.to_string());
        }
    }
    if !since.is_empty() {
        opts.push("--since".to_string());
        opts.push(since.to_string());
    }
    if !tail.is_empty() {
        opts.push("--tail".to_string());
        opts.push(tail.to_string());
    }

    call_family(&Backend::service(), "logs", &names, &[], &opts, &[])
}

pub fn ls(options: &OptionsArg) -> Result<i32> {
    let opts = split_options(&options.options)?;
    Backend::service().invoke(Some("ls"), &opts, &[], &[])
}

pub fn ps(services: &ServicesArg, options: &OptionsArg) -> Result<i32> {
    let names = resolve_services(&services.services)?;
    let opts = split_options(&options.options)?;
    call_family(&Backend::service(), "ps", &names, &[], &opts, &[])
}

pub fn rm(services: &ServicesArg, options: &OptionsArg) -> Result<i32> {
    let names = resolve_services(&services.services)?;
    let opts = split_options(&options.options)?;
    call_family(&Backend::service(), "rm", &names, &[], &opts, &[])
}

pub fn scale(stack: &str, replicas: &str, options: &OptionsArg) -> Result<i32> {
    let pairs = prepend_stack_name(stack, parse_scale_pairs(replicas)?);
    let opts = split_options(&options.options)?;
    call_family(&Backend::service(), "scale", &pairs, &[], &opts, &[])
}

pub fn update(services: &ServicesArg, flags: &UpdateFlags, options: &OptionsArg) -> Result<i32> {
    let names = resolve_services(&services.services)?;
    let opts = update_flag_tokens(
        split_options(&options.options)?,
        flags.detach,
        flags.quiet,
        flags.force,
        flags.rollback,
        &flags.image,
        &flags.replicas,
        &flags.env_add,
        &flags.label_add,
    );
    call_family(&Backend::service(), "update", &names, &[], &opts, &[])
}

pub fn rollback(
    services: &ServicesArg,
    stack: &str,
    detach: bool,
    quiet: bool,
    options: &OptionsArg,
) -> Result<i32> {
    let mut opts = split_options(&options.options)?;
    if detach {
        opts.push("--detach".to_string());
    }
    if quiet {
        opts.push("--quiet".to_string());
    }

    // Whole-stack rollback discovers members via `stack services`; explicit
    // names only get the stack prefix applied.
    let targets = if !stack.is_empty() {
        if services.all || services.services.trim().is_empty() {
            stack_services(stack)?
        } else {
            prepend_stack_name(stack, resolve_services(&services.services)?)
        }
    } else {
        resolve_services(&services.services)?
    };

    let backend = Backend::service();
    let (ok, bad) = rollback_all(&targets, |svc| rollback_service(&backend, svc, &opts))?;
    Ok(if ok > 0 || bad == 0 { 0 } else { 1 })
}

/// Outcome of one per-service rollback attempt, classified from the engine's
/// stderr. The engine reports rollback failure via stderr wording rather than
/// exit code, so this is a case-sensitive substring match by necessity.
#[derive(Debug, PartialEq, Eq)]
pub enum RollbackOutcome {
    Success,
    NoPreviousSpec,
    Failed(String),
}

pub fn classify_rollback(stderr: &str) -> RollbackOutcome {
    if stderr.contains("does not have a previous spec") {
        RollbackOutcome::NoPreviousSpec
    } else if !stderr.trim().is_empty() {
        RollbackOutcome::Failed(stderr.trim().to_string())
    } else {
        RollbackOutcome::Success
    }
}

/// One rollback invocation against the engine, classified from the captured
/// stderr. Exit code 1 is tolerated: the engine uses it for per-service
/// failures that the stderr text already describes.
fn rollback_service(backend: &Backend, svc: &str, opts: &[String]) -> Result<RollbackOutcome> {
    let (_, stderr) =
        backend.capture_lenient(Some("rollback"), opts, &[svc.to_string()], &[0, 1])?;
    Ok(classify_rollback(&stderr))
}

/// Roll back each target in turn, tolerating per-service failures, and print
/// a one-line tally. Always processes the full target list. The per-service
/// call is injected so the aggregation can be exercised without an engine.
pub fn rollback_all<F>(targets: &[String], mut rollback_one: F) -> Result<(u32, u32)>
where
    F: FnMut(&str) -> Result<RollbackOutcome>,
{
    if targets.is_empty() {
        tracing::warn!("No services specified for rollback");
        return Ok((0, 0));
    }

    let mut ok = 0u32;
    let mut bad = 0u32;
    for svc in targets {
        match rollback_one(svc) {
            Ok(RollbackOutcome::Success) => {
                println!("Successfully rolled back service {}", svc);
                ok += 1;
            }
            Ok(RollbackOutcome::NoPreviousSpec) => {
                tracing::warn!("Service {} has no previous version to rollback to", svc);
                bad += 1;
            }
            Ok(RollbackOutcome::Failed(err)) => {
                tracing::warn!("Failed to rollback service {}: {}", svc, err);
                bad += 1;
            }
            Err(e) => {
                tracing::warn!("Error rolling back service {}: {}", svc, e);
                bad += 1;
            }
        }
    }
    println!("Rollback complete: {} succeeded, {} failed", ok, bad);
    Ok((ok, bad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_empty_stderr_as_success() {
        assert_eq!(classify_rollback(""), RollbackOutcome::Success);
        assert_eq!(classify_rollback("  \n"), RollbackOutcome::Success);
    }

    #[test]
    fn classify_no_previous_spec_as_soft_failure() {
        let stderr = "rollback failed: service demo_web does not have a previous spec\n";
        assert_eq!(classify_rollback(stderr), RollbackOutcome::NoPreviousSpec);
    }

    #[test]
    fn classify_other_stderr_as_failure_with_trimmed_text() {
        let stderr = "  something went wrong  \n";
        assert_eq!(
            classify_rollback(stderr),
            RollbackOutcome::Failed("something went wrong".to_string())
        );
    }

    #[test]
    fn classification_is_case_sensitive() {
        // Upstream wording is matched verbatim; a different casing is an
        // ordinary failure.
        let stderr = "Does Not Have A Previous Spec";
        assert!(matches!(classify_rollback(stderr), RollbackOutcome::Failed(_)));
    }

    #[test]
    fn rollback_all_short_circuits_on_empty_targets() {
        let (ok, bad) = rollback_all(&[], |_| Ok(RollbackOutcome::Success)).unwrap();
        assert_eq!((ok, bad), (0, 0));
    }

    #[test]
    fn rollback_all_tallies_mixed_outcomes() {
        let targets: Vec<String> = ["demo_web", "demo_api", "demo_worker"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut calls = Vec::new();
        let (ok, bad) = rollback_all(&targets, |svc| {
            calls.push(svc.to_string());
            Ok(match svc {
                "demo_api" => classify_rollback(
                    "rollback failed: service demo_api does not have a previous spec",
                ),
                _ => classify_rollback(""),
            })
        })
        .unwrap();
        assert_eq!((ok, bad), (2, 1));
        assert_eq!(calls, targets, "every target is attempted exactly once");
    }

    #[test]
    fn rollback_all_continues_past_invocation_errors() {
        let targets: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let (ok, bad) = rollback_all(&targets, |svc| {
            if svc == "a" {
                Err(SugarError::command_error("spawn failed"))
            } else {
                Ok(RollbackOutcome::Success)
            }
        })
        .unwrap();
        assert_eq!((ok, bad), (2, 1));
    }

    #[test]
    fn create_requires_options() {
        let err = create(&OptionsArg { options: "  ".to_string() }).unwrap_err();
        assert!(matches!(err, SugarError::InvalidParameter(_)));
    }

    #[test]
    fn targeted_commands_reject_blank_services_before_spawning() {
        let services = ServicesArg::default();
        let options = OptionsArg::default();
        for result in [
            inspect(&services, &options),
            ps(&services, &options),
            rm(&services, &options),
            update(&services, &UpdateFlags::default(), &options),
            logs(&services, "", false, false, false, false, false, false, "", "", false, &options),
        ] {
            let err = result.unwrap_err();
            assert!(matches!(err, SugarError::InvalidParameter(_)));
            assert_eq!(err.to_string(), crate::resolve::MSG_ERROR_SERVICES_NAME);
        }
    }

    #[test]
    fn rollback_without_stack_requires_services() {
        let err = rollback(&ServicesArg::default(), "", false, false, &OptionsArg::default())
            .unwrap_err();
        assert_eq!(err.to_string(), crate::resolve::MSG_ERROR_SERVICES_NAME);
    }

    #[test]
    fn scale_prefixes_pairs_with_stack_name() {
        // The pure resolution path of the end-to-end scale contract.
        let pairs = prepend_stack_name("demo", parse_scale_pairs("web=3,worker=5").unwrap());
        assert_eq!(pairs, vec!["demo_web=3", "demo_worker=5"]);
    }

    #[test]
    fn scale_rejects_missing_replicas() {
        let err = scale("demo", "", &OptionsArg::default()).unwrap_err();
        assert!(matches!(err, SugarError::InvalidParameter(_)));
    }
}
