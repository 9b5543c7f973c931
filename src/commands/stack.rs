//! `sugar stack`: stack deployment and inspection.

use crate::backend::Backend;
use crate::cli::OptionsArg;
use crate::compose;
use crate::config::Profile;
use crate::errors::{Result, SugarError};
use crate::resolve::{split_options, MSG_ERROR_STACK_NAME};

fn require_stack(stack: &str) -> Result<()> {
    if stack.trim().is_empty() {
        return Err(SugarError::invalid_parameter(MSG_ERROR_STACK_NAME));
    }
    Ok(())
}

/// Deploy a stack: render the compose configuration for the active profile
/// (or an explicit `--file` override) and pipe it to `stack deploy -c -`.
pub fn deploy(profile: &Profile, stack: &str, file: &str, options: &OptionsArg) -> Result<i32> {
    require_stack(stack)?;

    let compose_files = if file.is_empty() {
        profile.config_path.files()
    } else {
        vec![file.to_string()]
    };
    let rendered = compose::render(
        &compose_files,
        profile.project_name.as_deref(),
        profile.env_file.as_deref(),
    )?;

    let opts = split_options(&options.options)?;
    Backend::stack(&["deploy", "-c", "-"]).invoke_with_stdin(
        &rendered,
        None,
        &opts,
        &[stack.to_string()],
        &[],
    )
}

/// List the tasks in the stack (`ls` is an alias of `ps`).
pub fn ps(stack: &str, quiet: bool, options: &OptionsArg) -> Result<i32> {
    require_stack(stack)?;
    let backend = if quiet {
        Backend::stack(&["ps", "--quiet"])
    } else {
        Backend::stack(&["ps"])
    };
    let opts = split_options(&options.options)?;
    backend.invoke(None, &opts, &[stack.to_string()], &[])
}

pub fn rm(stack: &str, options: &OptionsArg) -> Result<i32> {
    require_stack(stack)?;
    let opts = split_options(&options.options)?;
    Backend::stack(&["rm"]).invoke(None, &opts, &[stack.to_string()], &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_requires_stack_name() {
        let err = deploy(&Profile::default(), "", "", &OptionsArg::default()).unwrap_err();
        assert_eq!(err.to_string(), MSG_ERROR_STACK_NAME);
    }

    #[test]
    fn deploy_requires_a_compose_file_somewhere() {
        // Blank profile and no --file override: fails before spawning anything.
        let err = deploy(&Profile::default(), "demo", "", &OptionsArg::default()).unwrap_err();
        assert!(matches!(err, SugarError::InvalidParameter(_)));
    }

    #[test]
    fn ps_requires_stack_name() {
        let err = ps("", false, &OptionsArg::default()).unwrap_err();
        assert_eq!(err.to_string(), MSG_ERROR_STACK_NAME);
    }

    #[test]
    fn rm_requires_stack_name() {
        let err = rm("  ", &OptionsArg::default()).unwrap_err();
        assert_eq!(err.to_string(), MSG_ERROR_STACK_NAME);
    }
}
