//! `sugar swarm`: cluster-level commands.

use crate::backend::Backend;
use crate::cli::{OptionsArg, ServicesArg, UpdateFlags};
use crate::commands::{call_family, update_flag_tokens};
use crate::errors::Result;
use crate::resolve::{resolve_services, split_options};

pub fn init(options: &OptionsArg) -> Result<i32> {
    let opts = split_options(&options.options)?;
    Backend::swarm().invoke(Some("init"), &opts, &[], &[])
}

pub fn join(options: &OptionsArg) -> Result<i32> {
    let opts = split_options(&options.options)?;
    Backend::swarm().invoke(Some("join"), &opts, &[], &[])
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
    call_family(&Backend::swarm(), "update", &names, &[], &opts, &[])
}
