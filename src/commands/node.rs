//! `sugar node`: swarm node commands. Every mutation requires explicit
//! `--nodes` names.

use crate::backend::Backend;
use crate::cli::{NodesArg, OptionsArg};
use crate::commands::call_family;
use crate::errors::Result;
use crate::resolve::{resolve_nodes, split_options};

fn run(subcommand: &str, nodes: &NodesArg, options: &OptionsArg) -> Result<i32> {
    let names = resolve_nodes(&nodes.nodes)?;
    let opts = split_options(&options.options)?;
    call_family(&Backend::node(), subcommand, &[], &names, &opts, &[])
}

pub fn demote(nodes: &NodesArg, options: &OptionsArg) -> Result<i32> {
    run("demote", nodes, options)
}

pub fn inspect(nodes: &NodesArg, options: &OptionsArg) -> Result<i32> {
    run("inspect", nodes, options)
}

pub fn ls(options: &OptionsArg) -> Result<i32> {
    let opts = split_options(&options.options)?;
    Backend::node().invoke(Some("ls"), &opts, &[], &[])
}

pub fn promote(nodes: &NodesArg, options: &OptionsArg) -> Result<i32> {
    run("promote", nodes, options)
}

pub fn ps(nodes: &NodesArg, options: &OptionsArg) -> Result<i32> {
    run("ps", nodes, options)
}

pub fn rm(nodes: &NodesArg, options: &OptionsArg) -> Result<i32> {
    run("rm", nodes, options)
}

pub fn update(nodes: &NodesArg, options: &OptionsArg) -> Result<i32> {
    run("update", nodes, options)
}
