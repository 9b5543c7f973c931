//! Sugar: a convenience layer over docker compose, swarm, stack and
//! service, with an Apple Container adapter and a terminal dashboard.
//!
//! This library exposes the core modules for use by the binary and by tests.

pub mod apple;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod compose;
pub mod config;
pub mod docker;
pub mod errors;
pub mod resolve;
pub mod tui;
