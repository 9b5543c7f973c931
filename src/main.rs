use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sugar::apple::AppleContainer;
use sugar::cli::{Cli, Command, NodeCommand, ServiceCommand, StackCommand, SwarmCommand};
use sugar::commands::{node, service, stack, swarm};
use sugar::config::SugarConfig;
use sugar::errors::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "sugar=debug" } else { "sugar=info" };
    let env_filter = EnvFilter::try_from_env("SUGAR_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            eprintln!("sugar: {}", e);
            ExitCode::from(e.exit_code().clamp(0, 255) as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Command::Swarm(cmd) => match cmd {
            SwarmCommand::Init { options } => swarm::init(options),
            SwarmCommand::Join { options } => swarm::join(options),
            SwarmCommand::Update { services, flags, options } => {
                swarm::update(services, flags, options)
            }
        },

        Command::Service(cmd) => match cmd {
            ServiceCommand::Create { options } => service::create(options),
            ServiceCommand::Inspect { services, options } => service::inspect(services, options),
            ServiceCommand::Logs {
                services,
                stack,
                details,
                follow,
                no_resolve,
                no_task_ids,
                no_trunc,
                raw,
                since,
                tail,
                timestamps,
                options,
            } => service::logs(
                services, stack, *details, *follow, *no_resolve, *no_task_ids, *no_trunc, *raw,
                since, tail, *timestamps, options,
            ),
            ServiceCommand::Ls { options } => service::ls(options),
            ServiceCommand::Ps { services, options } => service::ps(services, options),
            ServiceCommand::Rm { services, options } => service::rm(services, options),
            ServiceCommand::Rollback { services, stack, detach, quiet, options } => {
                service::rollback(services, stack, *detach, *quiet, options)
            }
            ServiceCommand::Scale { stack, replicas, options } => {
                service::scale(stack, replicas, options)
            }
            ServiceCommand::Update { services, flags, options } => {
                service::update(services, flags, options)
            }
        },

        Command::Stack(cmd) => match cmd {
            StackCommand::Deploy { stack: name, file, options } => {
                let config = SugarConfig::load(Path::new(&cli.config))?;
                let (profile_name, profile) = config.select_profile(cli.profile.as_deref());
                tracing::debug!(profile = %profile_name, "deploying with profile");
                stack::deploy(&profile, name, file, options)
            }
            StackCommand::Ls { stack: name, quiet, options }
            | StackCommand::Ps { stack: name, quiet, options } => {
                stack::ps(name, *quiet, options)
            }
            StackCommand::Rm { stack: name, options } => stack::rm(name, options),
        },

        Command::Node(cmd) => match cmd {
            NodeCommand::Demote { nodes, options } => node::demote(nodes, options),
            NodeCommand::Inspect { nodes, options } => node::inspect(nodes, options),
            NodeCommand::Ls { options } => node::ls(options),
            NodeCommand::Promote { nodes, options } => node::promote(nodes, options),
            NodeCommand::Ps { nodes, options } => node::ps(nodes, options),
            NodeCommand::Rm { nodes, options } => node::rm(nodes, options),
            NodeCommand::Update { nodes, options } => node::update(nodes, options),
        },

        Command::Container(args) => {
            let services: Vec<String> = args
                .services
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            let mut adapter = if args.dummy {
                AppleContainer::with_dummy(&args.state_file)
            } else {
                AppleContainer::new()
            };
            adapter.execute(&args.command, &services, &args.extra)
        }

        Command::Ui => {
            let config = SugarConfig::load(Path::new(&cli.config))?;
            sugar::tui::run(config)
        }
    }
}
