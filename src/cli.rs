//! Command-line surface. Each subcommand family maps 1:1 onto an engine CLI
//! family; per-command flags are translated into backend flag tokens by the
//! `commands` module.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sugar", version, about = "Sugar for container engines")]
pub struct Cli {
    /// Path to the sugar configuration file.
    #[arg(long, global = true, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Profile name of the services you want to use.
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Show the commands being executed.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the swarm (docker swarm).
    #[command(subcommand)]
    Swarm(SwarmCommand),

    /// Manage swarm services (docker service).
    #[command(subcommand)]
    Service(ServiceCommand),

    /// Manage swarm stacks (docker stack).
    #[command(subcommand)]
    Stack(StackCommand),

    /// Manage swarm nodes (docker node).
    #[command(subcommand)]
    Node(NodeCommand),

    /// Run a command against the Apple Container runtime.
    Container(ContainerArgs),

    /// Open the terminal dashboard.
    Ui,
}

/// Raw passthrough options for the backend command,
/// e.g. `--options "--advertise-addr 192.168.1.1"`.
#[derive(Debug, Default, Args)]
pub struct OptionsArg {
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub options: String,
}

/// Services selected by comma-separated names.
#[derive(Debug, Default, Args)]
pub struct ServicesArg {
    /// Set the services separated by comma for the swarm command.
    #[arg(long, default_value = "")]
    pub services: String,

    /// Use all services for the command.
    #[arg(long)]
    pub all: bool,
}

/// Nodes selected by comma-separated names.
#[derive(Debug, Default, Args)]
pub struct NodesArg {
    /// Set the nodes separated by comma for the swarm command.
    #[arg(long, default_value = "")]
    pub nodes: String,
}

/// Flags shared by `swarm update` and `service update`.
#[derive(Debug, Default, Args)]
pub struct UpdateFlags {
    /// Exit immediately instead of waiting for the service to converge.
    #[arg(long)]
    pub detach: bool,

    /// Suppress progress output.
    #[arg(long)]
    pub quiet: bool,

    /// Service image tag.
    #[arg(long, default_value = "")]
    pub image: String,

    /// Number of tasks.
    #[arg(long, default_value = "")]
    pub replicas: String,

    /// Force update even if no changes require it.
    #[arg(long)]
    pub force: bool,

    /// Rollback to previous specification.
    #[arg(long)]
    pub rollback: bool,

    /// Add/update env vars (comma-separated NAME=VALUE list).
    #[arg(long, default_value = "")]
    pub env_add: String,

    /// Add/update service labels (comma-separated key=value list).
    #[arg(long, default_value = "")]
    pub label_add: String,
}

#[derive(Debug, Subcommand)]
pub enum SwarmCommand {
    /// Initialize a swarm on the current engine.
    Init {
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Join a swarm as a node and/or manager.
    Join {
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Update services (docker service update).
    Update {
        #[command(flatten)]
        services: ServicesArg,
        #[command(flatten)]
        flags: UpdateFlags,
        #[command(flatten)]
        options: OptionsArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum ServiceCommand {
    /// Create a new service (use --options for all parameters).
    Create {
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Display detailed information on one or more services.
    Inspect {
        #[command(flatten)]
        services: ServicesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Fetch the logs of a service or task.
    Logs {
        #[command(flatten)]
        services: ServicesArg,
        /// Name of the stack the services belong to.
        #[arg(long, default_value = "")]
        stack: String,
        /// Show extra details provided to logs.
        #[arg(long)]
        details: bool,
        /// Follow log output.
        #[arg(long)]
        follow: bool,
        /// Do not map IDs to Names in output.
        #[arg(long)]
        no_resolve: bool,
        /// Do not include task IDs in output.
        #[arg(long)]
        no_task_ids: bool,
        /// Do not truncate output.
        #[arg(long)]
        no_trunc: bool,
        /// Do not neatly format logs.
        #[arg(long)]
        raw: bool,
        /// Show logs since timestamp or relative time (e.g. 42m).
        #[arg(long, default_value = "")]
        since: String,
        /// Number of lines to show from the end of the logs.
        #[arg(long, default_value = "")]
        tail: String,
        /// Show timestamps.
        #[arg(long)]
        timestamps: bool,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// List services.
    Ls {
        #[command(flatten)]
        options: OptionsArg,
    },
    /// List the tasks of one or more services.
    Ps {
        #[command(flatten)]
        services: ServicesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Remove one or more services.
    Rm {
        #[command(flatten)]
        services: ServicesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Revert services to their previous configuration.
    Rollback {
        #[command(flatten)]
        services: ServicesArg,
        /// Name of the stack whose services should be rolled back.
        #[arg(long, default_value = "")]
        stack: String,
        /// Exit immediately instead of waiting for the service to converge.
        #[arg(long)]
        detach: bool,
        /// Suppress progress output.
        #[arg(long)]
        quiet: bool,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Scale one or multiple replicated services.
    Scale {
        /// Name of the stack to scale.
        #[arg(long, default_value = "")]
        stack: String,
        /// Replicas per service (comma-separated service=replicas pairs).
        #[arg(long, default_value = "")]
        replicas: String,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Update services (docker service update).
    Update {
        #[command(flatten)]
        services: ServicesArg,
        #[command(flatten)]
        flags: UpdateFlags,
        #[command(flatten)]
        options: OptionsArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum StackCommand {
    /// Deploy a stack from the rendered compose configuration.
    Deploy {
        /// Name of the stack to deploy.
        #[arg(long, default_value = "")]
        stack: String,
        /// Path to a compose file (overrides the one from the profile).
        #[arg(long, default_value = "")]
        file: String,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// List the tasks in the stack.
    Ls {
        /// Name of the stack to inspect.
        #[arg(long, default_value = "")]
        stack: String,
        /// Only display IDs.
        #[arg(long)]
        quiet: bool,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// List the tasks in the stack.
    Ps {
        /// Name of the stack to inspect.
        #[arg(long, default_value = "")]
        stack: String,
        /// Only display IDs.
        #[arg(long)]
        quiet: bool,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Remove the stack from the swarm.
    Rm {
        /// Name of the stack to remove.
        #[arg(long, default_value = "")]
        stack: String,
        #[command(flatten)]
        options: OptionsArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum NodeCommand {
    /// Demote one or more nodes from manager in the swarm.
    Demote {
        #[command(flatten)]
        nodes: NodesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Display detailed information on one or more nodes.
    Inspect {
        #[command(flatten)]
        nodes: NodesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// List nodes in the swarm.
    Ls {
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Promote one or more nodes to manager in the swarm.
    Promote {
        #[command(flatten)]
        nodes: NodesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// List tasks running on one or more nodes.
    Ps {
        #[command(flatten)]
        nodes: NodesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Remove one or more nodes from the swarm.
    Rm {
        #[command(flatten)]
        nodes: NodesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
    /// Update a node.
    Update {
        #[command(flatten)]
        nodes: NodesArg,
        #[command(flatten)]
        options: OptionsArg,
    },
}

#[derive(Debug, Args)]
pub struct ContainerArgs {
    /// Container runtime command (build, up, down, ps, ...).
    pub command: String,

    /// Set the services separated by comma for the command.
    #[arg(long, default_value = "")]
    pub services: String,

    /// Use the JSON-backed dummy runtime instead of the real binary.
    #[arg(long)]
    pub dummy: bool,

    /// State file for the dummy runtime.
    #[arg(long, default_value = crate::apple::dummy::DEFAULT_STATE_FILE)]
    pub state_file: String,

    /// Extra arguments passed through to the runtime.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_service_scale_with_stack() {
        let cli = Cli::parse_from([
            "sugar", "service", "scale", "--stack", "demo", "--replicas", "web=3,worker=5",
        ]);
        match cli.command {
            Command::Service(ServiceCommand::Scale { stack, replicas, .. }) => {
                assert_eq!(stack, "demo");
                assert_eq!(replicas, "web=3,worker=5");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_swarm_init_with_quoted_options() {
        let cli = Cli::parse_from([
            "sugar", "swarm", "init", "--options", "--advertise-addr 192.168.1.1",
        ]);
        match cli.command {
            Command::Swarm(SwarmCommand::Init { options }) => {
                assert_eq!(options.options, "--advertise-addr 192.168.1.1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_container_with_trailing_args() {
        let cli = Cli::parse_from([
            "sugar", "container", "exec", "--services", "web", "--", "sh", "-c", "ls",
        ]);
        match cli.command {
            Command::Container(args) => {
                assert_eq!(args.command, "exec");
                assert_eq!(args.services, "web");
                assert_eq!(args.extra, vec!["sh", "-c", "ls"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_profile_flag_is_accepted_anywhere() {
        let cli = Cli::parse_from(["sugar", "stack", "ps", "--stack", "demo", "--profile", "dev"]);
        assert_eq!(cli.profile.as_deref(), Some("dev"));
    }
}
