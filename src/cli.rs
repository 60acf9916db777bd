//! # `space` Command-Line Interface (CLI)

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "space-dns - gives a project's docker-compose services stable, collision-free hostnames"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bring the project's services up
    Up(UpArgs),
    /// Tear the project's services down
    Down(WorkdirArgs),
    /// List services with their URLs and state
    Ps(PsArgs),
    /// Manage the DNS daemon
    #[clap(subcommand)]
    Dns(DnsCommand),
    /// Manage the on-disk hook directory tree
    #[clap(subcommand)]
    Hooks(HooksCommand),
    /// Manage project configuration
    #[clap(subcommand)]
    Config(ConfigCommand),
    /// Run a command inside a running service container
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WorkdirArgs {
    /// Project root (defaults to the inferred project root)
    #[clap(short = 'w', long)]
    pub workdir: Option<PathBuf>,

    /// Specify log level
    #[clap(short = 'l', long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Args, Debug, Clone)]
pub struct UpArgs {
    /// Services to start (defaults to all services in the compose file)
    pub services: Vec<String>,

    #[clap(flatten)]
    pub workdir: WorkdirArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PsArgs {
    /// Render output as JSON
    #[clap(long, default_value_t = false)]
    pub json: bool,

    /// Show all containers, including stopped ones
    #[clap(long, default_value_t = false)]
    pub all: bool,

    /// Only display container IDs
    #[clap(short = 'q', long, default_value_t = false)]
    pub quiet: bool,

    /// Don't truncate output
    #[clap(long, default_value_t = false)]
    pub no_trunc: bool,

    /// Project root (defaults to the inferred project root)
    #[clap(short = 'w', long)]
    pub workdir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum DnsCommand {
    /// Report daemon status and registered records
    Status(JsonArgs),
    /// Start the DNS daemon
    Start(JsonArgs),
    /// Stop the DNS daemon
    Stop(JsonArgs),
    /// Restart the DNS daemon
    Restart(JsonArgs),
}

#[derive(Subcommand)]
pub enum HooksCommand {
    /// Scaffold the hook directory tree
    Init(JsonArgs),
    /// List hooks registered per event
    List(JsonArgs),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the merged project configuration
    Show(JsonArgs),
}

#[derive(Args, Debug, Clone)]
pub struct JsonArgs {
    /// Render output as JSON
    #[clap(long, default_value_t = false)]
    pub json: bool,

    /// Project root (defaults to the inferred project root)
    #[clap(short = 'w', long)]
    pub workdir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Service to run the command in
    pub service: String,

    /// Command and arguments to run (pass after `--`)
    #[clap(last = true, required = true)]
    pub cmd: Vec<String>,

    /// Project root (defaults to the inferred project root)
    #[clap(short = 'w', long)]
    pub workdir: Option<PathBuf>,
}

pub trait DefaultLogLevel {
    fn log_level(&self) -> &str;
}

impl DefaultLogLevel for Command {
    fn log_level(&self) -> &str {
        match self {
            Command::Up(args) => &args.workdir.log_level,
            Command::Down(args) => &args.log_level,
            _ => "warn",
        }
    }
}

pub trait CommandWithWorkdir {
    fn workdir(&self) -> Option<&PathBuf>;
}

impl CommandWithWorkdir for UpArgs {
    fn workdir(&self) -> Option<&PathBuf> {
        self.workdir.workdir.as_ref()
    }
}

impl CommandWithWorkdir for WorkdirArgs {
    fn workdir(&self) -> Option<&PathBuf> {
        self.workdir.as_ref()
    }
}

impl CommandWithWorkdir for PsArgs {
    fn workdir(&self) -> Option<&PathBuf> {
        self.workdir.as_ref()
    }
}

impl CommandWithWorkdir for JsonArgs {
    fn workdir(&self) -> Option<&PathBuf> {
        self.workdir.as_ref()
    }
}

impl CommandWithWorkdir for RunArgs {
    fn workdir(&self) -> Option<&PathBuf> {
        self.workdir.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_command_with_services() {
        let args = vec!["space", "up", "api", "db", "--workdir", "/tmp/proj"];
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Up(args) => {
                assert_eq!(args.services, vec!["api".to_string(), "db".to_string()]);
                assert_eq!(args.workdir(), Some(&PathBuf::from("/tmp/proj")));
            }
            _ => panic!("Unexpected command parsed"),
        }
    }

    #[test]
    fn test_down_command() {
        let args = vec!["space", "down"];
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Down(args) => assert_eq!(args.workdir(), None),
            _ => panic!("Unexpected command parsed"),
        }
    }

    #[test]
    fn test_ps_command_json_flag() {
        let args = vec!["space", "ps", "--json", "--all"];
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Ps(args) => {
                assert!(args.json);
                assert!(args.all);
                assert!(!args.quiet);
            }
            _ => panic!("Unexpected command parsed"),
        }
    }

    #[test]
    fn test_dns_status_command() {
        let args = vec!["space", "dns", "status", "--json"];
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Dns(DnsCommand::Status(args)) => assert!(args.json),
            _ => panic!("Unexpected command parsed"),
        }
    }

    #[test]
    fn test_hooks_list_command() {
        let args = vec!["space", "hooks", "list"];
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Hooks(HooksCommand::List(_)) => {}
            _ => panic!("Unexpected command parsed"),
        }
    }

    #[test]
    fn test_config_show_command() {
        let args = vec!["space", "config", "show", "--json"];
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Config(ConfigCommand::Show(args)) => assert!(args.json),
            _ => panic!("Unexpected command parsed"),
        }
    }

    #[test]
    fn test_run_command_passthrough() {
        let args = vec!["space", "run", "api", "--", "ls", "-la"];
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.service, "api");
                assert_eq!(args.cmd, vec!["ls".to_string(), "-la".to_string()]);
            }
            _ => panic!("Unexpected command parsed"),
        }
    }
}
