use clap::Parser;
use space_dns::cli::{Cli, Command, ConfigCommand, DefaultLogLevel, DnsCommand, HooksCommand};
use space_dns::config::ProjectConfig;
use space_dns::daemon::supervisor::FOREGROUND_DAEMON_FLAG;
use space_dns::daemon::{DaemonState, DaemonSupervisor};
use space_dns::docker::manager::DockerManager;
use space_dns::error::{self, ExitCode, SpaceError};
use space_dns::naming::hash;
use space_dns::orchestrator::{self, Orchestrator};
use space_dns::{dns, docker, hooks, output};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let mut raw_args = std::env::args();
    let exe = raw_args.next().unwrap_or_default();
    let rest: Vec<String> = raw_args.collect();

    if rest.first().map(String::as_str) == Some(FOREGROUND_DAEMON_FLAG) {
        run_foreground_daemon(&rest[1..]);
        return;
    }

    let cli = Cli::parse_from(std::iter::once(exe).chain(rest));
    init_logging(cli.command.log_level());

    let exit_code = match dispatch(cli.command) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            let rendered = output::Error {
                error_message: e.to_string(),
            };
            eprintln!("{rendered}");
            ExitCode::from(&e)
        }
    };
    process::exit(exit_code as i32);
}

fn init_logging(level: &str) {
    env_logger::Builder::new()
        .parse_filters(level)
        .format_timestamp_secs()
        .init();
}

fn dispatch(command: Command) -> error::Result<()> {
    match command {
        Command::Up(args) => {
            let work_dir = resolve_workdir(args.workdir.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let orchestrator = Orchestrator::new(config, &work_dir);
            let outcome = orchestrator.up(&args.services)?;
            println!(
                "{}",
                output::ps::List {
                    project_name: outcome.project_name,
                    services: outcome.services,
                }
            );
            Ok(())
        }
        Command::Down(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let orchestrator = Orchestrator::new(config, &work_dir);
            orchestrator.down()
        }
        Command::Ps(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let orchestrator = Orchestrator::new(config, &work_dir);
            let listing = ps(&orchestrator, args.all)?;
            if args.quiet && !args.json {
                for service in &listing.services {
                    println!("{}", service.container_name);
                }
            } else {
                println!("{listing}");
            }
            Ok(())
        }
        Command::Dns(cmd) => dispatch_dns(cmd),
        Command::Hooks(cmd) => dispatch_hooks(cmd),
        Command::Config(cmd) => dispatch_config(cmd),
        Command::Run(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let orchestrator = Orchestrator::new(config, &work_dir);
            let docker = DockerManager::new(orchestrator.config.compose_files.clone(), &orchestrator.project_name);
            let cmd_refs: Vec<&str> = args.cmd.iter().map(String::as_str).collect();
            let output = docker.exec(&args.service, &cmd_refs).map_err(SpaceError::Compose)?;
            print!("{}", String::from_utf8_lossy(&output.stdout));
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
            if !output.status.success() {
                return Err(SpaceError::Compose(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "command exited non-zero",
                )));
            }
            Ok(())
        }
    }
}

/// Resolve `-w/--workdir` (or the process's own cwd when absent) to an
/// absolute path. A relative `-w` must not survive as-is: it would hash
/// differently for two invocations from different `$PWD`s even when they
/// name the same directory (§4.1, §8 determinism invariant).
fn resolve_workdir(workdir: Option<&Path>) -> error::Result<PathBuf> {
    let current_dir = || {
        std::env::current_dir().map_err(|e| SpaceError::Config(format!("failed to read current directory: {e}")))
    };
    match workdir {
        Some(dir) if dir.is_absolute() => Ok(dir.to_path_buf()),
        Some(dir) => Ok(current_dir()?.join(dir)),
        None => current_dir(),
    }
}

/// Build a `ps` listing: running (or all) containers for the project,
/// annotated with the URL a caller would actually use — the hashed DNS
/// name if a daemon owns this project, else a localhost URL.
fn ps(orchestrator: &Orchestrator, all: bool) -> error::Result<output::ps::List> {
    let docker = DockerManager::new(orchestrator.config.compose_files.clone(), &orchestrator.project_name);
    let filter = if all { None } else { Some(docker::manager::ContainerState::Running) };
    let containers = docker.compose_ps(filter).map_err(SpaceError::Compose)?;

    let dns_active = DaemonSupervisor::new()
        .load()
        .map(|state| state.project_name == orchestrator.project_name)
        .unwrap_or(false);

    let services = containers
        .into_iter()
        .map(|container| {
            let url = if dns_active {
                let dns_name = hash::compose(&container.service, &orchestrator.work_dir, &orchestrator.config.base_domain);
                format!("http://{dns_name}")
            } else {
                match container.publishers.first() {
                    Some(publisher) => format!("http://localhost:{}", publisher.published_port),
                    None => "http://localhost".to_string(),
                }
            };
            orchestrator::up::ServiceStatus {
                service: container.service,
                container_name: container.name,
                state: container.state.to_string(),
                url,
            }
        })
        .collect();

    Ok(output::ps::List {
        project_name: orchestrator.project_name.clone(),
        services,
    })
}

fn dispatch_dns(cmd: DnsCommand) -> error::Result<()> {
    match cmd {
        DnsCommand::Status(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let orchestrator = Orchestrator::new(config, &work_dir);
            println!("{}", dns_status(&orchestrator)?);
            Ok(())
        }
        DnsCommand::Start(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let orchestrator = Orchestrator::new(config, &work_dir);
            let supervisor = DaemonSupervisor::new();
            if supervisor.is_running() {
                return Err(SpaceError::DaemonStart("DNS daemon is already running".to_string()));
            }
            start_daemon(&supervisor, &orchestrator)
        }
        DnsCommand::Stop(_args) => {
            let supervisor = DaemonSupervisor::new();
            let stopped = supervisor.is_running();
            supervisor.stop().map_err(SpaceError::Compose)?;
            println!("{}", output::dns::Stop { stopped });
            Ok(())
        }
        DnsCommand::Restart(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let orchestrator = Orchestrator::new(config, &work_dir);
            let supervisor = DaemonSupervisor::new();
            supervisor.stop().map_err(SpaceError::Compose)?;
            start_daemon(&supervisor, &orchestrator)
        }
    }
}

fn start_daemon(supervisor: &DaemonSupervisor, orchestrator: &Orchestrator) -> error::Result<()> {
    supervisor
        .spawn(
            &orchestrator.project_name,
            &orchestrator.config.base_domain,
            &orchestrator.config.upstream_dns.to_string(),
            &orchestrator.config.dns_port_candidates,
        )
        .map_err(|e| SpaceError::DaemonStart(e.to_string()))?;
    let listen_address = supervisor
        .load()
        .map(|s| s.listen_address)
        .ok_or_else(|| SpaceError::DaemonStart("daemon state missing after spawn".to_string()))?;
    println!("{}", output::dns::Start { listen_address });
    Ok(())
}

fn dns_status(orchestrator: &Orchestrator) -> error::Result<output::dns::Status> {
    let state = DaemonSupervisor::new().load();
    let running = state.is_some();
    let listen_address = state.as_ref().map(|s| s.listen_address);
    let project_name = state.as_ref().map(|s| s.project_name.clone());
    let resolver_configured = dns::resolver_install::is_configured(&orchestrator.config.base_domain);

    let docker = DockerManager::new(orchestrator.config.compose_files.clone(), &orchestrator.project_name);
    let containers = docker
        .compose_ps(Some(docker::manager::ContainerState::Running))
        .map_err(SpaceError::Compose)?;
    let records = containers
        .into_iter()
        .map(|container| output::dns::Record {
            hostname: hash::compose(&container.service, &orchestrator.work_dir, &orchestrator.config.base_domain),
            service: container.service,
        })
        .collect();

    Ok(output::dns::Status {
        running,
        listen_address,
        project_name,
        base_domain: orchestrator.config.base_domain.clone(),
        resolver_configured,
        records,
    })
}

fn dispatch_hooks(cmd: HooksCommand) -> error::Result<()> {
    match cmd {
        HooksCommand::Init(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let hooks_dir = work_dir.join(&config.hooks_dir);
            for event in ["pre-up", "post-up", "pre-down", "post-down", "on-dns-ready"] {
                std::fs::create_dir_all(hooks_dir.join(event))
                    .map_err(|e| SpaceError::Config(format!("failed to create hook directory: {e}")))?;
            }
            println!("initialized hook directories under {}", hooks_dir.display());
            Ok(())
        }
        HooksCommand::List(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let hooks_dir = work_dir.join(&config.hooks_dir);
            let events = hooks::runner::list_hooks(&hooks_dir).map_err(SpaceError::Compose)?;
            println!("{}", output::hooks::List { events });
            Ok(())
        }
    }
}

fn dispatch_config(cmd: ConfigCommand) -> error::Result<()> {
    match cmd {
        ConfigCommand::Show(args) => {
            let work_dir = resolve_workdir(args.workdir.as_deref())?;
            let config = ProjectConfig::load(&work_dir)?;
            let orchestrator = Orchestrator::new(config, &work_dir);
            println!(
                "{}",
                output::config::Show {
                    project_name: orchestrator.project_name,
                    config: orchestrator.config,
                }
            );
            Ok(())
        }
    }
}

/// Entry point for the re-exec'd, detached copy of this binary (§4.6).
/// Binds the DNS responder, writes the daemon state file, then blocks
/// forever — this process isn't a child of the `up` command that spawned
/// it, so it lives until something external kills it (§9: owner-pid is
/// advisory only, `stop` only relinquishes the state-file claim).
fn run_foreground_daemon(args: &[String]) {
    init_logging("info");

    let (project_name, base_domain, upstream_dns, port_candidates_csv) = match args {
        [a, b, c, d] => (a, b, c, d),
        _ => {
            log::error!("foreground daemon invoked with unexpected arguments: {args:?}");
            process::exit(ExitCode::ConfigFailure as i32);
        }
    };

    let upstream_dns: std::net::SocketAddr = match upstream_dns.parse() {
        Ok(addr) => addr,
        Err(e) => {
            log::error!("invalid upstream DNS address {upstream_dns}: {e}");
            process::exit(ExitCode::ConfigFailure as i32);
        }
    };
    let port_candidates: Vec<u16> = port_candidates_csv.split(',').filter_map(|p| p.parse().ok()).collect();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to start tokio runtime: {e}");
            process::exit(ExitCode::ComposeFailure as i32);
        }
    };

    runtime.block_on(async {
        let docker = DockerManager::new(Vec::new(), project_name);
        let responder = match dns::DnsResponder::start(base_domain, project_name, docker, upstream_dns, &port_candidates).await {
            Ok(responder) => responder,
            Err(e) => {
                log::error!("DNS responder failed to start: {e}");
                process::exit(ExitCode::ComposeFailure as i32);
            }
        };

        if let Err(e) = dns::resolver_install::install(base_domain, responder.listen_address) {
            log::warn!("failed to install resolver file for {base_domain}: {e}");
        }

        let state = DaemonState::new(responder.listen_address, project_name);
        let supervisor = DaemonSupervisor::new();
        if let Err(e) = supervisor.save(&state) {
            log::error!("failed to write daemon state file: {e}");
            process::exit(ExitCode::ComposeFailure as i32);
        }

        log::info!("space-dns daemon listening on {} for {base_domain}", responder.listen_address);
        std::future::pending::<()>().await;
    });
}
