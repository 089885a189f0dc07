use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use tracing_subscriber::EnvFilter;

use azkaban_cli::{Azkaban, Config, SessionStore};

/// Azkaban - command line client for the Azkaban workflow scheduler
#[derive(Parser)]
#[command(name = "azkaban", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in to an Azkaban host and remember the session
    Login {
        /// Azkaban host (e.g. `https://azkaban.internal:8443`)
        #[arg(long)]
        host: Option<String>,
        /// User name
        #[arg(short, long)]
        user: Option<String>,
        /// Password; prompted for when omitted
        #[arg(short, long, env = "AZKABAN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the host of the stored session
    Whoami,
    /// Zip a project directory and upload it
    Upload {
        /// Project directory
        path: PathBuf,
        /// Project name (defaults to the directory name)
        #[arg(long)]
        project: Option<String>,
        /// Archive name without extension (defaults to the project name)
        #[arg(long)]
        zip_name: Option<String>,
    },
    /// Schedule a flow with a quartz cron expression
    Schedule {
        /// Project name
        project: String,
        /// Flow name
        flow: String,
        /// Quartz cron expression (e.g. "0 0 12 * * ?")
        cron: String,
    },
    /// Execute a flow now
    Execute {
        /// Project name
        project: String,
        /// Flow name
        flow: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        // The library has already logged the reason
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let store = SessionStore::new(&config.session_file);

    match cli.command {
        Command::Login {
            host,
            user,
            password,
        } => cmd_login(&config, &store, host, user, password),
        Command::Logout => {
            store.clear()?;
            tracing::info!("logged out");
            Ok(true)
        }
        Command::Whoami => {
            match store.load()? {
                Some(session) => println!("logged in to {}", session.host),
                None => println!("not logged in"),
            }
            Ok(true)
        }
        Command::Upload {
            path,
            project,
            zip_name,
        } => {
            let azkaban = client(&config, &store)?;
            Ok(azkaban
                .upload(&path, project.as_deref(), zip_name.as_deref())
                .is_ok())
        }
        Command::Schedule {
            project,
            flow,
            cron,
        } => {
            let azkaban = client(&config, &store)?;
            Ok(azkaban.schedule(&project, &flow, &cron).is_ok())
        }
        Command::Execute { project, flow } => {
            let azkaban = client(&config, &store)?;
            Ok(azkaban.execute(&project, &flow).is_ok())
        }
    }
}

/// Build a client carrying the stored session
fn client(config: &Config, store: &SessionStore) -> anyhow::Result<Azkaban> {
    let mut azkaban = Azkaban::new(&config.client)?.with_archive_dir(&config.archive_dir);
    azkaban.set_logged_session(store.load()?);
    Ok(azkaban)
}

/// Log in, prompting for anything not given on the command line or in config
fn cmd_login(
    config: &Config,
    store: &SessionStore,
    host: Option<String>,
    user: Option<String>,
    password: Option<String>,
) -> anyhow::Result<bool> {
    let host = match host.or_else(|| config.host.clone()) {
        Some(host) => host,
        None => Input::<String>::new().with_prompt("Host").interact_text()?,
    };
    let user = match user.or_else(|| config.user.clone()) {
        Some(user) => user,
        None => Input::<String>::new().with_prompt("User").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let mut azkaban = Azkaban::new(&config.client)?;
    if azkaban.login(&host, &user, &password).is_err() {
        return Ok(false);
    }

    if let Some(session) = azkaban.get_logged_session() {
        store.save(session)?;
    }
    Ok(true)
}
