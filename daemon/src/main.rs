//! Lumeos daemon: runs contract requests against an LMDB environment.

mod outbox;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use lumeos_contract::{Action, Contract, ContractConfig, Request};
use lumeos_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use lumeos_types::AccountName;
use lumeos_utils::LogFormat;

#[derive(Parser)]
#[command(name = "lumeos-daemon", about = "Lumeos identity and poll contract host")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "LUMEOS_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "LUMEOS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "LUMEOS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "LUMEOS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Execute one action, e.g. '{"action":"getuser","account":"alice"}'.
    Exec {
        /// Principal the host authenticated for this invocation.
        #[arg(long)]
        principal: AccountName,
        /// The action as JSON.
        action: String,
    },
    /// Execute JSON-lines requests from a file, in order.
    Apply {
        file: PathBuf,
        /// Continue past failed requests instead of stopping at the first.
        #[arg(long)]
        keep_going: bool,
    },
    /// List polls carrying a tag.
    Search { tag: String },
    /// Show one account.
    Account { name: AccountName },
    /// Check the LMDB environment for corruption.
    Check,
    /// Print the effective configuration.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<ContractConfig> {
    let mut config = match &cli.config {
        Some(path) => ContractConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ContractConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn open_environment(config: &ContractConfig) -> anyhow::Result<LmdbEnvironment> {
    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn apply_file(
    contract: &Contract<LmdbEnvironment>,
    file: &Path,
    keep_going: bool,
) -> anyhow::Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let mut failed = 0usize;
    let mut executed = 0usize;
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        executed += 1;
        match contract.execute_json(line) {
            Ok(outcome) => println!("{}", serde_json::to_string(&outcome)?),
            Err(e) => {
                failed += 1;
                eprintln!("line {}: {} ({})", index + 1, e, e.kind());
                if !keep_going {
                    bail!("stopped at line {} after {executed} request(s)", index + 1);
                }
            }
        }
    }
    tracing::info!(executed, failed, "apply finished");
    if failed > 0 {
        bail!("{failed} of {executed} request(s) failed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    lumeos_utils::init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            return Ok(());
        }
        Command::Check => {
            let env = open_environment(&config)?;
            let report = check_integrity(&env)?;
            println!(
                "databases: {}, accounts: {}, polls: {}",
                report.databases_checked, report.accounts, report.polls
            );
            for error in &report.errors {
                println!("error: {error}");
            }
            if !report.is_healthy() {
                bail!("{} integrity error(s)", report.errors.len());
            }
            return Ok(());
        }
        _ => {}
    }

    let env = open_environment(&config)?;
    let (settlement, writer) = outbox::spawn_outbox(config.outbox_path());
    let contract = Contract::new(env, config.params.clone(), Arc::new(settlement));

    let result = match cli.command {
        Command::Exec { principal, action } => {
            let action: Action = serde_json::from_str(&action).context("parsing action")?;
            contract
                .execute(Request::new(principal, action))
                .map_err(|e| anyhow::anyhow!("{e} ({})", e.kind()))
                .and_then(|outcome| print_json(&outcome))
        }
        Command::Apply { file, keep_going } => apply_file(&contract, &file, keep_going),
        Command::Search { tag } => contract.polls().search(&tag).try_for_each(|poll| {
            println!("{}", serde_json::to_string(&poll?)?);
            Ok::<(), anyhow::Error>(())
        }),
        Command::Account { name } => contract
            .identity()
            .get(&name)
            .map_err(anyhow::Error::from)
            .and_then(|account| print_json(&account)),
        Command::Config | Command::Check => Ok(()),
    };

    // Dropping the contract closes the channel so the writer can drain.
    drop(contract);
    let written = writer.await.context("outbox writer panicked")??;
    tracing::debug!(written, "daemon exiting");
    result
}
