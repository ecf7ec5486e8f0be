// kir - reconcile scraped competition results against the KIR school registry

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use kir_recon::ReconError;

#[derive(Parser)]
#[command(name = "kir")]
#[command(about = "Reconcile competition results against the KIR school registry")]
#[command(version)]
struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct cities, match schools, write the reconciled dataset and audit
    #[command(after_help = "\
Examples:
  kir run recon.toml
  kir run recon.toml --json
  kir run recon.toml --report data/validation_report.json")]
    Run {
        /// Path to the recon TOML config
        config: PathBuf,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON summary to this file (overrides [paths] report)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Check the config and the registry columns without matching
    #[command(after_help = "\
Examples:
  kir validate recon.toml")]
    Validate {
        /// Path to the recon TOML config
        config: PathBuf,
    },

    /// List schools reported under several cities, flagging unreviewed ones
    #[command(after_help = "\
Examples:
  kir cities recon.toml
  kir cities recon.toml --json")]
    Cities {
        /// Path to the recon TOML config
        config: PathBuf,

        /// Print the variations as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "kir=debug,kir_recon=debug,kir_io=debug"
    } else {
        "kir=info,kir_recon=info,kir_io=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, json, report } => recon::cmd_run(config, json, report),
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Cities { config, json } => recon::cmd_cities(config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_code(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::RegistryNotFound(_) => {
                Some("set [registry] path in the config, relative to the config file".to_string())
            }
            ReconError::RegistryMissingColumns { .. } => {
                Some("check [registry.columns] against the registry header row".to_string())
            }
            _ => None,
        };
        Self {
            code: recon_exit_code(&err),
            message: err.to_string(),
            hint,
        }
    }
}
