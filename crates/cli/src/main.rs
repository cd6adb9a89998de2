// gridfeed CLI - import a named dataset into a sheet

mod exit_codes;
mod import;
mod prompt;
mod token;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gridfeed_client::FetchError;
use gridfeed_config::CacheError;
use gridfeed_core::DatasetIdentifier;
use gridfeed_io::SheetError;
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_INVALID_CODE, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "gridfeed")]
#[command(about = "Import datasets from a data provider into a spreadsheet")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a dataset and append its rows to a sheet
    #[command(after_help = "\
Examples:
  gridfeed import prices.csv --select A1
  gridfeed import prices.csv --select A1:B1 --param rows=30
  gridfeed import prices.csv --code WIKI/AAPL --param sort_order=asc --no-headers
  GRIDFEED_AUTH_TOKEN=... gridfeed import prices.csv --code TAMMER1/SHIBOR")]
    Import(import::ImportArgs),

    /// Check whether a dataset code is well formed (SOURCE/TABLE)
    #[command(after_help = "\
Examples:
  gridfeed check WIKI/AAPL
  gridfeed check 'WIKI // AAPL'")]
    Check {
        /// Dataset code to check
        code: String,
    },

    /// Manage the cached access token
    Token {
        #[command(subcommand)]
        command: token::TokenCommands,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: gridfeed <command> [options]");
            eprintln!("       gridfeed --help for more information");
            Ok(())
        }
        Some(Commands::Import(args)) => import::cmd_import(args),
        Some(Commands::Check { code }) => cmd_check(code),
        Some(Commands::Token { command }) => token::cmd_token(command),
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

fn cmd_check(code: String) -> Result<(), CliError> {
    match DatasetIdentifier::parse(&code) {
        Some(id) => {
            println!("{}", id);
            Ok(())
        }
        None => Err(CliError {
            code: EXIT_INVALID_CODE,
            message: format!("{:?} is not a dataset code", code),
            hint: Some("expected SOURCE/TABLE, e.g. WIKI/AAPL".into()),
        }),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn sheet(err: SheetError) -> Self {
        Self::io(err.to_string())
    }

    pub fn cache(err: CacheError) -> Self {
        Self::io(err.to_string())
    }

    /// Create error from a fetch error with the matching exit code.
    pub fn fetch(err: FetchError) -> Self {
        let code = exit_codes::fetch_exit_code(&err);
        let hint = match &err {
            FetchError::Auth { .. } => {
                Some("check the access token (gridfeed token set <TOKEN>)".to_string())
            }
            FetchError::NotFound(_) => {
                Some("check the SOURCE/TABLE code on the provider's site".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
