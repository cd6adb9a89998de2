//! `gridfeed import`: resolve a dataset code from the selection, fetch the
//! dataset and append its rows to the sheet.

use std::path::PathBuf;

use clap::Args;
use gridfeed_client::DatasetClient;
use gridfeed_config::{Settings, TokenCache};
use gridfeed_core::{resolve, Alert, CodePrompt, ResolutionOutcome, SelectionContents};
use gridfeed_io::{CellRange, Sheet};

use crate::exit_codes;
use crate::prompt::{NoPrompt, StderrAlert, TerminalPrompt};
use crate::token;
use crate::CliError;

/// Shown once when the user gives up on the code prompt.
const CANCELLED_ALERT: &str = "Import failed: no dataset code was provided.";

#[derive(Args)]
pub struct ImportArgs {
    /// Sheet to append to (CSV/TSV; created if missing)
    pub sheet: PathBuf,

    /// Selected range holding the code, as SOURCE/TABLE in one cell or
    /// SOURCE and TABLE in two adjacent cells (e.g. A1 or A1:B1)
    #[arg(long, short = 's', value_name = "RANGE")]
    pub select: Option<CellRange>,

    /// Dataset code, used as a one-cell selection instead of --select
    #[arg(long, short = 'c', conflicts_with = "select")]
    pub code: Option<String>,

    /// Access token (default: GRIDFEED_AUTH_TOKEN env, then the token cache)
    #[arg(long)]
    pub token: Option<String>,

    /// Data provider host (default: from settings)
    #[arg(long)]
    pub domain: Option<String>,

    /// Full API base URL, overriding --domain
    #[arg(long, env = "GRIDFEED_BASE_URL", hide = true)]
    pub base_url: Option<String>,

    /// Extra query parameter, repeatable (e.g. rows=10, sort_order=asc)
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Do not write the column-name row
    #[arg(long)]
    pub no_headers: bool,

    /// Never ask for a code; an unusable selection cancels the import
    #[arg(long)]
    pub no_prompt: bool,

    /// Suppress the summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

pub fn cmd_import(args: ImportArgs) -> Result<(), CliError> {
    let settings = Settings::load();
    let extra_params = args
        .params
        .iter()
        .map(|p| parse_param(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut sheet = Sheet::load_or_empty(&args.sheet).map_err(CliError::sheet)?;

    // 1. Selection snapshot
    let selection = match (&args.code, &args.select) {
        (Some(code), _) => SelectionContents::single(code.as_str()),
        (None, Some(range)) => sheet.selection(range),
        (None, None) => SelectionContents::default(),
    };

    // 2. Resolve the dataset code
    let mut prompt: Box<dyn CodePrompt> = if args.no_prompt {
        Box::new(NoPrompt)
    } else {
        Box::new(TerminalPrompt::stdio())
    };
    let id = match resolve(&selection, prompt.as_mut()) {
        ResolutionOutcome::Resolved(id) => id,
        ResolutionOutcome::Cancelled => {
            StderrAlert.alert(CANCELLED_ALERT);
            return Err(CliError {
                code: exit_codes::EXIT_IMPORT_CANCELLED,
                message: String::new(),
                hint: None,
            });
        }
    };

    // 3. Fetch
    let cache = TokenCache::open_default();
    let token = token::resolve_token(args.token, &cache);
    let client = match args.base_url {
        Some(base) => DatasetClient::with_base_url(base, token),
        None => {
            let domain = args.domain.as_deref().unwrap_or(settings.effective_domain());
            DatasetClient::new(domain, token)
        }
    }
    .map_err(CliError::fetch)?;

    let params = merge_params(&settings, extra_params);
    let dataset = client.fetch(&id, &params).map_err(CliError::fetch)?;
    if let Some(reported) = dataset.code.as_deref() {
        if !reported.eq_ignore_ascii_case(id.normalized()) {
            log::warn!("requested {} but the server answered with {}", id, reported);
        }
    }

    // 4. Append and save
    let include_headers = settings.include_headers && !args.no_headers;
    let rows = dataset.sheet_rows(include_headers);
    let row_count = rows.len();
    let first_row = sheet.append_rows(rows);
    sheet.save(&args.sheet).map_err(CliError::sheet)?;

    if !args.quiet {
        let title = match dataset.name.as_deref() {
            Some(name) if !name.trim().is_empty() => format!("{} ({})", id, name.trim()),
            _ => id.to_string(),
        };
        eprintln!(
            "Imported {}: {} rows appended to {} at {}",
            title,
            row_count,
            args.sheet.display(),
            CellRange::cell(first_row, 0),
        );
    }

    Ok(())
}

/// Parse a `KEY=VALUE` query parameter.
fn parse_param(s: &str) -> Result<(String, String), CliError> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(CliError::args(format!("invalid --param {:?}", s))
            .with_hint("use KEY=VALUE, e.g. --param rows=10")),
    }
}

/// Settings defaults first, then command-line parameters. A command-line
/// parameter replaces a default with the same key.
fn merge_params(settings: &Settings, extra: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = settings
        .default_params
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    for (k, v) in extra {
        match params.iter_mut().find(|(existing, _)| *existing == k) {
            Some(slot) => slot.1 = v,
            None => params.push((k, v)),
        }
    }

    params
}
