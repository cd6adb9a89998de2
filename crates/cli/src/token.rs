//! `gridfeed token` and access token resolution for imports.

use clap::Subcommand;
use gridfeed_config::TokenCache;

use crate::CliError;

/// Environment variable consulted when no `--token` flag is given.
pub const TOKEN_ENV: &str = "GRIDFEED_AUTH_TOKEN";

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Cache an access token (expires after six hours without use)
    Set {
        /// Access token issued by the data provider
        token: String,
    },
    /// Show the cached token (masked)
    Show,
    /// Remove the cached token
    Clear,
}

pub fn cmd_token(command: TokenCommands) -> Result<(), CliError> {
    let cache = TokenCache::open_default();
    match command {
        TokenCommands::Set { token } => {
            let token = token.trim();
            if token.is_empty() {
                return Err(CliError::args("token must not be empty"));
            }
            cache.set_token(token).map_err(CliError::cache)?;
            eprintln!("Token cached in {}", cache.path().display());
        }
        TokenCommands::Show => match cache.token().map_err(CliError::cache)? {
            Some(token) => println!("{}", mask(&token)),
            None => {
                return Err(CliError::args("no cached token")
                    .with_hint("run `gridfeed token set <TOKEN>` or pass --token"));
            }
        },
        TokenCommands::Clear => {
            if cache.clear_token().map_err(CliError::cache)? {
                eprintln!("Token removed");
            } else {
                eprintln!("No cached token");
            }
        }
    }
    Ok(())
}

/// Pick the access token for an import: flag > environment > cache.
///
/// A flag value is written to the cache for later runs. The token is
/// optional, so a cache failure only costs a warning.
pub fn resolve_token(flag: Option<String>, cache: &TokenCache) -> Option<String> {
    if let Some(token) = flag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        if let Err(e) = cache.set_token(&token) {
            log::warn!("{}", e);
        }
        return Some(token);
    }

    if let Ok(token) = std::env::var(TOKEN_ENV) {
        let trimmed = token.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    match cache.token() {
        Ok(token) => token,
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

/// Show only the last four characters of a token.
fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("abcdefgh"), "****efgh");
        assert_eq!(mask("abc"), "***");
    }

    #[test]
    fn test_flag_wins_and_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::at(dir.path().join("cache.json"));

        let token = resolve_token(Some("  from-flag ".into()), &cache);
        assert_eq!(token.as_deref(), Some("from-flag"));
        assert_eq!(cache.token().unwrap().as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_cache_used_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::at(dir.path().join("cache.json"));
        cache.set_token("cached").unwrap();

        // Only meaningful when the environment does not supply a token
        if std::env::var(TOKEN_ENV).is_err() {
            assert_eq!(resolve_token(None, &cache).as_deref(), Some("cached"));
        }
    }

    #[test]
    fn test_blank_flag_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::at(dir.path().join("cache.json"));

        if std::env::var(TOKEN_ENV).is_err() {
            assert_eq!(resolve_token(Some("   ".into()), &cache), None);
        }
        assert_eq!(cache.token().unwrap(), None);
    }
}
