//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 2       | Universal        | CLI usage error (bad args, bad range)    |
//! | 3       | Universal        | File I/O error (sheet, token cache)      |
//! | 10-19   | import           | Dataset code resolution                  |
//! | 50-59   | fetch            | Dataset API                              |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use gridfeed_client::FetchError;

// =============================================================================
// Universal (0, 2-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, malformed range or parameter.
pub const EXIT_USAGE: u8 = 2;

/// Reading or writing the sheet or the token cache failed.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Import (10-19)
// =============================================================================

/// User cancelled the dataset code prompt. Nothing was written.
pub const EXIT_IMPORT_CANCELLED: u8 = 10;

/// `check` was given a code that is not SOURCE/TABLE.
pub const EXIT_INVALID_CODE: u8 = 11;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Access token rejected by the API (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Dataset does not exist (404).
pub const EXIT_FETCH_NOT_FOUND: u8 = 52;

/// Any other non-success HTTP status.
pub const EXIT_FETCH_HTTP: u8 = 53;

/// Network failure or a response that could not be understood.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;

/// Map a FetchError to its exit code.
pub fn fetch_exit_code(err: &FetchError) -> u8 {
    match err {
        FetchError::Auth { .. } => EXIT_FETCH_AUTH,
        FetchError::NotFound(_) => EXIT_FETCH_NOT_FOUND,
        FetchError::Http { .. } => EXIT_FETCH_HTTP,
        FetchError::InvalidUrl(_) => EXIT_USAGE,
        FetchError::Network(_) | FetchError::Parse(_) => EXIT_FETCH_UPSTREAM,
    }
}
