//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `supas` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad args, unreadable config path, bad glob) |
//! | 3    | No data: no matching files, or none yielded a record     |
//! | 4    | Filter matched nothing (only with `--fail-on-empty`)     |
//! | 5    | Export file could not be written                         |
//! | 6    | Config failed to parse or validate                       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`'s constructors

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap also exits with 2 on parse failures.
pub const EXIT_USAGE: u8 = 2;

/// No extraction files matched, or every one failed / was empty.
pub const EXIT_NO_DATA: u8 = 3;

/// The filter criteria left no rows and `--fail-on-empty` was passed.
pub const EXIT_NO_MATCHES: u8 = 4;

/// CSV / XLSX export failed.
pub const EXIT_EXPORT: u8 = 5;

/// Config TOML could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 6;
