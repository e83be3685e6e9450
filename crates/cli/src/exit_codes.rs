//! CLI Exit Code Registry
//!
//! Single source of truth for `rowlink` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error (unspecified)                     |
//! | 2    | Usage error (bad or conflicting arguments)      |
//! | 3    | Invalid configuration (unknown matcher type...) |
//! | 4    | Malformed input record                          |
//! | 5    | I/O error (cannot read input / write output)    |

use rowlink_grouping::GroupError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Configuration rejected before any row was read.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Input record with the wrong shape; the run was aborted.
pub const EXIT_MALFORMED: u8 = 4;

/// File could not be read or written.
pub const EXIT_IO: u8 = 5;

/// Map an engine error to its exit code.
pub fn group_exit_code(err: &GroupError) -> u8 {
    match err {
        GroupError::InvalidConfiguration(_) | GroupError::ConfigParse(_) => EXIT_INVALID_CONFIG,
        GroupError::MalformedRecord { .. } => EXIT_MALFORMED,
        GroupError::Io(_) => EXIT_IO,
        // Unreachable once the matcher validated; report as a plain failure
        GroupError::UnknownMatcherType(_) => EXIT_ERROR,
    }
}
