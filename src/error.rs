use thiserror::Error;

/// Errors raised by the module purge beyond plain store failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurgeError {
    #[error("Invalid verbosity {0}: expected 0, 1 or 2")]
    InvalidVerbosity(u8),

    /// The store changed shape between counting and deleting, so the
    /// transaction was rolled back.
    #[error(
        "Deletion incomplete: expected to remove {expected} plugins, removed {deleted} ({remaining_modules} Module plugins remain)"
    )]
    IncompleteDeletion {
        expected: usize,
        deleted: usize,
        remaining_modules: usize,
    },
}
