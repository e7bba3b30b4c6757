//! Failure kinds shared by every engine and the bundled digests.

/// Caller-contract violations. Everything else (missing key, duplicate key,
/// empty table) is a normal outcome reported through `bool`/`Option`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// `rehash` was asked for a capacity that does not exceed the current one.
    /// The table is left untouched.
    #[error("requested capacity {requested} does not exceed current capacity {current}")]
    CapacityNotIncreased { requested: usize, current: usize },

    /// A digest was constructed with parameters it cannot work with.
    #[error("invalid hasher configuration: {0}")]
    InvalidHasher(&'static str),
}

/// Rejects a rehash request that would not grow the table.
pub(crate) fn check_growth(requested: usize, current: usize) -> Result<(), TableError> {
    if requested <= current {
        return Err(TableError::CapacityNotIncreased { requested, current });
    }
    Ok(())
}
