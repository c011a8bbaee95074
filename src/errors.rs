//! Error handling for pool allocation

use std::fmt;

/// Error type for pool tree operations.
///
/// `CapacityExhausted`, `InvalidPrefixLength` and `Conflict` are expected
/// outcomes surfaced to the operator; `LockTimeout` may be retried by the
/// caller; `InvariantViolation` indicates corrupted tree state and aborts
/// the enclosing transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    CapacityExhausted,
    InvalidPrefixLength(u8),
    Conflict,
    LockTimeout,
    NotFound,
    InvariantViolation(String),
}

impl Error {
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::CapacityExhausted => "Capacity exhausted",
            Error::InvalidPrefixLength(_) => "Invalid prefix length",
            Error::Conflict => "Conflict",
            Error::LockTimeout => "Lock timeout",
            Error::NotFound => "Not found",
            Error::InvariantViolation(_) => "Invariant violation",
        }
    }

    /// True for the error kinds that are normal validation outcomes rather
    /// than bugs or transient lock failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::CapacityExhausted | Error::InvalidPrefixLength(_) | Error::Conflict
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPrefixLength(plen) => write!(f, "invalid prefix length /{plen}"),
            Error::InvariantViolation(msg) => write!(f, "pool tree invariant violated: {msg}"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl std::error::Error for Error {}
