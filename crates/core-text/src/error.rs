//! Error taxonomy shared by every editing crate.
//!
//! None of these are fatal: movement and selection APIs clamp instead of
//! returning `InvalidRange`, preview APIs surface it as a non-zero status via
//! [`EditError::code`], and `Vetoed` is an ordinary control-flow outcome.

use thiserror::Error;

pub type EditResult<T> = Result<T, EditError>;

#[derive(Debug, Error)]
pub enum EditError {
    /// Offset or range outside `[0, len]`, or `start > end`.
    #[error("range {start}..{end} is invalid for content of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
    /// The input filter removed the entire payload.
    #[error("input filter removed the entire payload")]
    FilteredEmpty,
    /// Layout reported a non-finite or non-positive line height.
    #[error("layout reported degenerate line metrics")]
    DegenerateLayout,
    /// A `will` callback returned false.
    #[error("operation vetoed by a listener")]
    Vetoed,
    #[error("invalid input filter: {0}")]
    InvalidFilter(#[from] regex::Error),
}

impl EditError {
    pub fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self::InvalidRange { start, end, len }
    }

    /// Stable non-zero status code for callers that report errors as integers
    /// (IME bridges).
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidRange { .. } => 1,
            Self::FilteredEmpty => 2,
            Self::DegenerateLayout => 3,
            Self::Vetoed => 4,
            Self::InvalidFilter(_) => 5,
        }
    }
}
