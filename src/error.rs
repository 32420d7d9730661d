//! Error types for the search engine's recoverable failures.
//!
//! Contract violations by a game adapter (illegal moves, undo with an empty
//! history, moving out of turn) are bugs and panic instead.

use std::fmt;

/// Error type for invalid search options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Look-ahead must be at least one ply
    ZeroLookAhead,
    /// Iterative deepening cannot start deeper than it ends
    MinLookAheadTooLarge { min: u32, max: u32 },
    /// Percentage of best moves must be within 1-100
    PercentageOutOfRange { found: u32 },
    /// At least one move must survive ordering
    ZeroMinBestMoves,
    /// UCT needs at least one simulation
    ZeroSimulations,
    /// The explore/exploit ratio must be finite and non-negative
    ExploreExploitRatioOutOfRange,
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::ZeroLookAhead => write!(f, "Look-ahead must be at least 1 ply"),
            OptionsError::MinLookAheadTooLarge { min, max } => {
                write!(f, "Minimum look-ahead {min} exceeds maximum look-ahead {max}")
            }
            OptionsError::PercentageOutOfRange { found } => {
                write!(f, "Percentage of best moves must be 1-100, found {found}")
            }
            OptionsError::ZeroMinBestMoves => {
                write!(f, "Minimum number of best moves must be at least 1")
            }
            OptionsError::ZeroSimulations => {
                write!(f, "Number of simulations must be at least 1")
            }
            OptionsError::ExploreExploitRatioOutOfRange => {
                write!(f, "Explore/exploit ratio must be a finite, non-negative number")
            }
        }
    }
}

impl std::error::Error for OptionsError {}

/// Error type for controller requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Another search is still in flight; wait for it or cancel it first
    SearchInProgress,
    /// The worker thread could not be started
    WorkerSpawn { reason: String },
    /// The configured options are unusable
    InvalidOptions(OptionsError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::SearchInProgress => {
                write!(f, "A search is already in progress")
            }
            ControllerError::WorkerSpawn { reason } => {
                write!(f, "Failed to start search worker: {reason}")
            }
            ControllerError::InvalidOptions(err) => write!(f, "Invalid search options: {err}"),
        }
    }
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControllerError::InvalidOptions(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OptionsError> for ControllerError {
    fn from(err: OptionsError) -> Self {
        ControllerError::InvalidOptions(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn messages_name_the_problem() {
        let err = OptionsError::MinLookAheadTooLarge { min: 5, max: 3 };
        assert_eq!(
            err.to_string(),
            "Minimum look-ahead 5 exceeds maximum look-ahead 3"
        );
        assert_eq!(
            ControllerError::SearchInProgress.to_string(),
            "A search is already in progress"
        );
    }

    #[test]
    fn options_error_is_the_source() {
        let err: ControllerError = OptionsError::ZeroLookAhead.into();
        assert!(err.source().is_some());
        assert_eq!(err, ControllerError::InvalidOptions(OptionsError::ZeroLookAhead));
    }
}
