//! Failures surfaced by sessions and the solver.

use thiserror::Error;

use crate::actions::ActionError;
use crate::blocks::{Location, Symbol};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SolveError {
    /// A session's states may be configured once; build a fresh session
    /// for a fresh problem.
    #[error("initial and goal states are already registered")]
    AlreadyInitialized,

    #[error("no solver has been registered")]
    NotConfigured,

    /// Initial and goal states must describe the same block multiset.
    #[error("initial and goal states do not contain the same blocks ({symbol} is unmatched)")]
    BlockSetMismatch { symbol: Symbol },

    /// An action refused mid-plan. Precondition failures are consumed by
    /// the solver to pick an alternative action; one escaping here means
    /// the plan bookkeeping and the table diverged.
    #[error("arm command refused: {0}")]
    InvalidTransition(#[from] ActionError),

    /// The solver can make no further progress toward the goal.
    #[error("planning stalled at {location} while seeking a place for {symbol}")]
    PlanningStalled { location: Location, symbol: Symbol },
}
