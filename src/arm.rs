//! The robot arm's hand: a two-state machine that can hold one block.

use crate::blocks::{Block, Symbol};

/// Whether the arm currently holds a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArmState {
    #[default]
    Empty,
    Holding,
}

/// The hand itself. Grabbing only takes effect while empty and releasing
/// only while holding; callers that need a hard failure check first
/// (actions refuse with a typed error before touching the hand).
#[derive(Clone, Debug, Default)]
pub struct RobotArm {
    state: ArmState,
    holding: Option<Symbol>,
}

impl RobotArm {
    pub fn new() -> Self {
        RobotArm::default()
    }

    pub fn state(&self) -> ArmState {
        self.state
    }

    /// The symbol of the held block, if any.
    pub fn holding(&self) -> Option<Symbol> {
        self.holding
    }

    /// Closes the hand around `block`. Ignored while already holding.
    pub fn grab_block(&mut self, block: &Block) {
        if self.state == ArmState::Empty {
            self.state = ArmState::Holding;
            self.holding = Some(block.symbol);
        }
    }

    /// Opens the hand. Ignored while empty.
    pub fn release_block(&mut self) {
        if self.state == ArmState::Holding {
            self.state = ArmState::Empty;
            self.holding = None;
        }
    }
}
