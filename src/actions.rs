//! Primitive arm actions.
//!
//! Each primitive validates its preconditions, then either applies its
//! effects to the blocks and the arm or refuses with an [`ActionError`]
//! naming the violated precondition, mutating nothing. Stack membership
//! (which vector a block sits in) is the solver's bookkeeping around each
//! primitive, so the only world access here is `put_down`'s read-only
//! check that its destination is empty.

use std::fmt;

use thiserror::Error;

use crate::arm::{ArmState, RobotArm};
use crate::blocks::{Block, BlockState, Location, Symbol, TableState};

/// A violated action precondition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("the arm is already holding a block")]
    ArmOccupied,
    #[error("the arm is not holding {0}")]
    NotHolding(Symbol),
    #[error("{0} is covered by another block")]
    Covered(Symbol),
    #[error("{0} is not resting on the table")]
    NotOnTable(Symbol),
    #[error("{0} already holds a stack")]
    LocationOccupied(Location),
    #[error("{0} is not resting on {1}")]
    NotRestingOn(Symbol, Symbol),
}

/// One executed primitive, as recorded in the plan transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    PickUp(Symbol),
    PutDown(Symbol, Location),
    Stack(Symbol, Symbol),
    Unstack(Symbol, Symbol),
    Move(Location),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::PickUp(block) => write!(f, "pick up {block}"),
            Step::PutDown(block, location) => write!(f, "put down {block} at {location}"),
            Step::Stack(block, target) => write!(f, "stack {block} on {target}"),
            Step::Unstack(block, target) => write!(f, "unstack {block} from {target}"),
            Step::Move(location) => write!(f, "move to {location}"),
        }
    }
}

fn ensure_holding(arm: &RobotArm, block: &Block) -> Result<(), ActionError> {
    if arm.holding() != Some(block.symbol) {
        return Err(ActionError::NotHolding(block.symbol));
    }
    Ok(())
}

/// Lifts a lone table block into the empty arm.
pub fn pick_up(arm: &mut RobotArm, block: &Block) -> Result<(), ActionError> {
    if arm.state() != ArmState::Empty {
        return Err(ActionError::ArmOccupied);
    }
    if !block.state.on_table {
        return Err(ActionError::NotOnTable(block.symbol));
    }
    if !block.state.clear {
        return Err(ActionError::Covered(block.symbol));
    }
    arm.grab_block(block);
    Ok(())
}

/// Sets the held block down on the table at an empty `location`.
pub fn put_down(
    arm: &mut RobotArm,
    table: &TableState,
    block: &mut Block,
    location: Location,
) -> Result<(), ActionError> {
    ensure_holding(arm, block)?;
    if !table.stack(location).is_empty() {
        return Err(ActionError::LocationOccupied(location));
    }
    block.state = BlockState::on_table_at(location);
    arm.release_block();
    Ok(())
}

/// Sets the held block down on top of a clear `target`.
pub fn stack(arm: &mut RobotArm, block: &mut Block, target: &mut Block) -> Result<(), ActionError> {
    ensure_holding(arm, block)?;
    if !target.state.clear {
        return Err(ActionError::Covered(target.symbol));
    }
    let mut below = target.state.below.clone();
    below.push(target.symbol);
    block.state = BlockState {
        below,
        on: Some(target.symbol),
        clear: true,
        on_table: false,
        location: target.state.location,
    };
    target.state = BlockState {
        clear: false,
        ..target.state.clone()
    };
    arm.release_block();
    Ok(())
}

/// Lifts a clear block off the `target` it rests on into the empty arm.
pub fn unstack(arm: &mut RobotArm, block: &Block, target: &mut Block) -> Result<(), ActionError> {
    if arm.state() != ArmState::Empty {
        return Err(ActionError::ArmOccupied);
    }
    if block.state.on != Some(target.symbol) {
        return Err(ActionError::NotRestingOn(block.symbol, target.symbol));
    }
    if !block.state.clear {
        return Err(ActionError::Covered(block.symbol));
    }
    arm.grab_block(block);
    target.state = BlockState {
        clear: true,
        ..target.state.clone()
    };
    Ok(())
}

/// Carries the held block over to `destination`, updating only its
/// recorded location; a later `put_down` or `stack` settles it there.
pub fn move_to(arm: &mut RobotArm, block: &mut Block, destination: Location) -> Result<(), ActionError> {
    ensure_holding(arm, block)?;
    block.state = BlockState {
        location: destination,
        ..block.state.clone()
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Symbol = Symbol::new('A');
    const B: Symbol = Symbol::new('B');
    const C: Symbol = Symbol::new('C');

    fn table_block(label: char, location: Location) -> Block {
        Block {
            symbol: Symbol::new(label),
            state: BlockState::on_table_at(location),
        }
    }

    #[test]
    fn pick_up_while_holding_refuses_without_mutation() {
        let mut arm = RobotArm::new();
        let held = table_block('A', Location::L1);
        pick_up(&mut arm, &held).unwrap();

        let other = table_block('B', Location::L2);
        let before = other.clone();
        assert_eq!(pick_up(&mut arm, &other), Err(ActionError::ArmOccupied));
        assert_eq!(arm.holding(), Some(A), "the original grab must survive");
        assert_eq!(other, before);
    }

    #[test]
    fn pick_up_requires_clear_table_block() {
        let mut arm = RobotArm::new();
        let table = TableState::from_layout([vec![B, C], vec![], vec![], vec![]]);

        let buried = table.find(B).unwrap();
        assert_eq!(pick_up(&mut arm, buried), Err(ActionError::Covered(B)));

        let stacked = table.find(C).unwrap();
        assert_eq!(pick_up(&mut arm, stacked), Err(ActionError::NotOnTable(C)));
    }

    #[test]
    fn put_down_requires_empty_destination() {
        let mut arm = RobotArm::new();
        let mut block = table_block('A', Location::L1);
        pick_up(&mut arm, &block).unwrap();

        let world = TableState::from_layout([vec![], vec![B], vec![], vec![]]);
        assert_eq!(
            put_down(&mut arm, &world, &mut block, Location::L2),
            Err(ActionError::LocationOccupied(Location::L2))
        );

        put_down(&mut arm, &world, &mut block, Location::L3).unwrap();
        assert_eq!(block.state, BlockState::on_table_at(Location::L3));
        assert_eq!(arm.state(), ArmState::Empty);
    }

    #[test]
    fn stack_records_the_resting_relation() {
        let mut arm = RobotArm::new();
        let mut block = table_block('A', Location::L1);
        pick_up(&mut arm, &block).unwrap();
        move_to(&mut arm, &mut block, Location::L2).unwrap();

        let mut target = table_block('B', Location::L2);
        stack(&mut arm, &mut block, &mut target).unwrap();

        assert_eq!(block.state.on, Some(B));
        assert_eq!(block.state.below, vec![B]);
        assert!(block.state.clear);
        assert!(!block.state.on_table);
        assert_eq!(block.state.location, Location::L2);
        assert!(!target.state.clear, "the support is no longer clear");
        assert_eq!(arm.state(), ArmState::Empty);
    }

    #[test]
    fn unstack_requires_the_actual_support() {
        let mut arm = RobotArm::new();
        let table = TableState::from_layout([vec![B, A], vec![], vec![], vec![]]);
        let a = table.find(A).unwrap().clone();

        let mut unrelated = table_block('C', Location::L2);
        assert_eq!(
            unstack(&mut arm, &a, &mut unrelated),
            Err(ActionError::NotRestingOn(A, C))
        );

        let mut b = table.find(B).unwrap().clone();
        unstack(&mut arm, &a, &mut b).unwrap();
        assert!(b.state.clear, "the support becomes clear once the block is lifted");
        assert_eq!(arm.holding(), Some(A));
    }

    #[test]
    fn move_requires_holding_that_block() {
        let mut arm = RobotArm::new();
        let mut block = table_block('A', Location::L1);
        assert_eq!(
            move_to(&mut arm, &mut block, Location::L4),
            Err(ActionError::NotHolding(A))
        );

        pick_up(&mut arm, &block).unwrap();
        move_to(&mut arm, &mut block, Location::L4).unwrap();
        assert_eq!(block.state.location, Location::L4);
    }
}
