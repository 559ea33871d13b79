//! The planning passes: evacuate misplaced blocks to the buffer, then
//! rebuild each goal stack bottom-to-top.
//!
//! The solver works in rounds. A repositioning pass strips every
//! addressable stack down to the prefix that already matches the goal,
//! parking strays in the buffer. A placement pass per location then pulls
//! the needed blocks back out of the buffer in bottom-to-top goal order,
//! spilling whatever covers them one location further and letting the
//! next repositioning sweep reclaim the spill. Completion flags
//! short-circuit locations with no outstanding work; spilling over a
//! flagged location re-opens it.

use crate::actions::{self, Step};
use crate::blocks::{Location, Symbol};
use crate::error::SolveError;
use crate::session::Session;

/// Plans and executes block transfers against a session's working state.
#[derive(Clone, Debug, Default)]
pub struct Solver {
    completion: [bool; 4],
    depth_limit: usize,
}

impl Solver {
    pub fn new() -> Self {
        Solver::default()
    }

    /// Runs repositioning and placement rounds until the goal state is
    /// reached or no further progress is possible.
    pub fn solve(&mut self, session: &mut Session) -> Result<(), SolveError> {
        session.ensure_block_sets_match()?;
        self.completion = [false; 4];
        self.depth_limit = session.block_count();
        log::debug!("solving for {} blocks", self.depth_limit);
        loop {
            let steps_before = session.plan().len();
            self.reposition(session)?;
            for location in Location::TARGETS {
                self.place_location(session, location, 0)?;
            }
            if session.is_goal_state_reached()? {
                log::debug!("goal reached after {} steps", session.plan().len());
                return Ok(());
            }
            if session.plan().len() == steps_before {
                return stall_report(session);
            }
        }
    }

    /// Evacuates every addressable stack down to its goal-matching
    /// prefix, parking strays in the buffer. Idempotent: a second
    /// immediate run finds nothing left to move.
    fn reposition(&mut self, session: &mut Session) -> Result<(), SolveError> {
        for location in Location::TARGETS {
            if self.completion[location.index()] {
                continue;
            }
            while session.current().stack(location).len() > 1 && !top_at_goal(session, location) {
                transfer_top(session, location, Location::BUFFER)?;
            }
            if session.current().stack(location).len() == 1 && !top_at_goal(session, location) {
                transfer_top(session, location, Location::BUFFER)?;
            }
        }
        Ok(())
    }

    /// Rebuilds `location`'s goal stack from the buffer, bottom-to-top.
    fn place_location(
        &mut self,
        session: &mut Session,
        location: Location,
        depth: usize,
    ) -> Result<(), SolveError> {
        let Some(first_waiting) = first_destined(session, location) else {
            self.completion[location.index()] = true;
            return Ok(());
        };
        if depth > self.depth_limit {
            return Err(SolveError::PlanningStalled {
                location,
                symbol: first_waiting,
            });
        }
        log::debug!("placing blocks at {location}, depth {depth}");

        let needed = match session.top_symbol(location) {
            // An empty stack starts from the block that belongs on the table.
            None => goal_table_block(session, location).ok_or(SolveError::PlanningStalled {
                location,
                symbol: first_waiting,
            })?,
            // Otherwise the next block is the one resting on the current top.
            Some(top) => goal_successor(session, top).ok_or(SolveError::PlanningStalled {
                location,
                symbol: first_waiting,
            })?,
        };

        // Uncover the needed block. Whatever sits above it spills one
        // location further; the next repositioning sweeps the spill back.
        while session.top_symbol(Location::BUFFER) != Some(needed) {
            if session.is_location_empty(Location::BUFFER) {
                return Err(SolveError::PlanningStalled {
                    location,
                    symbol: needed,
                });
            }
            let spill = overflow_for(location);
            transfer_top(session, Location::BUFFER, spill)?;
            self.completion[spill.index()] = false;
        }

        transfer_top(session, Location::BUFFER, location)?;
        self.reposition(session)?;
        self.place_location(session, location, depth + 1)
    }
}

/// Where evacuated buffer blocks spill while uncovering a needed block.
fn overflow_for(target: Location) -> Location {
    if target == Location::L3 {
        Location::L2
    } else {
        Location::L3
    }
}

/// Whether the top block at `location` already matches its goal entry.
/// An empty stack counts as settled.
fn top_at_goal(session: &Session, location: Location) -> bool {
    session
        .current()
        .top(location)
        .map_or(true, |block| session.is_block_at_goal(block))
}

/// The first buffer block whose goal location is `location`.
fn first_destined(session: &Session, location: Location) -> Option<Symbol> {
    session
        .current()
        .stack(Location::BUFFER)
        .iter()
        .map(|block| block.symbol)
        .find(|symbol| {
            session
                .goal_state(*symbol)
                .map_or(false, |goal| goal.location == location)
        })
}

/// The buffer block whose goal seat is the table at `location`.
fn goal_table_block(session: &Session, location: Location) -> Option<Symbol> {
    session
        .current()
        .stack(Location::BUFFER)
        .iter()
        .map(|block| block.symbol)
        .find(|symbol| {
            session
                .goal_state(*symbol)
                .map_or(false, |goal| goal.location == location && goal.on_table)
        })
}

/// The buffer block whose goal seat is directly on `support`.
fn goal_successor(session: &Session, support: Symbol) -> Option<Symbol> {
    session
        .current()
        .stack(Location::BUFFER)
        .iter()
        .map(|block| block.symbol)
        .find(|symbol| {
            session
                .goal_state(*symbol)
                .map_or(false, |goal| goal.on == Some(support))
        })
}

/// A full round moved nothing: name the first misplaced block. When every
/// block matches its goal entry the arrangement is solved after all (the
/// multiset check at solve start rules out missing goal entries).
fn stall_report(session: &Session) -> Result<(), SolveError> {
    match session
        .current()
        .blocks()
        .find(|block| !session.is_block_at_goal(block))
    {
        Some(block) => Err(SolveError::PlanningStalled {
            location: block.state.location,
            symbol: block.symbol,
        }),
        None => Ok(()),
    }
}

/// Carries the top block of `from` over to `to`: lift (unstack off its
/// support, or pick up off the table), move, then settle (put down on an
/// empty stack, else stack on its top). A refused lift or settle falls
/// back to the alternative primitive; both refusing means the table and
/// the plan bookkeeping diverged, and the refusal propagates.
fn transfer_top(session: &mut Session, from: Location, to: Location) -> Result<(), SolveError> {
    // Callers check their source; an empty one leaves nothing to do.
    let Some(mut block) = session.pop_top(from) else {
        return Ok(());
    };

    let lift = {
        let (arm, table) = session.split_mut();
        match table.top_mut(from) {
            Some(beneath) => {
                let support = beneath.symbol;
                match actions::unstack(arm, &block, beneath) {
                    Ok(()) => Step::Unstack(block.symbol, support),
                    Err(_) => {
                        actions::pick_up(arm, &block)?;
                        Step::PickUp(block.symbol)
                    }
                }
            }
            None => {
                actions::pick_up(arm, &block)?;
                Step::PickUp(block.symbol)
            }
        }
    };
    session.record(lift);

    actions::move_to(session.arm_mut(), &mut block, to)?;
    session.record(Step::Move(to));

    let settle = {
        let (arm, table) = session.split_mut();
        match actions::put_down(arm, table, &mut block, to) {
            Ok(()) => Step::PutDown(block.symbol, to),
            Err(refusal) => match table.top_mut(to) {
                Some(target) => {
                    let support = target.symbol;
                    actions::stack(arm, &mut block, target)?;
                    Step::Stack(block.symbol, support)
                }
                None => return Err(refusal.into()),
            },
        }
    };
    session.push_top(to, block);
    session.record(settle);

    Ok(())
}
