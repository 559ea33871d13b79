//! One planning problem from registration to plan: the session owns the
//! arm, the registered initial and goal states, a working copy the
//! actions mutate, and the recorded step list.
//!
//! Collaborators talk to a session value instead of shared global state,
//! so independent problems can run side by side and tests stay isolated.

use rustc_hash::FxHashMap;

use crate::actions::Step;
use crate::arm::{ArmState, RobotArm};
use crate::blocks::{Block, BlockState, Location, Symbol, TableState};
use crate::error::SolveError;
use crate::solver::Solver;

/// Receives a notification after every executed and recorded action.
pub trait StateObserver {
    fn on_step(&mut self, step: &Step, table: &TableState, arm: &RobotArm);
}

/// A point-in-time view of the world for callers outside the crate.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub table: TableState,
    pub arm: ArmState,
    pub holding: Option<Symbol>,
}

#[derive(Default)]
pub struct Session {
    arm: RobotArm,
    initial: Option<TableState>,
    goal: Option<TableState>,
    goal_dict: FxHashMap<Symbol, BlockState>,
    current: TableState,
    solver: Option<Solver>,
    plan: Vec<Step>,
    observer: Option<Box<dyn StateObserver>>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// One-shot setup: validates that both states describe the same block
    /// multiset, then registers them along with a fresh solver. Fails with
    /// `AlreadyInitialized` once either state is in place.
    pub fn configure(&mut self, initial: TableState, goal: TableState) -> Result<(), SolveError> {
        if self.initial.is_some() || self.goal.is_some() {
            return Err(SolveError::AlreadyInitialized);
        }
        check_same_blocks(&initial, &goal)?;
        self.register_initial_state(initial);
        self.register_goal_state(goal);
        self.register_solver(Solver::new());
        Ok(())
    }

    /// Stores the initial state and resets the working state to a copy of
    /// it. Re-registration overwrites and discards any recorded plan.
    pub fn register_initial_state(&mut self, state: TableState) {
        self.current = state.clone();
        self.initial = Some(state);
        self.plan.clear();
    }

    /// Stores the goal state. Re-registration overwrites.
    pub fn register_goal_state(&mut self, state: TableState) {
        self.goal = Some(state);
    }

    /// Stores the solver and rebuilds the per-block goal dictionary from
    /// the registered goal state. Call after `register_goal_state`.
    pub fn register_solver(&mut self, solver: Solver) {
        self.goal_dict.clear();
        if let Some(goal) = &self.goal {
            for block in goal.blocks() {
                self.goal_dict.insert(block.symbol, block.state.clone());
            }
        }
        self.solver = Some(solver);
    }

    /// Runs the registered solver against this session's working state.
    pub fn run_solver(&mut self) -> Result<(), SolveError> {
        let mut solver = self.solver.take().ok_or(SolveError::NotConfigured)?;
        let outcome = solver.solve(self);
        self.solver = Some(solver);
        outcome
    }

    /// Command-surface alias for `run_solver`.
    pub fn run(&mut self) -> Result<(), SolveError> {
        self.run_solver()
    }

    pub fn current(&self) -> &TableState {
        &self.current
    }

    pub fn initial(&self) -> Option<&TableState> {
        self.initial.as_ref()
    }

    pub fn goal(&self) -> Option<&TableState> {
        self.goal.as_ref()
    }

    pub fn arm(&self) -> &RobotArm {
        &self.arm
    }

    /// The goal-dictionary entry for `symbol`, if the goal mentions it.
    pub fn goal_state(&self, symbol: Symbol) -> Option<&BlockState> {
        self.goal_dict.get(&symbol)
    }

    pub fn block_count(&self) -> usize {
        self.current.block_count()
    }

    pub fn is_location_empty(&self, location: Location) -> bool {
        self.current.stack(location).is_empty()
    }

    /// Whether the block's current state matches its goal entry. A pure
    /// query: repeated calls agree until an action moves something.
    pub fn is_block_at_goal(&self, block: &Block) -> bool {
        self.goal_dict
            .get(&block.symbol)
            .map_or(false, |goal| block.state.matches_goal(goal))
    }

    /// Order-independent comparison of the working state against the goal.
    ///
    /// Each goal block is consumed at most once from a scratch list, so a
    /// duplicated symbol cannot satisfy two goal entries. `Ok(false)` when
    /// either state is unregistered or the block counts differ; a working
    /// symbol absent from the goal is a `BlockSetMismatch`.
    pub fn is_goal_state_reached(&self) -> Result<bool, SolveError> {
        let (Some(_), Some(goal)) = (self.initial.as_ref(), self.goal.as_ref()) else {
            return Ok(false);
        };
        if self.current.block_count() != goal.block_count() {
            return Ok(false);
        }
        let mut unmatched: Vec<&Block> = goal.blocks().collect();
        for block in self.current.blocks() {
            let Some(found) = unmatched.iter().position(|g| g.symbol == block.symbol) else {
                return Err(SolveError::BlockSetMismatch {
                    symbol: block.symbol,
                });
            };
            let goal_block = unmatched.swap_remove(found);
            if !block.state.matches_goal(&goal_block.state) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `is_goal_state_reached` collapsed to a plain answer. Block sets are
    /// validated at configuration, so the mismatch arm cannot fire for a
    /// session built through `configure`.
    pub fn is_solved(&self) -> bool {
        self.is_goal_state_reached().unwrap_or(false)
    }

    pub fn query_state(&self) -> Snapshot {
        Snapshot {
            table: self.current.clone(),
            arm: self.arm.state(),
            holding: self.arm.holding(),
        }
    }

    /// The steps executed so far, in order.
    pub fn plan(&self) -> &[Step] {
        &self.plan
    }

    pub fn set_observer(&mut self, observer: Box<dyn StateObserver>) {
        self.observer = Some(observer);
    }

    /// Fails unless both states are registered and describe the same
    /// block multiset.
    pub fn ensure_block_sets_match(&self) -> Result<(), SolveError> {
        let (Some(initial), Some(goal)) = (self.initial.as_ref(), self.goal.as_ref()) else {
            return Err(SolveError::NotConfigured);
        };
        check_same_blocks(initial, goal)
    }

    pub(crate) fn split_mut(&mut self) -> (&mut RobotArm, &mut TableState) {
        (&mut self.arm, &mut self.current)
    }

    pub(crate) fn arm_mut(&mut self) -> &mut RobotArm {
        &mut self.arm
    }

    pub(crate) fn top_symbol(&self, location: Location) -> Option<Symbol> {
        self.current.top(location).map(|block| block.symbol)
    }

    pub(crate) fn pop_top(&mut self, location: Location) -> Option<Block> {
        self.current.pop(location)
    }

    pub(crate) fn push_top(&mut self, location: Location, block: Block) {
        self.current.push(location, block);
    }

    /// Appends an executed step to the plan and notifies the observer.
    pub(crate) fn record(&mut self, step: Step) {
        log::trace!("step {}: {}", self.plan.len() + 1, step);
        if let Some(observer) = self.observer.as_mut() {
            observer.on_step(&step, &self.current, &self.arm);
        }
        self.plan.push(step);
    }
}

/// Both states must contain exactly the same blocks, duplicates counted.
fn check_same_blocks(initial: &TableState, goal: &TableState) -> Result<(), SolveError> {
    let mut goal_counts: FxHashMap<Symbol, usize> = FxHashMap::default();
    for block in goal.blocks() {
        *goal_counts.entry(block.symbol).or_insert(0) += 1;
    }
    for block in initial.blocks() {
        match goal_counts.get_mut(&block.symbol) {
            Some(count) if *count > 0 => *count -= 1,
            _ => {
                return Err(SolveError::BlockSetMismatch {
                    symbol: block.symbol,
                })
            }
        }
    }
    for (symbol, count) in goal_counts {
        if count > 0 {
            return Err(SolveError::BlockSetMismatch { symbol });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Symbol = Symbol::new('A');
    const B: Symbol = Symbol::new('B');
    const C: Symbol = Symbol::new('C');
    const D: Symbol = Symbol::new('D');

    fn demo_initial() -> TableState {
        TableState::from_layout([vec![A], vec![B], vec![C, D], vec![]])
    }

    fn demo_goal() -> TableState {
        TableState::from_layout([vec![], vec![C, D], vec![], vec![A, B]])
    }

    #[test]
    fn goal_comparison_is_reflexive() {
        let mut session = Session::new();
        session.configure(demo_initial(), demo_initial()).unwrap();
        assert_eq!(session.is_goal_state_reached(), Ok(true));
        assert!(session.is_solved());
    }

    #[test]
    fn unregistered_states_never_match() {
        let session = Session::new();
        assert_eq!(session.is_goal_state_reached(), Ok(false));
        assert!(!session.is_solved());
    }

    #[test]
    fn differing_cardinalities_do_not_match() {
        let mut session = Session::new();
        session.register_initial_state(TableState::from_layout([
            vec![A, B],
            vec![],
            vec![],
            vec![],
        ]));
        session.register_goal_state(TableState::from_layout([vec![A], vec![], vec![], vec![]]));
        session.register_solver(Solver::new());
        assert_eq!(session.is_goal_state_reached(), Ok(false));
    }

    #[test]
    fn mismatched_block_sets_fail_configuration() {
        let mut session = Session::new();
        let err = session
            .configure(
                TableState::from_layout([vec![A], vec![], vec![], vec![]]),
                TableState::from_layout([vec![B], vec![], vec![], vec![]]),
            )
            .unwrap_err();
        assert!(matches!(err, SolveError::BlockSetMismatch { .. }));

        // Nothing was registered, so the session stays configurable.
        session.configure(demo_initial(), demo_goal()).unwrap();
    }

    #[test]
    fn second_configuration_is_rejected() {
        let mut session = Session::new();
        session.configure(demo_initial(), demo_goal()).unwrap();
        assert_eq!(
            session.configure(demo_initial(), demo_goal()),
            Err(SolveError::AlreadyInitialized)
        );
    }

    #[test]
    fn running_without_a_solver_fails() {
        let mut session = Session::new();
        assert_eq!(session.run(), Err(SolveError::NotConfigured));
    }

    #[test]
    fn block_at_goal_is_a_stable_query() {
        let mut session = Session::new();
        session.configure(demo_initial(), demo_goal()).unwrap();
        let block = session.current().find(D).unwrap().clone();
        let first = session.is_block_at_goal(&block);
        let second = session.is_block_at_goal(&block);
        assert_eq!(first, second);
        assert!(!first, "D belongs at L2 but sits at L3");
    }

    #[test]
    fn location_emptiness_tracks_the_working_state() {
        let mut session = Session::new();
        assert!(session.is_location_empty(Location::L1));
        session.configure(demo_initial(), demo_goal()).unwrap();
        assert!(!session.is_location_empty(Location::L3));
        assert!(session.is_location_empty(Location::L4));
    }

    #[test]
    fn snapshot_reflects_the_working_state() {
        let mut session = Session::new();
        session.configure(demo_initial(), demo_goal()).unwrap();
        let snapshot = session.query_state();
        assert_eq!(snapshot.arm, ArmState::Empty);
        assert_eq!(snapshot.holding, None);
        assert_eq!(snapshot.table.block_count(), 4);
    }
}
