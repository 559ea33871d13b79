//! Core data model for the block world: block labels, table locations,
//! per-block placement state and the table itself.
//!
//! A table holds four fixed locations, each carrying one stack of blocks
//! ordered bottom-to-top. Block relationships (`on`, `below`) are recorded
//! as symbol references into the same table, never as owned sub-blocks.

use std::fmt;

/// A block's unique single-character label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(char);

impl Symbol {
    pub const fn new(label: char) -> Self {
        Symbol(label)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four fixed table locations.
///
/// `L1..L3` are the addressable slots that placement builds goal stacks on.
/// `L4` is the neutral buffer the planner evacuates misplaced blocks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    L1,
    L2,
    L3,
    L4,
}

impl Location {
    /// All locations, in table order.
    pub const ALL: [Location; 4] = [Location::L1, Location::L2, Location::L3, Location::L4];

    /// The locations that receive a placement pass.
    pub const TARGETS: [Location; 3] = [Location::L1, Location::L2, Location::L3];

    /// The neutral buffer location.
    pub const BUFFER: Location = Location::L4;

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Location::L1 => "L1",
            Location::L2 => "L2",
            Location::L3 => "L3",
            Location::L4 => "L4",
        };
        f.write_str(name)
    }
}

/// Where a block sits and what it rests on.
///
/// States are replaced wholesale when an action moves a block; nothing
/// edits an individual field outside a rebuilt value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockState {
    /// Symbols beneath this block, bottom-to-top.
    pub below: Vec<Symbol>,
    /// The block this one rests directly on, if any.
    pub on: Option<Symbol>,
    /// Nothing rests on this block.
    pub clear: bool,
    /// This block rests directly on the table.
    pub on_table: bool,
    pub location: Location,
}

impl BlockState {
    /// A block alone on the table at `location`.
    pub fn on_table_at(location: Location) -> Self {
        BlockState {
            below: Vec::new(),
            on: None,
            clear: true,
            on_table: true,
            location,
        }
    }

    /// Whether this state realizes `goal`.
    ///
    /// Compares the resting relation (`on`, `below`, `on_table`) and the
    /// location. `clear` is derived from what currently sits above and
    /// takes no part in the match, so the blocks of a correct partial
    /// stack count as placed while the stack is still being extended.
    pub fn matches_goal(&self, goal: &BlockState) -> bool {
        self.on == goal.on
            && self.below == goal.below
            && self.on_table == goal.on_table
            && self.location == goal.location
    }
}

/// A labelled block together with its current placement state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub symbol: Symbol,
    pub state: BlockState,
}

/// Four location-indexed stacks of blocks, each ordered bottom-to-top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableState {
    stacks: [Vec<Block>; 4],
}

impl TableState {
    pub fn new() -> Self {
        TableState::default()
    }

    /// Builds a table from per-location bottom-to-top symbol sequences.
    ///
    /// The first block of each sequence rests on the table; every later
    /// block rests on its predecessor with `below` listing everything
    /// beneath it; only the final block is clear.
    pub fn from_layout(layout: [Vec<Symbol>; 4]) -> Self {
        let mut table = TableState::new();
        for (location, symbols) in Location::ALL.into_iter().zip(layout) {
            let stack = &mut table.stacks[location.index()];
            for (height, symbol) in symbols.iter().enumerate() {
                let state = BlockState {
                    below: symbols[..height].to_vec(),
                    on: height.checked_sub(1).map(|h| symbols[h]),
                    clear: height + 1 == symbols.len(),
                    on_table: height == 0,
                    location,
                };
                stack.push(Block {
                    symbol: *symbol,
                    state,
                });
            }
        }
        table
    }

    /// The stack at `location`, bottom-to-top.
    pub fn stack(&self, location: Location) -> &[Block] {
        &self.stacks[location.index()]
    }

    pub fn top(&self, location: Location) -> Option<&Block> {
        self.stacks[location.index()].last()
    }

    pub(crate) fn top_mut(&mut self, location: Location) -> Option<&mut Block> {
        self.stacks[location.index()].last_mut()
    }

    pub(crate) fn push(&mut self, location: Location, block: Block) {
        self.stacks[location.index()].push(block);
    }

    pub(crate) fn pop(&mut self, location: Location) -> Option<Block> {
        self.stacks[location.index()].pop()
    }

    /// All blocks on the table, visiting locations in table order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.stacks.iter().flatten()
    }

    pub fn block_count(&self) -> usize {
        self.stacks.iter().map(Vec::len).sum()
    }

    pub fn find(&self, symbol: Symbol) -> Option<&Block> {
        self.blocks().find(|block| block.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Symbol = Symbol::new('A');
    const B: Symbol = Symbol::new('B');
    const C: Symbol = Symbol::new('C');

    #[test]
    fn layout_derives_stack_relations() {
        let table = TableState::from_layout([vec![C, B, A], vec![], vec![], vec![]]);

        let c = table.find(C).unwrap();
        assert!(c.state.on_table);
        assert_eq!(c.state.on, None);
        assert!(c.state.below.is_empty());
        assert!(!c.state.clear, "C has two blocks above it");

        let b = table.find(B).unwrap();
        assert_eq!(b.state.on, Some(C));
        assert_eq!(b.state.below, vec![C]);
        assert!(!b.state.clear);
        assert!(!b.state.on_table);

        let a = table.find(A).unwrap();
        assert_eq!(a.state.on, Some(B));
        assert_eq!(a.state.below, vec![C, B]);
        assert!(a.state.clear, "A tops the stack");
        assert!(!a.state.on_table);

        for block in table.blocks() {
            assert_eq!(block.state.location, Location::L1);
        }
    }

    #[test]
    fn single_block_is_clear_and_on_table() {
        let table = TableState::from_layout([vec![], vec![A], vec![], vec![]]);
        let a = table.find(A).unwrap();
        assert!(a.state.clear);
        assert!(a.state.on_table);
        assert_eq!(a.state.location, Location::L2);
        assert_eq!(table.block_count(), 1);
    }

    #[test]
    fn goal_match_ignores_clear() {
        let full = TableState::from_layout([vec![C, B, A], vec![], vec![], vec![]]);
        let prefix = TableState::from_layout([vec![C, B], vec![], vec![], vec![]]);

        let goal_b = full.find(B).unwrap();
        let current_b = prefix.find(B).unwrap();
        assert!(current_b.state.clear, "top of the partial stack is clear");
        assert!(!goal_b.state.clear);
        assert!(current_b.state.matches_goal(&goal_b.state));
    }

    #[test]
    fn goal_match_requires_same_location() {
        let here = TableState::from_layout([vec![A], vec![], vec![], vec![]]);
        let there = TableState::from_layout([vec![], vec![A], vec![], vec![]]);
        let current = here.find(A).unwrap();
        let goal = there.find(A).unwrap();
        assert!(!current.state.matches_goal(&goal.state));
    }
}
