//! Blocks-World Planner Library
//!
//! Models a one-armed robot rearranging lettered blocks across four table
//! locations, and plans the pick, move and place actions that carry an
//! initial arrangement into a goal arrangement.

pub mod actions;
pub mod arm;
pub mod blocks;
pub mod error;
pub mod render;
pub mod session;
pub mod solver;
