//! # Conflict Planner
//!
//! Builds the undirected [`ConflictGraph`] over intersection element
//! locations and enumerates every maximal independent set into a [`Phase`]
//! (spec §4.B). Runs once, at the end of SET_UP, after the element tables
//! are materialized; the graph and the phase list are immutable for the
//! rest of the process's life (spec §3 Lifecycles).
pub mod graph;
pub mod planner;

pub use graph::{conflicts_tsem_crosswalk, conflicts_tsem_tsem, ConflictGraph};
pub use planner::enumerate_phases;

pub use crate::model::Phase;
