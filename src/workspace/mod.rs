//! The working area a run operates in.
//!
//! Two kinds of transient state live here: artifacts generated by a previous
//! run ([`sweep`]) and the schema tree fetched for the current one ([`tree`]).

pub mod sweep;
pub mod tree;

pub use sweep::{SweepReport, sweep_artifacts};
pub use tree::FetchedTree;
