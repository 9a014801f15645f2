//! Heuristics for minimizing crossings and stretch in layered graphs.
//!
//! A layered graph assigns every node to a numbered layer and only allows
//! edges between adjacent layers; the one degree of freedom is the order
//! of nodes within each layer. This crate implements the classic
//! iterative heuristics over that search space (barycenter and median
//! sweeps, sifting, and the maximum-crossings-edge/node family) against
//! four objectives (total and bottleneck crossings, total and bottleneck
//! stretch), with incremental crossing bookkeeping, per-objective best
//! orders, optional Pareto tracking between a pair of objectives, and a
//! swap-based post-processing pass.
//!
//! The [`engine::Engine`] owns a run: it borrows a [`graph::LayeredGraph`]
//! built by one of the readers ([`sgf`], [`graph_io`]), applies the
//! configured preprocessor and heuristic, and leaves behind a
//! [`stats::RunReport`] plus restorable best orderings.

pub mod crossings;
pub mod dot;
pub mod engine;
pub mod error;
pub mod graph;
pub mod graph_io;
mod heuristics;
pub mod ord;
pub mod sgf;
pub mod sifting;
pub mod sorting;
pub mod stats;
pub mod stretch;

pub use engine::{
    CaptureSink, Engine, EngineConfig, Heuristic, MceOption, Preprocessor, SiftOption,
};
pub use error::{Error, Result};
pub use graph::{LayeredGraph, OrderSnapshot};
pub use sorting::{Orientation, WeightCarry};
pub use stats::{Objective, ParetoMode, RunReport};
