//! Genetic search over packings.
//!
//! Individuals are complete [`Solution`](crate::model::Solution)s. The
//! controller composes the stateless heuristics in
//! [`crate::heuristic`]: corner fills seed the base generation, push
//! orderings act as mutation, and corner re-packing of two parents' shape
//! union acts as crossover.
//!
//! # Key Types
//!
//! - [`PackConfig`]: loop parameters (population size, seed, presets)
//! - [`PopulationController`]: runs the evolutionary loop
//! - [`PackResult`]: best solution, termination reason, and history
//!
//! # Submodules
//!
//! - [`operators`]: mutation and crossover on solutions

mod config;
pub mod operators;
mod runner;

pub use config::PackConfig;
pub use runner::{GenerationStats, PackResult, PopulationController, Termination};
