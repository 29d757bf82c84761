//! Constructive placement and local search.
//!
//! - [`CornerPlacer`]: corner-anchored first-fit placement of one shape
//! - [`seed_solution`]: whole-solution fills for the base generation
//! - [`PushSearch`]: directional compaction followed by backfill
//!
//! Every operator here keeps the solution valid after each step.

mod corner;
mod fill;
mod push;

pub use corner::{Corner, CornerPlacer};
pub use fill::{
    backfill, greedy_fill, random_fill, rank, seed_solution, PlacementOrder, SeedStrategy,
};
pub use push::{Direction, PushOrdering, PushSearch};
