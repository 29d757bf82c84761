//! Packing data model.
//!
//! Geometry is immutable and lives in a [`PackingInstance`] shared behind an
//! `Arc`. Placement state (one offset per placed shape) lives in a
//! [`Solution`], so cloning a solution for a parallel task copies only the
//! offset map.

mod instance;
mod shape;
mod solution;

pub use instance::{Container, ItemSpec, PackingInstance};
pub use shape::{Shape, ShapeCatalog, ShapeId};
pub use solution::Solution;
