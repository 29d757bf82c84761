//! Planar geometry used by the packing engine.
//!
//! The engine never inspects polygon edges itself. Every containment,
//! overlap, area and perimeter question goes through a [`GeometryKernel`],
//! so the placement logic does not depend on which geometry backend
//! answers it.
//!
//! # Key Types
//!
//! - [`Polygon`]: closed vertex loop with a cached [`BoundingBox`]
//! - [`GeometryKernel`]: the four predicates the engine needs
//! - [`PlanarKernel`]: exact-orientation implementation for simple polygons

mod kernel;
mod polygon;

pub use kernel::{GeometryKernel, PlanarKernel};
pub use polygon::{BoundingBox, Point, Polygon};
