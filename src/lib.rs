//! Value-maximizing packing of polygons into a polygonal container.
//!
//! Given a container and a catalog of polygonal items (each with a
//! quantity and a value), find translations for a subset of the items so
//! that every placed item lies inside the container, no two placed items
//! overlap, and the total value is as high as possible.
//!
//! - **Geometry**: polygon primitives and the [`GeometryKernel`](geometry::GeometryKernel)
//!   trait answering containment and interior-overlap queries.
//! - **Model**: immutable shapes and containers behind an `Arc`, and
//!   [`Solution`](model::Solution), an offset map with in-place trial and
//!   rollback.
//! - **Heuristics**: corner-anchored first-fit placement, greedy and
//!   random fills, and directional push compaction with backfill.
//! - **Genetic search**: a population controller that seeds with fills,
//!   mutates with push orderings, and recombines by re-packing the union of
//!   two parents, in parallel on rayon's pool.
//! - **I/O**: instance files, solution records, and a base-generation
//!   cache in JSON.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use u_polypack::ga::{PackConfig, PopulationController};
//! use u_polypack::model::{ItemSpec, PackingInstance};
//!
//! let square = |s: f64| vec![(0.0, 0.0), (s, 0.0), (s, s), (0.0, s)];
//! let instance = PackingInstance::new(
//!     "demo",
//!     square(100.0),
//!     vec![ItemSpec::new(square(50.0), 4, 10.0)],
//! )?;
//! let config = PackConfig::default().with_population_size(4).with_seed(1);
//! let result = PopulationController::new(Arc::new(instance), config)?.run();
//! assert!(result.best.is_valid());
//! # Ok::<(), u_polypack::PackError>(())
//! ```
//!
//! The library only emits `log` records; installing a logger is up to the
//! caller.

pub mod error;
pub mod ga;
pub mod geometry;
pub mod heuristic;
pub mod io;
pub mod model;

pub use error::{PackError, Result};
