//! JSON file formats.
//!
//! - instance files: container and item polygons with quantity and value
//! - solution records: item indices with parallel translation arrays
//! - base-generation cache: an array of solution records

mod cache;
mod export;
mod instance;

pub use cache::{load_base_generation, save_base_generation};
pub use export::{load_solution, save_solution, SolutionRecord};
pub use instance::{load_instance, parse_instance, parse_instance_with_kernel};
