//! Instance file reader.
//!
//! ```json
//! {
//!   "instance_name": "atris42",
//!   "container": { "x": [0, 100, 100, 0], "y": [0, 0, 100, 100] },
//!   "items": [
//!     { "x": [0, 10, 10, 0], "y": [0, 0, 10, 10], "quantity": 3, "value": 7 }
//!   ]
//! }
//! ```
//!
//! Unknown fields are ignored.

use crate::error::{PackError, Result};
use crate::geometry::{GeometryKernel, PlanarKernel, Point};
use crate::model::{ItemSpec, PackingInstance};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct InstanceFile {
    instance_name: String,
    container: Coordinates,
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    x: Vec<f64>,
    y: Vec<f64>,
    quantity: usize,
    value: f64,
}

fn zip_coordinates(what: String, x: Vec<f64>, y: Vec<f64>) -> Result<Vec<Point>> {
    if x.len() != y.len() {
        return Err(PackError::MismatchedLengths {
            what,
            left: x.len(),
            right: y.len(),
        });
    }
    Ok(x.into_iter().zip(y).collect())
}

/// Parses an instance from JSON text using the [`PlanarKernel`].
///
/// # Errors
/// [`PackError::Json`] for malformed input, [`PackError::MismatchedLengths`]
/// when an `x` and `y` array differ in length, and
/// [`PackError::DegeneratePolygon`] for unusable polygons.
pub fn parse_instance(json: &str) -> Result<PackingInstance> {
    parse_instance_with_kernel(json, Arc::new(PlanarKernel))
}

/// Like [`parse_instance`] with a caller-supplied geometry kernel.
pub fn parse_instance_with_kernel(
    json: &str,
    kernel: Arc<dyn GeometryKernel>,
) -> Result<PackingInstance> {
    let file: InstanceFile = serde_json::from_str(json)?;
    let container = zip_coordinates("container".into(), file.container.x, file.container.y)?;
    let items = file
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let vertices = zip_coordinates(format!("item {i}"), item.x, item.y)?;
            Ok(ItemSpec::new(vertices, item.quantity, item.value))
        })
        .collect::<Result<Vec<_>>>()?;

    let instance = PackingInstance::with_kernel(file.instance_name, container, items, kernel)?;
    log::debug!(
        "instance {}: {} shapes, container area {}",
        instance.name(),
        instance.catalog().len(),
        instance.container().area()
    );
    Ok(instance)
}

/// Reads and parses an instance file.
pub fn load_instance(path: impl AsRef<Path>) -> Result<PackingInstance> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_instance(&text)
}
