//! Containers and packing instances.

use super::shape::{Shape, ShapeCatalog, ShapeId};
use crate::error::{PackError, Result};
use crate::geometry::{BoundingBox, GeometryKernel, PlanarKernel, Point, Polygon};
use std::sync::Arc;

/// The fixed boundary every placed shape must fit inside.
#[derive(Debug, Clone)]
pub struct Container {
    polygon: Polygon,
    area: f64,
}

impl Container {
    /// Boundary polygon.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Boundary bounding box.
    pub fn bounds(&self) -> BoundingBox {
        self.polygon.bounds()
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        self.area
    }
}

/// One entry of an instance's item list before quantity expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    /// Local-frame vertex loop.
    pub vertices: Vec<Point>,
    /// Number of physical copies (0 skips the item).
    pub quantity: usize,
    /// Value of each copy.
    pub value: f64,
}

impl ItemSpec {
    /// Creates an item spec.
    pub fn new(vertices: Vec<Point>, quantity: usize, value: f64) -> Self {
        Self {
            vertices,
            quantity,
            value,
        }
    }
}

/// A container, its shape catalog, and the geometry kernel that answers
/// every feasibility question about them.
///
/// Read-only once built; share it between tasks with `Arc`.
#[derive(Debug)]
pub struct PackingInstance {
    name: String,
    container: Container,
    catalog: ShapeCatalog,
    /// `(first id, quantity)` per input item, skipped items included.
    item_ranges: Vec<(usize, usize)>,
    kernel: Arc<dyn GeometryKernel>,
}

impl PackingInstance {
    /// Builds an instance backed by the [`PlanarKernel`].
    pub fn new(name: impl Into<String>, container: Vec<Point>, items: Vec<ItemSpec>) -> Result<Self> {
        Self::with_kernel(name, container, items, Arc::new(PlanarKernel))
    }

    /// Builds an instance backed by a custom kernel.
    ///
    /// Items are expanded by quantity in input order; the `k`-th copy of
    /// item `i` records `item_index = i`, `copy = k`.
    ///
    /// # Errors
    /// [`PackError::DegeneratePolygon`] for the container or any item with
    /// fewer than three vertices or zero area.
    pub fn with_kernel(
        name: impl Into<String>,
        container: Vec<Point>,
        items: Vec<ItemSpec>,
        kernel: Arc<dyn GeometryKernel>,
    ) -> Result<Self> {
        let polygon = Polygon::new(container)?;
        let area = kernel.area(&polygon);
        if area <= 0.0 {
            return Err(PackError::DegeneratePolygon("container has zero area".into()));
        }
        let container = Container { polygon, area };

        let mut shapes = Vec::new();
        let mut item_ranges = Vec::with_capacity(items.len());
        for (item_index, item) in items.into_iter().enumerate() {
            item_ranges.push((shapes.len(), item.quantity));
            if item.quantity == 0 {
                log::debug!("item {item_index} has quantity 0, skipping");
                continue;
            }
            let polygon = Polygon::new(item.vertices)?;
            let area = kernel.area(&polygon);
            if area <= 0.0 {
                return Err(PackError::DegeneratePolygon(format!(
                    "item {item_index} has zero area"
                )));
            }
            for copy in 0..item.quantity {
                let id = ShapeId(shapes.len());
                shapes.push(Shape::new(id, item_index, copy, polygon.clone(), item.value, area));
            }
        }

        Ok(Self {
            name: name.into(),
            container,
            catalog: ShapeCatalog::from_shapes(shapes),
            item_ranges,
            kernel,
        })
    }

    /// Instance name, echoed into exported solutions.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The container.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The expanded shape catalog.
    pub fn catalog(&self) -> &ShapeCatalog {
        &self.catalog
    }

    /// The geometry kernel.
    pub fn kernel(&self) -> &dyn GeometryKernel {
        self.kernel.as_ref()
    }

    /// Shorthand for `catalog().get(id)`.
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.catalog.get(id)
    }

    /// Finds the id of copy `copy` of catalog item `item_index`.
    ///
    /// Copies of one item have contiguous ids, so this is O(1).
    pub fn shape_id(&self, item_index: usize, copy: usize) -> Option<ShapeId> {
        let &(first, quantity) = self.item_ranges.get(item_index)?;
        (copy < quantity).then_some(ShapeId(first + copy))
    }
}
