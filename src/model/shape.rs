//! Shapes and the shape catalog.

use crate::geometry::{BoundingBox, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of one physical shape.
///
/// Catalog items with quantity `q` expand into `q` shapes with distinct ids.
/// Ids are dense indices into the [`ShapeCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub usize);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One physical polygon to pack, in its local frame.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    item_index: usize,
    copy: usize,
    polygon: Polygon,
    value: f64,
    area: f64,
}

impl Shape {
    pub(crate) fn new(
        id: ShapeId,
        item_index: usize,
        copy: usize,
        polygon: Polygon,
        value: f64,
        area: f64,
    ) -> Self {
        Self {
            id,
            item_index,
            copy,
            polygon,
            value,
            area,
        }
    }

    /// The shape's identity.
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Index of the catalog item this shape was expanded from.
    pub fn item_index(&self) -> usize {
        self.item_index
    }

    /// 0-based occurrence among the copies of its catalog item.
    pub fn copy(&self) -> usize {
        self.copy
    }

    /// Local-frame polygon.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Local-frame bounding box.
    pub fn bounds(&self) -> BoundingBox {
        self.polygon.bounds()
    }

    /// Intrinsic value gained by placing the shape.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Polygon area.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Value per unit area, used to rank placement priority.
    pub fn density(&self) -> f64 {
        self.value / self.area
    }

    /// The polygon translated by `offset`.
    pub fn placed(&self, offset: Point) -> Polygon {
        self.polygon.translated(offset)
    }
}

/// All shapes of an instance, indexed by [`ShapeId`].
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: Vec<Shape>,
}

impl ShapeCatalog {
    pub(crate) fn from_shapes(shapes: Vec<Shape>) -> Self {
        debug_assert!(shapes.iter().enumerate().all(|(i, s)| s.id == ShapeId(i)));
        Self { shapes }
    }

    /// Looks up a shape.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    /// Number of physical shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterates all shapes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Iterates all ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ShapeId> {
        (0..self.shapes.len()).map(ShapeId)
    }

    /// Sum of all shape values (the grade upper bound).
    pub fn total_value(&self) -> f64 {
        self.shapes.iter().map(|s| s.value).sum()
    }
}
