//! Candidate packings.

use super::instance::PackingInstance;
use super::shape::{Shape, ShapeId};
use crate::geometry::{BoundingBox, Point, Polygon};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One candidate packing: a subset of the catalog with an offset per shape.
///
/// # Invariants
///
/// Every mutating method keeps the solution valid when it starts valid:
///
/// 1. each placed shape lies inside the container,
/// 2. no two placed shapes overlap,
/// 3. each shape id appears at most once (enforced by the map).
///
/// Failed trial placements and moves are rolled back before returning.
#[derive(Debug, Clone)]
pub struct Solution {
    instance: Arc<PackingInstance>,
    placements: BTreeMap<ShapeId, Point>,
    meta: Map<String, Value>,
}

impl Solution {
    /// An empty packing of `instance`.
    pub fn new(instance: Arc<PackingInstance>) -> Self {
        Self {
            instance,
            placements: BTreeMap::new(),
            meta: Map::new(),
        }
    }

    /// The instance this solution packs.
    pub fn instance(&self) -> &Arc<PackingInstance> {
        &self.instance
    }

    /// Free-form metadata carried into exports.
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    /// Mutable access to the metadata.
    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.meta
    }

    /// Number of placed shapes.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether no shape is placed.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Whether `id` is placed.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.placements.contains_key(&id)
    }

    /// Offset of a placed shape.
    pub fn offset(&self, id: ShapeId) -> Option<Point> {
        self.placements.get(&id).copied()
    }

    /// Placed `(id, offset)` pairs in ascending id order.
    pub fn placements(&self) -> impl Iterator<Item = (ShapeId, Point)> + '_ {
        self.placements.iter().map(|(&id, &offset)| (id, offset))
    }

    /// Placed ids in ascending order.
    pub fn placed_ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.placements.keys().copied()
    }

    /// Catalog ids not in this solution, ascending.
    pub fn unplaced_ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.instance
            .catalog()
            .ids()
            .filter(move |id| !self.placements.contains_key(id))
    }

    /// Whether every catalog shape is placed.
    pub fn is_complete(&self) -> bool {
        self.placements.len() == self.instance.catalog().len()
    }

    /// Container-frame polygon of a placed shape.
    pub fn placed_polygon(&self, id: ShapeId) -> Option<Polygon> {
        let offset = self.offset(id)?;
        Some(self.instance.shape(id)?.placed(offset))
    }

    /// Container-frame bounding box of a placed shape.
    pub fn placed_bounds(&self, id: ShapeId) -> Option<BoundingBox> {
        let offset = self.offset(id)?;
        Some(self.instance.shape(id)?.bounds().translated(offset))
    }

    /// Fitness: sum of the values of the placed shapes.
    pub fn grade(&self) -> f64 {
        self.placed_shapes().map(Shape::value).sum()
    }

    /// Container area minus the area of every placed shape.
    ///
    /// A shape larger than this cannot be added; a smaller one still might
    /// not fit.
    pub fn remaining_area(&self) -> f64 {
        self.instance.container().area() - self.placed_shapes().map(Shape::area).sum::<f64>()
    }

    /// Full validity check: containment of every shape and pairwise
    /// non-overlap. O(n²) kernel calls in the worst case.
    pub fn is_valid(&self) -> bool {
        let kernel = self.instance.kernel();
        let container = self.instance.container();

        let mut placed: Vec<(BoundingBox, Polygon)> = Vec::with_capacity(self.placements.len());
        for &id in self.placements.keys() {
            let Some(polygon) = self.placed_polygon(id) else {
                return false;
            };
            if !container.bounds().contains_box(&polygon.bounds())
                || !kernel.contains(container.polygon(), &polygon)
            {
                return false;
            }
            placed.push((polygon.bounds(), polygon));
        }

        for (i, (bi, pi)) in placed.iter().enumerate() {
            for (bj, pj) in &placed[i + 1..] {
                if bi.overlaps(bj) && kernel.intersects(pi, pj) {
                    return false;
                }
            }
        }
        true
    }

    /// Validity restricted to one placed shape: inside the container and
    /// clear of every other placed shape.
    ///
    /// If every other shape already satisfies the invariants, this is
    /// equivalent to [`is_valid`](Self::is_valid) at O(n) cost.
    pub fn fits(&self, id: ShapeId) -> bool {
        let (Some(shape), Some(offset)) = (self.instance.shape(id), self.offset(id)) else {
            return false;
        };
        let kernel = self.instance.kernel();
        let container = self.instance.container();

        let bounds = shape.bounds().translated(offset);
        if !container.bounds().contains_box(&bounds) {
            return false;
        }
        let polygon = shape.placed(offset);
        if !kernel.contains(container.polygon(), &polygon) {
            return false;
        }

        self.placements
            .iter()
            .filter(|(other, _)| **other != id)
            .all(|(&other, &other_offset)| {
                let Some(other_shape) = self.instance.shape(other) else {
                    return false;
                };
                !bounds.overlaps(&other_shape.bounds().translated(other_offset))
                    || !kernel.intersects(&polygon, &other_shape.placed(other_offset))
            })
    }

    /// Adds an unplaced shape at `offset` if it fits; otherwise leaves the
    /// solution unchanged.
    pub fn try_place(&mut self, id: ShapeId, offset: Point) -> bool {
        if self.instance.shape(id).is_none() || self.placements.contains_key(&id) {
            return false;
        }
        self.placements.insert(id, offset);
        if self.fits(id) {
            true
        } else {
            self.placements.remove(&id);
            false
        }
    }

    /// Moves a placed shape to `offset` if it fits there; otherwise restores
    /// the previous offset.
    pub fn try_move(&mut self, id: ShapeId, offset: Point) -> bool {
        let Some(previous) = self.placements.insert(id, offset) else {
            self.placements.remove(&id);
            return false;
        };
        if self.fits(id) {
            true
        } else {
            self.placements.insert(id, previous);
            false
        }
    }

    /// Removes a placed shape, returning its offset.
    pub fn remove(&mut self, id: ShapeId) -> Option<Point> {
        self.placements.remove(&id)
    }

    /// Inserts a placement without any feasibility check.
    ///
    /// Used when re-binding stored solutions; callers validate afterwards.
    pub(crate) fn insert_unchecked(&mut self, id: ShapeId, offset: Point) {
        self.placements.insert(id, offset);
    }

    fn placed_shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.placements
            .keys()
            .filter_map(move |&id| self.instance.shape(id))
    }
}
