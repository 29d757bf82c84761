//! Whole-solution construction from an ordered shape list.

use super::corner::{Corner, CornerPlacer};
use crate::geometry::Point;
use crate::model::{PackingInstance, ShapeId, Solution};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;

/// Order in which a fill offers shapes to the placer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementOrder {
    /// Value per unit area, highest first.
    Density,
    /// Intrinsic value, highest first.
    Value,
    /// Area, smallest first.
    AreaAscending,
    /// Seeded shuffle.
    Random,
}

impl PlacementOrder {
    /// Kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            PlacementOrder::Density => "density",
            PlacementOrder::Value => "value",
            PlacementOrder::AreaAscending => "area",
            PlacementOrder::Random => "random",
        }
    }
}

/// How one base-generation individual is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeedStrategy {
    /// Shape order.
    pub order: PlacementOrder,
    /// Anchor corner of the placer.
    pub corner: Corner,
}

impl SeedStrategy {
    /// Greedy density-ordered fill toward `corner`.
    pub fn greedy(corner: Corner) -> Self {
        Self {
            order: PlacementOrder::Density,
            corner,
        }
    }

    /// Random-order fill toward `corner`, with random-offset retries.
    pub fn random(corner: Corner) -> Self {
        Self {
            order: PlacementOrder::Random,
            corner,
        }
    }

    /// Strategy for the `index`-th individual of a base generation.
    ///
    /// The four corner greedy fills come first, then value-ordered and
    /// area-ordered bottom-left fills, then random-order fills cycling
    /// through the corners.
    pub fn cycle(index: usize) -> Self {
        match index {
            0..=3 => Self::greedy(Corner::ALL[index]),
            4 => Self {
                order: PlacementOrder::Value,
                corner: Corner::BottomLeft,
            },
            5 => Self {
                order: PlacementOrder::AreaAscending,
                corner: Corner::BottomLeft,
            },
            _ => Self::random(Corner::ALL[(index - 6) % 4]),
        }
    }

    /// `order/corner` label stored in solution metadata.
    pub fn label(&self) -> String {
        format!("{}/{}", self.order.name(), self.corner.name())
    }
}

/// Sorts `ids` by a deterministic priority, ties by ascending id.
///
/// [`PlacementOrder::Random`] leaves the slice untouched; shuffle it with
/// the caller's RNG instead.
pub fn rank(instance: &PackingInstance, ids: &mut [ShapeId], order: PlacementOrder) {
    let key = |id: &ShapeId| instance.shape(*id).map(|s| (s.density(), s.value(), s.area()));
    match order {
        PlacementOrder::Density => ids.sort_by(|a, b| {
            let (ka, kb) = (key(a), key(b));
            let da = ka.map_or(f64::NEG_INFINITY, |k| k.0);
            let db = kb.map_or(f64::NEG_INFINITY, |k| k.0);
            db.total_cmp(&da).then(a.cmp(b))
        }),
        PlacementOrder::Value => ids.sort_by(|a, b| {
            let va = key(a).map_or(f64::NEG_INFINITY, |k| k.1);
            let vb = key(b).map_or(f64::NEG_INFINITY, |k| k.1);
            vb.total_cmp(&va).then(a.cmp(b))
        }),
        PlacementOrder::AreaAscending => ids.sort_by(|a, b| {
            let aa = key(a).map_or(f64::INFINITY, |k| k.2);
            let ab = key(b).map_or(f64::INFINITY, |k| k.2);
            aa.total_cmp(&ab).then(a.cmp(b))
        }),
        PlacementOrder::Random => {}
    }
}

/// Offers each shape in `ids` to the corner placer. Returns how many were
/// placed.
pub fn greedy_fill(solution: &mut Solution, ids: &[ShapeId], corner: Corner) -> usize {
    let placer = CornerPlacer::new(corner);
    ids.iter()
        .filter(|&&id| placer.place(solution, id).is_some())
        .count()
}

/// Like [`greedy_fill`], but a shape the corner scan cannot place gets up
/// to `retries` uniformly sampled integer offsets.
///
/// Offsets are drawn from the range that keeps the shape's bounding box
/// inside the container's bounding box.
pub fn random_fill<R: Rng>(
    solution: &mut Solution,
    ids: &[ShapeId],
    corner: Corner,
    retries: usize,
    rng: &mut R,
) -> usize {
    let placer = CornerPlacer::new(corner);
    let mut placed = 0;
    for &id in ids {
        if placer.place(solution, id).is_some()
            || random_offset(solution, id, retries, rng).is_some()
        {
            placed += 1;
        }
    }
    placed
}

/// Tries up to `retries` random offsets for an unplaced shape.
fn random_offset<R: Rng>(
    solution: &mut Solution,
    id: ShapeId,
    retries: usize,
    rng: &mut R,
) -> Option<Point> {
    let instance = Arc::clone(solution.instance());
    let shape = instance.shape(id)?;
    if retries == 0 || solution.contains(id) || shape.area() > solution.remaining_area() {
        return None;
    }
    let c = instance.container().bounds();
    let b = shape.bounds();
    let (lo_x, hi_x) = ((c.min_x - b.min_x).ceil(), (c.max_x - b.max_x).floor());
    let (lo_y, hi_y) = ((c.min_y - b.min_y).ceil(), (c.max_y - b.max_y).floor());
    if lo_x > hi_x || lo_y > hi_y {
        return None;
    }
    for _ in 0..retries {
        let offset = (
            rng.random_range(lo_x as i64..=hi_x as i64) as f64,
            rng.random_range(lo_y as i64..=hi_y as i64) as f64,
        );
        if solution.try_place(id, offset) {
            return Some(offset);
        }
    }
    log::debug!("shape {id}: no random offset found in {retries} tries");
    None
}

/// Builds a fresh solution with `strategy`.
///
/// `rng` is only consumed by [`PlacementOrder::Random`].
pub fn seed_solution<R: Rng>(
    instance: Arc<PackingInstance>,
    strategy: SeedStrategy,
    retries: usize,
    rng: &mut R,
) -> Solution {
    let mut ids: Vec<ShapeId> = instance.catalog().ids().collect();
    let mut solution = Solution::new(Arc::clone(&instance));
    if strategy.order == PlacementOrder::Random {
        ids.shuffle(rng);
        random_fill(&mut solution, &ids, strategy.corner, retries, rng);
    } else {
        rank(&instance, &mut ids, strategy.order);
        greedy_fill(&mut solution, &ids, strategy.corner);
    }
    solution
        .meta_mut()
        .insert("strategy".into(), Value::String(strategy.label()));
    debug_assert!(solution.is_valid());
    solution
}

/// Offers every unplaced shape, densest first, to the corner placer.
pub fn backfill(solution: &mut Solution, corner: Corner) -> usize {
    let mut ids: Vec<ShapeId> = solution.unplaced_ids().collect();
    let instance = Arc::clone(solution.instance());
    rank(&instance, &mut ids, PlacementOrder::Density);
    greedy_fill(solution, &ids, corner)
}
