//! Corner-anchored placement.

use crate::geometry::Point;
use crate::model::{ShapeId, Solution};
use std::fmt;
use std::sync::Arc;

/// The container corner a placement scan is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    /// Lowest, then leftmost.
    BottomLeft,
    /// Highest, then leftmost.
    TopLeft,
    /// Lowest, then rightmost.
    BottomRight,
    /// Highest, then rightmost.
    TopRight,
}

impl Corner {
    /// All four corners.
    pub const ALL: [Corner; 4] = [
        Corner::BottomLeft,
        Corner::TopLeft,
        Corner::BottomRight,
        Corner::TopRight,
    ];

    /// Axis signs of the mirrored frame in which this corner is bottom-left.
    fn signs(self) -> (f64, f64) {
        match self {
            Corner::BottomLeft => (1.0, 1.0),
            Corner::TopLeft => (1.0, -1.0),
            Corner::BottomRight => (-1.0, 1.0),
            Corner::TopRight => (-1.0, -1.0),
        }
    }

    /// Kebab-case name, used in logs and solution metadata.
    pub fn name(self) -> &'static str {
        match self {
            Corner::BottomLeft => "bottom-left",
            Corner::TopLeft => "top-left",
            Corner::BottomRight => "bottom-right",
            Corner::TopRight => "top-right",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Greedy bottom-left-fill style placement, mirrored to any corner.
///
/// # Algorithm (shown for bottom-left)
///
/// 1. Candidates: the container's extreme vertex (min x, then min y), that
///    vertex shifted by the shape's bounding-box size, and every container
///    vertex.
/// 2. For each placed shape: one unit right-and-above the bottom-right and
///    the top-left corners of its bounding box.
/// 3. Deduplicate and scan lowest first, then leftmost.
/// 4. Align the shape's bounding-box minimum to each candidate and keep the
///    first position that fits.
///
/// The other corners run the same scan in a frame mirrored along x and/or
/// y. Candidates are container-frame points, so the result depends only on
/// the solution state and the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerPlacer {
    corner: Corner,
}

impl CornerPlacer {
    /// A placer anchored to `corner`.
    pub fn new(corner: Corner) -> Self {
        Self { corner }
    }

    /// The anchor corner.
    pub fn corner(&self) -> Corner {
        self.corner
    }

    /// Candidate anchor points for `id` in scan order, container frame.
    ///
    /// Each point is where the shape's corner-side bounding-box corner would
    /// go. Empty if `id` is not in the catalog.
    pub fn candidates(&self, solution: &Solution, id: ShapeId) -> Vec<Point> {
        let instance = solution.instance();
        let Some(shape) = instance.shape(id) else {
            return Vec::new();
        };
        let (sx, sy) = self.corner.signs();
        let mirror = |(x, y): Point| (sx * x, sy * y);

        let vertices: Vec<Point> = instance
            .container()
            .polygon()
            .vertices()
            .iter()
            .map(|&p| mirror(p))
            .collect();
        let mut points = vertices.clone();
        if let Some(&(ex, ey)) = vertices
            .iter()
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)))
        {
            let size = shape.bounds();
            points.push((ex, ey));
            points.push((ex + size.width(), ey + size.height()));
        }

        for placed in solution.placed_ids() {
            let Some(b) = solution.placed_bounds(placed) else {
                continue;
            };
            let (min_x, max_x) = if sx > 0.0 {
                (b.min_x, b.max_x)
            } else {
                (-b.max_x, -b.min_x)
            };
            let (min_y, max_y) = if sy > 0.0 {
                (b.min_y, b.max_y)
            } else {
                (-b.max_y, -b.min_y)
            };
            points.push((max_x + 1.0, min_y + 1.0));
            points.push((min_x + 1.0, max_y + 1.0));
        }

        points.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.total_cmp(&b.0)));
        points.dedup();
        points.into_iter().map(mirror).collect()
    }

    /// Offset that puts the shape's corner-side bounding-box corner on
    /// `anchor`.
    fn offset_for(&self, solution: &Solution, id: ShapeId, anchor: Point) -> Option<Point> {
        let b = solution.instance().shape(id)?.bounds();
        let (sx, sy) = self.corner.signs();
        let corner_x = if sx > 0.0 { b.min_x } else { b.max_x };
        let corner_y = if sy > 0.0 { b.min_y } else { b.max_y };
        Some((anchor.0 - corner_x, anchor.1 - corner_y))
    }

    /// Places an unplaced shape at the first feasible candidate.
    ///
    /// Returns the committed offset, or `None` when the shape is already
    /// placed, larger than the remaining area, or no candidate fits. A
    /// failed scan leaves the solution unchanged.
    pub fn place(&self, solution: &mut Solution, id: ShapeId) -> Option<Point> {
        let instance = Arc::clone(solution.instance());
        let shape = instance.shape(id)?;
        if solution.contains(id) {
            return None;
        }
        if shape.area() > solution.remaining_area() {
            log::debug!(
                "shape {id} skipped at {}: area {} exceeds remaining {}",
                self.corner,
                shape.area(),
                solution.remaining_area()
            );
            return None;
        }

        for anchor in self.candidates(solution, id) {
            let Some(offset) = self.offset_for(solution, id, anchor) else {
                continue;
            };
            if solution.try_place(id, offset) {
                return Some(offset);
            }
        }
        log::debug!("no {} placement found for shape {id}", self.corner);
        None
    }
}
