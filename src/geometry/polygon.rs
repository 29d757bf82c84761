//! Polygon and bounding-box primitives.

use crate::error::{PackError, Result};

/// A point or translation vector `(x, y)`.
pub type Point = (f64, f64);

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum x coordinate.
    pub min_x: f64,
    /// Minimum y coordinate.
    pub min_y: f64,
    /// Maximum x coordinate.
    pub max_x: f64,
    /// Maximum y coordinate.
    pub max_y: f64,
}

impl BoundingBox {
    /// Computes the bounding box of a non-empty point set.
    pub fn of(points: &[Point]) -> Self {
        points.iter().fold(
            Self {
                min_x: f64::INFINITY,
                min_y: f64::INFINITY,
                max_x: f64::NEG_INFINITY,
                max_y: f64::NEG_INFINITY,
            },
            |b, &(x, y)| Self {
                min_x: b.min_x.min(x),
                min_y: b.min_y.min(y),
                max_x: b.max_x.max(x),
                max_y: b.max_y.max(y),
            },
        )
    }

    /// Width along x.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height along y.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the box shifted by `offset`.
    pub fn translated(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.0,
            min_y: self.min_y + offset.1,
            max_x: self.max_x + offset.0,
            max_y: self.max_y + offset.1,
        }
    }

    /// Whether the two boxes share interior area.
    ///
    /// Boxes that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Whether `other` lies inside this box (boundary contact allowed).
    pub fn contains_box(&self, other: &Self) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }
}

/// A closed simple polygon given by its vertex loop.
///
/// The closing edge from the last vertex back to the first is implicit.
/// A repeated first vertex at the end of the input is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
    bounds: BoundingBox,
}

impl Polygon {
    /// Builds a polygon from a vertex loop.
    ///
    /// # Errors
    /// [`PackError::DegeneratePolygon`] if fewer than three distinct
    /// vertices remain.
    pub fn new(mut vertices: Vec<Point>) -> Result<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(PackError::DegeneratePolygon(format!(
                "{} vertices, need at least 3",
                vertices.len()
            )));
        }
        let bounds = BoundingBox::of(&vertices);
        Ok(Self { vertices, bounds })
    }

    /// Builds a polygon from separate x and y coordinate arrays.
    pub fn from_xy(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(PackError::MismatchedLengths {
                what: "polygon coordinates".into(),
                left: xs.len(),
                right: ys.len(),
            });
        }
        Self::new(xs.iter().copied().zip(ys.iter().copied()).collect())
    }

    /// Axis-aligned rectangle `[x, x + w] × [y, y + h]`, counter-clockwise.
    pub fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Result<Self> {
        Self::new(vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)])
    }

    /// The vertex loop.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Cached bounding box.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Iterates the edges `(v[i], v[i + 1])`, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace signed area: positive for counter-clockwise loops.
    pub fn signed_area(&self) -> f64 {
        self.edges()
            .map(|((x1, y1), (x2, y2))| x1 * y2 - x2 * y1)
            .sum::<f64>()
            / 2.0
    }

    /// Returns a copy shifted by `offset`.
    pub fn translated(&self, offset: Point) -> Self {
        let (dx, dy) = offset;
        Self {
            vertices: self.vertices.iter().map(|&(x, y)| (x + dx, y + dy)).collect(),
            bounds: self.bounds.translated(offset),
        }
    }
}
