//! Geometry kernel trait and the built-in planar implementation.

use super::polygon::{Point, Polygon};

/// The geometric predicates the packing engine relies on.
///
/// Implementations must be pure: the same inputs always give the same
/// answer, and no call mutates shared state visible to the engine.
///
/// # Semantics
///
/// - `contains(outer, inner)`: every point of `inner` lies in `outer`;
///   boundaries may touch.
/// - `intersects(a, b)`: the interiors of `a` and `b` share area.
///   Polygons that only touch along edges or at vertices do not intersect.
pub trait GeometryKernel: Send + Sync + std::fmt::Debug {
    /// Whether `inner` lies fully inside `outer`.
    fn contains(&self, outer: &Polygon, inner: &Polygon) -> bool;

    /// Whether the interiors of `a` and `b` overlap.
    fn intersects(&self, a: &Polygon, b: &Polygon) -> bool;

    /// Unsigned area.
    fn area(&self, polygon: &Polygon) -> f64;

    /// Length of the boundary.
    fn perimeter(&self, polygon: &Polygon) -> f64;
}

/// Kernel for simple (possibly non-convex) polygons.
///
/// Uses orientation tests with a small absolute tolerance. Exact for the
/// integer coordinates found in packing instances.
///
/// Overlap is detected in two stages: a proper crossing between any two
/// edges, or a piece of one boundary running through the other's interior.
/// Boundary pieces that coincide with the other polygon's boundary are
/// probed a short distance toward their own interior.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarKernel;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Inside,
    Outside,
    Boundary,
}

impl GeometryKernel for PlanarKernel {
    fn contains(&self, outer: &Polygon, inner: &Polygon) -> bool {
        if !outer.bounds().contains_box(&inner.bounds()) {
            return false;
        }
        if any_proper_crossing(outer, inner) {
            return false;
        }
        // Inner boundary must stay in the closed outer region, and where it
        // runs along the outer boundary its interior side must face inward.
        let inner_escapes = boundary_pieces(inner, outer).any(|(m, normal)| {
            match locate(m, outer) {
                Location::Inside => false,
                Location::Outside => true,
                Location::Boundary => locate(probe(m, normal), outer) == Location::Outside,
            }
        });
        if inner_escapes {
            return false;
        }
        // Outer boundary may not pass through the inner interior (notches).
        !boundary_pieces(outer, inner).any(|(m, normal)| match locate(m, inner) {
            Location::Inside => true,
            Location::Outside => false,
            Location::Boundary => {
                locate(probe(m, (-normal.0, -normal.1)), inner) == Location::Inside
            }
        })
    }

    fn intersects(&self, a: &Polygon, b: &Polygon) -> bool {
        if !a.bounds().overlaps(&b.bounds()) {
            return false;
        }
        any_proper_crossing(a, b) || boundary_enters(a, b) || boundary_enters(b, a)
    }

    fn area(&self, polygon: &Polygon) -> f64 {
        polygon.signed_area().abs()
    }

    fn perimeter(&self, polygon: &Polygon) -> f64 {
        polygon
            .edges()
            .map(|((x1, y1), (x2, y2))| ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt())
            .sum()
    }
}

/// Cross product of `(b - a) × (c - a)`.
fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn sign(v: f64) -> i8 {
    if v > EPS {
        1
    } else if v < -EPS {
        -1
    } else {
        0
    }
}

/// Segments cross at a single point interior to both.
fn crosses_properly(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let o1 = sign(orient(p1, p2, q1));
    let o2 = sign(orient(p1, p2, q2));
    let o3 = sign(orient(q1, q2, p1));
    let o4 = sign(orient(q1, q2, p2));
    o1 * o2 < 0 && o3 * o4 < 0
}

fn any_proper_crossing(a: &Polygon, b: &Polygon) -> bool {
    a.edges().any(|(p1, p2)| {
        b.edges()
            .any(|(q1, q2)| crosses_properly(p1, p2, q1, q2))
    })
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
    if len < EPS {
        return (p.0 - a.0).abs() < EPS && (p.1 - a.1).abs() < EPS;
    }
    orient(a, b, p).abs() / len < EPS
        && p.0 >= a.0.min(b.0) - EPS
        && p.0 <= a.0.max(b.0) + EPS
        && p.1 >= a.1.min(b.1) - EPS
        && p.1 <= a.1.max(b.1) + EPS
}

/// Classifies a point against a polygon (boundary first, then ray casting).
fn locate(p: Point, polygon: &Polygon) -> Location {
    if polygon.edges().any(|(a, b)| on_segment(p, a, b)) {
        return Location::Boundary;
    }
    let (px, py) = p;
    let mut inside = false;
    for ((xi, yi), (xj, yj)) in polygon.edges() {
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
    }
    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}

/// Splits every edge of `subject` at the vertices of `other` lying on it,
/// and yields each piece's midpoint with the unit normal pointing into
/// `subject`'s interior.
fn boundary_pieces<'a>(
    subject: &'a Polygon,
    other: &'a Polygon,
) -> impl Iterator<Item = (Point, Point)> + 'a {
    let ccw = subject.signed_area() > 0.0;
    subject.edges().flat_map(move |(a, b)| {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        let normal = if len < EPS {
            (0.0, 0.0)
        } else if ccw {
            (-dy / len, dx / len)
        } else {
            (dy / len, -dx / len)
        };

        let mut cuts = vec![0.0, 1.0];
        if len >= EPS {
            cuts.extend(
                other
                    .vertices()
                    .iter()
                    .filter(|&&v| on_segment(v, a, b))
                    .map(|&(vx, vy)| ((vx - a.0) * dx + (vy - a.1) * dy) / (len * len))
                    .filter(|t| *t > EPS && *t < 1.0 - EPS),
            );
        }
        cuts.sort_by(|x, y| x.total_cmp(y));
        cuts.dedup_by(|x, y| (*x - *y).abs() < EPS);

        let pieces: Vec<(Point, Point)> = cuts
            .windows(2)
            .map(|w| {
                let t = (w[0] + w[1]) / 2.0;
                ((a.0 + t * dx, a.1 + t * dy), normal)
            })
            .collect();
        pieces
    })
}

/// A point a short distance from `m` along `normal`.
fn probe(m: Point, normal: Point) -> Point {
    const DELTA: f64 = 1e-4;
    (m.0 + normal.0 * DELTA, m.1 + normal.1 * DELTA)
}

/// Some piece of `a`'s boundary reaches into `b`'s interior, or runs along
/// `b`'s boundary with both interiors on the same side.
fn boundary_enters(a: &Polygon, b: &Polygon) -> bool {
    boundary_pieces(a, b).any(|(m, normal)| match locate(m, b) {
        Location::Inside => true,
        Location::Outside => false,
        Location::Boundary => locate(probe(m, normal), b) == Location::Inside,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Polygon {
        Polygon::rectangle(x, y, w, h).unwrap()
    }

    /// L-shaped polygon occupying [0,20]x[0,10] ∪ [0,10]x[10,20].
    fn ell() -> Polygon {
        Polygon::new(vec![
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, 10.0),
            (10.0, 10.0),
            (10.0, 20.0),
            (0.0, 20.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_area_and_perimeter() {
        let k = PlanarKernel;
        assert!((k.area(&rect(0.0, 0.0, 3.0, 4.0)) - 12.0).abs() < 1e-12);
        assert!((k.perimeter(&rect(0.0, 0.0, 3.0, 4.0)) - 14.0).abs() < 1e-12);
        assert!((k.area(&ell()) - 300.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_polygons_intersect() {
        let k = PlanarKernel;
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(k.intersects(&a, &a.clone()));
    }

    #[test]
    fn test_edge_contact_is_not_overlap() {
        let k = PlanarKernel;
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(!k.intersects(&a, &rect(10.0, 0.0, 10.0, 10.0)));
        assert!(!k.intersects(&a, &rect(10.0, 10.0, 5.0, 5.0)));
        assert!(!k.intersects(&a, &rect(10.0, 3.0, 5.0, 4.0)));
    }

    #[test]
    fn test_cross_shaped_overlap() {
        let k = PlanarKernel;
        assert!(k.intersects(&rect(0.0, 4.0, 10.0, 2.0), &rect(4.0, 0.0, 2.0, 10.0)));
    }

    #[test]
    fn test_nested_polygon_overlaps() {
        let k = PlanarKernel;
        let outer = rect(0.0, 0.0, 10.0, 10.0);
        let inner = rect(2.0, 2.0, 1.0, 1.0);
        assert!(k.intersects(&outer, &inner));
        assert!(k.intersects(&inner, &outer));
    }

    #[test]
    fn test_shared_partial_edge_overlap() {
        let k = PlanarKernel;
        // B's bottom-left corner sits on A's bottom edge.
        assert!(k.intersects(&rect(0.0, 0.0, 10.0, 10.0), &rect(5.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_square_in_concave_notch() {
        let k = PlanarKernel;
        let l = ell();
        // The notch [10,20]x[10,20] is empty space.
        let in_notch = rect(10.0, 10.0, 10.0, 10.0);
        assert!(!k.intersects(&l, &in_notch));
        assert!(k.intersects(&l, &rect(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn test_contains_with_boundary_contact() {
        let k = PlanarKernel;
        let container = rect(0.0, 0.0, 100.0, 100.0);
        assert!(k.contains(&container, &rect(0.0, 0.0, 50.0, 50.0)));
        assert!(k.contains(&container, &container.clone()));
        assert!(k.contains(&container, &rect(50.0, 50.0, 50.0, 50.0)));
        assert!(!k.contains(&container, &rect(60.0, 60.0, 50.0, 50.0)));
    }

    #[test]
    fn test_concave_container_rejects_notch() {
        let k = PlanarKernel;
        let l = ell();
        assert!(k.contains(&l, &rect(0.0, 0.0, 20.0, 10.0)));
        assert!(k.contains(&l, &rect(0.0, 0.0, 10.0, 20.0)));
        // Bounding box fits, but the square covers the notch corner.
        assert!(!k.contains(&l, &rect(5.0, 5.0, 10.0, 10.0)));
        assert!(!k.contains(&l, &rect(12.0, 12.0, 4.0, 4.0)));
    }

    #[test]
    fn test_triangle_container() {
        let k = PlanarKernel;
        let tri = Polygon::new(vec![(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]).unwrap();
        assert!(k.contains(&tri, &rect(0.0, 0.0, 40.0, 40.0)));
        assert!(!k.contains(&tri, &rect(0.0, 0.0, 60.0, 60.0)));
    }

    #[test]
    fn test_clockwise_input_behaves_the_same() {
        let k = PlanarKernel;
        let ccw = rect(0.0, 0.0, 10.0, 10.0);
        let cw = Polygon::new(ccw.vertices().iter().rev().copied().collect()).unwrap();
        assert!(k.intersects(&cw, &ccw));
        assert!(k.contains(&cw, &rect(1.0, 1.0, 2.0, 2.0)));
        assert!(!k.intersects(&cw, &rect(10.0, 0.0, 3.0, 3.0)));
    }

    proptest! {
        // For axis-aligned rectangles, interior overlap is exactly strict
        // bounding-box overlap.
        #[test]
        fn prop_rectangles_match_box_overlap(
            ax in 0i32..50, ay in 0i32..50, aw in 1i32..30, ah in 1i32..30,
            bx in 0i32..50, by in 0i32..50, bw in 1i32..30, bh in 1i32..30,
        ) {
            let a = rect(ax as f64, ay as f64, aw as f64, ah as f64);
            let b = rect(bx as f64, by as f64, bw as f64, bh as f64);
            let expected = a.bounds().overlaps(&b.bounds());
            prop_assert_eq!(PlanarKernel.intersects(&a, &b), expected);
            prop_assert_eq!(PlanarKernel.intersects(&b, &a), expected);
        }

        #[test]
        fn prop_rectangles_match_box_containment(
            ax in 0i32..50, ay in 0i32..50, aw in 1i32..60, ah in 1i32..60,
            bx in 0i32..50, by in 0i32..50, bw in 1i32..30, bh in 1i32..30,
        ) {
            let outer = rect(ax as f64, ay as f64, aw as f64, ah as f64);
            let inner = rect(bx as f64, by as f64, bw as f64, bh as f64);
            prop_assert_eq!(
                PlanarKernel.contains(&outer, &inner),
                outer.bounds().contains_box(&inner.bounds())
            );
        }
    }
}
