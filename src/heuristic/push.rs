//! Directional compaction ("push to wall") local search.

use super::corner::Corner;
use super::fill::backfill;
use crate::geometry::Point;
use crate::model::{ShapeId, Solution};
use std::fmt;

/// Bisection stops once the search interval is this narrow.
const TOLERANCE: f64 = 1.0;

/// The container wall shapes are pushed toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward minimum x.
    Left,
    /// Toward maximum x.
    Right,
    /// Toward minimum y.
    Down,
    /// Toward maximum y.
    Up,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
    ];

    /// Unit translation vector.
    fn unit(self) -> Point {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Down => (0.0, -1.0),
            Direction::Up => (0.0, 1.0),
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Corner used to backfill after a single-direction push.
    pub fn corner(self) -> Corner {
        match self {
            Direction::Left | Direction::Down => Corner::BottomLeft,
            Direction::Right => Corner::BottomRight,
            Direction::Up => Corner::TopLeft,
        }
    }

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Up => "up",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two pushes applied in sequence, then a backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushOrdering {
    /// Applied first.
    pub first: Direction,
    /// Applied second.
    pub second: Direction,
}

impl PushOrdering {
    /// The eight compass orderings explored per individual and generation.
    pub const ALL: [PushOrdering; 8] = [
        PushOrdering::new(Direction::Left, Direction::Down),
        PushOrdering::new(Direction::Down, Direction::Left),
        PushOrdering::new(Direction::Up, Direction::Left),
        PushOrdering::new(Direction::Left, Direction::Up),
        PushOrdering::new(Direction::Right, Direction::Down),
        PushOrdering::new(Direction::Down, Direction::Right),
        PushOrdering::new(Direction::Right, Direction::Up),
        PushOrdering::new(Direction::Up, Direction::Right),
    ];

    /// Creates an ordering.
    pub const fn new(first: Direction, second: Direction) -> Self {
        Self { first, second }
    }

    /// The corner both pushes compact toward.
    ///
    /// Falls back to the first direction's corner when both directions are
    /// on the same axis.
    pub fn corner(&self) -> Corner {
        let (h, v) = match (self.first.is_horizontal(), self.second.is_horizontal()) {
            (true, false) => (self.first, self.second),
            (false, true) => (self.second, self.first),
            _ => return self.first.corner(),
        };
        match (h, v) {
            (Direction::Left, Direction::Up) => Corner::TopLeft,
            (Direction::Right, Direction::Down) => Corner::BottomRight,
            (Direction::Right, Direction::Up) => Corner::TopRight,
            _ => Corner::BottomLeft,
        }
    }

    /// `first-second` label.
    pub fn label(&self) -> String {
        format!("{}-{}", self.first, self.second)
    }
}

/// Stateless compaction operators.
///
/// Every operator works on its own clone of the input, keeps every placed
/// shape, and only adds shapes during backfill, so the returned grade is
/// never lower than the input grade.
pub struct PushSearch;

impl PushSearch {
    /// Slides every placed shape toward `direction` as far as it goes,
    /// in place. Returns the number of shapes that moved.
    ///
    /// Shapes nearest the target wall move first. Each one first tries the
    /// full distance to the container's bounding box, then bisects between
    /// its current position (feasible) and the wall (blocked) on integer
    /// midpoints until the gap is at most one unit.
    pub fn compact(solution: &mut Solution, direction: Direction) -> usize {
        let container = solution.instance().container().bounds();
        let mut queue: Vec<(f64, ShapeId)> = solution
            .placed_ids()
            .filter_map(|id| {
                let b = solution.placed_bounds(id)?;
                // Remaining travel to the wall.
                let travel = match direction {
                    Direction::Left => b.min_x - container.min_x,
                    Direction::Right => container.max_x - b.max_x,
                    Direction::Down => b.min_y - container.min_y,
                    Direction::Up => container.max_y - b.max_y,
                };
                Some((travel, id))
            })
            .collect();
        queue.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let (ux, uy) = direction.unit();
        let mut moved = 0;
        for (travel, id) in queue {
            let Some(origin) = solution.offset(id) else {
                continue;
            };
            if travel <= 0.0 {
                continue;
            }
            let at = |t: f64| (origin.0 + ux * t, origin.1 + uy * t);

            let mut feasible = 0.0;
            let mut blocked = travel;
            if solution.try_move(id, at(travel)) {
                feasible = travel;
            } else {
                while blocked - feasible > TOLERANCE {
                    let mid = ((feasible + blocked) / 2.0).floor();
                    let mid = if mid > feasible {
                        mid
                    } else {
                        (feasible + blocked) / 2.0
                    };
                    if solution.try_move(id, at(mid)) {
                        feasible = mid;
                    } else {
                        blocked = mid;
                    }
                }
            }
            if feasible > 0.0 {
                moved += 1;
            }
        }
        debug_assert!(solution.is_valid());
        moved
    }

    /// Pushes toward one wall, then backfills toward the matching corner.
    pub fn push(solution: &Solution, direction: Direction) -> Solution {
        let mut next = solution.clone();
        Self::compact(&mut next, direction);
        backfill(&mut next, direction.corner());
        next
    }

    /// Applies both pushes of `ordering`, then backfills toward the corner
    /// they compact into.
    pub fn push_ordering(solution: &Solution, ordering: PushOrdering) -> Solution {
        let mut next = solution.clone();
        Self::compact(&mut next, ordering.first);
        Self::compact(&mut next, ordering.second);
        let added = backfill(&mut next, ordering.corner());
        if added > 0 {
            log::debug!("push {}: backfilled {added} shapes", ordering.label());
        }
        next
    }
}
