//! Genetic operators on packings.
//!
//! - [`mutate`]: best of the eight [`PushOrdering`]s on a snapshot
//! - [`crossover`]: re-pack the union of two parents' shapes from scratch
//!
//! Both operators leave their inputs untouched, and every result is
//! reduced by maximum grade with the first candidate winning ties, so the
//! outcome does not depend on task scheduling.

use crate::heuristic::{greedy_fill, rank, Corner, PlacementOrder, PushOrdering, PushSearch};
use crate::model::{ShapeId, Solution};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Maps `f` over `items`, on rayon's pool when `parallel` is set.
///
/// Results are in input order either way.
pub(crate) fn map_population<T, U, F>(items: &[T], parallel: bool, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

/// Index of the highest-grade solution, earliest on ties.
pub fn best_index(solutions: &[Solution]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, s) in solutions.iter().enumerate() {
        let grade = s.grade();
        if best.map_or(true, |(_, g)| grade > g) {
            best = Some((i, grade));
        }
    }
    best.map(|(i, _)| i)
}

/// Consumes `solutions` and returns the best one (see [`best_index`]).
pub fn best_of(mut solutions: Vec<Solution>) -> Option<Solution> {
    let i = best_index(&solutions)?;
    Some(solutions.swap_remove(i))
}

/// Runs every push ordering on its own copy of `solution` and returns the
/// best result.
///
/// The result's grade is never below the input's.
pub fn mutate(solution: &Solution, parallel: bool) -> Solution {
    let candidates = map_population(&PushOrdering::ALL, parallel, |&ordering| {
        let mut pushed = PushSearch::push_ordering(solution, ordering);
        pushed
            .meta_mut()
            .insert("push".into(), Value::String(ordering.label()));
        pushed
    });
    best_of(candidates).unwrap_or_else(|| solution.clone())
}

/// Re-packs the union of both parents' placed shapes into an empty
/// container, densest first, once per corner, and returns the best fill.
///
/// Shapes placed in neither parent are not offered. Both parents must share
/// the same instance; otherwise the first parent's instance is used and
/// foreign ids are ignored.
pub fn crossover(first: &Solution, second: &Solution, parallel: bool) -> Solution {
    let instance = Arc::clone(first.instance());
    let union: BTreeSet<ShapeId> = first.placed_ids().chain(second.placed_ids()).collect();
    let mut ids: Vec<ShapeId> = union
        .into_iter()
        .filter(|&id| instance.shape(id).is_some())
        .collect();
    rank(&instance, &mut ids, PlacementOrder::Density);

    let children = map_population(&Corner::ALL, parallel, |&corner| {
        let mut child = Solution::new(Arc::clone(&instance));
        greedy_fill(&mut child, &ids, corner);
        child.meta_mut().insert(
            "crossover".into(),
            Value::String(corner.name().to_string()),
        );
        child
    });
    let child = best_of(children).unwrap_or_else(|| Solution::new(instance));
    debug_assert!(child.is_valid());
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::heuristic::{seed_solution, SeedStrategy};
    use crate::model::{ItemSpec, PackingInstance};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square(side: f64) -> Vec<Point> {
        vec![(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)]
    }

    fn instance() -> Arc<PackingInstance> {
        Arc::new(
            PackingInstance::new(
                "ops",
                square(100.0),
                vec![
                    ItemSpec::new(square(50.0), 4, 25.0),
                    ItemSpec::new(square(25.0), 4, 10.0),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_map_population_order() {
        let items: Vec<usize> = (0..64).collect();
        let seq = map_population(&items, false, |&i| i * 2);
        let par = map_population(&items, true, |&i| i * 2);
        assert_eq!(seq, par);
        assert_eq!(seq[10], 20);
    }

    #[test]
    fn test_best_index_first_wins_ties() {
        let inst = instance();
        let mut a = Solution::new(inst.clone());
        let mut b = Solution::new(inst.clone());
        let mut c = Solution::new(inst);
        assert!(a.try_place(ShapeId(4), (0.0, 0.0)));
        assert!(b.try_place(ShapeId(0), (0.0, 0.0)));
        assert!(c.try_place(ShapeId(1), (0.0, 0.0)));
        assert_eq!(best_index(&[a, b, c]), Some(1));
        assert_eq!(best_index(&[]), None);
    }

    #[test]
    fn test_mutate_never_decreases_grade() {
        let inst = instance();
        let mut rng = StdRng::seed_from_u64(5);
        for i in 0..8 {
            let s = seed_solution(inst.clone(), SeedStrategy::cycle(i), 20, &mut rng);
            let m = mutate(&s, false);
            assert!(m.grade() >= s.grade());
            assert!(m.is_valid());
            assert!(m.meta().contains_key("push"));
        }
    }

    #[test]
    fn test_mutate_parallel_matches_sequential() {
        let inst = instance();
        let s = seed_solution(
            inst,
            SeedStrategy::cycle(7),
            20,
            &mut StdRng::seed_from_u64(1),
        );
        let a = mutate(&s, false);
        let b = mutate(&s, true);
        assert_eq!(
            a.placements().collect::<Vec<_>>(),
            b.placements().collect::<Vec<_>>()
        );
        assert_eq!(a.meta(), b.meta());
    }

    #[test]
    fn test_crossover_repacks_union() {
        let inst = instance();
        let mut p1 = Solution::new(inst.clone());
        let mut p2 = Solution::new(inst);
        assert!(p1.try_place(ShapeId(4), (0.0, 0.0)));
        assert!(p1.try_place(ShapeId(6), (60.0, 60.0)));
        assert!(p2.try_place(ShapeId(5), (30.0, 0.0)));

        let child = crossover(&p1, &p2, false);
        assert!(child.is_valid());
        assert_eq!(child.placed_ids().collect::<Vec<_>>(), [4, 5, 6].map(ShapeId).to_vec());
        assert!((child.grade() - 30.0).abs() < 1e-9);
        assert_eq!(
            child.meta().get("crossover"),
            Some(&Value::String("bottom-left".into()))
        );

        // Parents are untouched.
        assert_eq!(p1.offset(ShapeId(6)), Some((60.0, 60.0)));
        assert_eq!(p2.len(), 1);
    }

    #[test]
    fn test_crossover_of_empty_parents_is_empty() {
        let inst = instance();
        let child = crossover(&Solution::new(inst.clone()), &Solution::new(inst), true);
        assert!(child.is_empty());
    }
}
