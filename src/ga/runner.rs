//! Population controller: the evolutionary loop.
//!
//! [`PopulationController`] seeds a base generation, then repeatedly
//! mutates every individual with push search, recombines adjacent
//! individuals, and stops on the first termination condition met.

use super::config::PackConfig;
use super::operators::{crossover, map_population, mutate};
use crate::error::Result;
use crate::heuristic::{seed_solution, SeedStrategy};
use crate::model::{PackingInstance, Solution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `max_generations` steps ran.
    MaxGenerations,
    /// The best solution holds every catalog shape.
    Complete,
    /// A generation's grades were identical to the previous generation's.
    Stagnated,
    /// The wall-clock limit was reached.
    TimeLimit,
    /// The cancellation flag was set.
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Termination::MaxGenerations => "max generations",
            Termination::Complete => "complete",
            Termination::Stagnated => "stagnated",
            Termination::TimeLimit => "time limit",
            Termination::Cancelled => "cancelled",
        })
    }
}

/// Summary of one population.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// 0 for the base generation.
    pub generation: usize,
    /// Highest grade in the population.
    pub best_grade: f64,
    /// Mean grade.
    pub mean_grade: f64,
    /// Lowest grade.
    pub worst_grade: f64,
    /// Number of shapes in the best individual.
    pub best_placed: usize,
}

impl GenerationStats {
    fn of(generation: usize, population: &[Solution]) -> Self {
        let grades: Vec<f64> = population.iter().map(Solution::grade).collect();
        let best_grade = grades.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst_grade = grades.iter().copied().fold(f64::INFINITY, f64::min);
        let mean_grade = if grades.is_empty() {
            0.0
        } else {
            grades.iter().sum::<f64>() / grades.len() as f64
        };
        Self {
            generation,
            best_grade,
            mean_grade,
            worst_grade,
            best_placed: population.first().map_or(0, Solution::len),
        }
    }
}

/// Result of a controller run.
#[derive(Debug, Clone)]
pub struct PackResult {
    /// The highest-grade solution seen during the run.
    pub best: Solution,

    /// Same as `best.grade()`.
    pub best_grade: f64,

    /// Generation steps executed after the base generation.
    pub generations: usize,

    /// Why the run stopped.
    pub termination: Termination,

    /// Per-population statistics, base generation first.
    pub history: Vec<GenerationStats>,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Drives the genetic search over one instance.
///
/// The controller owns no mutable state during a run; every task works on
/// its own solution clone and all randomness comes from per-task streams
/// derived from [`PackConfig::seed`].
///
/// # Usage
///
/// ```ignore
/// let instance = Arc::new(load_instance("instance.json")?);
/// let controller = PopulationController::new(instance, PackConfig::default())?;
/// let result = controller.run();
/// println!("best grade: {}", result.best_grade);
/// ```
#[derive(Debug)]
pub struct PopulationController {
    instance: Arc<PackingInstance>,
    config: PackConfig,
    cached: Vec<Solution>,
}

impl PopulationController {
    /// Creates a controller.
    ///
    /// # Errors
    /// [`PackError::Config`](crate::PackError::Config) if the
    /// configuration is invalid, such as `population_size < 2`.
    pub fn new(instance: Arc<PackingInstance>, config: PackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            instance,
            config,
            cached: Vec::new(),
        })
    }

    /// Uses previously computed individuals as the first slots of the
    /// base generation.
    ///
    /// Solutions bound to another instance or failing the validity check
    /// are dropped with a warning. At most `population_size` are kept; the
    /// remaining slots are seeded normally.
    pub fn with_base_generation(mut self, cached: Vec<Solution>) -> Self {
        let total = cached.len();
        self.cached = cached
            .into_iter()
            .filter(|s| {
                if !Arc::ptr_eq(s.instance(), &self.instance) {
                    log::warn!("cached solution belongs to another instance, dropped");
                    false
                } else if !s.is_valid() {
                    log::warn!("cached solution with {} shapes is invalid, dropped", s.len());
                    false
                } else {
                    true
                }
            })
            .take(self.config.population_size)
            .collect();
        log::debug!("using {} of {total} cached individuals", self.cached.len());
        self
    }

    /// The instance being packed.
    pub fn instance(&self) -> &Arc<PackingInstance> {
        &self.instance
    }

    /// The run configuration.
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Builds the initial population, sorted by grade descending.
    ///
    /// Slot `i` is the `i`-th cached individual if there is one, otherwise
    /// a fresh fill with [`SeedStrategy::cycle`]`(i)` and its own random
    /// stream.
    pub fn base_generation(&self) -> Vec<Solution> {
        let slots: Vec<usize> = (self.cached.len()..self.config.population_size).collect();
        let seeded = map_population(&slots, self.config.parallel, |&i| {
            let mut rng = task_rng(self.config.seed, i as u64);
            seed_solution(
                Arc::clone(&self.instance),
                SeedStrategy::cycle(i),
                self.config.placement_retries,
                &mut rng,
            )
        });
        let mut population = self.cached.clone();
        population.extend(seeded);
        sort_by_grade(population)
    }

    /// Produces the successor of `population`, sorted by grade descending.
    ///
    /// Every individual is replaced by its best push ordering. With
    /// crossover enabled, the next generation is the best mutated
    /// individual followed by one child per adjacent pair of the sorted
    /// mutated population.
    pub fn next_generation(&self, population: &[Solution]) -> Vec<Solution> {
        let parallel = self.config.parallel;
        let mutated = sort_by_grade(map_population(population, parallel, |s| mutate(s, parallel)));
        if !self.config.crossover || mutated.len() < 2 {
            return mutated;
        }

        let pairs: Vec<usize> = (0..mutated.len() - 1).collect();
        let children = map_population(&pairs, parallel, |&i| {
            crossover(&mutated[i], &mutated[i + 1], parallel)
        });
        let mut next = Vec::with_capacity(mutated.len());
        next.extend(mutated.into_iter().take(1));
        next.extend(children);
        sort_by_grade(next)
    }

    /// Runs the search to completion.
    pub fn run(&self) -> PackResult {
        self.run_with_cancel(None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// The flag is polled before each generation step; once set, the run
    /// returns the best solution found so far.
    pub fn run_with_cancel(&self, cancel: Option<Arc<AtomicBool>>) -> PackResult {
        let start = Instant::now();
        let limit = self.config.time_limit_ms.map(Duration::from_millis);

        let mut population = self.base_generation();
        let mut best = population
            .first()
            .cloned()
            .unwrap_or_else(|| Solution::new(Arc::clone(&self.instance)));
        let mut history = vec![GenerationStats::of(0, &population)];
        let mut previous = grades(&population);
        log::info!(
            "{}: base generation of {} individuals, best grade {}",
            self.instance.name(),
            population.len(),
            best.grade()
        );

        let mut generations = 0;
        let mut termination = Termination::MaxGenerations;
        while !best.is_complete() {
            if generations >= self.config.max_generations {
                break;
            }
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                termination = Termination::Cancelled;
                break;
            }
            if limit.is_some_and(|limit| start.elapsed() >= limit) {
                termination = Termination::TimeLimit;
                break;
            }

            population = self.next_generation(&population);
            generations += 1;

            let stats = GenerationStats::of(generations, &population);
            log::info!(
                "generation {generations}: best {} ({} shapes), mean {:.3}, worst {}",
                stats.best_grade,
                stats.best_placed,
                stats.mean_grade,
                stats.worst_grade
            );
            history.push(stats);

            if let Some(leader) = population.first() {
                if leader.grade() > best.grade() {
                    best = leader.clone();
                }
            }

            let current = grades(&population);
            if current == previous {
                termination = Termination::Stagnated;
                break;
            }
            previous = current;
        }
        if best.is_complete() {
            termination = Termination::Complete;
        }

        if termination == Termination::Complete {
            log::info!(
                "{}: every shape placed, grade {} of {}",
                self.instance.name(),
                best.grade(),
                self.instance.catalog().total_value()
            );
        }
        let elapsed = start.elapsed();
        log::info!(
            "{}: stopped after {generations} generations ({termination}), best grade {}",
            self.instance.name(),
            best.grade()
        );
        PackResult {
            best_grade: best.grade(),
            best,
            generations,
            termination,
            history,
            elapsed,
        }
    }
}

/// Independent random stream `stream` of the run seeded with `seed`.
fn task_rng(seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Stable sort by grade descending.
fn sort_by_grade(population: Vec<Solution>) -> Vec<Solution> {
    let mut keyed: Vec<(f64, Solution)> = population.into_iter().map(|s| (s.grade(), s)).collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().map(|(_, s)| s).collect()
}

fn grades(population: &[Solution]) -> Vec<f64> {
    population.iter().map(Solution::grade).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackError;
    use crate::geometry::Point;
    use crate::model::{ItemSpec, ShapeId};

    fn square(side: f64) -> Vec<Point> {
        vec![(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)]
    }

    fn instance(items: Vec<ItemSpec>) -> Arc<PackingInstance> {
        Arc::new(PackingInstance::new("ga", square(100.0), items).unwrap())
    }

    /// More shapes than fit, in mixed sizes.
    fn crowded() -> Arc<PackingInstance> {
        instance(vec![
            ItemSpec::new(square(40.0), 3, 20.0),
            ItemSpec::new(vec![(0.0, 0.0), (30.0, 0.0), (0.0, 30.0)], 4, 6.0),
            ItemSpec::new(square(20.0), 6, 5.0),
            ItemSpec::new(vec![(0.0, 0.0), (50.0, 0.0), (50.0, 10.0), (0.0, 10.0)], 2, 7.0),
        ])
    }

    fn config() -> PackConfig {
        PackConfig::default()
            .with_population_size(6)
            .with_max_generations(3)
            .with_placement_retries(10)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_population_of_one_is_rejected() {
        let err = PopulationController::new(crowded(), config().with_population_size(1));
        assert!(matches!(err, Err(PackError::Config(_))));
    }

    #[test]
    fn test_base_generation_sorted_and_valid() {
        let controller = PopulationController::new(crowded(), config()).unwrap();
        let base = controller.base_generation();
        assert_eq!(base.len(), 6);
        assert!(base.iter().all(Solution::is_valid));
        for pair in base.windows(2) {
            assert!(pair[0].grade() >= pair[1].grade());
        }
    }

    #[test]
    fn test_next_generation_keeps_size_and_best() {
        let controller = PopulationController::new(crowded(), config()).unwrap();
        let base = controller.base_generation();
        let next = controller.next_generation(&base);
        assert_eq!(next.len(), base.len());
        assert!(next.iter().all(Solution::is_valid));
        assert!(next[0].grade() >= base[0].grade());

        let no_cross = PopulationController::new(crowded(), config().with_crossover(false))
            .unwrap()
            .next_generation(&base);
        assert_eq!(no_cross.len(), base.len());
        assert!(no_cross[0].grade() >= base[0].grade());
    }

    #[test]
    fn test_best_grade_is_monotone() {
        let controller =
            PopulationController::new(crowded(), config().with_max_generations(4)).unwrap();
        let result = controller.run();
        for window in result.history.windows(2) {
            assert!(
                window[1].best_grade >= window[0].best_grade,
                "best grade dropped: {} -> {}",
                window[0].best_grade,
                window[1].best_grade
            );
        }
        assert_eq!(result.history.len(), result.generations + 1);
        assert!(result.best.is_valid());
        assert_eq!(result.best_grade, result.best.grade());
        let top = result.history.iter().map(|h| h.best_grade).fold(0.0, f64::max);
        assert_eq!(result.best_grade, top);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let seq = PopulationController::new(crowded(), config()).unwrap().run();
        let par = PopulationController::new(crowded(), config().with_parallel(true))
            .unwrap()
            .run();
        assert_eq!(seq.best_grade, par.best_grade);
        assert_eq!(seq.generations, par.generations);
        assert_eq!(
            seq.best.placements().collect::<Vec<_>>(),
            par.best.placements().collect::<Vec<_>>()
        );
        assert_eq!(seq.history, par.history);
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = PopulationController::new(crowded(), config()).unwrap().run();
        let b = PopulationController::new(crowded(), config()).unwrap().run();
        assert_eq!(
            a.best.placements().collect::<Vec<_>>(),
            b.best.placements().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_stops_when_complete() {
        let inst = instance(vec![ItemSpec::new(square(40.0), 4, 1.0)]);
        let result = PopulationController::new(inst, config()).unwrap().run();
        assert_eq!(result.termination, Termination::Complete);
        assert_eq!(result.generations, 0);
        assert!(result.best.is_complete());
        assert_eq!(result.best_grade, 4.0);
    }

    #[test]
    fn test_stops_on_stagnation() {
        // Only one of the two squares ever fits, so every grade stays 50.
        let inst = instance(vec![ItemSpec::new(square(60.0), 2, 50.0)]);
        let result = PopulationController::new(inst, config().with_max_generations(10))
            .unwrap()
            .run();
        assert_eq!(result.termination, Termination::Stagnated);
        assert_eq!(result.generations, 1);
        assert_eq!(result.best_grade, 50.0);
    }

    #[test]
    fn test_zero_generations_returns_base_best() {
        let controller =
            PopulationController::new(crowded(), config().with_max_generations(0)).unwrap();
        let base_best = controller.base_generation()[0].grade();
        let result = controller.run();
        assert_eq!(result.generations, 0);
        assert_eq!(result.termination, Termination::MaxGenerations);
        assert_eq!(result.best_grade, base_best);
    }

    #[test]
    fn test_cancellation() {
        let controller =
            PopulationController::new(crowded(), config().with_max_generations(1000)).unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let result = controller.run_with_cancel(Some(cancel));
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.generations, 0);
        assert!(result.best.is_valid());
    }

    #[test]
    fn test_stops_at_time_limit() {
        // More square area than the container holds, so the run cannot end
        // complete, and enough shapes that the base generation outlasts 1 ms.
        let inst = Arc::new(
            PackingInstance::new(
                "timed",
                square(200.0),
                vec![
                    ItemSpec::new(square(40.0), 30, 20.0),
                    ItemSpec::new(vec![(0.0, 0.0), (30.0, 0.0), (0.0, 30.0)], 15, 6.0),
                    ItemSpec::new(square(20.0), 10, 5.0),
                ],
            )
            .unwrap(),
        );
        let config = config()
            .with_population_size(4)
            .with_max_generations(1000)
            .with_time_limit_ms(1);
        let result = PopulationController::new(inst, config).unwrap().run();
        assert_eq!(result.termination, Termination::TimeLimit);
        assert!(result.best.is_valid());
        assert_eq!(result.history.len(), result.generations + 1);
        assert!(result.generations < 1000);
    }

    #[test]
    fn test_cached_individuals_fill_first_slots() {
        let inst = crowded();
        let mut cached = Solution::new(inst.clone());
        assert!(cached.try_place(ShapeId(0), (0.0, 0.0)));
        let mut broken = Solution::new(inst.clone());
        broken.insert_unchecked(ShapeId(0), (0.0, 0.0));
        broken.insert_unchecked(ShapeId(1), (10.0, 10.0));
        let foreign = Solution::new(crowded());

        let controller = PopulationController::new(inst, config())
            .unwrap()
            .with_base_generation(vec![cached, broken, foreign]);
        let base = controller.base_generation();
        assert_eq!(base.len(), 6);
        // The single-shape cached individual ranks last.
        let last = base.last().unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last.offset(ShapeId(0)), Some((0.0, 0.0)));
    }

    #[test]
    fn test_task_rng_streams_differ() {
        use rand::Rng;
        let a: u64 = task_rng(7, 0).random();
        let b: u64 = task_rng(7, 1).random();
        let again: u64 = task_rng(7, 0).random();
        assert_ne!(a, b);
        assert_eq!(a, again);
    }
}
