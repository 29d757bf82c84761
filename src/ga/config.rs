//! Population controller configuration.
//!
//! [`PackConfig`] holds every parameter of the evolutionary loop.

use crate::error::{PackError, Result};

/// Configuration for the [`PopulationController`](super::PopulationController).
///
/// # Defaults
///
/// ```
/// use u_polypack::ga::PackConfig;
///
/// let config = PackConfig::default();
/// assert_eq!(config.population_size, 16);
/// assert_eq!(config.max_generations, 50);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_polypack::ga::PackConfig;
///
/// let config = PackConfig::default()
///     .with_population_size(32)
///     .with_placement_retries(200)
///     .with_crossover(false)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PackConfig {
    /// Number of individuals per generation. Must be at least 2.
    pub population_size: usize,

    /// Maximum number of generation steps after the base generation.
    ///
    /// 0 returns the best individual of the base generation.
    pub max_generations: usize,

    /// Random offsets tried per shape when a random-order seed cannot place
    /// it at a corner candidate.
    pub placement_retries: usize,

    /// Seed of every random stream. Runs with the same seed and input are
    /// identical.
    pub seed: u64,

    /// Whether the generation step recombines adjacent individuals.
    ///
    /// When disabled, the mutated population is the next generation.
    pub crossover: bool,

    /// Whether to run seeding, mutation, and crossover on rayon's pool.
    pub parallel: bool,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at the start of each generation, so a run may exceed it by
    /// one generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            population_size: 16,
            max_generations: 50,
            placement_retries: 100,
            seed: 0,
            crossover: true,
            parallel: true,
            time_limit_ms: None,
        }
    }
}

impl PackConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the random-offset retry budget.
    pub fn with_placement_retries(mut self, n: usize) -> Self {
        self.placement_retries = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables crossover.
    pub fn with_crossover(mut self, crossover: bool) -> Self {
        self.crossover = crossover;
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Preset for quick runs on small instances.
    ///
    /// - Population: 8, Generations: 20, Retries: 50, Time limit: 10s
    pub fn fast() -> Self {
        Self {
            population_size: 8,
            max_generations: 20,
            placement_retries: 50,
            time_limit_ms: Some(10_000),
            ..Self::default()
        }
    }

    /// Preset balancing packing quality and run time.
    ///
    /// - Population: 16, Generations: 50, Retries: 100, Time limit: 60s
    pub fn balanced() -> Self {
        Self {
            time_limit_ms: Some(60_000),
            ..Self::default()
        }
    }

    /// Preset for long runs on large instances.
    ///
    /// - Population: 32, Generations: 200, Retries: 200, Time limit: 10min
    pub fn quality() -> Self {
        Self {
            population_size: 32,
            max_generations: 200,
            placement_retries: 200,
            time_limit_ms: Some(600_000),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`PackError::Config`] describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(PackError::Config(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.time_limit_ms == Some(0) {
            return Err(PackError::Config(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        Ok(())
    }
}
