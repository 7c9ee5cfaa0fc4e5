//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use super::selection::Selection;
use std::time::Duration;

/// Configuration for the Genetic Algorithm.
///
/// Each generation keeps `population_size - offspring` survivors unchanged
/// and breeds the remaining `offspring` individuals from selected parents.
///
/// # Defaults
///
/// ```
/// use u_picking::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.survivor_selection, Selection::Tournament(5));
/// assert_eq!(config.steady_fitness_limit, 300);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use std::time::Duration;
/// use u_picking::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_offspring_selection(Selection::Tournament(3))
///     .with_mutation_rate(0.1)
///     .with_time_limit(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Fraction of each generation produced by breeding (0.0–1.0).
    pub offspring_fraction: f64,

    /// Selection strategy for survivors, copied unchanged.
    pub survivor_selection: Selection,

    /// Selection strategy for the parents of offspring.
    pub offspring_selection: Selection,

    /// Probability of applying crossover to a pair of offspring (0.0–1.0).
    pub crossover_rate: f64,

    /// Per-gene mutation probability passed to [`GaProblem::mutate`](super::GaProblem::mutate).
    pub mutation_rate: f64,

    /// Generations without improvement of the best fitness before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub steady_fitness_limit: usize,

    /// Hard cap on generations. `None` runs until another limit fires.
    pub max_generations: Option<usize>,

    /// Wall-clock limit, checked at the start of each generation.
    ///
    /// The actual runtime may exceed this by one generation's worth of work.
    pub time_limit: Option<Duration>,

    /// Whether to evaluate individuals in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            offspring_fraction: 0.6,
            survivor_selection: Selection::Tournament(5),
            offspring_selection: Selection::Roulette,
            crossover_rate: 0.2,
            mutation_rate: 0.15,
            steady_fitness_limit: 300,
            max_generations: None,
            time_limit: None,
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the offspring fraction.
    pub fn with_offspring_fraction(mut self, fraction: f64) -> Self {
        self.offspring_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Sets the survivor selection strategy.
    pub fn with_survivor_selection(mut self, sel: Selection) -> Self {
        self.survivor_selection = sel;
        self
    }

    /// Sets the offspring (parent) selection strategy.
    pub fn with_offspring_selection(mut self, sel: Selection) -> Self {
        self.offspring_selection = sel;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the steady-fitness limit (0 to disable).
    pub fn with_steady_fitness_limit(mut self, limit: usize) -> Self {
        self.steady_fitness_limit = limit;
        self
    }

    /// Caps the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    /// Sets the wall-clock time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of offspring bred per generation.
    pub fn offspring_count(&self) -> usize {
        (self.population_size as f64 * self.offspring_fraction).round() as usize
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        for (name, value) in [
            ("offspring_fraction", self.offspring_fraction),
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        if self.max_generations == Some(0) {
            return Err("max_generations must be at least 1 or None".into());
        }
        if self.steady_fitness_limit == 0
            && self.max_generations.is_none()
            && self.time_limit.is_none()
        {
            return Err("no termination condition: set a steady-fitness limit, generation cap or time limit".into());
        }
        for sel in [self.survivor_selection, self.offspring_selection] {
            if sel == Selection::Tournament(0) {
                return Err("tournament size must be at least 1".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 100);
        assert!((config.offspring_fraction - 0.6).abs() < 1e-10);
        assert_eq!(config.survivor_selection, Selection::Tournament(5));
        assert_eq!(config.offspring_selection, Selection::Roulette);
        assert!((config.crossover_rate - 0.2).abs() < 1e-10);
        assert!((config.mutation_rate - 0.15).abs() < 1e-10);
        assert_eq!(config.steady_fitness_limit, 300);
        assert!(config.max_generations.is_none());
        assert!(config.time_limit.is_none());
        assert!(config.parallel);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(200)
            .with_offspring_fraction(0.5)
            .with_survivor_selection(Selection::Roulette)
            .with_offspring_selection(Selection::Tournament(2))
            .with_crossover_rate(0.8)
            .with_mutation_rate(0.05)
            .with_steady_fitness_limit(100)
            .with_max_generations(1000)
            .with_time_limit(Duration::from_millis(500))
            .with_parallel(false)
            .with_seed(42);

        assert_eq!(config.population_size, 200);
        assert_eq!(config.offspring_count(), 100);
        assert_eq!(config.survivor_selection, Selection::Roulette);
        assert_eq!(config.offspring_selection, Selection::Tournament(2));
        assert!((config.crossover_rate - 0.8).abs() < 1e-10);
        assert!((config.mutation_rate - 0.05).abs() < 1e-10);
        assert_eq!(config.steady_fitness_limit, 100);
        assert_eq!(config.max_generations, Some(1000));
        assert_eq!(config.time_limit, Some(Duration::from_millis(500)));
        assert!(!config.parallel);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_offspring_count_rounds() {
        assert_eq!(GaConfig::default().offspring_count(), 60);
        assert_eq!(
            GaConfig::default().with_population_size(5).offspring_count(),
            3
        );
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = GaConfig::default().with_population_size(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_generations() {
        let config = GaConfig::default().with_max_generations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_needs_termination() {
        let config = GaConfig::default().with_steady_fitness_limit(0);
        assert!(config.validate().unwrap_err().contains("termination"));
        assert!(config.with_max_generations(10).validate().is_ok());
    }

    #[test]
    fn test_validate_tournament_size() {
        let config = GaConfig::default().with_survivor_selection(Selection::Tournament(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_rates() {
        let config = GaConfig::default()
            .with_offspring_fraction(1.5)
            .with_crossover_rate(-0.5)
            .with_mutation_rate(2.0);

        assert!((config.offspring_fraction - 1.0).abs() < 1e-10);
        assert!((config.crossover_rate - 0.0).abs() < 1e-10);
        assert!((config.mutation_rate - 1.0).abs() < 1e-10);
    }
}
