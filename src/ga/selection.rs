//! Selection strategies for the GA.
//!
//! Selection determines which individuals survive unchanged and which are
//! chosen as parents for crossover. Different strategies provide different
//! selection pressure.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::{Fitness, Individual};
use rand::Rng;

/// Selection strategy.
///
/// All strategies assume **maximization** (higher fitness = better).
///
/// # Examples
///
/// ```
/// use u_picking::ga::Selection;
///
/// // Tournament with size 5 (survivor default)
/// let sel = Selection::Tournament(5);
///
/// // Roulette wheel (fitness-proportionate, offspring default)
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random, select the best.
    ///
    /// Higher `k` = stronger selection pressure.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Non-negative fitness values are used as weights directly. A
    /// population with negative values is shifted up by its minimum first.
    ///
    /// # Complexity
    /// O(n) per selection
    Roulette,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(5)
    }
}

impl Selection {
    /// Select one index from the population.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match self {
            Selection::Tournament(k) => tournament(population, *k, rng),
            Selection::Roulette => roulette(population, rng),
        }
    }

    /// Select `count` indices (with replacement).
    pub fn select_many<I: Individual, R: Rng>(
        &self,
        population: &[I],
        count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        (0..count).map(|_| self.select(population, rng)).collect()
    }
}

/// Tournament selection: pick k random individuals, return best.
fn tournament<I: Individual, R: Rng>(population: &[I], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness() > population[best_idx].fitness() {
            best_idx = idx;
        }
    }
    best_idx
}

/// Roulette wheel selection.
///
/// weight_i = fitness_i - min(min_fitness, 0). Non-finite fitness weighs
/// nothing; an all-zero population is sampled uniformly.
fn roulette<I: Individual, R: Rng>(population: &[I], rng: &mut R) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    let fitnesses: Vec<f64> = population
        .iter()
        .map(|ind| ind.fitness().to_f64())
        .collect();

    let offset = fitnesses
        .iter()
        .copied()
        .filter(|f| f.is_finite())
        .fold(0.0, f64::min);

    let weights: Vec<f64> = fitnesses
        .iter()
        .map(|&f| {
            let w = f - offset;
            if w.is_finite() && w > 0.0 {
                w
            } else {
                0.0
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    // floating-point fallback: last individual with positive weight
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(n - 1)
}
