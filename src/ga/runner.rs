//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → evaluation → survivors + offspring → repeat.

use super::config::GaConfig;
use super::types::{Fitness, GaProblem, Individual};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Result of a GA optimization run.
///
/// Contains the best solution found, along with statistics about the
/// evolutionary process.
#[derive(Debug, Clone)]
pub struct GaResult<I: Individual> {
    /// The best individual found during the entire run.
    pub best: I,

    /// Best fitness value (same as `best.fitness()`).
    pub best_fitness: I::Fitness,

    /// Total number of generations executed.
    pub generations: usize,

    /// Whether the run stopped because the best fitness stopped improving.
    pub stagnated: bool,

    /// Whether the run stopped on the wall-clock limit.
    pub timed_out: bool,

    /// Best fitness so far: initial population, then after each generation.
    pub fitness_history: Vec<f64>,
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&problem, &config)?;
/// println!("Best fitness: {:?}", result.best_fitness);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// Returns `Err` with a description if the configuration is invalid.
    pub fn run<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
    ) -> Result<GaResult<P::Individual>, String> {
        config.validate()?;

        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));

        let offspring_count = config.offspring_count();
        let survivor_count = config.population_size - offspring_count;

        // 1. Initialize and evaluate
        let mut population: Vec<P::Individual> = (0..config.population_size)
            .map(|_| problem.create_individual(&mut rng))
            .collect();
        evaluate_population(problem, &mut population, config.parallel);

        let mut best = population[best_index(&population)].clone();
        let mut fitness_history = vec![best.fitness().to_f64()];
        let mut generations = 0usize;
        let mut steady = 0usize;
        let mut stagnated = false;
        let mut timed_out = false;

        // 2. Evolutionary loop
        loop {
            if let Some(limit) = config.time_limit {
                if started.elapsed() >= limit {
                    timed_out = true;
                    break;
                }
            }
            if config.max_generations.is_some_and(|max| generations >= max) {
                break;
            }

            // Survivors are copied unchanged
            let survivors: Vec<P::Individual> = config
                .survivor_selection
                .select_many(&population, survivor_count, &mut rng)
                .into_iter()
                .map(|i| population[i].clone())
                .collect();

            // Offspring: select parents, recombine in pairs, mutate
            let mut offspring: Vec<P::Individual> = config
                .offspring_selection
                .select_many(&population, offspring_count, &mut rng)
                .into_iter()
                .map(|i| population[i].clone())
                .collect();
            for pair in offspring.chunks_exact_mut(2) {
                if rng.random_bool(config.crossover_rate) {
                    let (a, b) = problem.crossover(&pair[0], &pair[1], &mut rng);
                    pair[0] = a;
                    pair[1] = b;
                }
            }
            for child in &mut offspring {
                problem.mutate(child, config.mutation_rate, &mut rng);
            }
            evaluate_population(problem, &mut offspring, config.parallel);

            population = survivors;
            population.extend(offspring);
            generations += 1;

            let gen_best = &population[best_index(&population)];
            if gen_best.fitness() > best.fitness() {
                best = gen_best.clone();
                steady = 0;
            } else {
                steady += 1;
            }
            fitness_history.push(best.fitness().to_f64());
            problem.on_generation(generations, best.fitness());

            if config.steady_fitness_limit > 0 && steady >= config.steady_fitness_limit {
                stagnated = true;
                break;
            }
        }

        Ok(GaResult {
            best_fitness: best.fitness(),
            best,
            generations,
            stagnated,
            timed_out,
            fitness_history,
        })
    }
}

/// Evaluate all individuals in the population.
fn evaluate_population<P: GaProblem>(
    problem: &P,
    population: &mut [P::Individual],
    parallel: bool,
) {
    if parallel {
        population.par_iter_mut().for_each(|ind| {
            let f = problem.evaluate(ind);
            ind.set_fitness(f);
        });
    } else {
        for ind in population.iter_mut() {
            let f = problem.evaluate(ind);
            ind.set_fitness(f);
        }
    }
}

/// Index of the individual with the highest fitness (first on ties).
fn best_index<I: Individual>(population: &[I]) -> usize {
    let mut best = 0;
    for (i, ind) in population.iter().enumerate().skip(1) {
        if ind.fitness() > population[best].fitness() {
            best = i;
        }
    }
    best
}

// ============================================================================
// Tests
// ============================================================================
