//! Core trait definitions for the GA framework.
//!
//! The two central traits, [`Individual`] and [`GaProblem`], define the
//! contract between the generic GA engine and domain-specific problem
//! implementations.

use rand::Rng;

/// Marker trait for fitness values.
///
/// Fitness must support comparison and be cheaply copyable.
/// Higher fitness is considered better (maximization).
///
/// Built-in implementations exist for `f64` and `f32`.
pub trait Fitness: PartialOrd + Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Returns a value representing the worst possible fitness.
    ///
    /// Used for initial/uninitialized individuals.
    fn worst() -> Self;

    /// Converts the fitness to `f64` for logging and statistics.
    fn to_f64(self) -> f64;
}

impl Fitness for f64 {
    fn worst() -> Self {
        f64::NEG_INFINITY
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl Fitness for f32 {
    fn worst() -> Self {
        f32::NEG_INFINITY
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// A candidate solution in the GA population.
///
/// Individuals carry their own fitness value. The GA framework calls
/// [`GaProblem::evaluate`] to compute fitness, then stores it via
/// [`set_fitness`](Individual::set_fitness).
///
/// # Implementing
///
/// ```ignore
/// #[derive(Clone)]
/// struct MySolution {
///     genes: Vec<f64>,
///     fitness: f64,
/// }
///
/// impl Individual for MySolution {
///     type Fitness = f64;
///     fn fitness(&self) -> f64 { self.fitness }
///     fn set_fitness(&mut self, f: f64) { self.fitness = f; }
/// }
/// ```
pub trait Individual: Clone + Send + Sync {
    /// The fitness type. Must implement [`Fitness`].
    type Fitness: Fitness;

    /// Returns the current fitness of this individual.
    fn fitness(&self) -> Self::Fitness;

    /// Sets the fitness of this individual.
    ///
    /// Called by the GA framework after evaluation.
    fn set_fitness(&mut self, fitness: Self::Fitness);
}

/// Defines a GA optimization problem.
///
/// Implementors supply:
///
/// 1. **Initialization**: How to create random individuals
/// 2. **Evaluation**: How to compute fitness (higher is better)
/// 3. **Crossover**: How to recombine two parents
/// 4. **Mutation**: How to perturb an individual
///
/// # Thread Safety
///
/// `GaProblem` must be `Send + Sync` because the GA runner may evaluate
/// individuals in parallel using rayon.
pub trait GaProblem: Send + Sync {
    /// The individual (solution) type for this problem.
    type Individual: Individual;

    /// Creates a random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Evaluates an individual and returns its fitness.
    ///
    /// This is typically the most expensive operation. The GA framework
    /// may call this in parallel across the population.
    fn evaluate(&self, individual: &Self::Individual) -> <Self::Individual as Individual>::Fitness;

    /// Recombines two parents into two children.
    ///
    /// Called for a pair of offspring with probability `crossover_rate`.
    /// The default implementation returns the parents unchanged.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        _rng: &mut R,
    ) -> (Self::Individual, Self::Individual) {
        (parent1.clone(), parent2.clone())
    }

    /// Mutates an individual in place with the given per-gene probability.
    ///
    /// Called for every offspring; the problem decides how the rate maps
    /// onto its genes. The default implementation is a no-op.
    fn mutate<R: Rng>(&self, _individual: &mut Self::Individual, _rate: f64, _rng: &mut R) {}

    /// Called at the end of each generation with the best fitness so far.
    ///
    /// The default implementation is a no-op.
    fn on_generation(
        &self,
        _generation: usize,
        _best_fitness: <Self::Individual as Individual>::Fitness,
    ) {
    }
}
