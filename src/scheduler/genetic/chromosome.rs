use crate::ga::Individual;

/// Two-part genotype for the picking problem.
///
/// Both parts are indexed by slot: slot `i` hands order `permutation[i]`
/// to picker `pickers[i]`. The parts always have the same length and are
/// recombined with a shared cut point.
#[derive(Debug, Clone, PartialEq)]
pub struct PickingChromosome {
    pickers: Vec<usize>,
    permutation: Vec<usize>,
    fitness: f64,
}

impl PickingChromosome {
    /// Creates an unevaluated chromosome.
    ///
    /// # Panics
    /// Panics if the parts have different lengths.
    pub fn new(pickers: Vec<usize>, permutation: Vec<usize>) -> Self {
        assert_eq!(
            pickers.len(),
            permutation.len(),
            "chromosome parts must have equal length"
        );
        Self {
            pickers,
            permutation,
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Picker index per slot.
    pub fn pickers(&self) -> &[usize] {
        &self.pickers
    }

    /// Order index per slot.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    pub(super) fn parts_mut(&mut self) -> (&mut [usize], &mut [usize]) {
        (&mut self.pickers, &mut self.permutation)
    }

    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    /// Whether every picker gene is below `picker_count` and the second part
    /// is a permutation of `0..len`.
    pub fn is_valid(&self, picker_count: usize) -> bool {
        let n = self.len();
        let mut seen = vec![false; n];
        for &order in &self.permutation {
            if order >= n || std::mem::replace(&mut seen[order], true) {
                return false;
            }
        }
        self.pickers.iter().all(|&p| p < picker_count)
    }
}

impl Individual for PickingChromosome {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}
