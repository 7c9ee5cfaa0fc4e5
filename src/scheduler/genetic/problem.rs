use rand::Rng;

use super::chromosome::PickingChromosome;
use crate::ga::operators::{
    random_cut, random_permutation, resample_mutation_per_gene, single_point_crossover,
    single_point_order_crossover, swap_mutation_per_gene,
};
use crate::ga::GaProblem;
use crate::model::{Order, Store};
use crate::scheduler::OptimizationCriteria;

/// Per-order data the decoder needs, in integer seconds.
#[derive(Debug, Clone, Copy)]
struct OrderEntry {
    duration: i64,
    start_deadline: i64,
    score: f64,
}

/// One accepted slot of a decoded genotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub picker: usize,
    pub order: usize,
    /// Start, in seconds-of-day.
    pub start: i64,
}

/// The picking problem as seen by the GA.
///
/// Decoding walks the slots left to right. Each picker keeps a clock that
/// starts at the shift start; a slot is accepted when its picker's clock is
/// not past the order's start deadline, and then advances that clock by the
/// picking time. Rejected slots are skipped.
#[derive(Debug, Clone)]
pub struct PickingProblem {
    entries: Vec<OrderEntry>,
    picker_count: usize,
    shift_start: i64,
}

impl PickingProblem {
    pub fn new(orders: &[Order], store: &Store, criteria: OptimizationCriteria) -> Self {
        let entries = orders
            .iter()
            .map(|order| OrderEntry {
                duration: order.picking_seconds(),
                start_deadline: order.start_deadline(store),
                score: criteria.score(order),
            })
            .collect();
        Self {
            entries,
            picker_count: store.pickers().len(),
            shift_start: store.picking_start_seconds(),
        }
    }

    pub fn order_count(&self) -> usize {
        self.entries.len()
    }

    pub fn picker_count(&self) -> usize {
        self.picker_count
    }

    /// Sum of scores of accepted slots. Out-of-range genes are skipped.
    pub fn fitness(&self, chromosome: &PickingChromosome) -> f64 {
        let mut clocks = vec![self.shift_start; self.picker_count];
        let mut fitness = 0.0;
        for (&picker, &order) in chromosome.pickers().iter().zip(chromosome.permutation()) {
            let (Some(clock), Some(entry)) = (clocks.get_mut(picker), self.entries.get(order)) else {
                continue;
            };
            if *clock <= entry.start_deadline {
                *clock += entry.duration;
                fitness += entry.score;
            }
        }
        fitness
    }

    /// Accepted slots grouped by picker index, each group in slot order.
    pub fn decode(&self, chromosome: &PickingChromosome) -> Vec<Assignment> {
        let mut clocks = vec![self.shift_start; self.picker_count];
        let mut per_picker: Vec<Vec<Assignment>> = vec![Vec::new(); self.picker_count];
        for (&picker, &order) in chromosome.pickers().iter().zip(chromosome.permutation()) {
            let (Some(clock), Some(entry)) = (clocks.get_mut(picker), self.entries.get(order)) else {
                continue;
            };
            if *clock <= entry.start_deadline {
                per_picker[picker].push(Assignment {
                    picker,
                    order,
                    start: *clock,
                });
                *clock += entry.duration;
            }
        }
        per_picker.into_iter().flatten().collect()
    }
}

impl GaProblem for PickingProblem {
    type Individual = PickingChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> PickingChromosome {
        let n = self.order_count();
        let pickers = (0..n)
            .map(|_| rng.random_range(0..self.picker_count.max(1)))
            .collect();
        PickingChromosome::new(pickers, random_permutation(n, rng))
    }

    fn evaluate(&self, individual: &PickingChromosome) -> f64 {
        self.fitness(individual)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &PickingChromosome,
        parent2: &PickingChromosome,
        rng: &mut R,
    ) -> (PickingChromosome, PickingChromosome) {
        let Some(cut) = random_cut(parent1.len(), rng) else {
            return (parent1.clone(), parent2.clone());
        };
        let (p1, p2) = single_point_crossover(parent1.pickers(), parent2.pickers(), cut);
        let (o1, o2) =
            single_point_order_crossover(parent1.permutation(), parent2.permutation(), cut);
        (PickingChromosome::new(p1, o1), PickingChromosome::new(p2, o2))
    }

    fn mutate<R: Rng>(&self, individual: &mut PickingChromosome, rate: f64, rng: &mut R) {
        let (pickers, permutation) = individual.parts_mut();
        resample_mutation_per_gene(pickers, self.picker_count, rate, rng);
        swap_mutation_per_gene(permutation, rate, rng);
    }
}
