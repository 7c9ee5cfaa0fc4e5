//! Generic genetic operators for integer and permutation chromosomes.
//!
//! These operate on plain `usize` slices and know nothing about the problem
//! being solved. Problems that carry several chromosomes side by side pick
//! one cut point with [`random_cut`] and apply it to every chromosome.
//!
//! # Crossover Operators
//!
//! - [`single_point_crossover`]: exchange tails at a cut point
//! - [`single_point_order_crossover`]: keep a prefix, refill in the other
//!   parent's order (permutation preserving)
//!
//! # Mutation Operators
//!
//! - [`resample_mutation_per_gene`]: redraw each gene with probability `rate`
//! - [`swap_mutation_per_gene`]: swap each position with a random one with
//!   probability `rate`
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use rand::seq::SliceRandom;
use rand::Rng;

// ============================================================================
// Construction
// ============================================================================

/// Uniformly random permutation of `0..n`.
pub fn random_permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

/// Cut point in `1..n`, so that both parents contribute. `None` if `n < 2`.
pub fn random_cut<R: Rng>(n: usize, rng: &mut R) -> Option<usize> {
    (n >= 2).then(|| rng.random_range(1..n))
}

// ============================================================================
// Crossover operators
// ============================================================================

/// Single-point crossover: children swap everything from `cut` onwards.
///
/// # Panics
/// Panics if parents have different lengths or `cut > len`.
pub fn single_point_crossover<T: Clone>(
    parent1: &[T],
    parent2: &[T],
    cut: usize,
) -> (Vec<T>, Vec<T>) {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");

    let mut child1 = parent1[..cut].to_vec();
    child1.extend_from_slice(&parent2[cut..]);
    let mut child2 = parent2[..cut].to_vec();
    child2.extend_from_slice(&parent1[cut..]);
    (child1, child2)
}

/// Single-point order crossover for permutations.
///
/// Each child keeps its own parent's prefix `[0, cut)` and fills the
/// remaining positions with the missing elements in the order they appear
/// in the other parent.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or `cut > len`.
pub fn single_point_order_crossover(
    parent1: &[usize],
    parent2: &[usize],
    cut: usize,
) -> (Vec<usize>, Vec<usize>) {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");

    (
        order_fill(parent1, parent2, cut),
        order_fill(parent2, parent1, cut),
    )
}

fn order_fill(template: &[usize], donor: &[usize], cut: usize) -> Vec<usize> {
    let n = template.len();
    let mut taken = vec![false; n];
    let mut child = Vec::with_capacity(n);
    for &v in &template[..cut] {
        taken[v] = true;
        child.push(v);
    }
    child.extend(donor.iter().copied().filter(|&v| !taken[v]));
    child
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Redraws each gene uniformly from `0..upper` with probability `rate`.
///
/// Returns the number of genes touched.
pub fn resample_mutation_per_gene<R: Rng>(
    genes: &mut [usize],
    upper: usize,
    rate: f64,
    rng: &mut R,
) -> usize {
    if upper == 0 || rate <= 0.0 {
        return 0;
    }
    let mut touched = 0;
    for gene in genes.iter_mut() {
        if rng.random_bool(rate.min(1.0)) {
            *gene = rng.random_range(0..upper);
            touched += 1;
        }
    }
    touched
}

/// With probability `rate` per position, swaps it with a uniformly random
/// position. The slice stays a permutation.
///
/// Returns the number of swaps performed.
pub fn swap_mutation_per_gene<R: Rng>(perm: &mut [usize], rate: f64, rng: &mut R) -> usize {
    let n = perm.len();
    if n < 2 || rate <= 0.0 {
        return 0;
    }
    let mut swaps = 0;
    for i in 0..n {
        if rng.random_bool(rate.min(1.0)) {
            let j = rng.random_range(0..n);
            perm.swap(i, j);
            swaps += 1;
        }
    }
    swaps
}

// ============================================================================
// Tests
// ============================================================================
