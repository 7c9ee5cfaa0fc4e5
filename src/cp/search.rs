//! Parallel branch-and-bound search for optional-interval models.
//!
//! # Supported models
//!
//! - Every interval is optional (gated by a presence literal)
//! - Every interval belongs to at most one `NoOverlap` group; intervals in
//!   no group run on a private resource
//! - Any number of `AtMostOne` groups over presence literals
//! - A `Maximize` objective over presence literals
//!
//! Anything else is reported as [`SolverStatus::ModelInvalid`].
//!
//! # Search
//!
//! Each resource's sequence is built left to right with every interval
//! placed at its earliest start, always extending the open resource whose
//! clock is smallest. Any feasible set of per-resource sequences has a
//! left-shifted counterpart, so the enumeration is complete. Every node is
//! itself a feasible assignment (undecided literals read false), which
//! keeps the incumbent improving while the search runs.
//!
//! The bound is the current objective plus, per `AtMostOne` group, the
//! largest weight of a member that can still be placed. Workers explore the
//! same tree with different candidate orders and share the incumbent; the
//! first worker to exhaust its tree proves optimality.
//!
//! # Reference
//! Baptiste, Le Pape & Nuijten (2001), "Constraint-Based Scheduling"

use super::model::{Constraint, CpModel, Objective};
use super::solver::{CpSolution, CpSolver, IntervalSolution, SolverConfig, SolverStatus};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Nodes between two checks of the deadline and the stop flag.
const CHECK_INTERVAL: u64 = 64;

/// Portfolio branch-and-bound solver running on its own rayon pool.
///
/// # Examples
///
/// ```
/// use u_picking::cp::{BranchAndBoundSolver, CpModel, CpSolver, IntervalVar, Objective, SolverConfig};
///
/// let mut model = CpModel::new("example", 100);
/// model.add_interval(IntervalVar::new("a", 0, 60, 40, 60).as_optional("a_p"));
/// model.add_interval(IntervalVar::new("b", 0, 60, 30, 60).as_optional("b_p"));
/// model.add_no_overlap(vec!["a".into(), "b".into()]);
/// model.set_objective(Objective::Maximize {
///     terms: vec![("a_p".into(), 2), ("b_p".into(), 1)],
/// });
///
/// let solver = BranchAndBoundSolver::new(1).unwrap();
/// let solution = solver.solve(&model, &SolverConfig::default());
/// assert!(solution.is_solution_found());
/// assert_eq!(solution.objective_value, Some(2));
/// ```
pub struct BranchAndBoundSolver {
    pool: rayon::ThreadPool,
}

impl BranchAndBoundSolver {
    /// Creates a solver backed by `num_threads` search threads.
    ///
    /// Fails if the operating system refuses to spawn the threads.
    pub fn new(num_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .thread_name(|i| format!("cp-search-{i}"))
            .stack_size(16 * 1024 * 1024)
            .build()?;
        Ok(Self { pool })
    }

    /// Number of threads in the search pool.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        let compiled = match Compiled::new(model) {
            Ok(compiled) => compiled,
            Err(reason) => return CpSolution::invalid(reason),
        };

        let deadline = started + Duration::from_millis(config.time_limit_ms);
        let shared = Shared::new();
        let workers = config.num_workers.clamp(1, self.num_threads());
        let seed = config.seed;

        self.pool.scope(|scope| {
            for id in 0..workers {
                let compiled = &compiled;
                let shared = &shared;
                scope.spawn(move |_| Worker::new(compiled, shared, deadline, id, seed).run());
            }
        });

        let proven = shared.proven.load(Ordering::Acquire);
        let nodes = shared.nodes.load(Ordering::Acquire);
        let objective = shared.best_value.load(Ordering::Acquire);
        let Some(starts) = shared.best.into_inner() else {
            return CpSolution {
                nodes,
                solve_time_ms: elapsed_ms(started),
                ..CpSolution::empty(SolverStatus::Timeout)
            };
        };

        let mut intervals = HashMap::with_capacity(starts.len());
        let mut literals = HashMap::with_capacity(starts.len());
        for (iv, start) in model.intervals().iter().zip(&starts) {
            let is_present = start.is_some();
            let start = start.unwrap_or_else(|| iv.earliest_start());
            intervals.insert(
                iv.name.clone(),
                IntervalSolution {
                    start,
                    end: start + iv.duration,
                    is_present,
                },
            );
            if let Some(presence) = &iv.presence {
                literals.insert(presence.name.clone(), is_present);
            }
        }

        let status = if proven {
            SolverStatus::Optimal
        } else {
            SolverStatus::Feasible
        };
        let solve_time_ms = elapsed_ms(started);
        debug!(
            model = %model.name,
            ?status,
            objective,
            nodes,
            workers,
            solve_time_ms,
            "branch-and-bound finished"
        );

        CpSolution {
            status,
            objective_value: Some(objective),
            intervals,
            literals,
            nodes,
            solve_time_ms,
            message: None,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Dense, index-based view of a model.
struct Compiled {
    duration: Vec<i64>,
    earliest: Vec<i64>,
    latest: Vec<i64>,
    weight: Vec<i64>,
    /// Worth placing: positive weight and a non-empty start domain.
    viable: Vec<bool>,
    resource: Vec<usize>,
    members: Vec<Vec<usize>>,
    conflicts: Vec<Vec<usize>>,
    groups: Vec<Vec<usize>>,
    ungrouped: Vec<usize>,
}

impl Compiled {
    fn new(model: &CpModel) -> Result<Self, String> {
        model.validate()?;
        let intervals = model.intervals();
        let n = intervals.len();

        if let Some(iv) = intervals.iter().find(|iv| !iv.is_optional()) {
            return Err(format!("{}: mandatory intervals are not supported", iv.name));
        }

        let mut weight = vec![0i64; n];
        if let Some(Objective::Maximize { terms }) = model.objective() {
            for (name, coefficient) in terms {
                let idx = model
                    .literal_position(name)
                    .ok_or_else(|| format!("undefined literal: {name}"))?;
                weight[idx] = weight[idx].saturating_add(*coefficient);
            }
        }

        let unassigned = usize::MAX;
        let mut resource = vec![unassigned; n];
        let mut members: Vec<Vec<usize>> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut conflicts: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_group = vec![false; n];

        for constraint in model.constraints() {
            match constraint {
                Constraint::NoOverlap { intervals: names } => {
                    let r = members.len();
                    let mut list = Vec::with_capacity(names.len());
                    for name in names {
                        let idx = model
                            .interval_position(name)
                            .ok_or_else(|| format!("undefined interval: {name}"))?;
                        if resource[idx] == r {
                            continue;
                        }
                        if resource[idx] != unassigned {
                            return Err(format!("{name}: interval in more than one no-overlap group"));
                        }
                        resource[idx] = r;
                        list.push(idx);
                    }
                    members.push(list);
                }
                Constraint::AtMostOne { literals } => {
                    let mut group = literals
                        .iter()
                        .map(|name| {
                            model
                                .literal_position(name)
                                .ok_or_else(|| format!("undefined literal: {name}"))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    group.sort_unstable();
                    group.dedup();
                    for &a in &group {
                        in_group[a] = true;
                        conflicts[a].extend(group.iter().copied().filter(|&b| b != a));
                    }
                    groups.push(group);
                }
            }
        }

        for (idx, r) in resource.iter_mut().enumerate() {
            if *r == unassigned {
                *r = members.len();
                members.push(vec![idx]);
            }
        }
        for list in &mut conflicts {
            list.sort_unstable();
            list.dedup();
        }

        Ok(Self {
            duration: intervals.iter().map(|iv| iv.duration).collect(),
            earliest: intervals.iter().map(|iv| iv.earliest_start()).collect(),
            latest: intervals.iter().map(|iv| iv.latest_start()).collect(),
            viable: intervals
                .iter()
                .zip(&weight)
                .map(|(iv, &w)| w > 0 && iv.can_be_present())
                .collect(),
            weight,
            resource,
            members,
            conflicts,
            groups,
            ungrouped: (0..n).filter(|&i| !in_group[i]).collect(),
        })
    }

    fn len(&self) -> usize {
        self.duration.len()
    }

    /// Candidate priority for a worker: position of each interval in the
    /// worker's preferred order.
    fn ranks(&self, worker: usize, seed: u64) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        match worker {
            0 => order.sort_by_key(|&i| (Reverse(self.weight[i]), self.latest[i], i)),
            1 => order.sort_by_key(|&i| (self.latest[i], Reverse(self.weight[i]), i)),
            2 => order.sort_by(|&a, &b| {
                // weight per second, compared without division
                let lhs = self.weight[b] as i128 * self.duration[a].max(1) as i128;
                let rhs = self.weight[a] as i128 * self.duration[b].max(1) as i128;
                lhs.cmp(&rhs).then(a.cmp(&b))
            }),
            _ => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
                order.shuffle(&mut rng);
            }
        }
        let mut rank = vec![0; order.len()];
        for (pos, &i) in order.iter().enumerate() {
            rank[i] = pos;
        }
        rank
    }
}

/// State shared by all workers of one solve.
struct Shared {
    best_value: AtomicI64,
    best: Mutex<Option<Vec<Option<i64>>>>,
    stop: AtomicBool,
    proven: AtomicBool,
    nodes: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            best_value: AtomicI64::new(i64::MIN),
            best: Mutex::new(None),
            stop: AtomicBool::new(false),
            proven: AtomicBool::new(false),
            nodes: AtomicU64::new(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Undecided,
    Present(i64),
    Absent,
}

struct Worker<'a> {
    model: &'a Compiled,
    shared: &'a Shared,
    deadline: Instant,
    cells: Vec<Cell>,
    clock: Vec<i64>,
    open: Vec<bool>,
    /// Members of each resource in this worker's candidate order.
    members: Vec<Vec<usize>>,
    trail: Vec<usize>,
    objective: i64,
    nodes: u64,
}

impl<'a> Worker<'a> {
    fn new(model: &'a Compiled, shared: &'a Shared, deadline: Instant, id: usize, seed: u64) -> Self {
        let rank = model.ranks(id, seed);
        let members = model
            .members
            .iter()
            .map(|list| {
                let mut list = list.clone();
                list.sort_by_key(|&i| rank[i]);
                list
            })
            .collect();
        let cells = model
            .viable
            .iter()
            .map(|&v| if v { Cell::Undecided } else { Cell::Absent })
            .collect();

        Self {
            model,
            shared,
            deadline,
            cells,
            clock: vec![i64::MIN; model.members.len()],
            open: vec![true; model.members.len()],
            members,
            trail: Vec::new(),
            objective: 0,
            nodes: 0,
        }
    }

    fn run(mut self) {
        if self.dfs() {
            self.shared.proven.store(true, Ordering::Release);
            self.shared.stop.store(true, Ordering::Release);
        }
        self.shared.nodes.fetch_add(self.nodes, Ordering::AcqRel);
    }

    /// Returns `false` when the search was interrupted.
    fn dfs(&mut self) -> bool {
        self.nodes += 1;
        if self.nodes % CHECK_INTERVAL == 0 && self.should_stop() {
            return false;
        }

        self.record();
        // Siblings restore the state, so the bound holds for the whole node.
        let bound = self.upper_bound();
        if bound <= self.incumbent() {
            return true;
        }

        let Some(r) = self.next_resource() else {
            return true;
        };

        let candidates: Vec<usize> = self.members[r]
            .iter()
            .copied()
            .filter(|&i| self.placeable(i))
            .collect();
        for c in candidates {
            if bound <= self.incumbent() {
                return true;
            }
            if !self.place(r, c) {
                return false;
            }
        }

        // Nothing more on this resource.
        self.open[r] = false;
        let completed = self.dfs();
        self.open[r] = true;
        completed
    }

    fn place(&mut self, r: usize, c: usize) -> bool {
        let model = self.model;
        let start = self.clock[r].max(model.earliest[c]);
        let saved_clock = self.clock[r];
        let mark = self.trail.len();

        self.cells[c] = Cell::Present(start);
        self.objective += model.weight[c];
        self.clock[r] = start + model.duration[c];
        for &other in &model.conflicts[c] {
            if self.cells[other] == Cell::Undecided {
                self.cells[other] = Cell::Absent;
                self.trail.push(other);
            }
        }

        let completed = self.dfs();

        for other in self.trail.drain(mark..) {
            self.cells[other] = Cell::Undecided;
        }
        self.clock[r] = saved_clock;
        self.objective -= model.weight[c];
        self.cells[c] = Cell::Undecided;
        completed
    }

    fn placeable(&self, i: usize) -> bool {
        if self.cells[i] != Cell::Undecided {
            return false;
        }
        let r = self.model.resource[i];
        self.open[r] && self.clock[r].max(self.model.earliest[i]) <= self.model.latest[i]
    }

    fn next_resource(&self) -> Option<usize> {
        (0..self.clock.len())
            .filter(|&r| self.open[r])
            .min_by_key(|&r| (self.clock[r], r))
    }

    fn upper_bound(&self) -> i64 {
        let model = self.model;
        let mut bound = self.objective;
        for group in &model.groups {
            let best = group
                .iter()
                .filter(|&&i| self.placeable(i))
                .map(|&i| model.weight[i])
                .max()
                .unwrap_or(0);
            bound = bound.saturating_add(best);
        }
        for &i in &model.ungrouped {
            if self.placeable(i) {
                bound = bound.saturating_add(model.weight[i]);
            }
        }
        bound
    }

    fn incumbent(&self) -> i64 {
        self.shared.best_value.load(Ordering::Acquire)
    }

    fn record(&self) {
        if self.objective <= self.incumbent() {
            return;
        }
        let mut best = self.shared.best.lock();
        if self.objective <= self.incumbent() {
            return;
        }
        *best = Some(
            self.cells
                .iter()
                .map(|cell| match cell {
                    Cell::Present(start) => Some(*start),
                    _ => None,
                })
                .collect(),
        );
        self.shared.best_value.store(self.objective, Ordering::Release);
    }

    fn should_stop(&self) -> bool {
        if self.shared.stop.load(Ordering::Acquire) {
            return true;
        }
        if Instant::now() >= self.deadline {
            self.shared.stop.store(true, Ordering::Release);
            return true;
        }
        false
    }
}
