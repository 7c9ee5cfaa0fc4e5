//! CP model definition.

use super::variables::IntervalVar;
use std::collections::HashMap;

/// A constraint in the CP model.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// At most one of the named literals may be true.
    AtMostOne {
        /// Names of presence literals.
        literals: Vec<String>,
    },

    /// Non-overlapping intervals on a shared resource.
    ///
    /// No two present intervals in the set may overlap in time.
    NoOverlap {
        /// Names of interval variables that must not overlap.
        intervals: Vec<String>,
    },
}

/// Objective function for the CP model.
#[derive(Debug, Clone)]
pub enum Objective {
    /// Maximize a linear combination of literals.
    Maximize {
        /// (literal_name, coefficient) pairs.
        terms: Vec<(String, i64)>,
    },
}

/// A constraint programming model.
///
/// Intervals are kept in insertion order so that solvers iterate them
/// deterministically; names are resolved through an index.
///
/// # Examples
///
/// ```
/// use u_picking::cp::{CpModel, IntervalVar, Objective};
///
/// let mut model = CpModel::new("example", 1000);
/// model.add_interval(IntervalVar::new("op1", 0, 100, 50, 200).as_optional("op1_p"));
/// model.add_interval(IntervalVar::new("op2", 0, 100, 30, 200).as_optional("op2_p"));
/// model.add_no_overlap(vec!["op1".into(), "op2".into()]);
/// model.set_objective(Objective::Maximize {
///     terms: vec![("op1_p".into(), 1), ("op2_p".into(), 1)],
/// });
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Planning horizon: every time bound lies in `[0, horizon]`.
    pub horizon: i64,
    intervals: Vec<IntervalVar>,
    interval_index: HashMap<String, usize>,
    literal_index: HashMap<String, usize>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
    duplicates: Vec<String>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>, horizon: i64) -> Self {
        Self {
            name: name.into(),
            horizon,
            intervals: Vec::new(),
            interval_index: HashMap::new(),
            literal_index: HashMap::new(),
            constraints: Vec::new(),
            objective: None,
            duplicates: Vec::new(),
        }
    }

    /// Adds an interval variable. Its presence literal, if any, becomes
    /// addressable by name.
    pub fn add_interval(&mut self, var: IntervalVar) {
        let idx = self.intervals.len();
        if self.interval_index.insert(var.name.clone(), idx).is_some() {
            self.duplicates.push(var.name.clone());
        }
        if let Some(presence) = &var.presence {
            if self.literal_index.insert(presence.name.clone(), idx).is_some() {
                self.duplicates.push(presence.name.clone());
            }
        }
        self.intervals.push(var);
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add an at-most-one constraint.
    pub fn add_at_most_one(&mut self, literals: Vec<String>) {
        self.constraints.push(Constraint::AtMostOne { literals });
    }

    /// Convenience: add a no-overlap constraint.
    pub fn add_no_overlap(&mut self, intervals: Vec<String>) {
        self.constraints.push(Constraint::NoOverlap { intervals });
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    pub fn intervals(&self) -> &[IntervalVar] {
        &self.intervals
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Index of the named interval.
    pub fn interval_position(&self, name: &str) -> Option<usize> {
        self.interval_index.get(name).copied()
    }

    /// Index of the interval gated by the named literal.
    pub fn literal_position(&self, name: &str) -> Option<usize> {
        self.literal_index.get(name).copied()
    }

    /// Validates the model for consistency.
    ///
    /// Checks for duplicate names, references to undefined intervals or
    /// literals, negative durations, and a start minimum or end maximum
    /// outside the horizon.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = self.duplicates.first() {
            return Err(format!("duplicate name: {name}"));
        }
        for iv in &self.intervals {
            if iv.duration < 0 {
                return Err(format!("{}: negative duration {}", iv.name, iv.duration));
            }
            // Upper start / lower end bounds may fall outside the horizon;
            // that only empties the domain.
            if iv.start.min < 0 || iv.end.max > self.horizon {
                return Err(format!("{}: bounds outside [0, {}]", iv.name, self.horizon));
            }
        }
        for constraint in &self.constraints {
            match constraint {
                Constraint::AtMostOne { literals } => {
                    for name in literals {
                        if !self.literal_index.contains_key(name) {
                            return Err(format!("undefined literal: {name}"));
                        }
                    }
                }
                Constraint::NoOverlap { intervals } => {
                    for name in intervals {
                        if !self.interval_index.contains_key(name) {
                            return Err(format!("undefined interval: {name}"));
                        }
                    }
                }
            }
        }
        if let Some(Objective::Maximize { terms }) = &self.objective {
            for (name, _) in terms {
                if !self.literal_index.contains_key(name) {
                    return Err(format!("undefined literal in objective: {name}"));
                }
            }
        }
        Ok(())
    }

    /// Returns the number of interval variables.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optional(name: &str, start_min: i64, start_max: i64, duration: i64, end_max: i64) -> IntervalVar {
        IntervalVar::new(name, start_min, start_max, duration, end_max).as_optional(format!("{name}_p"))
    }

    #[test]
    fn test_model_creation() {
        let mut model = CpModel::new("test", 1_000_000);
        model.add_interval(optional("op1", 0, 100_000, 50_000, 200_000));
        model.add_interval(optional("op2", 0, 100_000, 30_000, 200_000));
        model.add_no_overlap(vec!["op1".into(), "op2".into()]);
        model.add_at_most_one(vec!["op1_p".into(), "op2_p".into()]);
        model.set_objective(Objective::Maximize {
            terms: vec![("op1_p".into(), 3), ("op2_p".into(), 2)],
        });

        assert_eq!(model.interval_count(), 2);
        assert_eq!(model.constraint_count(), 2);
        assert!(model.objective().is_some());
        assert_eq!(model.interval_position("op2"), Some(1));
        assert_eq!(model.literal_position("op1_p"), Some(0));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_undefined_interval() {
        let mut model = CpModel::new("test", 1000);
        model.add_no_overlap(vec!["nonexistent".into()]);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_undefined_literal() {
        let mut model = CpModel::new("test", 1000);
        model.add_interval(optional("a", 0, 100, 10, 200));
        model.add_at_most_one(vec!["a_p".into(), "b_p".into()]);
        assert!(model.validate().unwrap_err().contains("b_p"));
    }

    #[test]
    fn test_undefined_objective_literal() {
        let mut model = CpModel::new("test", 1000);
        model.add_interval(optional("a", 0, 100, 10, 200));
        model.set_objective(Objective::Maximize {
            terms: vec![("missing".into(), 1)],
        });
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_duplicate_name() {
        let mut model = CpModel::new("test", 1000);
        model.add_interval(optional("a", 0, 100, 10, 200));
        model.add_interval(optional("a", 0, 100, 10, 200));
        assert!(model.validate().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_bounds_outside_horizon() {
        let mut model = CpModel::new("test", 100);
        model.add_interval(optional("a", 0, 100, 10, 200));
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_empty_domain_is_valid() {
        // An interval that can never be present is not a modeling error.
        let mut model = CpModel::new("test", 1000);
        model.add_interval(optional("a", 500, 100, 10, 200));
        assert!(model.validate().is_ok());
    }
}
