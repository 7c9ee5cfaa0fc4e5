//! CP variable types.

/// A boolean decision variable.
///
/// In this framework booleans appear as presence literals of optional
/// intervals; constraints and objective terms refer to them by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolVar {
    /// Variable name (unique within a model).
    pub name: String,
}

impl BoolVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A bounded integer time point with domain `[min, max]`.
///
/// An empty domain (`min > max`) is legal and means no value can be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeVar {
    pub min: i64,
    pub max: i64,
}

impl TimeVar {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

/// A fixed-duration activity with bounded start and end.
///
/// The solver maintains `end = start + duration`. Optional intervals are
/// gated by a presence literal: when the literal is false the interval is
/// ignored by every constraint.
///
/// # Examples
///
/// ```
/// use u_picking::cp::IntervalVar;
///
/// // start in [0, 100], duration 50, end at most 120
/// let op = IntervalVar::new("op1", 0, 100, 50, 120).as_optional("op1_present");
/// assert_eq!(op.latest_start(), 70);
/// assert!(op.presence.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct IntervalVar {
    pub name: String,
    pub start: TimeVar,
    pub end: TimeVar,
    pub duration: i64,
    pub presence: Option<BoolVar>,
}

impl IntervalVar {
    /// Creates a mandatory fixed-duration interval.
    ///
    /// # Arguments
    /// * `name` - Unique name
    /// * `start_min` - Earliest start time
    /// * `start_max` - Latest start time
    /// * `duration` - Fixed duration
    /// * `end_max` - Latest end time
    pub fn new(
        name: impl Into<String>,
        start_min: i64,
        start_max: i64,
        duration: i64,
        end_max: i64,
    ) -> Self {
        Self {
            name: name.into(),
            start: TimeVar::new(start_min, start_max),
            end: TimeVar::new(start_min + duration, end_max),
            duration,
            presence: None,
        }
    }

    /// Makes this interval optional with a presence literal.
    pub fn as_optional(mut self, presence_name: impl Into<String>) -> Self {
        self.presence = Some(BoolVar::new(presence_name));
        self
    }

    pub fn is_optional(&self) -> bool {
        self.presence.is_some()
    }

    /// Earliest feasible start after propagating the end bound.
    pub fn earliest_start(&self) -> i64 {
        self.start.min.max(self.end.min - self.duration)
    }

    /// Latest feasible start after propagating the end bound.
    pub fn latest_start(&self) -> i64 {
        self.start.max.min(self.end.max - self.duration)
    }

    /// Whether some start value satisfies both the start and end domains.
    pub fn can_be_present(&self) -> bool {
        self.earliest_start() <= self.latest_start()
    }
}
