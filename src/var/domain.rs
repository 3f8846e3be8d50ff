//! Integer domains and modification events.

use super::store::VarId;
use std::fmt;

/// What a domain mutation did to the variable.
///
/// Events are ordered by strength: an `Assigned` event is also a bounds
/// change, and a bounds change is also a domain change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModEvent {
    /// The domain was not modified.
    NoChange,
    /// An interior value was removed; both bounds are unchanged.
    Domain,
    /// The minimum or maximum moved, the variable is still unassigned.
    Bounds,
    /// The domain shrank to a single value.
    Assigned,
}

impl ModEvent {
    /// Whether the mutation changed anything.
    pub fn changed(self) -> bool {
        self != ModEvent::NoChange
    }
}

/// A domain became empty, or a propagator proved its constraint violated.
///
/// This is routine during search: the engine reacts by abandoning the
/// branch. `var` names the variable whose domain was wiped out, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainFailure {
    /// Variable whose domain became empty.
    pub var: Option<VarId>,
}

impl DomainFailure {
    /// A failure that is not tied to a single variable.
    pub fn conflict() -> Self {
        Self { var: None }
    }

    /// A failure caused by `var` losing its last value.
    pub fn on(var: VarId) -> Self {
        Self { var: Some(var) }
    }
}

impl fmt::Display for DomainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.var {
            Some(v) => write!(f, "domain of {v} became empty"),
            None => write!(f, "constraint failed"),
        }
    }
}

impl std::error::Error for DomainFailure {}

/// Domain of an integer variable.
///
/// Stored as sorted, disjoint, non-adjacent closed ranges. Most propagators
/// only read and write the bounds; [`IntVar::exclude`] may punch holes.
///
/// # Examples
///
/// ```
/// use u_cpsolve::var::{IntVar, ModEvent};
///
/// let mut v = IntVar::new(0, 4);
/// assert_eq!(v.exclude(2), Ok(ModEvent::Domain));
/// assert_eq!(v.size(), 4);
/// assert_eq!(v.tighten_max(2), Ok(ModEvent::Bounds));
/// assert_eq!(v.max(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    ranges: Vec<(i64, i64)>,
}

/// Outcome of a domain mutation: the event, or the failure it caused.
pub type Mutation = Result<ModEvent, DomainFailure>;

impl IntVar {
    /// Creates a variable with domain `[min, max]`.
    ///
    /// Callers must ensure `min <= max`; [`crate::space::Space::int_var`]
    /// checks this and reports [`crate::CpError::EmptyDomain`]. Sizes
    /// saturate at `u64::MAX` for domains wider than the
    /// [`limits`](super::limits) allow.
    pub fn new(min: i64, max: i64) -> Self {
        debug_assert!(min <= max, "empty initial domain");
        Self {
            ranges: vec![(min, max)],
        }
    }

    /// Smallest value in the domain.
    pub fn min(&self) -> i64 {
        self.ranges[0].0
    }

    /// Largest value in the domain.
    pub fn max(&self) -> i64 {
        self.ranges[self.ranges.len() - 1].1
    }

    /// Number of values left.
    pub fn size(&self) -> u64 {
        self.ranges
            .iter()
            .map(|&(lo, hi)| hi.abs_diff(lo).saturating_add(1))
            .fold(0, u64::saturating_add)
    }

    /// Distance between the bounds plus one (ignores holes).
    pub fn width(&self) -> u64 {
        self.max().abs_diff(self.min()).saturating_add(1)
    }

    /// Whether the domain holds exactly one value.
    pub fn assigned(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].0 == self.ranges[0].1
    }

    /// The assigned value, or `None` while more than one value remains.
    pub fn val(&self) -> Option<i64> {
        if self.assigned() {
            Some(self.ranges[0].0)
        } else {
            None
        }
    }

    /// Whether `value` is still in the domain.
    pub fn contains(&self, value: i64) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if hi < value {
                    std::cmp::Ordering::Less
                } else if lo > value {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// The disjoint ranges making up the domain, in increasing order.
    pub fn ranges(&self) -> &[(i64, i64)] {
        &self.ranges
    }

    /// Iterates over every value in increasing order.
    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.ranges.iter().flat_map(|&(lo, hi)| lo..=hi)
    }

    /// Removes every value below `value`.
    pub fn tighten_min(&mut self, value: i64) -> Mutation {
        if value <= self.min() {
            return Ok(ModEvent::NoChange);
        }
        if value > self.max() {
            return Err(DomainFailure::conflict());
        }
        let before = self.snapshot();
        self.ranges.retain(|&(_, hi)| hi >= value);
        if self.ranges[0].0 < value {
            self.ranges[0].0 = value;
        }
        Ok(self.event_since(before))
    }

    /// Removes every value above `value`.
    pub fn tighten_max(&mut self, value: i64) -> Mutation {
        if value >= self.max() {
            return Ok(ModEvent::NoChange);
        }
        if value < self.min() {
            return Err(DomainFailure::conflict());
        }
        let before = self.snapshot();
        self.ranges.retain(|&(lo, _)| lo <= value);
        let last = self.ranges.len() - 1;
        if self.ranges[last].1 > value {
            self.ranges[last].1 = value;
        }
        Ok(self.event_since(before))
    }

    /// Keeps only the values inside `[lo, hi]`.
    pub fn restrict(&mut self, lo: i64, hi: i64) -> Mutation {
        if lo > hi || hi < self.min() || lo > self.max() {
            return Err(DomainFailure::conflict());
        }
        if !self.ranges.iter().any(|&(a, b)| a <= hi && b >= lo) {
            return Err(DomainFailure::conflict());
        }
        let before = self.snapshot();
        self.tighten_min(lo)?;
        self.tighten_max(hi)?;
        Ok(self.event_since(before))
    }

    /// Removes a single value.
    pub fn exclude(&mut self, value: i64) -> Mutation {
        self.exclude_range(value, value)
    }

    /// Removes every value inside `[lo, hi]`.
    pub fn exclude_range(&mut self, lo: i64, hi: i64) -> Mutation {
        if lo > hi || hi < self.min() || lo > self.max() {
            return Ok(ModEvent::NoChange);
        }
        let mut kept = Vec::with_capacity(self.ranges.len() + 1);
        for &(a, b) in &self.ranges {
            if b < lo || a > hi {
                kept.push((a, b));
                continue;
            }
            if a < lo {
                kept.push((a, lo - 1));
            }
            if b > hi {
                kept.push((hi + 1, b));
            }
        }
        if kept.is_empty() {
            return Err(DomainFailure::conflict());
        }
        let before = self.snapshot();
        self.ranges = kept;
        Ok(self.event_since(before))
    }

    /// Reduces the domain to `value`.
    pub fn assign(&mut self, value: i64) -> Mutation {
        if !self.contains(value) {
            return Err(DomainFailure::conflict());
        }
        if self.assigned() {
            return Ok(ModEvent::NoChange);
        }
        self.ranges.clear();
        self.ranges.push((value, value));
        Ok(ModEvent::Assigned)
    }

    fn snapshot(&self) -> (i64, i64, u64) {
        (self.min(), self.max(), self.size())
    }

    fn event_since(&self, (min, max, size): (i64, i64, u64)) -> ModEvent {
        if self.assigned() && size > 1 {
            ModEvent::Assigned
        } else if self.min() != min || self.max() != max {
            ModEvent::Bounds
        } else if self.size() != size {
            ModEvent::Domain
        } else {
            ModEvent::NoChange
        }
    }
}

impl fmt::Display for IntVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(v) = self.val() {
            return write!(f, "{v}");
        }
        write!(f, "{{")?;
        for (i, &(lo, hi)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if lo == hi {
                write!(f, "{lo}")?;
            } else {
                write!(f, "{lo}..{hi}")?;
            }
        }
        write!(f, "}}")
    }
}
