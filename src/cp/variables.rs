//! CP variable types.

use std::fmt;

/// Index of an interval variable inside a [`CpModel`](super::CpModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(usize);

impl IntervalId {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntervalId({})", self.0)
    }
}

/// A finite set of candidate integer values, kept sorted and unique.
///
/// # Examples
///
/// ```
/// use u_itinerary::cp::Domain;
///
/// let d = Domain::from_values([7, 3, 5, 3]);
/// assert_eq!(d.values(), &[3, 5, 7]);
/// assert_eq!(d.min(), Some(3));
/// assert!(Domain::range(4, 2).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domain {
    values: Vec<i64>,
}

impl Domain {
    /// The empty domain.
    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    /// All integers in `[min, max]`; empty when `min > max`.
    pub fn range(min: i64, max: i64) -> Self {
        if min > max {
            return Self::empty();
        }
        Self {
            values: (min..=max).collect(),
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = i64>) -> Self {
        let mut values: Vec<i64> = values.into_iter().collect();
        values.sort_unstable();
        values.dedup();
        Self { values }
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> Option<i64> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<i64> {
        self.values.last().copied()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    /// Keeps only the values matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&i64) -> bool) {
        self.values.retain(keep);
    }
}

/// A fixed-duration interval `[start, start + duration)`.
///
/// The start is a decision variable over [`Domain`]; the end is derived
/// as `start + duration`, so `end - start == duration` holds for every
/// assignment.
///
/// # Examples
///
/// ```
/// use u_itinerary::cp::IntervalVar;
///
/// let op = IntervalVar::new("leg", 10, 20, 4);
/// assert_eq!(op.end_min(), Some(14));
/// assert_eq!(op.end_max(), Some(24));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalVar {
    /// Variable name.
    pub name: String,
    /// Candidate start values.
    pub start: Domain,
    /// Fixed duration.
    pub duration: i64,
}

impl IntervalVar {
    /// Creates an interval whose start ranges over `[start_min, start_max]`.
    pub fn new(name: impl Into<String>, start_min: i64, start_max: i64, duration: i64) -> Self {
        Self::with_domain(name, Domain::range(start_min, start_max), duration)
    }

    /// Creates an interval with an explicit start domain.
    pub fn with_domain(name: impl Into<String>, start: Domain, duration: i64) -> Self {
        Self {
            name: name.into(),
            start,
            duration,
        }
    }

    pub fn end_min(&self) -> Option<i64> {
        self.start.min().map(|s| s + self.duration)
    }

    pub fn end_max(&self) -> Option<i64> {
        self.start.max().map(|s| s + self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_range() {
        let d = Domain::range(3, 6);
        assert_eq!(d.len(), 4);
        assert_eq!(d.min(), Some(3));
        assert_eq!(d.max(), Some(6));
        assert!(d.contains(5));
        assert!(!d.contains(7));
    }

    #[test]
    fn test_domain_empty() {
        let d = Domain::range(5, 4);
        assert!(d.is_empty());
        assert_eq!(d.min(), None);
        assert_eq!(Domain::empty(), d);
    }

    #[test]
    fn test_domain_retain() {
        let mut d = Domain::range(0, 9);
        d.retain(|v| v % 3 == 0);
        assert_eq!(d.values(), &[0, 3, 6, 9]);
    }

    #[test]
    fn test_interval_var() {
        let iv = IntervalVar::new("op1", 0, 100, 50);
        assert_eq!(iv.name, "op1");
        assert_eq!(iv.start.min(), Some(0));
        assert_eq!(iv.start.max(), Some(100));
        assert_eq!(iv.duration, 50);
        assert_eq!(iv.end_min(), Some(50));
        assert_eq!(iv.end_max(), Some(150));
    }

    #[test]
    fn test_interval_empty_domain() {
        let iv = IntervalVar::new("op1", 10, 5, 2);
        assert!(iv.start.is_empty());
        assert_eq!(iv.end_min(), None);
    }

    #[test]
    fn test_interval_id() {
        let id = IntervalId::new(3);
        assert_eq!(id.get(), 3);
        assert_eq!(id.to_string(), "IntervalId(3)");
    }
}
