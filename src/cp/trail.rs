//! Undo log for depth-first search.
//!
//! Every domain removal and assignment made while processing a decision is
//! recorded so that backtracking restores the exact previous state.

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum TrailEntry {
    /// A value slot of `var`'s domain was switched off.
    Removed { var: usize, slot: usize },
    /// `var` received a value.
    Assigned { var: usize },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SearchTrail {
    /// The linear history of all changes made to the state.
    entries: Vec<TrailEntry>,
    /// `frames[i]` is the index in `entries` where depth `i` began.
    frames: Vec<usize>,
}

impl SearchTrail {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserves room for a search over `num_vars` variables.
    pub(crate) fn ensure_capacity(&mut self, num_vars: usize) {
        self.frames.reserve((num_vars + 1).saturating_sub(self.frames.len()));
        self.entries
            .reserve((num_vars * 4).saturating_sub(self.entries.len()));
    }

    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub(crate) fn num_entries(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.entries.is_empty()
    }

    #[inline]
    pub(crate) fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    #[inline]
    pub(crate) fn push(&mut self, entry: TrailEntry) {
        self.entries.push(entry);
    }

    /// Removes the newest frame and returns its entries, newest first.
    pub(crate) fn pop_frame(&mut self) -> impl Iterator<Item = TrailEntry> + '_ {
        let start = self.frames.pop().unwrap_or(0);
        self.entries.drain(start..).rev()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_unwind_in_reverse() {
        let mut trail = SearchTrail::new();
        trail.push_frame();
        trail.push(TrailEntry::Assigned { var: 0 });
        trail.push_frame();
        trail.push(TrailEntry::Assigned { var: 1 });
        trail.push(TrailEntry::Removed { var: 2, slot: 5 });
        assert_eq!(trail.depth(), 2);
        assert_eq!(trail.num_entries(), 3);

        let popped: Vec<_> = trail.pop_frame().collect();
        assert_eq!(
            popped,
            vec![
                TrailEntry::Removed { var: 2, slot: 5 },
                TrailEntry::Assigned { var: 1 }
            ]
        );
        assert_eq!(trail.depth(), 1);

        let popped: Vec<_> = trail.pop_frame().collect();
        assert_eq!(popped, vec![TrailEntry::Assigned { var: 0 }]);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut trail = SearchTrail::new();
        trail.ensure_capacity(8);
        trail.push_frame();
        trail.push(TrailEntry::Assigned { var: 0 });
        trail.clear();
        assert!(trail.is_empty());
        assert_eq!(trail.depth(), 0);
    }
}
