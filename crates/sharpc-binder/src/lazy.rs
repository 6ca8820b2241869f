//! Demand-driven, memoized, cycle-guarded resolution.
//!
//! Constants, using directives and aliases all resolve through a
//! [`LazyCell`]: the first request marks the cell in progress, does the work,
//! and stores either the value or a failure. A request that arrives while the
//! cell is still in progress is a cycle.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LazyState<T> {
    Unresolved,
    InProgress,
    Resolved(T),
    Failed,
}

/// Outcome of [`LazyCell::begin`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Begin<T> {
    /// Already settled: the cached value, or `None` for a cached failure.
    Ready(Option<T>),
    /// The cell was unresolved and is now in progress; call `finish`.
    Started,
    /// The cell is in progress further up the stack.
    Cycle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LazyCell<T> {
    state: LazyState<T>,
}

impl<T> Default for LazyCell<T> {
    fn default() -> Self {
        LazyCell {
            state: LazyState::Unresolved,
        }
    }
}

impl<T: Clone> LazyCell<T> {
    pub const fn new() -> Self {
        LazyCell {
            state: LazyState::Unresolved,
        }
    }

    pub fn begin(&mut self) -> Begin<T> {
        match &self.state {
            LazyState::Resolved(value) => Begin::Ready(Some(value.clone())),
            LazyState::Failed => Begin::Ready(None),
            LazyState::InProgress => Begin::Cycle,
            LazyState::Unresolved => {
                self.state = LazyState::InProgress;
                Begin::Started
            }
        }
    }

    /// Settle an in-progress cell.
    pub fn finish(&mut self, value: Option<T>) {
        debug_assert!(
            matches!(self.state, LazyState::InProgress),
            "finish called on a cell that was not started"
        );
        self.state = match value {
            Some(value) => LazyState::Resolved(value),
            None => LazyState::Failed,
        };
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            LazyState::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub const fn state(&self) -> &LazyState<T> {
        &self.state
    }

    pub const fn is_in_progress(&self) -> bool {
        matches!(self.state, LazyState::InProgress)
    }

    pub const fn is_settled(&self) -> bool {
        matches!(self.state, LazyState::Resolved(_) | LazyState::Failed)
    }

    pub fn reset(&mut self) {
        self.state = LazyState::Unresolved;
    }
}
