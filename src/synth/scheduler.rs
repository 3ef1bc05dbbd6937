//! Deferred events on the engine clock.
//!
//! The scheduler never runs anything by itself; the engine polls it with
//! [`Scheduler::pop_due`] after advancing its clock. Every scheduled event
//! returns a [`TaskHandle`] that can cancel it before it fires.

/// Cancel handle for a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    #[cfg(test)]
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug)]
struct Scheduled<E> {
    due: f64,
    handle: TaskHandle,
    event: E,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    /// Kept sorted by (due, handle) so ties fire in scheduling order
    pending: Vec<Scheduled<E>>,
    next_id: u64,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `event` to fire once the clock reaches `due`.
    pub fn schedule_at(&mut self, due: f64, event: E) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;

        let index = self
            .pending
            .partition_point(|task| task.due <= due);
        self.pending.insert(index, Scheduled { due, handle, event });
        handle
    }

    /// Cancel a pending event. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.pending.iter().position(|task| task.handle == handle) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove and return the earliest event due at or before `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<(TaskHandle, E)> {
        match self.pending.first() {
            Some(task) if task.due <= now => {
                let task = self.pending.remove(0);
                Some((task.handle, task.event))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
