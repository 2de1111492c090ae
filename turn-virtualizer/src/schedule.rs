use alloc::vec::Vec;

/// Handle to a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskId(u64);

/// Deferred work the engine hands itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskKind {
    /// Apply a triggered restoration batch.
    ApplyBatch { count: usize },
    /// End of the post-batch settle delay.
    ReleaseLock,
    /// Probe for the render surface again.
    BootstrapRetry { attempt: u32 },
    /// Start again after a navigation reset.
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) due_ms: u64,
    pub(crate) epoch: u64,
    pub(crate) kind: TaskKind,
}

/// A deadline-ordered task list driven by adapter-supplied time.
///
/// Tasks due at the same time run in scheduling order.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn schedule(&mut self, due_ms: u64, epoch: u64, kind: TaskKind) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tasks.push(Task {
            id,
            due_ms,
            epoch,
            kind,
        });
        id
    }

    /// Removes a pending task. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.tasks.iter().map(|t| t.due_ms).min()
    }

    pub fn pending(&self) -> impl Iterator<Item = (TaskId, TaskKind)> + '_ {
        self.tasks.iter().map(|t| (t.id, t.kind))
    }

    /// Pops the earliest task due at or before `now_ms`.
    pub(crate) fn pop_due(&mut self, now_ms: u64) -> Option<Task> {
        let pos = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;
        Some(self.tasks.remove(pos))
    }
}
