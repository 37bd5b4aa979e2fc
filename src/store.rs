// In-memory task store with CSV export

use crate::csv_file;
use crate::models::Task;
use eyre::{Result, eyre};
use std::path::Path;
use tracing::{debug, info, warn};

/// Ordered list of tasks owned by a single session
///
/// Every task's id equals its 1-based position. Tasks are never removed or
/// reordered, so the invariant holds for the store's lifetime.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a new pending task and return it
    pub fn add(&mut self, name: impl Into<String>) -> &Task {
        let id = self.next_id();
        let task = Task::new(id, name);
        debug!(id, name = %task.name, "add: appending task");

        self.tasks.push(task);
        &self.tasks[self.tasks.len() - 1]
    }

    /// All tasks in insertion order
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    /// Get a task by id
    pub fn get(&self, id: i64) -> Option<&Task> {
        let index = self.index_of(id)?;
        self.tasks.get(index)
    }

    /// Mark a task as complete
    ///
    /// Completing an already-completed task succeeds. Any id outside
    /// `1..=len` fails and leaves the store untouched.
    pub fn complete(&mut self, id: i64) -> Result<&Task> {
        let index = self.index_of(id).ok_or_else(|| eyre!("Invalid Task ID: {}", id))?;

        self.tasks[index].completed = true;
        debug!(id, "complete: task marked complete");
        Ok(&self.tasks[index])
    }

    /// Write all tasks to `path` as CSV, replacing the file
    pub fn export(&self, path: &Path) -> Result<()> {
        csv_file::export_csv(path, &self.tasks)
    }

    /// Append tasks previously exported to `path`
    ///
    /// Ids are renumbered by position. Returns the number of tasks loaded.
    pub fn import(&mut self, path: &Path) -> Result<usize> {
        let loaded = csv_file::import_csv(path)?;
        let count = loaded.len();

        for task in loaded {
            let id = self.next_id();
            if task.id != id {
                warn!(file = ?path, file_id = task.id, id, "Task id in file does not match position, renumbering");
            }
            self.tasks.push(Task { id, ..task });
        }

        info!(file = ?path, count, total = self.tasks.len(), "Imported tasks");
        Ok(count)
    }

    fn next_id(&self) -> u32 {
        u32::try_from(self.tasks.len() + 1).unwrap_or(u32::MAX)
    }

    fn index_of(&self, id: i64) -> Option<usize> {
        if id < 1 {
            return None;
        }
        let index = usize::try_from(id - 1).ok()?;
        (index < self.tasks.len()).then_some(index)
    }
}
