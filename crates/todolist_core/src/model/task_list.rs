//! Task list domain model.
//!
//! # Responsibility
//! - Hold an ordered sequence of tasks under one name.
//! - Carry the `mutable` flag that protects the reserved default list.
//!
//! # Invariants
//! - Task order is insertion order and is never re-sorted.
//! - A task id appears at most once per list.
//! - An immutable list keeps its name for its whole lifetime.
//! - Name uniqueness among siblings is enforced by the owning `Account`.

use crate::model::ids::IdSource;
use crate::model::task::Task;
use serde::{Deserialize, Serialize};

/// Name of the list every account owns and can neither rename nor delete.
pub const DEFAULT_LIST_NAME: &str = "Default";

const WELCOME_TASK_TITLE: &str = "Start using your TodoList";
const WELCOME_TASK_COMMENT: &str = "Add, delete and modify entries.";

/// Named, ordered collection of tasks owned by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    id: String,
    name: String,
    mutable: bool,
    tasks: Vec<Task>,
}

impl TaskList {
    /// Creates a user-defined list: mutable and without tasks.
    pub fn new_empty(ids: &dyn IdSource, name: impl Into<String>) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            mutable: true,
            tasks: Vec::new(),
        }
    }

    /// Creates a list seeded with one welcome task.
    ///
    /// Unlike `new_empty`, this path inserts a placeholder task. Account
    /// registration uses it for the default list.
    pub fn new_with_welcome_task(ids: &dyn IdSource, name: impl Into<String>, mutable: bool) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            mutable,
            tasks: vec![Task::new(ids, WELCOME_TASK_TITLE, WELCOME_TASK_COMMENT)],
        }
    }

    /// Rebuilds an empty list from persisted fields; decoders append tasks.
    pub fn restore(id: impl Into<String>, name: impl Into<String>, mutable: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mutable,
            tasks: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the list may be renamed or deleted.
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Renames the list. Returns `false` and keeps the name when immutable.
    pub(crate) fn rename(&mut self, name: impl Into<String>) -> bool {
        if !self.mutable {
            return false;
        }
        self.name = name.into();
        true
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    /// Appends `task`. Returns `false` without mutation when a task with the
    /// same id is already present.
    pub fn add_task(&mut self, task: Task) -> bool {
        if self.task(task.id()).is_some() {
            return false;
        }
        self.tasks.push(task);
        true
    }

    /// Removes and returns the task with `id`, keeping the order of the rest.
    pub fn remove_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id() == id)?;
        Some(self.tasks.remove(index))
    }
}
