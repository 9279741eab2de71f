//! The active, ordered list of tasks.
//!
//! Lookups that miss are no-ops: they return `None` and leave the list
//! untouched. Nothing here knows about history or persistence.

use crate::error::AppError;
use crate::model::{Task, TaskId, Transition};
use time::OffsetDateTime;

/// Hands out millisecond-derived ids that are strictly increasing, even when
/// several tasks are created within the same millisecond. Fails rather than
/// repeat an id once `i64::MAX` has been handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdGenerator {
    last: TaskId,
}

impl IdGenerator {
    pub fn seeded(tasks: &[Task]) -> Self {
        let mut generator = Self::default();
        generator.observe(tasks);
        generator
    }

    pub fn next(&mut self) -> Result<TaskId, AppError> {
        let now = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as TaskId;
        self.next_at(now)
    }

    pub fn next_at(&mut self, now_millis: TaskId) -> Result<TaskId, AppError> {
        let following = self
            .last
            .checked_add(1)
            .ok_or_else(|| AppError::invalid_data("task id space exhausted"))?;
        let id = now_millis.max(following);
        self.last = id;
        Ok(id)
    }

    /// Moves the generator past every id in `tasks`.
    pub fn observe(&mut self, tasks: &[Task]) {
        if let Some(max) = tasks.iter().map(|task| task.id).max() {
            self.last = self.last.max(max);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    ids: IdGenerator,
}

impl PartialEq for TaskList {
    fn eq(&self, other: &Self) -> bool {
        self.tasks == other.tasks
    }
}

impl Eq for TaskList {}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let ids = IdGenerator::seeded(&tasks);
        Self { tasks, ids }
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

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Appends a pending task. Blank or whitespace-only text is skipped.
    pub fn add(&mut self, text: &str) -> Result<Option<Task>, AppError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let task = Task::new(self.ids.next()?, text);
        self.tasks.push(task.clone());
        Ok(Some(task))
    }

    pub fn toggle(&mut self, id: TaskId) -> Option<(Task, Transition)> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        let transition = if task.completed {
            Transition::Completed
        } else {
            Transition::Reopened
        };
        Some((task.clone(), transition))
    }

    /// Replaces the text as given; an empty string is allowed here.
    pub fn edit(&mut self, id: TaskId, text: &str) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.text = text.to_string();
        Some(task.clone())
    }

    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Empties the list and returns what it held.
    pub fn clear(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.ids.observe(&tasks);
        self.tasks = tasks;
    }
}
