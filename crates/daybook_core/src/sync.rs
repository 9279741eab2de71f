//! Moves the active list and the history log between memory and a
//! [`KeyValueStore`].
//!
//! Both records are written whole after every mutation. Writes are refused
//! until [`SyncLayer::hydrate`] has run, so a fresh process can never replace
//! stored data with its empty defaults.

use crate::error::AppError;
use crate::model::{HistorySnapshot, Task};
use crate::storage::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::debug;

pub const TASKS_KEY: &str = "todos";
pub const HISTORY_KEY: &str = "todo_history";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hydrated {
    pub tasks: Vec<Task>,
    pub history: Vec<HistorySnapshot>,
}

#[derive(Debug)]
pub struct SyncLayer<S> {
    store: S,
    hydrated: bool,
}

impl<S: KeyValueStore> SyncLayer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            hydrated: false,
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn hydrate(&mut self) -> Result<Hydrated, AppError> {
        let tasks: Vec<Task> = self.read_record(TASKS_KEY)?.unwrap_or_default();
        ensure_unique_ids(&tasks, TASKS_KEY)?;

        let history: Vec<HistorySnapshot> = self.read_record(HISTORY_KEY)?.unwrap_or_default();
        for snapshot in &history {
            ensure_unique_ids(&snapshot.tasks, HISTORY_KEY)?;
        }

        debug!(
            tasks = tasks.len(),
            snapshots = history.len(),
            "hydrated from store"
        );
        self.hydrated = true;
        Ok(Hydrated { tasks, history })
    }

    pub fn persist(&mut self, tasks: &[Task]) -> Result<(), AppError> {
        self.write_record(TASKS_KEY, tasks)
    }

    pub fn persist_history(&mut self, history: &[HistorySnapshot]) -> Result<(), AppError> {
        self.write_record(HISTORY_KEY, history)
    }

    fn read_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let Some(bytes) = self.store.get(key)? else {
            debug!(key, "record absent, using empty default");
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| AppError::invalid_data(format!("record '{key}': {err}")))
    }

    fn write_record<T>(&mut self, key: &str, value: &T) -> Result<(), AppError>
    where
        T: Serialize + ?Sized,
    {
        if !self.hydrated {
            return Err(AppError::invalid_state(format!(
                "refusing to write '{key}' before hydration"
            )));
        }

        let bytes =
            serde_json::to_vec(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.store.set(key, &bytes)?;
        debug!(key, bytes = bytes.len(), "persisted record");
        Ok(())
    }
}

fn ensure_unique_ids(tasks: &[Task], key: &str) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(task.id) {
            return Err(AppError::invalid_data(format!(
                "record '{key}' contains duplicate task id {}",
                task.id
            )));
        }
    }
    Ok(())
}
