//! The controller that owns all application state.
//!
//! [`TodoApp`] is the only way to mutate the active list or the history log.
//! It hydrates from its store when opened and writes the affected record
//! after every successful mutation. When a write fails the in-memory change
//! is kept and the error is returned; memory stays the source of truth.
//!
//! A store must only be opened by one `TodoApp` at a time.

use crate::ai::TaskGenerator;
use crate::error::AppError;
use crate::export;
use crate::history::HistoryLog;
use crate::model::{HistorySnapshot, Task, TaskId, Transition};
use crate::storage::KeyValueStore;
use crate::sync::SyncLayer;
use crate::task_list::TaskList;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub tasks: TaskList,
    pub history: HistoryLog,
}

/// Yes/no gate in front of destructive operations.
pub trait Confirmation {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirmation for F {
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored {
        tasks: usize,
        archived_discarded: bool,
    },
    Declined,
}

/// Proof that a generation was started. Hand it back to
/// [`TodoApp::finish_generation`] to release the slot.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct GenerationTicket {
    sequence: u64,
    prompt: String,
}

impl GenerationTicket {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

pub struct TodoApp<S> {
    state: AppState,
    sync: SyncLayer<S>,
    archive_on_restore: bool,
    clock: Box<dyn Fn() -> OffsetDateTime>,
    generation_sequence: u64,
    generation_in_flight: Option<u64>,
}

impl<S: KeyValueStore> TodoApp<S> {
    /// Hydrates both records from `store` before anything can be written.
    pub fn open(store: S) -> Result<Self, AppError> {
        let mut sync = SyncLayer::new(store);
        let hydrated = sync.hydrate()?;

        Ok(Self {
            state: AppState {
                tasks: TaskList::from_tasks(hydrated.tasks),
                history: HistoryLog::from_snapshots(hydrated.history),
            },
            sync,
            archive_on_restore: false,
            clock: Box::new(OffsetDateTime::now_utc),
            generation_sequence: 0,
            generation_in_flight: None,
        })
    }

    pub fn with_archive_on_restore(mut self, enabled: bool) -> Self {
        self.set_archive_on_restore(enabled);
        self
    }

    pub fn set_archive_on_restore(&mut self, enabled: bool) {
        self.archive_on_restore = enabled;
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> OffsetDateTime + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        self.state.tasks.tasks()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.state.history
    }

    pub fn store(&self) -> &S {
        self.sync.store()
    }

    pub fn into_store(self) -> S {
        self.sync.into_store()
    }

    /// `Ok(None)` when `text` is blank.
    pub fn add(&mut self, text: &str) -> Result<Option<Task>, AppError> {
        let Some(task) = self.state.tasks.add(text)? else {
            return Ok(None);
        };
        self.persist_tasks()?;
        Ok(Some(task))
    }

    /// `Ok(None)` when no task has this id.
    pub fn toggle(&mut self, id: TaskId) -> Result<Option<(Task, Transition)>, AppError> {
        let Some(toggled) = self.state.tasks.toggle(id) else {
            return Ok(None);
        };
        self.persist_tasks()?;
        Ok(Some(toggled))
    }

    pub fn edit(&mut self, id: TaskId, text: &str) -> Result<Option<Task>, AppError> {
        let Some(task) = self.state.tasks.edit(id, text) else {
            return Ok(None);
        };
        self.persist_tasks()?;
        Ok(Some(task))
    }

    pub fn delete(&mut self, id: TaskId) -> Result<Option<Task>, AppError> {
        let Some(task) = self.state.tasks.delete(id) else {
            return Ok(None);
        };
        self.persist_tasks()?;
        Ok(Some(task))
    }

    /// Archives the active list, then empties it.
    ///
    /// Both steps happen in memory before either record is written, so a
    /// caller never sees one without the other. History is written first and
    /// the stored tasks are only emptied once it has landed. An empty list is
    /// archived too.
    pub fn clear_all(&mut self) -> Result<HistorySnapshot, AppError> {
        let now = (self.clock)();
        let snapshot = self
            .state
            .history
            .archive_current(self.state.tasks.tasks(), now)
            .clone();
        self.state.tasks.clear();
        info!(
            archived = snapshot.tasks.len(),
            snapshots = self.state.history.len(),
            "cleared active list"
        );

        self.persist_history()?;
        self.persist_tasks()?;
        Ok(snapshot)
    }

    pub fn snapshot_at(&self, display_index: usize) -> Result<&HistorySnapshot, AppError> {
        self.state.history.snapshot_at(display_index)
    }

    /// Replaces the active list with a copy of a history snapshot.
    ///
    /// The snapshot stays in the log. Unless `archive_on_restore` is set the
    /// list being replaced is discarded.
    pub fn restore(
        &mut self,
        display_index: usize,
        confirmation: &mut dyn Confirmation,
    ) -> Result<RestoreOutcome, AppError> {
        let snapshot = self.state.history.snapshot_at(display_index)?.clone();
        let label = snapshot
            .timestamp
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        let question = format!(
            "Replace the current {} task(s) with the {} task(s) archived at {}?",
            self.state.tasks.len(),
            snapshot.tasks.len(),
            label
        );
        if !confirmation.confirm(&question) {
            return Ok(RestoreOutcome::Declined);
        }

        let archived_discarded = self.archive_on_restore && !self.state.tasks.is_empty();
        if archived_discarded {
            let now = (self.clock)();
            self.state
                .history
                .archive_current(self.state.tasks.tasks(), now);
        }

        let restored = snapshot.tasks.len();
        self.state.tasks.replace_all(snapshot.tasks);
        info!(display_index, restored, archived_discarded, "restored snapshot");

        if archived_discarded {
            self.persist_history()?;
        }
        self.persist_tasks()?;

        Ok(RestoreOutcome::Restored {
            tasks: restored,
            archived_discarded,
        })
    }

    /// Reserves the single generation slot.
    ///
    /// The list stays editable until the ticket is finished; results are
    /// appended to whatever the list holds at that point.
    pub fn begin_generation(&mut self, prompt: &str) -> Result<GenerationTicket, AppError> {
        if prompt.trim().is_empty() {
            return Err(AppError::invalid_input("prompt is required"));
        }
        if self.generation_in_flight.is_some() {
            return Err(AppError::invalid_state("generation already in progress"));
        }

        self.generation_sequence += 1;
        self.generation_in_flight = Some(self.generation_sequence);
        Ok(GenerationTicket {
            sequence: self.generation_sequence,
            prompt: prompt.to_string(),
        })
    }

    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<Vec<String>, AppError>,
    ) -> Result<Vec<Task>, AppError> {
        if self.generation_in_flight != Some(ticket.sequence) {
            return Err(AppError::invalid_state("generation ticket is not active"));
        }
        self.generation_in_flight = None;

        let texts = match result {
            Ok(texts) => texts,
            Err(err) => {
                warn!(error = %err, "task generation failed");
                return Err(err);
            }
        };

        let mut added = Vec::with_capacity(texts.len());
        let mut exhausted = None;
        for text in &texts {
            match self.state.tasks.add(text.trim()) {
                Ok(Some(task)) => added.push(task),
                Ok(None) => {}
                Err(err) => {
                    exhausted = Some(err);
                    break;
                }
            }
        }
        info!(added = added.len(), "appended generated tasks");
        if !added.is_empty() {
            self.persist_tasks()?;
        }
        match exhausted {
            Some(err) => Err(err),
            None => Ok(added),
        }
    }

    pub fn generate_with(
        &mut self,
        prompt: &str,
        generator: &dyn TaskGenerator,
    ) -> Result<Vec<Task>, AppError> {
        let ticket = self.begin_generation(prompt)?;
        let result = generator.generate(ticket.prompt());
        self.finish_generation(ticket, result)
    }

    pub fn export_plain(&self) -> String {
        export::to_plain_text(self.tasks())
    }

    pub fn export_html(&self) -> String {
        export::to_html(self.tasks())
    }

    fn persist_tasks(&mut self) -> Result<(), AppError> {
        self.sync.persist(self.state.tasks.tasks())
    }

    fn persist_history(&mut self) -> Result<(), AppError> {
        self.sync.persist_history(self.state.history.snapshots())
    }
}
