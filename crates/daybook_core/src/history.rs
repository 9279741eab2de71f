//! Archive of cleared lists.
//!
//! Snapshots are kept in the order they were archived. Every read that shows
//! them to a user goes through [`HistoryLog::list`], which orders them newest
//! first; display indices always refer to that view.

use crate::error::AppError;
use crate::model::{HistorySnapshot, Task};
use std::cmp::Reverse;
use time::OffsetDateTime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    snapshots: Vec<HistorySnapshot>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshots(snapshots: Vec<HistorySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Snapshots in archive order, as persisted.
    pub fn snapshots(&self) -> &[HistorySnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn archive_current(
        &mut self,
        tasks: &[Task],
        timestamp: OffsetDateTime,
    ) -> &HistorySnapshot {
        self.snapshots.push(HistorySnapshot {
            tasks: tasks.to_vec(),
            timestamp,
        });
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// Newest first. Equal timestamps put the later archive first.
    pub fn list(&self) -> Vec<&HistorySnapshot> {
        self.display_order()
            .into_iter()
            .map(|index| &self.snapshots[index])
            .collect()
    }

    pub fn snapshot_at(&self, display_index: usize) -> Result<&HistorySnapshot, AppError> {
        self.display_order()
            .get(display_index)
            .map(|&index| &self.snapshots[index])
            .ok_or(AppError::IndexOutOfRange {
                index: display_index,
                len: self.snapshots.len(),
            })
    }

    fn display_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.snapshots.len()).collect();
        order.sort_by_key(|&index| Reverse((self.snapshots[index].timestamp, index)));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryLog;
    use crate::model::Task;
    use time::macros::datetime;

    fn tasks(texts: &[&str]) -> Vec<Task> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Task::new(index as i64 + 1, *text))
            .collect()
    }

    #[test]
    fn archive_current_copies_tasks() {
        let mut log = HistoryLog::new();
        let mut active = tasks(&["a", "b"]);

        log.archive_current(&active, datetime!(2025-01-01 09:00 UTC));
        active[0].text = "changed".to_string();
        active.clear();

        assert_eq!(log.len(), 1);
        assert_eq!(log.snapshots()[0].tasks, tasks(&["a", "b"]));
    }

    #[test]
    fn list_orders_newest_first_without_reordering_storage() {
        let mut log = HistoryLog::new();
        log.archive_current(&tasks(&["middle"]), datetime!(2025-01-02 09:00 UTC));
        log.archive_current(&tasks(&["oldest"]), datetime!(2025-01-01 09:00 UTC));
        log.archive_current(&tasks(&["newest"]), datetime!(2025-01-03 09:00 UTC));

        let listed: Vec<_> = log.list().iter().map(|s| s.tasks[0].text.clone()).collect();
        let stored: Vec<_> = log
            .snapshots()
            .iter()
            .map(|s| s.tasks[0].text.clone())
            .collect();

        assert_eq!(listed, ["newest", "middle", "oldest"]);
        assert_eq!(stored, ["middle", "oldest", "newest"]);
    }

    #[test]
    fn list_compares_instants_across_offsets() {
        let mut log = HistoryLog::new();
        log.archive_current(&tasks(&["earlier"]), datetime!(2025-01-01 10:00 +02:00));
        log.archive_current(&tasks(&["later"]), datetime!(2025-01-01 09:30 UTC));

        assert_eq!(log.list()[0].tasks[0].text, "later");
    }

    #[test]
    fn equal_timestamps_show_the_later_archive_first() {
        let mut log = HistoryLog::new();
        let at = datetime!(2025-01-01 09:00 UTC);
        log.archive_current(&tasks(&["first"]), at);
        log.archive_current(&tasks(&["second"]), at);

        assert_eq!(log.list()[0].tasks[0].text, "second");
        assert_eq!(log.snapshot_at(1).unwrap().tasks[0].text, "first");
    }

    #[test]
    fn snapshot_at_resolves_display_index() {
        let mut log = HistoryLog::new();
        log.archive_current(&tasks(&["old"]), datetime!(2025-01-01 09:00 UTC));
        log.archive_current(&tasks(&["new"]), datetime!(2025-01-02 09:00 UTC));

        assert_eq!(log.snapshot_at(0).unwrap().tasks[0].text, "new");
        assert_eq!(log.snapshot_at(1).unwrap().tasks[0].text, "old");
    }

    #[test]
    fn snapshot_at_rejects_out_of_range_index() {
        let mut log = HistoryLog::new();
        log.archive_current(&tasks(&["a"]), datetime!(2025-01-01 09:00 UTC));
        log.archive_current(&tasks(&["b"]), datetime!(2025-01-02 09:00 UTC));

        let err = log.snapshot_at(5).unwrap_err();
        assert_eq!(err.code(), "index_out_of_range");
        assert_eq!(err.message(), "history index 5 is outside 0..2");
        assert!(log.snapshot_at(2).is_err());
    }

    #[test]
    fn snapshot_at_on_empty_log_fails() {
        let log = HistoryLog::new();
        assert_eq!(log.snapshot_at(0).unwrap_err().code(), "index_out_of_range");
    }
}
