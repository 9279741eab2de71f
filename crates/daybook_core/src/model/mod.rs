mod task;

pub use task::{HistorySnapshot, Task, TaskId, Transition};
