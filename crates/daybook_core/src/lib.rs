pub mod ai;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod model;
pub mod notify;
pub mod storage;
pub mod sync;
pub mod task_api;
pub mod task_list;

pub use error::AppError;
pub use task_api::{AppState, Confirmation, RestoreOutcome, TodoApp};
