pub mod calendar;
pub mod display;
pub mod error;
pub mod prayer;
pub mod store;
pub mod task;

pub use crate::error::{CalendarError, Result};
pub use crate::store::{TaskStore, TaskStoreBuilder};
