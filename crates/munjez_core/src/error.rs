use chrono::NaiveDate;
use thiserror::Error;

use crate::task::TaskId;

pub type Result<T, E = CalendarError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("`{input}` is not a valid calendar date")]
    InvalidDate { input: String },
    #[error("{date} shifted by {offset_days} days falls outside the supported calendar range")]
    OutOfRange { date: NaiveDate, offset_days: i64 },
    #[error("{date} shifted by {offset_months} months falls outside the supported calendar range")]
    MonthOutOfRange { date: NaiveDate, offset_months: i32 },
    #[error("no task with id {0}")]
    UnknownTask(TaskId),
    #[error("task id {0} appears more than once")]
    DuplicateTask(TaskId),
    #[error("unable to read task file")]
    Io(#[from] std::io::Error),
    #[error("malformed task data")]
    Json(#[from] serde_json::Error),
}

impl CalendarError {
    /// Both parse failures and arithmetic overflow mean a date could not be resolved to a day.
    pub fn is_invalid_date(&self) -> bool {
        matches!(
            self,
            CalendarError::InvalidDate { .. }
                | CalendarError::OutOfRange { .. }
                | CalendarError::MonthOutOfRange { .. }
        )
    }

    pub(crate) fn invalid(input: impl Into<String>) -> Self {
        CalendarError::InvalidDate {
            input: input.into(),
        }
    }
}
