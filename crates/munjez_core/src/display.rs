//! Presentation lookup tables keyed by the closed task enumerations.

use chrono::Weekday;
use serde::Serialize;

use crate::task::{Priority, Task, TaskStatus};

pub const PRAYER_BACKGROUND: &str = "#22c55e";
pub const PRAYER_BORDER: &str = "#16a34a";
pub const DEFAULT_TASK_COLOR: &str = "#E5E7EB";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PriorityStyle {
    pub label: &'static str,
    pub tone: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub closed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Swatch {
    pub background: String,
    pub border: String,
}

pub fn priority_style(priority: Priority) -> PriorityStyle {
    match priority {
        Priority::Urgent => PriorityStyle {
            label: "عاجل",
            tone: "red",
            color: "#ef4444",
        },
        Priority::High => PriorityStyle {
            label: "عالية",
            tone: "orange",
            color: "#f97316",
        },
        Priority::Med => PriorityStyle {
            label: "متوسطة",
            tone: "yellow",
            color: "#eab308",
        },
        Priority::Low => PriorityStyle {
            label: "منخفضة",
            tone: "green",
            color: "#22c55e",
        },
    }
}

pub fn status_style(status: TaskStatus) -> StatusStyle {
    match status {
        TaskStatus::Todo => StatusStyle {
            label: "قيد الانتظار",
            closed: false,
        },
        TaskStatus::InProgress => StatusStyle {
            label: "قيد التنفيذ",
            closed: false,
        },
        TaskStatus::Done => StatusStyle {
            label: "مكتملة",
            closed: true,
        },
        TaskStatus::Archived => StatusStyle {
            label: "مؤرشفة",
            closed: true,
        },
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "الأحد",
        Weekday::Mon => "الاثنين",
        Weekday::Tue => "الثلاثاء",
        Weekday::Wed => "الأربعاء",
        Weekday::Thu => "الخميس",
        Weekday::Fri => "الجمعة",
        Weekday::Sat => "السبت",
    }
}

/// Prayer reminders always use the green swatch; other tasks fall back to the neutral grey.
pub fn task_swatch(task: &Task) -> Swatch {
    if task.is_prayer {
        return Swatch {
            background: PRAYER_BACKGROUND.to_string(),
            border: PRAYER_BORDER.to_string(),
        };
    }
    let background = task
        .color
        .clone()
        .unwrap_or_else(|| DEFAULT_TASK_COLOR.to_string());
    Swatch {
        border: background.clone(),
        background,
    }
}
