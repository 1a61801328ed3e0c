use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::task::{Task, TaskStatus};

pub const MONTH_GRID_CELLS: usize = 35;
pub const WEEK_LENGTH: usize = 7;
/// Cell index holding the first of the month; the grid opens with the six days before it.
pub const MONTH_GRID_LEAD_DAYS: i64 = 6;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    #[default]
    Month,
    Week,
    Day,
}

impl std::str::FromStr for ViewType {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(ViewType::Month),
            "week" => Ok(ViewType::Week),
            "day" => Ok(ViewType::Day),
            other => Err(format!("unknown view `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridConfig {
    /// Tasks rendered in a month/week cell before the rest collapse into the overflow count.
    pub max_visible_per_day: usize,
    pub upcoming_limit: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_visible_per_day: 1,
            upcoming_limit: 5,
        }
    }
}

impl GridConfig {
    pub fn visible_limit(&self) -> usize {
        self.max_visible_per_day.max(1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
}

fn offset_date(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or(CalendarError::OutOfRange {
            date,
            offset_days: days,
        })
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists for every month chrono can represent.
    date.with_day(1).unwrap_or(date)
}

/// Fixed 35-cell window starting six days before the first of `reference`'s month.
pub fn enumerate_month_grid(reference: NaiveDate) -> Result<Vec<MonthCell>> {
    let first = first_of_month(reference);
    (0..MONTH_GRID_CELLS as i64)
        .map(|i| {
            let date = offset_date(first, i - MONTH_GRID_LEAD_DAYS)?;
            Ok(MonthCell {
                date,
                is_current_month: date.year() == reference.year()
                    && date.month() == reference.month(),
            })
        })
        .collect()
}

pub fn start_of_week(reference: NaiveDate) -> Result<NaiveDate> {
    let back = i64::from(reference.weekday().num_days_from_sunday());
    offset_date(reference, -back)
}

/// The Sunday on or before `reference` and the six days after it.
pub fn enumerate_week_dates(reference: NaiveDate) -> Result<Vec<NaiveDate>> {
    let sunday = start_of_week(reference)?;
    (0..WEEK_LENGTH as i64)
        .map(|i| offset_date(sunday, i))
        .collect()
}

pub fn enumerate_day_view(reference: NaiveDate) -> NaiveDate {
    reference
}

pub fn enumerate_view(reference: NaiveDate, view: ViewType) -> Result<Vec<NaiveDate>> {
    match view {
        ViewType::Month => Ok(enumerate_month_grid(reference)?
            .into_iter()
            .map(|cell| cell.date)
            .collect()),
        ViewType::Week => enumerate_week_dates(reference),
        ViewType::Day => Ok(vec![enumerate_day_view(reference)]),
    }
}

/// Moves the reference date by whole view units. Month steps clamp to the target month's last day.
pub fn shift_reference(reference: NaiveDate, view: ViewType, steps: i32) -> Result<NaiveDate> {
    match view {
        ViewType::Month => {
            let months = Months::new(steps.unsigned_abs());
            let shifted = if steps >= 0 {
                reference.checked_add_months(months)
            } else {
                reference.checked_sub_months(months)
            };
            shifted.ok_or(CalendarError::MonthOutOfRange {
                date: reference,
                offset_months: steps,
            })
        }
        ViewType::Week => offset_date(reference, i64::from(steps) * 7),
        ViewType::Day => offset_date(reference, i64::from(steps)),
    }
}

pub fn is_same_calendar_day<A: Datelike, B: Datelike>(a: &A, b: &B) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

pub fn is_today_on<D: Datelike>(date: &D, today: NaiveDate) -> bool {
    is_same_calendar_day(date, &today)
}

pub fn is_today<D: Datelike>(date: &D) -> bool {
    is_today_on(date, Local::now().date_naive())
}

/// Stable filter of the tasks whose due date falls on `date`, regardless of time of day.
pub fn tasks_on_date<'a, I>(tasks: I, date: NaiveDate) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|task| is_same_calendar_day(&task.due_date, &date))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySelection<'a> {
    pub visible: &'a [&'a Task],
    pub overflow: usize,
}

impl<'a> DaySelection<'a> {
    pub fn primary(&self) -> Option<&'a Task> {
        self.visible.first().copied()
    }
}

pub fn select_visible<'a>(day_tasks: &'a [&'a Task], max_visible: usize) -> DaySelection<'a> {
    let shown = day_tasks.len().min(max_visible.max(1));
    DaySelection {
        visible: &day_tasks[..shown],
        overflow: day_tasks.len() - shown,
    }
}

pub fn select_primary_and_overflow<'a>(day_tasks: &[&'a Task]) -> (Option<&'a Task>, usize) {
    match day_tasks.split_first() {
        Some((first, rest)) => (Some(*first), rest.len()),
        None => (None, 0),
    }
}

pub fn tasks_due_today<'a>(tasks: &'a [Task], today: NaiveDate) -> Vec<&'a Task> {
    tasks_on_date(tasks, today)
}

pub fn today_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks_due_today(tasks, Local::now().date_naive())
}

/// First `limit` tasks due strictly after `now`, in collection order. No chronological sort is applied.
pub fn upcoming_tasks_at(tasks: &[Task], now: NaiveDateTime, limit: usize) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.due_date > now)
        .take(limit)
        .collect()
}

pub fn upcoming_tasks(tasks: &[Task], limit: usize) -> Vec<&Task> {
    upcoming_tasks_at(tasks, Local::now().naive_local(), limit)
}

pub fn overdue_tasks_at(tasks: &[Task], now: NaiveDateTime) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.due_date < now && task.status != TaskStatus::Done)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub is_current_month: bool,
    pub is_today: bool,
    pub tasks: Vec<Task>,
    pub visible: usize,
    pub overflow: usize,
}

impl DayCell {
    pub fn visible_tasks(&self) -> &[Task] {
        &self.tasks[..self.visible.min(self.tasks.len())]
    }

    pub fn primary(&self) -> Option<&Task> {
        self.tasks.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarView {
    pub view: ViewType,
    pub reference: NaiveDate,
    pub days: Vec<DayCell>,
}

impl CalendarView {
    pub fn task_count(&self) -> usize {
        self.days.iter().map(|day| day.tasks.len()).sum()
    }
}

pub fn build_view(
    tasks: &[Task],
    reference: NaiveDate,
    view: ViewType,
    today: NaiveDate,
    config: &GridConfig,
) -> Result<CalendarView> {
    let limit = match view {
        ViewType::Day => usize::MAX,
        ViewType::Month | ViewType::Week => config.visible_limit(),
    };

    let days = enumerate_view(reference, view)?
        .into_iter()
        .map(|date| {
            let bucket = tasks_on_date(tasks, date);
            let selection = select_visible(&bucket, limit);
            DayCell {
                date,
                weekday: date.weekday(),
                is_current_month: date.year() == reference.year()
                    && date.month() == reference.month(),
                is_today: is_today_on(&date, today),
                visible: selection.visible.len(),
                overflow: selection.overflow,
                tasks: bucket.into_iter().cloned().collect(),
            }
        })
        .collect();

    Ok(CalendarView {
        view,
        reference,
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn month_grid_is_contiguous_and_anchored() {
        for reference in [date(2025, 9, 1), date(2024, 2, 29), date(2025, 12, 31), date(2026, 3, 15)] {
            let grid = enumerate_month_grid(reference).expect("grid");
            assert_eq!(grid.len(), MONTH_GRID_CELLS);
            assert_eq!(grid[6].date, first_of_month(reference));
            for pair in grid.windows(2) {
                assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
            }
            for cell in &grid {
                assert_eq!(cell.is_current_month, cell.date.month() == reference.month());
            }
        }
    }

    #[test]
    fn month_grid_for_september_2025() {
        let grid = enumerate_month_grid(date(2025, 9, 17)).expect("grid");
        assert_eq!(grid[0].date, date(2025, 8, 26));
        assert!(!grid[0].is_current_month);
        assert_eq!(grid[6].date, date(2025, 9, 1));
        assert_eq!(grid[34].date, date(2025, 9, 29));
        // September 30th does not fit in the fixed window.
        assert!(grid.iter().all(|cell| cell.date != date(2025, 9, 30)));
    }

    #[test]
    fn week_starts_on_sunday_and_contains_reference() {
        let mut reference = date(2025, 8, 28);
        for _ in 0..14 {
            let week = enumerate_week_dates(reference).expect("week");
            assert_eq!(week.len(), WEEK_LENGTH);
            assert_eq!(week[0].weekday(), Weekday::Sun);
            assert!(week.contains(&reference));
            reference = reference.succ_opt().unwrap();
        }
        let week = enumerate_week_dates(date(2025, 9, 7)).expect("sunday reference");
        assert_eq!(week[0], date(2025, 9, 7));
        assert_eq!(week[6], date(2025, 9, 13));
    }

    #[test]
    fn arithmetic_overflow_surfaces_as_invalid_date() {
        let err = enumerate_month_grid(NaiveDate::MIN).expect_err("lead days precede MIN");
        assert!(err.is_invalid_date());
        assert!(shift_reference(NaiveDate::MAX, ViewType::Day, 1).is_err());

        let err = shift_reference(NaiveDate::MAX, ViewType::Month, 1).expect_err("past MAX");
        assert!(err.is_invalid_date());
        assert!(matches!(
            err,
            CalendarError::MonthOutOfRange { offset_months: 1, .. }
        ));
    }

    #[test]
    fn day_view_is_identity() {
        assert_eq!(enumerate_day_view(date(2025, 9, 10)), date(2025, 9, 10));
        assert_eq!(
            enumerate_view(date(2025, 9, 10), ViewType::Day).unwrap(),
            vec![date(2025, 9, 10)]
        );
    }

    #[test]
    fn tasks_on_date_ignores_time_of_day() {
        let tasks = vec![
            Task::new(1, "early", at(2025, 9, 10, 0, 1)),
            Task::new(2, "other day", at(2025, 9, 11, 0, 0)),
            Task::new(3, "late", at(2025, 9, 10, 23, 59)),
        ];
        let bucket = tasks_on_date(&tasks, date(2025, 9, 10));
        let ids: Vec<String> = bucket.iter().map(|t| t.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let again = tasks_on_date(bucket.iter().copied(), date(2025, 9, 10));
        assert_eq!(again, bucket);
    }

    #[test]
    fn primary_and_overflow() {
        assert_eq!(select_primary_and_overflow(&[]), (None, 0));

        let tasks: Vec<Task> = (1..=3)
            .map(|i| Task::new(i, format!("t{}", i), at(2025, 9, 10, 9, 0)))
            .collect();
        let refs: Vec<&Task> = tasks.iter().collect();
        let (primary, overflow) = select_primary_and_overflow(&refs);
        assert_eq!(primary.map(|t| t.title.as_str()), Some("t1"));
        assert_eq!(overflow, 2);

        let two = select_visible(&refs, 2);
        assert_eq!(two.visible.len(), 2);
        assert_eq!(two.overflow, 1);
        assert_eq!(two.primary().map(|t| t.title.as_str()), Some("t1"));

        let clamped = select_visible(&refs, 0);
        assert_eq!(clamped.visible.len(), 1);
        assert_eq!(clamped.overflow, 2);
    }

    #[test]
    fn same_day_compares_calendar_fields_only() {
        assert!(is_same_calendar_day(&at(2025, 9, 10, 0, 0), &at(2025, 9, 10, 23, 59)));
        assert!(is_same_calendar_day(&at(2025, 9, 10, 8, 0), &date(2025, 9, 10)));
        assert!(!is_same_calendar_day(&date(2025, 9, 10), &date(2024, 9, 10)));
        assert!(is_today_on(&at(2025, 9, 10, 6, 0), date(2025, 9, 10)));
    }

    #[test]
    fn overdue_skips_done_tasks() {
        let tasks = vec![
            Task::new(1, "late", at(2025, 9, 9, 10, 0)),
            Task::new(2, "finished", at(2025, 9, 9, 11, 0)).with_status(TaskStatus::Done),
            Task::new(3, "future", at(2025, 9, 11, 11, 0)),
        ];
        let overdue = overdue_tasks_at(&tasks, at(2025, 9, 10, 12, 0));
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].title, "late");
    }

    #[test]
    fn shifting_references_per_view() {
        let jan31 = date(2025, 1, 31);
        assert_eq!(shift_reference(jan31, ViewType::Month, 1).unwrap(), date(2025, 2, 28));
        assert_eq!(shift_reference(jan31, ViewType::Month, -2).unwrap(), date(2024, 11, 30));
        assert_eq!(shift_reference(jan31, ViewType::Week, -1).unwrap(), date(2025, 1, 24));
        assert_eq!(shift_reference(jan31, ViewType::Day, 1).unwrap(), date(2025, 2, 1));
    }

    #[test]
    fn build_view_applies_overflow_limit_per_view() {
        let tasks = vec![
            Task::new(1, "a", at(2025, 9, 10, 9, 0)),
            Task::new(2, "b", at(2025, 9, 10, 10, 0)),
            Task::new(3, "c", at(2025, 9, 10, 11, 0)),
        ];
        let config = GridConfig::default();
        let today = date(2025, 9, 10);

        let month = build_view(&tasks, today, ViewType::Month, today, &config).unwrap();
        assert_eq!(month.days.len(), MONTH_GRID_CELLS);
        assert_eq!(month.task_count(), 3);
        let cell = month.days.iter().find(|d| d.date == today).unwrap();
        assert!(cell.is_today);
        assert_eq!(cell.visible_tasks().len(), 1);
        assert_eq!(cell.overflow, 2);

        let week = build_view(&tasks, today, ViewType::Week, today, &GridConfig {
            max_visible_per_day: 2,
            ..config
        })
        .unwrap();
        assert_eq!(week.days.len(), WEEK_LENGTH);
        let cell = week.days.iter().find(|d| d.date == today).unwrap();
        assert_eq!((cell.visible, cell.overflow), (2, 1));

        let day = build_view(&tasks, today, ViewType::Day, today, &config).unwrap();
        assert_eq!(day.days.len(), 1);
        assert_eq!((day.days[0].visible, day.days[0].overflow), (3, 0));
    }

    #[test]
    fn visible_tasks_tolerates_inconsistent_counts() {
        let cell = DayCell {
            date: date(2025, 9, 10),
            weekday: Weekday::Wed,
            is_current_month: true,
            is_today: false,
            tasks: vec![Task::new(1, "only", at(2025, 9, 10, 9, 0))],
            visible: 3,
            overflow: 0,
        };
        assert_eq!(cell.visible_tasks().len(), 1);

        let decoded: DayCell = serde_json::from_str(
            r#"{"date":"2025-09-10","weekday":"Wed","is_current_month":true,"is_today":false,"tasks":[],"visible":2,"overflow":0}"#,
        )
        .expect("day cell json");
        assert!(decoded.visible_tasks().is_empty());
        assert!(decoded.primary().is_none());
    }

    #[test]
    fn parses_view_names() {
        assert_eq!("Week".parse::<ViewType>(), Ok(ViewType::Week));
        assert!("year".parse::<ViewType>().is_err());
    }
}
