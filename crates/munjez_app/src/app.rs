use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use munjez_core::{
    calendar::{CalendarView, GridConfig, ViewType},
    display,
    prayer::{riyadh_schedule, UpcomingPrayer},
    task::{parse_calendar_date, Task},
    TaskStore,
};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub(crate) reference: Option<NaiveDate>,
    pub(crate) view: ViewType,
    pub(crate) grid: GridConfig,
    pub(crate) output: OutputFormat,
    pub(crate) tasks_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparsable optional settings keep their defaults; only a bad reference date is fatal.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup("MUNJEZ_DATE") {
            let date = parse_calendar_date(&raw).context("MUNJEZ_DATE must be YYYY-MM-DD")?;
            config.reference = Some(date);
        }
        if let Some(raw) = lookup("MUNJEZ_VIEW") {
            match raw.parse::<ViewType>() {
                Ok(view) => config.view = view,
                Err(err) => warn!(%err, "ignoring MUNJEZ_VIEW"),
            }
        }
        if let Some(raw) = lookup("MUNJEZ_MAX_VISIBLE") {
            if let Ok(value) = raw.trim().parse::<usize>() {
                if value > 0 {
                    config.grid.max_visible_per_day = value;
                }
            }
        }
        if let Some(raw) = lookup("MUNJEZ_UPCOMING_LIMIT") {
            if let Ok(value) = raw.trim().parse::<usize>() {
                if value > 0 {
                    config.grid.upcoming_limit = value;
                }
            }
        }
        if let Some(raw) = lookup("MUNJEZ_OUTPUT") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "json" => config.output = OutputFormat::Json,
                "text" => config.output = OutputFormat::Text,
                other => warn!(value = other, "ignoring MUNJEZ_OUTPUT"),
            }
        }
        if let Some(raw) = lookup("MUNJEZ_TASKS") {
            let path = PathBuf::from(raw);
            info!(path = %path.display(), "using task file");
            config.tasks_path = Some(path);
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub calendar: CalendarView,
    pub today: Vec<Task>,
    pub upcoming: Vec<Task>,
    pub next_prayer: UpcomingPrayer,
}

pub fn build_dashboard(config: &AppConfig, now: NaiveDateTime) -> Result<Dashboard> {
    let today = now.date();
    let reference = config.reference.unwrap_or(today);

    let mut builder = TaskStore::builder()
        .with_config(config.grid)
        .with_prayer_schedule(riyadh_schedule().context("invalid built-in prayer table")?);
    builder = match &config.tasks_path {
        Some(path) => builder
            .load_json(path)
            .with_context(|| format!("unable to load {}", path.display()))?,
        None => builder
            .with_seed_data(reference)
            .context("failed to seed demo tasks")?,
    };
    let store = builder.build().context("failed to initialize task store")?;

    let calendar = store
        .view_at(reference, config.view, today)
        .with_context(|| format!("unable to lay out {:?} view around {}", config.view, reference))?;
    debug!(days = calendar.days.len(), tasks = calendar.task_count(), "calendar view built");

    Ok(Dashboard {
        calendar,
        today: store.due_on(today),
        upcoming: store.upcoming_at(now),
        next_prayer: store.next_prayer(now)?,
    })
}

pub fn render_text(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let calendar = &dashboard.calendar;
    let _ = writeln!(out, "{:?} · {}", calendar.view, calendar.reference);

    for day in &calendar.days {
        let marker = if day.is_today { "*" } else { " " };
        let date = if day.is_current_month {
            day.date.format("%d").to_string()
        } else {
            format!("({})", day.date.format("%d"))
        };
        let _ = write!(out, "{} {:>4} {:<9}", marker, date, display::weekday_name(day.weekday));

        if calendar.view == ViewType::Day {
            let _ = writeln!(out);
            for task in day.visible_tasks() {
                let _ = writeln!(out, "    {}", describe_task(task));
            }
            continue;
        }

        let titles: Vec<&str> = day
            .visible_tasks()
            .iter()
            .map(|task| task.title.as_str())
            .collect();
        let _ = write!(out, " {}", titles.join(" | "));
        if day.overflow > 0 {
            let _ = write!(out, " +{} أخرى", day.overflow);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "\nToday: {}", dashboard.today.len());
    for task in &dashboard.today {
        let _ = writeln!(out, "  {}", describe_task(task));
    }
    let _ = writeln!(out, "Upcoming:");
    for task in &dashboard.upcoming {
        let _ = writeln!(out, "  {} {}", task.due_date.format("%Y-%m-%d"), describe_task(task));
    }
    let next = &dashboard.next_prayer;
    let _ = writeln!(
        out,
        "Next prayer: {} {} ({})",
        next.prayer.arabic_name(),
        next.at.format("%H:%M"),
        next.remaining_label()
    );
    out
}

fn describe_task(task: &Task) -> String {
    let priority = display::priority_style(task.priority);
    let status = display::status_style(task.status);
    let swatch = display::task_swatch(task);
    format!(
        "{} {} [{} · {}] {}",
        task.due_date.format("%H:%M"),
        task.title,
        priority.label,
        status.label,
        swatch.background
    )
}

pub fn run(config: AppConfig) -> Result<()> {
    let now = Local::now().naive_local();
    let dashboard = build_dashboard(&config, now)?;
    let rendered = match config.output {
        OutputFormat::Text => render_text(&dashboard),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&dashboard).context("failed to encode dashboard")?
        }
    };
    println!("{}", rendered);
    Ok(())
}
