use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    calendar::{self, CalendarView, GridConfig, ViewType},
    error::{CalendarError, Result},
    prayer::{PrayerSchedule, UpcomingPrayer},
    task::{Priority, Task, TaskId, TaskRecord, TaskStatus},
};

/// Conjunction of optional predicates. An empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project: Option<String>,
    /// Inclusive lower bound on the due timestamp.
    pub from: Option<NaiveDateTime>,
    /// Inclusive upper bound on the due timestamp.
    pub to: Option<NaiveDateTime>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
            && self
                .project
                .as_deref()
                .map_or(true, |project| task.project == project)
            && self.from.map_or(true, |from| task.due_date >= from)
            && self.to.map_or(true, |to| task.due_date <= to)
    }
}

/// Session-scoped task collection. Nothing written here outlives the process.
pub struct TaskStore {
    tasks: RwLock<Vec<Task>>,
    config: GridConfig,
    prayers: PrayerSchedule,
}

pub struct TaskStoreBuilder {
    tasks: Vec<Task>,
    config: GridConfig,
    prayers: PrayerSchedule,
}

impl TaskStoreBuilder {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            config: GridConfig::default(),
            prayers: PrayerSchedule::default(),
        }
    }

    pub fn add_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    pub fn with_seed_data(self, anchor: NaiveDate) -> Result<Self> {
        Ok(self.with_tasks(seed_tasks(anchor)?))
    }

    /// Reads a JSON array of tasks, appending them after anything already added.
    pub fn load_json(self, path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let records: Vec<TaskRecord> = serde_json::from_str(&raw)?;
        let tasks = records
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>>>()?;
        debug!(path = %path.as_ref().display(), count = tasks.len(), "loaded task file");
        Ok(self.with_tasks(tasks))
    }

    pub fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_prayer_schedule(mut self, prayers: PrayerSchedule) -> Self {
        self.prayers = prayers;
        self
    }

    pub fn build(self) -> Result<TaskStore> {
        let mut seen: HashSet<&TaskId> = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(&task.id) {
                return Err(CalendarError::DuplicateTask(task.id.clone()));
            }
        }
        info!(count = self.tasks.len(), "task store ready");
        Ok(TaskStore {
            tasks: RwLock::new(self.tasks),
            config: self.config,
            prayers: self.prayers,
        })
    }
}

impl Default for TaskStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn builder() -> TaskStoreBuilder {
        TaskStoreBuilder::new()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().iter().find(|task| &task.id == id).cloned()
    }

    #[instrument(skip(self))]
    pub fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<()> {
        let mut tasks = self.tasks.write();
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| CalendarError::UnknownTask(id.clone()))?;
        debug!(from = ?task.status, to = ?status, "updating task status");
        task.status = status;
        Ok(())
    }

    pub fn mark_done(&self, id: &TaskId) -> Result<()> {
        self.set_status(id, TaskStatus::Done)
    }

    pub fn filter(&self, filter: &TaskFilter) -> Vec<Task> {
        self.tasks
            .read()
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }

    #[instrument(skip(self))]
    pub fn view_at(
        &self,
        reference: NaiveDate,
        view: ViewType,
        today: NaiveDate,
    ) -> Result<CalendarView> {
        let tasks = self.tasks.read();
        calendar::build_view(&tasks, reference, view, today, &self.config)
    }

    pub fn view(&self, reference: NaiveDate, view: ViewType) -> Result<CalendarView> {
        self.view_at(reference, view, Local::now().date_naive())
    }

    pub fn due_on(&self, today: NaiveDate) -> Vec<Task> {
        let tasks = self.tasks.read();
        calendar::tasks_due_today(&tasks, today)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn upcoming_at(&self, now: NaiveDateTime) -> Vec<Task> {
        let tasks = self.tasks.read();
        calendar::upcoming_tasks_at(&tasks, now, self.config.upcoming_limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn overdue_at(&self, now: NaiveDateTime) -> Vec<Task> {
        let tasks = self.tasks.read();
        calendar::overdue_tasks_at(&tasks, now)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn next_prayer(&self, now: NaiveDateTime) -> Result<UpcomingPrayer> {
        self.prayers.next_prayer(now)
    }
}

/// Demo collection placed on fixed days of `anchor`'s month.
pub fn seed_tasks(anchor: NaiveDate) -> Result<Vec<Task>> {
    let on = |day: u32, hour: u32, minute: u32| -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| {
                CalendarError::invalid(format!(
                    "{}-{:02}-{:02}T{:02}:{:02}",
                    anchor.year(),
                    anchor.month(),
                    day,
                    hour,
                    minute
                ))
            })
    };

    Ok(vec![
        Task::new(1, "اجتماع المنتج", on(5, 11, 0)?)
            .with_description("مراجعة خارطة الطريق")
            .with_priority(Priority::High)
            .with_project("المنتج")
            .with_color("#DBEAFE"),
        Task::new(2, "موعد مع عميل", on(8, 16, 30)?)
            .with_description("عرض مميزات الإصدار التالي")
            .with_status(TaskStatus::InProgress)
            .with_project("مبيعات")
            .with_color("#FEF9C3"),
        Task::new(3, "مراجعة تصميم", on(10, 14, 0)?)
            .with_description("مراجعة لوحات الواجهة")
            .with_priority(Priority::Low)
            .with_project("تصميم")
            .with_color("#FCE7F3"),
        Task::new(4, "كتابة تقرير", on(12, 9, 0)?)
            .with_description("تقرير الأداء الشهري")
            .with_project("تقارير")
            .with_color("#EDE9FE"),
        Task::new(5, "تدريب الفريق", on(15, 13, 0)?)
            .with_description("جلسة تدريب أدوات")
            .with_priority(Priority::High)
            .with_project("موارد بشرية")
            .with_color("#FFEDD5"),
        Task::new(6, "مكالمة مبيعات", on(18, 17, 0)?)
            .with_description("متابعة العملاء المحتملين")
            .with_project("مبيعات")
            .with_color("#CFFAFE"),
        Task::new(7, "تحديث بنية", on(20, 10, 30)?)
            .with_description("ترقية خدمات البنية")
            .with_project("DevOps")
            .with_color("#E2E8F0"),
        Task::new(8, "صلاة الظهر", on(22, 12, 5)?)
            .with_description("تذكير بموعد الصلاة")
            .with_priority(Priority::High)
            .with_project("عبادة")
            .as_prayer(),
        Task::new(9, "موعد طبي", on(24, 8, 30)?)
            .with_description("فحص دوري")
            .with_priority(Priority::Low)
            .with_project("شخصي")
            .with_color("#DCFCE7"),
        Task::new(10, "تقديم عرض", on(27, 15, 30)?)
            .with_description("عرض نتائج الربع")
            .with_priority(Priority::High)
            .with_project("إدارة")
            .with_color("#E0E7FF"),
    ])
}
