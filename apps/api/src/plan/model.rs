//! Domain model for study plans.
//!
//! A `Task` is a sum type — a day is either a real study session or a rest
//! day — so states like "a rest day with XP" are unrepresentable. The flat
//! persisted/wire shape (`isRestDay` flag plus zeroed fields) lives in
//! [`TaskRecord`]; conversion normalizes any record that violates the
//! rest-day invariant instead of trusting it.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Weekday labels
// ────────────────────────────────────────────────────────────────────────────

/// Canonical short label ("Mon".."Sun") used in `studyDays` sets.
pub fn weekday_short(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Full label ("Monday".."Sunday") used on task rows.
pub fn weekday_full(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses a weekday label, accepting short ("Wed") and full ("Wednesday")
/// forms, case-insensitively.
pub fn parse_weekday(label: &str) -> Option<Weekday> {
    match label.trim().to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Human display form of a calendar date, e.g. "Aug 6".
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Hours-per-day band
// ────────────────────────────────────────────────────────────────────────────

/// Daily availability band selected at generation time. Closed set — anything
/// else is a validation failure before scheduling runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoursPerDay {
    #[serde(rename = "1-2")]
    OneToTwo,
    #[serde(rename = "2-3")]
    TwoToThree,
    #[serde(rename = "3-4")]
    ThreeToFour,
    #[serde(rename = "4+")]
    FourPlus,
}

impl HoursPerDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoursPerDay::OneToTwo => "1-2",
            HoursPerDay::TwoToThree => "2-3",
            HoursPerDay::ThreeToFour => "3-4",
            HoursPerDay::FourPlus => "4+",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "1-2" => Some(HoursPerDay::OneToTwo),
            "2-3" => Some(HoursPerDay::TwoToThree),
            "3-4" => Some(HoursPerDay::ThreeToFour),
            "4+" => Some(HoursPerDay::FourPlus),
            _ => None,
        }
    }

    /// Per-session time estimate used by the deterministic fallback curriculum.
    pub fn session_estimate(&self) -> &'static str {
        match self {
            HoursPerDay::OneToTwo => "1h30m",
            HoursPerDay::TwoToThree => "2h30m",
            HoursPerDay::ThreeToFour => "3h30m",
            HoursPerDay::FourPlus => "4h",
        }
    }

    /// Per-session XP used by the deterministic fallback curriculum. Scales
    /// with the band so longer sessions are worth more.
    pub fn session_xp(&self) -> u32 {
        match self {
            HoursPerDay::OneToTwo => 40,
            HoursPerDay::TwoToThree => 55,
            HoursPerDay::ThreeToFour => 70,
            HoursPerDay::FourPlus => 85,
        }
    }
}

impl std::fmt::Display for HoursPerDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template contract
// ────────────────────────────────────────────────────────────────────────────

/// An abstract, date-free lesson supplied by the curriculum generator. The
/// scheduler stamps these onto concrete study days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub theme: String,
    pub description: String,
    #[serde(default)]
    pub resource: String,
    pub estimated_time: String,
    pub xp: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Task
// ────────────────────────────────────────────────────────────────────────────

/// A real study session scheduled on a concrete date.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyTask {
    /// Canonical key for the task within its plan.
    pub calendar_date: NaiveDate,
    pub theme: String,
    pub description: String,
    pub resource: String,
    pub estimated_time: String,
    pub xp: u32,
    pub completed: bool,
}

/// One calendar day of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub enum Task {
    Study(StudyTask),
    Rest(NaiveDate),
}

impl Task {
    /// Synthesizes a rest entry for the given date.
    pub fn rest(date: NaiveDate) -> Self {
        Task::Rest(date)
    }

    pub fn calendar_date(&self) -> NaiveDate {
        match self {
            Task::Study(t) => t.calendar_date,
            Task::Rest(date) => *date,
        }
    }

    pub fn is_rest_day(&self) -> bool {
        matches!(self, Task::Rest(_))
    }

    pub fn is_completed(&self) -> bool {
        match self {
            Task::Study(t) => t.completed,
            Task::Rest(_) => false,
        }
    }

    pub fn xp(&self) -> u32 {
        match self {
            Task::Study(t) => t.xp,
            Task::Rest(_) => 0,
        }
    }

    /// Moves the task's content onto a new date. A moved study session has
    /// not happened yet on its new date, so `completed` resets to false.
    pub fn restamp(self, date: NaiveDate) -> Self {
        match self {
            Task::Study(t) => Task::Study(StudyTask {
                calendar_date: date,
                completed: false,
                ..t
            }),
            Task::Rest(_) => Task::Rest(date),
        }
    }
}

/// Flat wire/persisted shape of a task. Rest rows always carry `xp: 0`,
/// `estimatedTime: "0h"`, `completed: false`; the display fields are derived
/// from the canonical date on the way out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub calendar_date: NaiveDate,
    #[serde(default)]
    pub display_date: String,
    #[serde(default)]
    pub day_of_week: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_rest_day: bool,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        // Parse, don't trust: a record flagged as a rest day becomes a true
        // rest entry no matter what its other fields claim.
        if record.is_rest_day {
            Task::Rest(record.calendar_date)
        } else {
            Task::Study(StudyTask {
                calendar_date: record.calendar_date,
                theme: record.theme,
                description: record.description,
                resource: record.resource,
                estimated_time: record.estimated_time,
                xp: record.xp,
                completed: record.completed,
            })
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let date = task.calendar_date();
        let display = display_date(date);
        let day = weekday_full(date.weekday()).to_string();
        match task {
            Task::Study(t) => TaskRecord {
                calendar_date: t.calendar_date,
                display_date: display,
                day_of_week: day,
                theme: t.theme,
                description: t.description,
                resource: t.resource,
                estimated_time: t.estimated_time,
                xp: t.xp,
                completed: t.completed,
                is_rest_day: false,
            },
            Task::Rest(_) => TaskRecord {
                calendar_date: date,
                display_date: display,
                day_of_week: day,
                theme: "Rest Day".to_string(),
                description: "No study scheduled — recover and let it settle.".to_string(),
                resource: String::new(),
                estimated_time: "0h".to_string(),
                xp: 0,
                completed: false,
                is_rest_day: true,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Phases, aggregates, plan
// ────────────────────────────────────────────────────────────────────────────

/// A labeled contiguous run of day indices. `start_index` is inclusive,
/// `end_index` exclusive; ranges never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPhase {
    pub label: String,
    pub start_index: u32,
    pub end_index: u32,
}

/// Schedule-level aggregates fixed at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    #[serde(rename = "totalXP")]
    pub total_xp: u32,
    pub total_hours: f64,
    pub study_day_count: u32,
    pub rest_day_count: u32,
}

/// Derived progress aggregates. Never cached apart from the task list —
/// recomputed on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub progress: u32,
    #[serde(rename = "totalXP")]
    pub total_xp: u32,
    pub completed_tasks: u32,
}

/// Recomputes progress aggregates from the task list.
///
/// `total_xp` is earned XP: the sum over completed study tasks. `progress`
/// is completed study tasks over all study tasks, rounded to a whole percent
/// (0 when the plan has no study tasks at all).
pub fn recompute_metadata(tasks: &[Task]) -> PlanMetadata {
    let study_count = tasks.iter().filter(|t| !t.is_rest_day()).count() as u32;
    let completed: Vec<&Task> = tasks.iter().filter(|t| t.is_completed()).collect();
    let completed_tasks = completed.len() as u32;
    let total_xp = completed.iter().map(|t| t.xp()).sum();
    let progress = if study_count == 0 {
        0
    } else {
        ((100.0 * f64::from(completed_tasks)) / f64::from(study_count)).round() as u32
    };
    PlanMetadata {
        progress,
        total_xp,
        completed_tasks,
    }
}

/// A complete study plan — the sole shared mutable record in the system.
/// Always read and written whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: Uuid,
    /// None for anonymous plans, which are capability-based: anyone holding
    /// the id may read and mutate them.
    pub owner: Option<Uuid>,
    pub analysis_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub hours_per_day: HoursPerDay,
    pub study_days: Vec<String>,
    pub skills: Vec<String>,
    pub summary: PlanSummary,
    pub tasks: Vec<Task>,
    pub phases: Vec<PlanPhase>,
    pub metadata: PlanMetadata,
}

impl StudyPlan {
    /// Resolves a task by exact match on its canonical calendar date.
    pub fn task_index_by_date(&self, date: NaiveDate) -> Option<usize> {
        self.tasks.iter().position(|t| t.calendar_date() == date)
    }

    pub fn recompute_metadata(&mut self) {
        self.metadata = recompute_metadata(&self.tasks);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Owner-bound plans require the matching identity; anonymous plans are
    /// open to any holder of the id.
    pub fn accessible_by(&self, user: Option<Uuid>) -> bool {
        match self.owner {
            None => true,
            Some(owner) => user == Some(owner),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn study(d: NaiveDate, xp: u32, completed: bool) -> Task {
        Task::Study(StudyTask {
            calendar_date: d,
            theme: "Ownership".to_string(),
            description: "Read the ownership chapter".to_string(),
            resource: "The Book, ch. 4".to_string(),
            estimated_time: "1h30m".to_string(),
            xp,
            completed,
        })
    }

    /// Mon Aug 3 study, Tue Aug 4 rest, Wed Aug 5 study.
    pub fn sample_plan() -> StudyPlan {
        let tasks = vec![
            study(date(2026, 8, 3), 50, false),
            Task::rest(date(2026, 8, 4)),
            study(date(2026, 8, 5), 60, false),
        ];
        StudyPlan {
            id: Uuid::new_v4(),
            owner: None,
            analysis_id: Uuid::new_v4(),
            status: "active".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            start_date: date(2026, 8, 3),
            end_date: date(2026, 8, 5),
            total_days: 3,
            hours_per_day: HoursPerDay::OneToTwo,
            study_days: vec!["Mon".to_string(), "Wed".to_string()],
            skills: vec!["Rust".to_string()],
            summary: PlanSummary {
                total_xp: 110,
                total_hours: 3.0,
                study_day_count: 2,
                rest_day_count: 1,
            },
            metadata: recompute_metadata(&tasks),
            tasks,
            phases: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::{date, sample_plan, study};
    use super::*;

    #[test]
    fn test_parse_weekday_accepts_short_and_full_labels() {
        assert_eq!(parse_weekday("Mon"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday(" WED "), Some(Weekday::Wed));
        assert_eq!(parse_weekday("Funday"), None);
    }

    #[test]
    fn test_weekday_labels_round_trip() {
        for wd in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            assert_eq!(parse_weekday(weekday_short(wd)), Some(wd));
            assert_eq!(parse_weekday(weekday_full(wd)), Some(wd));
        }
    }

    #[test]
    fn test_hours_per_day_serde_uses_band_labels() {
        let json = serde_json::to_string(&HoursPerDay::FourPlus).unwrap();
        assert_eq!(json, "\"4+\"");
        let band: HoursPerDay = serde_json::from_str("\"2-3\"").unwrap();
        assert_eq!(band, HoursPerDay::TwoToThree);
        assert!(serde_json::from_str::<HoursPerDay>("\"5-6\"").is_err());
    }

    #[test]
    fn test_rest_record_carries_zeroed_fields() {
        let record = TaskRecord::from(Task::rest(date(2026, 8, 4)));
        assert!(record.is_rest_day);
        assert_eq!(record.xp, 0);
        assert_eq!(record.estimated_time, "0h");
        assert!(!record.completed);
        assert_eq!(record.day_of_week, "Tuesday");
        assert_eq!(record.display_date, "Aug 4");
    }

    #[test]
    fn test_rest_invariant_normalized_on_parse() {
        // A corrupt record claiming rest-day with XP and completion must
        // come back as a true rest entry.
        let json = r#"{
            "calendarDate": "2026-08-04",
            "displayDate": "Aug 4",
            "dayOfWeek": "Tuesday",
            "theme": "Ghost task",
            "xp": 120,
            "completed": true,
            "isRestDay": true
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.is_rest_day());
        assert_eq!(task.xp(), 0);
        assert!(!task.is_completed());
    }

    #[test]
    fn test_study_task_record_round_trip() {
        let original = study(date(2026, 8, 3), 55, true);
        let json = serde_json::to_string(&original).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_restamp_resets_completion_and_moves_date() {
        let moved = study(date(2026, 8, 3), 55, true).restamp(date(2026, 8, 5));
        assert_eq!(moved.calendar_date(), date(2026, 8, 5));
        assert!(!moved.is_completed());
        assert!(!moved.is_rest_day());
    }

    #[test]
    fn test_recompute_metadata_counts_only_study_tasks() {
        let tasks = vec![
            study(date(2026, 8, 3), 50, true),
            Task::rest(date(2026, 8, 4)),
            study(date(2026, 8, 5), 60, false),
            study(date(2026, 8, 6), 70, true),
        ];
        let meta = recompute_metadata(&tasks);
        assert_eq!(meta.completed_tasks, 2);
        assert_eq!(meta.total_xp, 120);
        // 2 of 3 study tasks → 66.67 → 67
        assert_eq!(meta.progress, 67);
    }

    #[test]
    fn test_recompute_metadata_empty_plan_is_all_zero() {
        let meta = recompute_metadata(&[]);
        assert_eq!(meta.progress, 0);
        assert_eq!(meta.total_xp, 0);
        assert_eq!(meta.completed_tasks, 0);
    }

    #[test]
    fn test_metadata_serializes_with_total_xp_label() {
        let meta = recompute_metadata(&[study(date(2026, 8, 3), 50, true)]);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["totalXP"], 50);
        assert_eq!(value["progress"], 100);
        assert_eq!(value["completedTasks"], 1);
    }

    #[test]
    fn test_accessible_by_owner_rules() {
        let owner = Uuid::new_v4();
        let mut plan = sample_plan();
        assert!(plan.accessible_by(None));
        assert!(plan.accessible_by(Some(owner)));

        plan.owner = Some(owner);
        assert!(plan.accessible_by(Some(owner)));
        assert!(!plan.accessible_by(None));
        assert!(!plan.accessible_by(Some(Uuid::new_v4())));
    }

}
