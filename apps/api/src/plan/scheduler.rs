//! Calendar scheduler — maps an abstract curriculum onto concrete dates.
//!
//! Pure and synchronous: (templates, timeline length, study-day set, anchor
//! date) → exactly N date-stamped tasks plus schedule aggregates. Templates
//! advance only on study days; non-study days become rest entries.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::plan::model::{PlanPhase, StudyTask, Task, TaskTemplate};

const PHASE_LABELS: [&str; 3] = ["Foundations", "Core Practice", "Applied Polish"];

/// Output of one scheduling run. Aggregates cover non-rest tasks only.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub tasks: Vec<Task>,
    pub phases: Vec<PlanPhase>,
    pub total_xp: u32,
    pub total_hours: f64,
    pub study_day_count: u32,
    pub rest_day_count: u32,
}

/// Builds the full task calendar.
///
/// An empty `study_days` set means every day is a study day; so does a set
/// naming all seven weekdays. When the template list runs out before the
/// study days do, placeholder sessions are synthesized so the calendar is
/// always complete.
pub fn build_schedule(
    templates: &[TaskTemplate],
    total_days: u32,
    study_days: &[Weekday],
    anchor: NaiveDate,
) -> Schedule {
    let mut tasks = Vec::with_capacity(total_days as usize);
    let mut next_template = 0usize;
    let mut session_ordinal = 0u32;

    for offset in 0..total_days {
        let date = anchor + Duration::days(i64::from(offset));
        if is_study_day(date.weekday(), study_days) {
            session_ordinal += 1;
            let template = templates
                .get(next_template)
                .cloned()
                .unwrap_or_else(|| placeholder_template(session_ordinal));
            next_template += 1;
            tasks.push(Task::Study(StudyTask {
                calendar_date: date,
                theme: template.theme,
                description: template.description,
                resource: template.resource,
                estimated_time: template.estimated_time,
                xp: template.xp,
                completed: false,
            }));
        } else {
            tasks.push(Task::rest(date));
        }
    }

    let total_xp = tasks.iter().map(Task::xp).sum();
    let total_minutes: u32 = tasks
        .iter()
        .filter_map(|t| match t {
            Task::Study(s) => Some(parse_estimated_minutes(&s.estimated_time)),
            Task::Rest(_) => None,
        })
        .sum();
    let rest_day_count = total_days - session_ordinal;

    Schedule {
        phases: derive_phases(total_days),
        tasks,
        total_xp,
        total_hours: f64::from(total_minutes) / 60.0,
        study_day_count: session_ordinal,
        rest_day_count,
    }
}

fn is_study_day(weekday: Weekday, study_days: &[Weekday]) -> bool {
    study_days.is_empty() || study_days.contains(&weekday)
}

/// Number of study days a schedule over this window would contain. Used to
/// size the curriculum request before any scheduling happens.
pub fn count_study_days(total_days: u32, study_days: &[Weekday], anchor: NaiveDate) -> u32 {
    (0..total_days)
        .filter(|offset| {
            let date = anchor + Duration::days(i64::from(*offset));
            is_study_day(date.weekday(), study_days)
        })
        .count() as u32
}

fn placeholder_template(session_ordinal: u32) -> TaskTemplate {
    TaskTemplate {
        theme: format!("Study Session {session_ordinal}"),
        description: "Review and consolidate material from earlier sessions.".to_string(),
        resource: "Self-guided".to_string(),
        estimated_time: "1h".to_string(),
        xp: 25,
    }
}

/// Splits the day range 0..N into up to three labeled, contiguous,
/// non-overlapping phases covering every index.
pub fn derive_phases(total_days: u32) -> Vec<PlanPhase> {
    if total_days == 0 {
        return vec![];
    }
    let count = total_days.min(PHASE_LABELS.len() as u32);
    (0..count)
        .map(|i| PlanPhase {
            label: PHASE_LABELS[i as usize].to_string(),
            start_index: i * total_days / count,
            end_index: (i + 1) * total_days / count,
        })
        .collect()
}

/// Tolerant parser for estimated-time tokens: "2h", "90m", "2h30m", with
/// optional whitespace. Anything unparsable counts as zero minutes.
pub fn parse_estimated_minutes(raw: &str) -> u32 {
    let mut minutes = 0u32;
    let mut digits = String::new();
    let mut saw_unit = false;

    for ch in raw.trim().chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if ch.is_whitespace() {
            continue;
        } else {
            let unit = match ch.to_ascii_lowercase() {
                'h' => 60,
                'm' => 1,
                _ => return 0,
            };
            let Ok(value) = digits.parse::<u32>() else {
                return 0; // unit with no number in front
            };
            minutes = minutes.saturating_add(value.saturating_mul(unit));
            digits.clear();
            saw_unit = true;
        }
    }

    if !digits.is_empty() || !saw_unit {
        return 0; // dangling number, or no recognizable token at all
    }
    minutes
}
