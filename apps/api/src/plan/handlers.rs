//! Axum route handlers for the Plan API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, NaiveDate, Utc, Weekday};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::AnalysisRow;
use crate::plan::completion::{set_task_completion, CompletionError};
use crate::plan::curriculum::generate_curriculum;
use crate::plan::model::{
    parse_weekday, recompute_metadata, weekday_short, HoursPerDay, PlanSummary, StudyPlan,
};
use crate::plan::scheduler::{build_schedule, count_study_days};
use crate::state::AppState;

const NO_PLAN_MESSAGE: &str = "No plan yet — generate one first";
const REST_DAY_MESSAGE: &str = "That day is a rest day and cannot be completed";
/// Hard cap on requested timelines; a year of daily tasks is already
/// generous for a study plan.
const MAX_TIMELINE_DAYS: u32 = 365;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Generation request. Every required field arrives as an `Option` so the
/// validator can reject missing pieces as a ValidationError before any store
/// write, instead of leaving it to the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    pub analysis_id: Option<Uuid>,
    pub hours_per_day: Option<String>,
    pub timeline: Option<u32>,
    pub study_days: Option<Vec<String>>,
    pub job_description: Option<String>,
    /// Anchor date for the calendar; defaults to today.
    pub start_date: Option<NaiveDate>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    pub completed: bool,
    pub user_id: Option<Uuid>,
}

struct ValidatedGenerate {
    analysis_id: Uuid,
    hours_per_day: HoursPerDay,
    timeline: u32,
    study_days: Vec<Weekday>,
    study_day_labels: Vec<String>,
    job_description: Option<String>,
    start_date: NaiveDate,
    owner: Option<Uuid>,
}

fn validate_generate(
    request: GeneratePlanRequest,
    today: NaiveDate,
) -> Result<ValidatedGenerate, AppError> {
    let analysis_id = request
        .analysis_id
        .ok_or_else(|| AppError::Validation("analysisId is required".to_string()))?;

    let hours_raw = request
        .hours_per_day
        .ok_or_else(|| AppError::Validation("hoursPerDay is required".to_string()))?;
    let hours_per_day = HoursPerDay::parse(&hours_raw).ok_or_else(|| {
        AppError::Validation(format!(
            "hoursPerDay must be one of 1-2, 2-3, 3-4, 4+ (got {hours_raw:?})"
        ))
    })?;

    let timeline = request
        .timeline
        .ok_or_else(|| AppError::Validation("timeline is required".to_string()))?;
    if timeline > MAX_TIMELINE_DAYS {
        return Err(AppError::Validation(format!(
            "timeline cannot exceed {MAX_TIMELINE_DAYS} days"
        )));
    }

    let labels = request
        .study_days
        .ok_or_else(|| AppError::Validation("studyDays is required".to_string()))?;

    // Canonicalize and deduplicate; an empty set means "every day".
    let mut study_days: Vec<Weekday> = Vec::new();
    let mut study_day_labels: Vec<String> = Vec::new();
    for label in &labels {
        let weekday = parse_weekday(label).ok_or_else(|| {
            AppError::Validation(format!("Unknown weekday label {label:?} in studyDays"))
        })?;
        if !study_days.contains(&weekday) {
            study_days.push(weekday);
            study_day_labels.push(weekday_short(weekday).to_string());
        }
    }

    Ok(ValidatedGenerate {
        analysis_id,
        hours_per_day,
        timeline,
        study_days,
        study_day_labels,
        job_description: request.job_description,
        start_date: request.start_date.unwrap_or(today),
        owner: request.user_id,
    })
}

fn plan_end_date(start_date: NaiveDate, total_days: u32) -> NaiveDate {
    if total_days == 0 {
        start_date
    } else {
        start_date + Duration::days(i64::from(total_days) - 1)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/plans
///
/// Full generation pipeline: validate → load analysis → curriculum (LLM or
/// deterministic fallback) → schedule → persist. Always yields a complete
/// plan once validation passes.
pub async fn handle_generate_plan(
    State(state): State<AppState>,
    Json(request): Json<GeneratePlanRequest>,
) -> Result<Json<StudyPlan>, AppError> {
    let today = Utc::now().date_naive();
    let validated = validate_generate(request, today)?;

    // The analysis is an external reference; anything short of a hit
    // degrades to a generic curriculum rather than failing the request.
    let analysis: Option<AnalysisRow> =
        match sqlx::query_as("SELECT * FROM analyses WHERE id = $1")
            .bind(validated.analysis_id)
            .fetch_optional(&state.db)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!("Analysis lookup failed ({e}) — proceeding with generic curriculum");
                None
            }
        };
    let skills = analysis
        .as_ref()
        .map(AnalysisRow::skill_names)
        .unwrap_or_default();

    let session_count = count_study_days(
        validated.timeline,
        &validated.study_days,
        validated.start_date,
    );
    let templates = generate_curriculum(
        &state.llm,
        &skills,
        validated.hours_per_day,
        session_count,
        validated.job_description.as_deref(),
    )
    .await;

    let schedule = build_schedule(
        &templates,
        validated.timeline,
        &validated.study_days,
        validated.start_date,
    );

    let now = Utc::now();
    let metadata = recompute_metadata(&schedule.tasks);
    let plan = StudyPlan {
        id: Uuid::new_v4(),
        owner: validated.owner,
        analysis_id: validated.analysis_id,
        status: "active".to_string(),
        created_at: now,
        updated_at: now,
        start_date: validated.start_date,
        end_date: plan_end_date(validated.start_date, validated.timeline),
        total_days: validated.timeline,
        hours_per_day: validated.hours_per_day,
        study_days: validated.study_day_labels,
        skills,
        summary: PlanSummary {
            total_xp: schedule.total_xp,
            total_hours: schedule.total_hours,
            study_day_count: schedule.study_day_count,
            rest_day_count: schedule.rest_day_count,
        },
        tasks: schedule.tasks,
        phases: schedule.phases,
        metadata,
    };

    state.store.put(&plan).await?;

    info!(
        "Generated plan {} ({} days, {} study sessions, {} XP available)",
        plan.id, plan.total_days, plan.summary.study_day_count, plan.summary.total_xp
    );

    Ok(Json(plan))
}

/// GET /api/v1/plans/:id
pub async fn handle_get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<StudyPlan>, AppError> {
    let plan = state
        .store
        .get(plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_PLAN_MESSAGE.to_string()))?;

    if !plan.accessible_by(query.user_id) {
        return Err(AppError::Forbidden);
    }

    Ok(Json(plan))
}

/// PATCH /api/v1/plans/:id/tasks/:index/complete
pub async fn handle_complete_task(
    State(state): State<AppState>,
    Path((plan_id, index)): Path<(Uuid, usize)>,
    Json(request): Json<CompleteTaskRequest>,
) -> Result<Json<StudyPlan>, AppError> {
    let mut plan = state
        .store
        .get(plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_PLAN_MESSAGE.to_string()))?;

    if !plan.accessible_by(request.user_id) {
        return Err(AppError::Forbidden);
    }

    set_task_completion(&mut plan, index, request.completed).map_err(|e| match e {
        CompletionError::OutOfRange(i) => {
            AppError::NotFound(format!("Task {i} not found on this plan"))
        }
        CompletionError::RestDay(_) => AppError::InvalidOperation(REST_DAY_MESSAGE.to_string()),
    })?;

    state.store.put(&plan).await?;

    Ok(Json(plan))
}
