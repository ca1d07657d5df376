use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::plan::model::{PlanMetadata, PlanPhase, PlanSummary, StudyPlan, Task};

/// Persisted shape of a study plan. `plan_data` and `metadata` are JSONB
/// blobs so the row is always read and written as one record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudyPlanRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub analysis_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub hours_per_day: String,
    pub study_days: Vec<String>,
    pub plan_data: Value,
    pub metadata: Value,
}

/// Contents of the `plan_data` JSONB column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanData {
    #[serde(default)]
    pub skills: Vec<String>,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub phases: Vec<PlanPhase>,
    pub summary: PlanSummary,
}

impl StudyPlanRow {
    pub fn from_plan(plan: &StudyPlan) -> Result<Self, serde_json::Error> {
        let plan_data = serde_json::to_value(PlanData {
            skills: plan.skills.clone(),
            tasks: plan.tasks.clone(),
            phases: plan.phases.clone(),
            summary: plan.summary.clone(),
        })?;
        Ok(Self {
            id: plan.id,
            user_id: plan.owner,
            analysis_id: plan.analysis_id,
            status: plan.status.clone(),
            created_at: plan.created_at,
            updated_at: plan.updated_at,
            start_date: plan.start_date,
            end_date: plan.end_date,
            total_days: plan.total_days as i32,
            hours_per_day: plan.hours_per_day.as_str().to_string(),
            study_days: plan.study_days.clone(),
            plan_data,
            metadata: serde_json::to_value(&plan.metadata)?,
        })
    }

    pub fn into_plan(self) -> Result<StudyPlan, serde_json::Error> {
        let data: PlanData = serde_json::from_value(self.plan_data)?;
        let metadata: PlanMetadata = serde_json::from_value(self.metadata)?;
        // Round-trips through serde so an out-of-band value fails loudly
        // instead of silently mapping to some default band.
        let hours_per_day = serde_json::from_value(Value::String(self.hours_per_day))?;
        Ok(StudyPlan {
            id: self.id,
            owner: self.user_id,
            analysis_id: self.analysis_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            start_date: self.start_date,
            end_date: self.end_date,
            total_days: self.total_days.max(0) as u32,
            hours_per_day,
            study_days: self.study_days,
            skills: data.skills,
            summary: data.summary,
            tasks: data.tasks,
            phases: data.phases,
            metadata,
        })
    }
}
