//! Durable primary store: one row per plan in the `study_plans` table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::plan::StudyPlanRow;
use crate::plan::model::StudyPlan;
use crate::store::{PlanStore, StoreError};

pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn get(&self, id: Uuid) -> Result<Option<StudyPlan>, StoreError> {
        let row: Option<StudyPlanRow> =
            sqlx::query_as("SELECT * FROM study_plans WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(StudyPlanRow::into_plan)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn put(&self, plan: &StudyPlan) -> Result<(), StoreError> {
        let row = StudyPlanRow::from_plan(plan)?;

        // Whole-record upsert: a concurrent reader never sees the task list
        // and metadata out of step with each other.
        sqlx::query(
            r#"
            INSERT INTO study_plans
                (id, user_id, analysis_id, status, created_at, updated_at,
                 start_date, end_date, total_days, hours_per_day, study_days,
                 plan_data, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                analysis_id = EXCLUDED.analysis_id,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                total_days = EXCLUDED.total_days,
                hours_per_day = EXCLUDED.hours_per_day,
                study_days = EXCLUDED.study_days,
                plan_data = EXCLUDED.plan_data,
                metadata = EXCLUDED.metadata
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.analysis_id)
        .bind(&row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(row.total_days)
        .bind(&row.hours_per_day)
        .bind(&row.study_days)
        .bind(&row.plan_data)
        .bind(&row.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
