use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::store::PlanStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Plan persistence behind the capability trait. Composed at startup as
    /// Postgres primary with a Redis failover, so handlers never branch on
    /// which backend actually served a plan.
    pub store: Arc<dyn PlanStore>,
    pub llm: LlmClient,
    pub config: Config,
}
