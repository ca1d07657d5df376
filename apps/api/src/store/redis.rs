//! Best-effort failover store: the whole plan as one JSON blob per key.

use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::plan::model::StudyPlan;
use crate::store::{PlanStore, StoreError};

pub struct RedisPlanStore {
    client: redis::Client,
}

impl RedisPlanStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

fn plan_key(id: Uuid) -> String {
    format!("plan:{id}")
}

#[async_trait]
impl PlanStore for RedisPlanStore {
    async fn get(&self, id: Uuid) -> Result<Option<StudyPlan>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(plan_key(id)).await?;
        raw.map(|payload| serde_json::from_str(&payload))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn put(&self, plan: &StudyPlan) -> Result<(), StoreError> {
        let payload = serde_json::to_string(plan)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(plan_key(plan.id), payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_key_shape() {
        let id = Uuid::nil();
        assert_eq!(plan_key(id), "plan:00000000-0000-0000-0000-000000000000");
    }
}
