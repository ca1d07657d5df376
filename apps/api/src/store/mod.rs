//! Plan persistence as a capability.
//!
//! Handlers depend on `dyn PlanStore` only; the concrete composition —
//! Postgres primary with a Redis failover — is assembled once at startup.
//! The fallback is a failover path, not a cache: it is consulted only when
//! the primary read/write fails, or when a primary miss may be explained by
//! an earlier failed-over write.

pub mod postgres;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::plan::model::StudyPlan;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("postgres: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("redis: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("primary and fallback stores both failed: {primary}; {fallback}")]
    Unavailable { primary: String, fallback: String },
}

/// Whole-record get/put of a plan. Both implementations return the same
/// field shape, so callers never branch on which backend served a plan.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<StudyPlan>, StoreError>;
    async fn put(&self, plan: &StudyPlan) -> Result<(), StoreError>;
}

/// Tries the primary store first and falls back to the secondary, surfacing
/// an error only when both sides fail.
pub struct FallbackStore<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackStore<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P: PlanStore, S: PlanStore> PlanStore for FallbackStore<P, S> {
    async fn get(&self, id: Uuid) -> Result<Option<StudyPlan>, StoreError> {
        match self.primary.get(id).await {
            Ok(Some(plan)) => Ok(Some(plan)),
            // A miss on a healthy primary can still mean the plan's create
            // failed over, so the secondary gets a look before we give up.
            Ok(None) => match self.secondary.get(id).await {
                Ok(found) => Ok(found),
                Err(e) => {
                    warn!("Fallback store read failed after primary miss: {e}");
                    Ok(None)
                }
            },
            Err(primary_err) => {
                warn!("Primary store read failed ({primary_err}) — trying fallback");
                self.secondary
                    .get(id)
                    .await
                    .map_err(|fallback_err| StoreError::Unavailable {
                        primary: primary_err.to_string(),
                        fallback: fallback_err.to_string(),
                    })
            }
        }
    }

    async fn put(&self, plan: &StudyPlan) -> Result<(), StoreError> {
        match self.primary.put(plan).await {
            Ok(()) => Ok(()),
            Err(primary_err) => {
                warn!("Primary store write failed ({primary_err}) — writing to fallback");
                self.secondary
                    .put(plan)
                    .await
                    .map_err(|fallback_err| StoreError::Unavailable {
                        primary: primary_err.to_string(),
                        fallback: fallback_err.to_string(),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::test_fixtures::sample_plan;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        plans: Mutex<HashMap<Uuid, StudyPlan>>,
    }

    impl MemoryStore {
        fn len(&self) -> usize {
            self.plans.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PlanStore for MemoryStore {
        async fn get(&self, id: Uuid) -> Result<Option<StudyPlan>, StoreError> {
            Ok(self.plans.lock().unwrap().get(&id).cloned())
        }

        async fn put(&self, plan: &StudyPlan) -> Result<(), StoreError> {
            self.plans.lock().unwrap().insert(plan.id, plan.clone());
            Ok(())
        }
    }

    /// Always errors, standing in for an unreachable backend.
    struct DownStore;

    #[async_trait]
    impl PlanStore for DownStore {
        async fn get(&self, _id: Uuid) -> Result<Option<StudyPlan>, StoreError> {
            Err(StoreError::Unavailable {
                primary: "down".to_string(),
                fallback: "down".to_string(),
            })
        }

        async fn put(&self, _plan: &StudyPlan) -> Result<(), StoreError> {
            Err(StoreError::Unavailable {
                primary: "down".to_string(),
                fallback: "down".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_healthy_primary_never_touches_the_fallback() {
        let store = FallbackStore::new(MemoryStore::default(), MemoryStore::default());
        let plan = sample_plan();
        store.put(&plan).await.unwrap();

        assert_eq!(store.primary.len(), 1);
        assert_eq!(store.secondary.len(), 0);
        assert_eq!(store.get(plan.id).await.unwrap().unwrap(), plan);
    }

    #[tokio::test]
    async fn test_failed_primary_write_lands_in_fallback_with_identical_fields() {
        let store = FallbackStore::new(DownStore, MemoryStore::default());
        let plan = sample_plan();
        store.put(&plan).await.unwrap();

        // Reads also fail over, so the plan is retrievable and identical.
        let read_back = store.get(plan.id).await.unwrap().unwrap();
        assert_eq!(read_back, plan);
    }

    #[tokio::test]
    async fn test_both_stores_failing_surfaces_unavailable() {
        let store = FallbackStore::new(DownStore, DownStore);
        let err = store.put(&sample_plan()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_primary_miss_consults_secondary() {
        let secondary = MemoryStore::default();
        let plan = sample_plan();
        secondary.put(&plan).await.unwrap();

        let store = FallbackStore::new(MemoryStore::default(), secondary);
        assert_eq!(store.get(plan.id).await.unwrap().unwrap(), plan);
    }

    #[tokio::test]
    async fn test_miss_on_both_sides_is_a_clean_none() {
        let store = FallbackStore::new(MemoryStore::default(), MemoryStore::default());
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
