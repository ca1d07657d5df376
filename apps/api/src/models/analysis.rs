#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// External reference: the skill-gap analysis a plan is generated from.
/// Scoring itself happens elsewhere; this service only reads the result.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub skills: Value,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRow {
    /// Extracts skill names from the stored JSON, tolerating both plain
    /// string arrays and object arrays with a `name` field.
    pub fn skill_names(&self) -> Vec<String> {
        let Some(items) = self.skills.as_array() else {
            return vec![];
        };
        items
            .iter()
            .filter_map(|item| {
                item.as_str()
                    .or_else(|| item.get("name").and_then(Value::as_str))
                    .map(str::to_string)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(skills: Value) -> AnalysisRow {
        AnalysisRow {
            id: Uuid::new_v4(),
            user_id: None,
            skills,
            summary: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_skill_names_from_string_array() {
        assert_eq!(row(json!(["SQL", "Kafka"])).skill_names(), ["SQL", "Kafka"]);
    }

    #[test]
    fn test_skill_names_from_object_array() {
        let skills = json!([{"name": "SQL", "gap": 0.7}, {"name": "Kafka", "gap": 0.4}]);
        assert_eq!(row(skills).skill_names(), ["SQL", "Kafka"]);
    }

    #[test]
    fn test_skill_names_tolerates_junk() {
        assert!(row(json!("not an array")).skill_names().is_empty());
        assert_eq!(row(json!(["SQL", 42, {"label": "x"}])).skill_names(), ["SQL"]);
    }
}
