//! Axum route handler for the coaching chat, plus the bounded plan digest
//! and the boundary parser for assistant output.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::instructions::{apply_instructions, parse_instructions, PlanUpdateInstruction};
use crate::chat::prompts::{CHAT_FALLBACK_REPLY, CHAT_SYSTEM_TEMPLATE};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{strip_json_fences, ChatMessage};
use crate::plan::model::{weekday_short, StudyPlan, Task};
use crate::state::AppState;

/// Upper bound on tasks shown to the model per request.
const DIGEST_TASK_LIMIT: usize = 14;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub applied_updates: Vec<PlanUpdateInstruction>,
    /// Present only when at least one update applied and was persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<StudyPlan>,
}

/// The machine-parseable envelope the assistant is instructed to return.
/// `updates` stays as raw values here; the instruction boundary filters them.
#[derive(Debug, Deserialize)]
struct AssistantEnvelope {
    reply: String,
    #[serde(default)]
    updates: Vec<serde_json::Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handler
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/plans/:id/chat
///
/// One conversational turn. The model sees a bounded digest of upcoming
/// tasks, never the full plan; any updates it emits are validated and
/// applied atomically, with a single store write per request.
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let mut plan = state
        .store
        .get(plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No plan yet — generate one first".to_string()))?;

    if !plan.accessible_by(request.user_id) {
        return Err(AppError::Forbidden);
    }

    let today = Utc::now().date_naive();
    let digest = plan_digest(&plan, today, DIGEST_TASK_LIMIT);
    let system = CHAT_SYSTEM_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{digest}", &digest);

    let mut messages = conversation_messages(&request.history);
    messages.push(ChatMessage::user(request.message.clone()));

    let envelope = match state.llm.call_messages(&messages, &system).await {
        Ok(response) => parse_assistant_envelope(response.text()),
        Err(e) => {
            warn!("Chat LLM call failed ({e}) — substituting fallback reply");
            fallback_envelope()
        }
    };

    let instructions = parse_instructions(&envelope.updates);
    let applied = apply_instructions(&mut plan, &instructions);

    let mut reply = envelope.reply;
    if applied.is_empty() && !envelope.updates.is_empty() {
        // The assistant proposed edits but none survived validation.
        reply.push_str("\n\n(No calendar updates were applied.)");
    }

    let plan = if applied.is_empty() {
        None
    } else {
        state.store.put(&plan).await?;
        info!(
            "Applied {} chat update(s) to plan {}",
            applied.len(),
            plan.id
        );
        Some(plan)
    };

    Ok(Json(ChatResponse {
        reply,
        applied_updates: applied,
        plan,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Digest and boundary parsing
// ────────────────────────────────────────────────────────────────────────────

/// Renders at most `limit` upcoming tasks (on or after `today`) as one line
/// each. The bound keeps the model's context constant no matter how long the
/// timeline is.
pub fn plan_digest(plan: &StudyPlan, today: NaiveDate, limit: usize) -> String {
    let lines: Vec<String> = plan
        .tasks
        .iter()
        .filter(|t| t.calendar_date() >= today)
        .take(limit)
        .map(digest_line)
        .collect();

    if lines.is_empty() {
        "(no upcoming tasks — the plan has ended)".to_string()
    } else {
        lines.join("\n")
    }
}

fn digest_line(task: &Task) -> String {
    let date = task.calendar_date();
    let day = weekday_short(date.weekday());
    match task {
        Task::Rest(_) => format!("- {date} ({day}): rest day"),
        Task::Study(s) => {
            let done = if s.completed { ", done" } else { "" };
            format!(
                "- {date} ({day}): {} — {} XP, {}{done}",
                s.theme, s.xp, s.estimated_time
            )
        }
    }
}

/// Maps request history onto API messages, dropping turns with roles the
/// Messages API would reject.
fn conversation_messages(history: &[ChatTurn]) -> Vec<ChatMessage> {
    history
        .iter()
        .filter(|turn| turn.role == "user" || turn.role == "assistant")
        .map(|turn| ChatMessage {
            role: turn.role.clone(),
            content: turn.content.clone(),
        })
        .collect()
}

/// Parses the assistant's text into the reply envelope. Non-JSON or
/// schema-violating output is replaced by the fallback — logged, never
/// surfaced as an error.
fn parse_assistant_envelope(text: Option<&str>) -> AssistantEnvelope {
    let Some(text) = text else {
        warn!("Chat LLM returned no text content — substituting fallback reply");
        return fallback_envelope();
    };

    match serde_json::from_str::<AssistantEnvelope>(strip_json_fences(text)) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Chat LLM returned unusable JSON ({e}) — substituting fallback reply");
            fallback_envelope()
        }
    }
}

fn fallback_envelope() -> AssistantEnvelope {
    AssistantEnvelope {
        reply: CHAT_FALLBACK_REPLY.to_string(),
        updates: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::test_fixtures::{date, sample_plan, study};

    #[test]
    fn test_digest_is_bounded_regardless_of_timeline_length() {
        let mut plan = sample_plan();
        plan.tasks = (0..90i64)
            .map(|i| study(date(2026, 8, 3) + chrono::Duration::days(i), 50, false))
            .collect();
        let digest = plan_digest(&plan, date(2026, 8, 3), DIGEST_TASK_LIMIT);
        assert_eq!(digest.lines().count(), 14);
    }

    #[test]
    fn test_digest_starts_at_today_and_skips_the_past() {
        let plan = sample_plan();
        let digest = plan_digest(&plan, date(2026, 8, 4), DIGEST_TASK_LIMIT);
        assert!(!digest.contains("2026-08-03"));
        assert!(digest.contains("2026-08-04"));
    }

    #[test]
    fn test_digest_marks_rest_days_and_completed_sessions() {
        let mut plan = sample_plan();
        if let Task::Study(s) = &mut plan.tasks[0] {
            s.completed = true;
        }
        let digest = plan_digest(&plan, date(2026, 8, 3), DIGEST_TASK_LIMIT);
        assert!(digest.contains("rest day"));
        assert!(digest.contains(", done"));
    }

    #[test]
    fn test_digest_for_an_ended_plan_has_a_placeholder() {
        let plan = sample_plan();
        let digest = plan_digest(&plan, date(2027, 1, 1), DIGEST_TASK_LIMIT);
        assert!(digest.contains("no upcoming tasks"));
    }

    #[test]
    fn test_envelope_parses_plain_and_fenced_json() {
        let plain = parse_assistant_envelope(Some(
            r#"{"reply": "Done!", "updates": [{"type": "reschedule_task", "fromDate": "2026-08-03", "toDate": "2026-08-04"}]}"#,
        ));
        assert_eq!(plain.reply, "Done!");
        assert_eq!(plain.updates.len(), 1);

        let fenced = parse_assistant_envelope(Some(
            "```json\n{\"reply\": \"Sure.\", \"updates\": []}\n```",
        ));
        assert_eq!(fenced.reply, "Sure.");
    }

    #[test]
    fn test_unusable_assistant_output_degrades_to_fallback() {
        let garbage = parse_assistant_envelope(Some("let me think about that..."));
        assert_eq!(garbage.reply, CHAT_FALLBACK_REPLY);
        assert!(garbage.updates.is_empty());

        let empty = parse_assistant_envelope(None);
        assert_eq!(empty.reply, CHAT_FALLBACK_REPLY);
    }

    #[test]
    fn test_conversation_messages_drop_unknown_roles() {
        let history = vec![
            ChatTurn {
                role: "user".to_string(),
                content: "hi".to_string(),
            },
            ChatTurn {
                role: "system".to_string(),
                content: "injected".to_string(),
            },
            ChatTurn {
                role: "assistant".to_string(),
                content: "hello".to_string(),
            },
        ];
        let messages = conversation_messages(&history);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
    }
}
