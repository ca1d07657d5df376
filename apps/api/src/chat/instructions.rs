//! Mutation instructions — structured edit commands the assistant emits
//! alongside its free-text reply, and the interpreter that applies them.
//!
//! Instructions come from a probabilistic generator, so the boundary here is
//! deliberately forgiving: anything unrecognized or unresolvable is dropped
//! (and logged), never raised as a hard error that would abort the
//! conversation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plan::model::{StudyPlan, Task};

/// A structured plan edit. Closed tagged union: unknown `type` values fail
/// deserialization at the boundary and never reach the interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanUpdateInstruction {
    #[serde(rename_all = "camelCase")]
    RescheduleTask {
        from_date: NaiveDate,
        to_date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

/// Filters raw assistant-emitted values down to well-formed instructions.
pub fn parse_instructions(raw: &[serde_json::Value]) -> Vec<PlanUpdateInstruction> {
    raw.iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(instruction) => Some(instruction),
            Err(e) => {
                debug!("Dropping malformed plan update instruction: {e}");
                None
            }
        })
        .collect()
}

/// Applies a batch of instructions to one plan and returns the subset that
/// actually applied.
///
/// Each instruction resolves both dates by exact match on canonical calendar
/// dates; if either fails the whole instruction is void (no partial
/// application). `reschedule_task` moves the source task's content onto the
/// destination date with completion reset, and re-stamps the displaced
/// content back onto the source date — a displaced rest day survives as a
/// synthesized rest entry rather than being silently erased.
///
/// Metadata is recomputed once per batch, after the last instruction.
pub fn apply_instructions(
    plan: &mut StudyPlan,
    instructions: &[PlanUpdateInstruction],
) -> Vec<PlanUpdateInstruction> {
    let mut applied = Vec::new();

    for instruction in instructions {
        let PlanUpdateInstruction::RescheduleTask {
            from_date, to_date, ..
        } = instruction;

        let (Some(from_idx), Some(to_idx)) = (
            plan.task_index_by_date(*from_date),
            plan.task_index_by_date(*to_date),
        ) else {
            debug!(
                "Dropping reschedule {from_date} -> {to_date}: date not on the plan calendar"
            );
            continue;
        };

        let moved = plan.tasks[from_idx].clone().restamp(*to_date);
        let displaced = match plan.tasks[to_idx].clone() {
            task @ Task::Study(_) => task.restamp(*from_date),
            // The vacated slot gets a fresh rest entry, so a displaced rest
            // day is never silently erased.
            Task::Rest(_) => Task::rest(*from_date),
        };

        plan.tasks[to_idx] = moved;
        plan.tasks[from_idx] = displaced;
        applied.push(instruction.clone());
    }

    if !applied.is_empty() {
        plan.recompute_metadata();
        plan.touch();
    }

    applied
}
