//! Task completion tracking — toggles one task and keeps the derived
//! aggregates consistent.

use thiserror::Error;

use crate::plan::model::{StudyPlan, Task};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Task index {0} is out of range")]
    OutOfRange(usize),

    #[error("Task {0} falls on a rest day and cannot be completed")]
    RestDay(usize),
}

/// Sets the completion flag on the task at `index`.
///
/// Rest days are rejected without touching the plan. Setting a value the
/// task already holds still succeeds (and bumps `updated_at`) with no change
/// to the aggregates.
pub fn set_task_completion(
    plan: &mut StudyPlan,
    index: usize,
    completed: bool,
) -> Result<(), CompletionError> {
    let task = plan
        .tasks
        .get_mut(index)
        .ok_or(CompletionError::OutOfRange(index))?;

    match task {
        Task::Rest(_) => Err(CompletionError::RestDay(index)),
        Task::Study(study) => {
            study.completed = completed;
            plan.recompute_metadata();
            plan.touch();
            Ok(())
        }
    }
}
