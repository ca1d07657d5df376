//! Template/Curriculum generation — the external-collaborator seam in front
//! of the scheduler.
//!
//! The LLM path produces an ordered lesson list sized to the study-day
//! count; any transport failure or schema-invalid output degrades to the
//! deterministic fallback so a generate request always yields a full plan.

use tracing::warn;

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::plan::model::{HoursPerDay, TaskTemplate};
use crate::plan::prompts::{CURRICULUM_PROMPT_TEMPLATE, CURRICULUM_SYSTEM};

/// Upper bound on per-lesson XP accepted from the generative path.
const MAX_TEMPLATE_XP: u32 = 200;

/// Produces the ordered lesson list the scheduler will stamp onto study days.
/// Never fails: generative errors are logged and replaced by the fallback.
pub async fn generate_curriculum(
    llm: &LlmClient,
    skills: &[String],
    hours_per_day: HoursPerDay,
    session_count: u32,
    job_description: Option<&str>,
) -> Vec<TaskTemplate> {
    if session_count == 0 {
        return vec![];
    }

    let prompt = build_curriculum_prompt(skills, hours_per_day, session_count, job_description);

    match llm
        .call_json::<Vec<TaskTemplate>>(&prompt, CURRICULUM_SYSTEM)
        .await
    {
        Ok(templates) if curriculum_is_usable(&templates) => templates,
        Ok(templates) => {
            warn!(
                "LLM curriculum failed schema checks ({} lessons) — substituting deterministic fallback",
                templates.len()
            );
            fallback_curriculum(skills, hours_per_day, session_count)
        }
        Err(e) => {
            warn!("LLM curriculum call failed ({e}) — substituting deterministic fallback");
            fallback_curriculum(skills, hours_per_day, session_count)
        }
    }
}

/// Schema checks beyond what serde enforces: no empty themes or time
/// estimates, XP within the accepted band.
fn curriculum_is_usable(templates: &[TaskTemplate]) -> bool {
    !templates.is_empty()
        && templates.iter().all(|t| {
            !t.theme.trim().is_empty()
                && !t.estimated_time.trim().is_empty()
                && t.xp > 0
                && t.xp <= MAX_TEMPLATE_XP
        })
}

fn build_curriculum_prompt(
    skills: &[String],
    hours_per_day: HoursPerDay,
    session_count: u32,
    job_description: Option<&str>,
) -> String {
    let skills_json = serde_json::to_string(skills).unwrap_or_else(|_| "[]".to_string());
    let jd_block = match job_description {
        Some(jd) if !jd.trim().is_empty() => {
            format!("TARGET ROLE (weight lessons toward what this role needs):\n{jd}")
        }
        _ => String::new(),
    };

    CURRICULUM_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{session_count}", &session_count.to_string())
        .replace("{hours_band}", hours_per_day.as_str())
        .replace("{skills_json}", &skills_json)
        .replace("{jd_block}", &jd_block)
}

/// Deterministic curriculum: cycles through the skill list, escalating from
/// fundamentals to hands-on work to project work on each full pass.
pub fn fallback_curriculum(
    skills: &[String],
    hours_per_day: HoursPerDay,
    session_count: u32,
) -> Vec<TaskTemplate> {
    let generic = ["your target skills".to_string()];
    let pool: &[String] = if skills.is_empty() { &generic } else { skills };

    (0..session_count as usize)
        .map(|k| {
            let skill = &pool[k % pool.len()];
            let (theme, description) = match (k / pool.len()) % 3 {
                0 => (
                    format!("Foundations: {skill}"),
                    format!("Learn the fundamentals of {skill} and take notes on the core ideas."),
                ),
                1 => (
                    format!("Hands-on: {skill}"),
                    format!("Work through guided exercises applying {skill}."),
                ),
                _ => (
                    format!("Project work: {skill}"),
                    format!("Build a small project that exercises {skill} end to end."),
                ),
            };
            TaskTemplate {
                theme,
                description,
                resource: format!("Curated resources for {skill}"),
                estimated_time: hours_per_day.session_estimate().to_string(),
                xp: hours_per_day.session_xp(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_produces_requested_session_count() {
        let skills = vec!["SQL".to_string(), "Kafka".to_string()];
        let templates = fallback_curriculum(&skills, HoursPerDay::TwoToThree, 7);
        assert_eq!(templates.len(), 7);
    }

    #[test]
    fn test_fallback_cycles_skills_and_escalates_stages() {
        let skills = vec!["SQL".to_string(), "Kafka".to_string()];
        let templates = fallback_curriculum(&skills, HoursPerDay::OneToTwo, 6);
        assert_eq!(templates[0].theme, "Foundations: SQL");
        assert_eq!(templates[1].theme, "Foundations: Kafka");
        assert_eq!(templates[2].theme, "Hands-on: SQL");
        assert_eq!(templates[3].theme, "Hands-on: Kafka");
        assert_eq!(templates[4].theme, "Project work: SQL");
        assert_eq!(templates[5].theme, "Project work: Kafka");
    }

    #[test]
    fn test_fallback_with_no_skills_still_yields_lessons() {
        let templates = fallback_curriculum(&[], HoursPerDay::FourPlus, 3);
        assert_eq!(templates.len(), 3);
        assert!(templates.iter().all(|t| t.xp == HoursPerDay::FourPlus.session_xp()));
    }

    #[test]
    fn test_fallback_estimates_follow_availability_band() {
        let templates = fallback_curriculum(&["Rust".to_string()], HoursPerDay::ThreeToFour, 2);
        assert!(templates.iter().all(|t| t.estimated_time == "3h30m"));
    }

    #[test]
    fn test_curriculum_usability_rejects_empty_and_absurd_lessons() {
        assert!(!curriculum_is_usable(&[]));

        let good = fallback_curriculum(&["Rust".to_string()], HoursPerDay::OneToTwo, 2);
        assert!(curriculum_is_usable(&good));

        let mut blank_theme = good.clone();
        blank_theme[0].theme = "   ".to_string();
        assert!(!curriculum_is_usable(&blank_theme));

        let mut zero_xp = good.clone();
        zero_xp[1].xp = 0;
        assert!(!curriculum_is_usable(&zero_xp));

        let mut huge_xp = good;
        huge_xp[0].xp = 10_000;
        assert!(!curriculum_is_usable(&huge_xp));
    }

    #[test]
    fn test_prompt_embeds_inputs() {
        let prompt = build_curriculum_prompt(
            &["Rust".to_string()],
            HoursPerDay::TwoToThree,
            5,
            Some("Backend engineer role"),
        );
        assert!(prompt.contains("exactly 5 lessons"));
        assert!(prompt.contains("2-3 hours"));
        assert!(prompt.contains("\"Rust\""));
        assert!(prompt.contains("Backend engineer role"));
    }
}
