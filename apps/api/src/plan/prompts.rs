// All LLM prompt constants for the plan module.
// Cross-cutting fragments come from llm_client::prompts at build time.

/// System prompt for curriculum generation — enforces JSON-only output.
pub const CURRICULUM_SYSTEM: &str = "You are an expert learning-path designer \
    turning a skill-gap analysis into an ordered study curriculum. \
    You MUST respond with a valid JSON array only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Curriculum prompt template.
/// Replace: {json_only}, {session_count}, {hours_band}, {skills_json}, {jd_block}
pub const CURRICULUM_PROMPT_TEMPLATE: &str = r#"{json_only}

Design an ordered study curriculum of exactly {session_count} lessons for a learner
closing these skill gaps:
{skills_json}

The learner studies {hours_band} hours on each study day. Size every lesson to fit
inside one study day.

{jd_block}

Return a JSON ARRAY of lesson objects, ordered from fundamentals to applied work:
[
  {
    "theme": "Ownership & Borrowing",
    "description": "Read the ownership chapter and rewrite three snippets to satisfy the borrow checker.",
    "resource": "The Rust Book, ch. 4",
    "estimatedTime": "1h30m",
    "xp": 50
  }
]

HARD RULES:
1. Return exactly {session_count} lessons — no more, no fewer
2. `estimatedTime` uses compact tokens like "45m", "1h30m", "2h"
3. `xp` is an integer between 10 and 200 reflecting lesson effort
4. Every lesson must name a concrete, real resource — no invented URLs
5. Order lessons so earlier ones unlock later ones"#;
