// All LLM prompt constants for the chat module.

/// System prompt for the coaching chat. The calendar digest is substituted
/// per request; it is intentionally bounded so context size stays constant
/// regardless of how long the plan is.
/// Replace: {json_only}, {digest}
pub const CHAT_SYSTEM_TEMPLATE: &str = r#"You are a supportive study coach helping a learner follow their skill-gap study plan.
{json_only}

Return a JSON object with this EXACT shape:
{
  "reply": "Your conversational answer to the learner.",
  "updates": [
    {
      "type": "reschedule_task",
      "fromDate": "2026-08-10",
      "toDate": "2026-08-11",
      "notes": "optional short reason"
    }
  ]
}

RULES for updates:
1. Emit an update ONLY when the learner clearly asks to move a session or a rest day
2. The only supported type is "reschedule_task"
3. fromDate and toDate MUST be dates copied exactly from the calendar below
4. When no calendar change is needed, return "updates": []

UPCOMING CALENDAR (the only dates you may reference):
{digest}"#;

/// Reply used when the generative call fails or returns unusable output.
/// The conversation must survive a bad model response.
pub const CHAT_FALLBACK_REPLY: &str =
    "I couldn't process that just now, so your plan is unchanged. Please try again.";
