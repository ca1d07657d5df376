// Cross-cutting prompt fragments shared by the curriculum and chat modules.

/// Appended to every system prompt that expects machine-parseable output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
