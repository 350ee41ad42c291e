// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; only cross-cutting pieces live here.

/// Appended to every prompt whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that rewrites resume content.
pub const NO_FABRICATION_INSTRUCTION: &str = "Use only facts present in the original resume. \
    Do NOT invent employers, titles, dates, degrees, or metrics.";
