// Shared prompt fragments. Each service that calls the LLM keeps its own prompts.rs
// alongside it and builds on these.

/// System prompt fragment for short plain-prose replies.
pub const PLAIN_PROSE_SYSTEM: &str = "You are a concise writing assistant. \
    Respond with plain prose only. \
    Do NOT use markdown, bullet points, headings, or code fences. \
    Do NOT include greetings, explanations of your reasoning, or apologies.";

/// Restricts the model to the facts it was handed.
pub const FACTS_ONLY_INSTRUCTION: &str = "\
    CRITICAL: Mention ONLY the facts listed below. Do NOT add qualifications, \
    experience, industries, or numbers that are not listed. \
    If a fact is not listed, it does not exist.";
