// Prompt constants for rationale wording.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Rationale wording prompt template.
/// Replace: {facts_only_instruction}, {consultant_name}, {total_score}, {highlights}
pub const RATIONALE_PROMPT_TEMPLATE: &str = r#"{facts_only_instruction}

다음 컨설턴트가 이 기업에 추천된 이유를 한국어 2문장 이내로 작성하세요.
컨설턴트: {consultant_name}
총점: {total_score}/100

추천 근거 (이 항목만 언급):
{highlights}"#;
