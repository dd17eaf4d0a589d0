//! Prompt and response schema for decision analysis.

use crate::models::{Choice, Scenario};
use serde_json::{json, Value};

/// Build the educator prompt for a decision.
pub fn build_prompt(scenario: &Scenario, choice: &Choice) -> String {
    let mut prompt = String::new();

    prompt.push_str("당신은 청소년을 위한 'AI 윤리 교육 전문가'입니다.\n");
    prompt.push_str(&format!(
        "학생이 '{}'라는 딜레마 상황에서 결정을 내렸습니다.\n\n",
        scenario.title
    ));
    prompt.push_str(&format!("[시나리오]: {}\n", scenario.description));
    prompt.push_str(&format!("[학생의 선택]: {}\n", choice.text));
    prompt.push_str(&format!(
        "[선택의 기반 관점]: {} (공리주의, 의무론 등)\n\n",
        choice.perspective
    ));
    prompt.push_str("학생의 선택에 대해 다음 3가지를 포함하여 JSON 형식으로 응답해주세요:\n");
    prompt.push_str("1. analysis: 선택이 가져온 윤리적 결과와 그 의미에 대한 친절하고 교육적인 해설 (약 3-4문장).\n");
    prompt.push_str("2. discussionQuestions: 이 문제에 대해 친구들과 토론해볼 수 있는 심오한 질문 3가지.\n");
    prompt.push_str("3. keyEthicalConcepts: 이 상황과 관련된 핵심 윤리 용어 2-3개.\n\n");
    prompt.push_str("어조는 격려하며 생각할 거리를 던져주는 선생님의 말투(해요체)를 사용해주세요.");

    prompt
}

/// JSON schema the model's response must follow.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": { "type": "STRING" },
            "discussionQuestions": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "keyEthicalConcepts": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["analysis", "discussionQuestions", "keyEthicalConcepts"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_prompt_embeds_decision() {
        let catalog = Catalog::builtin();
        let (scenario, choice) = catalog.choice("s2", "c2_2").unwrap();

        let prompt = build_prompt(scenario, choice);
        assert!(prompt.contains("'희귀병 치료제 분배'"));
        assert!(prompt.contains(&scenario.description));
        assert!(prompt.contains("[학생의 선택]: 어린아이에게 투여한다"));
        assert!(prompt.contains("[선택의 기반 관점]: JUSTICE"));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = response_schema();
        let required: Vec<_> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["analysis", "discussionQuestions", "keyEthicalConcepts"]
        );
        assert_eq!(schema["properties"]["discussionQuestions"]["type"], "ARRAY");
    }
}
