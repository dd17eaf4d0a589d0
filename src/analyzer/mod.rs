//! Decision analysis.
//!
//! An analyzer turns a (scenario, choice) pair into an [`AnalysisResponse`].
//! Analysis never fails from the caller's side: a missing credential yields
//! the offline fallback and any request failure yields the transient one.

pub mod gemini;
pub mod prompt;

pub use gemini::{GeminiAnalyzer, GeminiConfig};

use crate::models::{AnalysisResponse, Choice, Scenario};
use async_trait::async_trait;
use thiserror::Error;

/// Where an analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    /// Generated by the model.
    Model,
    /// No credential configured; offline fallback.
    Offline,
    /// The request failed; transient fallback.
    Degraded,
}

/// An analysis together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub response: AnalysisResponse,
    pub source: AnalysisSource,
}

impl Analysis {
    pub fn offline() -> Self {
        Self {
            response: offline_fallback(),
            source: AnalysisSource::Offline,
        }
    }

    pub fn degraded() -> Self {
        Self {
            response: transient_fallback(),
            source: AnalysisSource::Degraded,
        }
    }
}

/// Produces explanations for decisions.
#[async_trait]
pub trait DecisionAnalyzer: Send + Sync {
    /// Analyze a decision. Always resolves.
    async fn analyze(&self, scenario: &Scenario, choice: &Choice) -> Analysis;
}

/// Failures inside a single analysis request.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("request timed out")]
    Timeout,

    #[error("cannot connect to {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no text")]
    EmptyResponse,

    #[error("failed to parse analysis JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("analysis text is empty")]
    EmptyAnalysis,
}

/// Response used when no API key is configured.
pub fn offline_fallback() -> AnalysisResponse {
    AnalysisResponse {
        analysis: "API 키가 설정되지 않아 AI 심층 분석을 제공할 수 없습니다. 하지만 당신의 선택은 이 상황에서 중요한 윤리적 가치를 반영하고 있습니다.".to_string(),
        discussion_questions: vec![
            "이 상황에서 가장 중요하게 고려한 가치는 무엇인가요?".to_string(),
            "다른 선택을 했다면 결과가 어떻게 달라졌을까요?".to_string(),
        ],
        key_ethical_concepts: vec!["윤리적 책임".to_string(), "알고리즘 편향".to_string()],
    }
}

/// Response used when the request to the model fails.
pub fn transient_fallback() -> AnalysisResponse {
    AnalysisResponse {
        analysis: "AI 분석 서버 연결에 일시적인 문제가 발생했습니다. 잠시 후 다시 시도해주세요."
            .to_string(),
        discussion_questions: vec![
            "이 기술이 사회에 미칠 영향은 무엇일까요?".to_string(),
            "누가 책임을 져야 할까요?".to_string(),
        ],
        key_ethical_concepts: vec!["기술 윤리".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_are_distinct_and_complete() {
        let offline = offline_fallback();
        let transient = transient_fallback();

        assert_ne!(offline, transient);
        for response in [&offline, &transient] {
            assert!(!response.analysis.is_empty());
            assert!(!response.discussion_questions.is_empty());
            assert!(!response.key_ethical_concepts.is_empty());
        }
    }

    #[test]
    fn test_analysis_constructors() {
        assert_eq!(Analysis::offline().source, AnalysisSource::Offline);
        assert_eq!(Analysis::offline().response, offline_fallback());
        assert_eq!(Analysis::degraded().source, AnalysisSource::Degraded);
        assert_eq!(Analysis::degraded().response, transient_fallback());
    }
}
