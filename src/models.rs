//! Data models for the dilemma simulator.
//!
//! This module contains the core data structures used throughout
//! the application for representing scenarios, choices, history and
//! analysis results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ethical framework a choice is classified under.
///
/// Variant order is the fixed display order used by the stats chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Perspective {
    Utilitarianism,
    Deontology,
    VirtueEthics,
    Justice,
    CareEthics,
}

impl Perspective {
    /// All perspectives in enumeration order.
    pub const ALL: [Perspective; 5] = [
        Perspective::Utilitarianism,
        Perspective::Deontology,
        Perspective::VirtueEthics,
        Perspective::Justice,
        Perspective::CareEthics,
    ];

    /// Returns the Korean display label.
    pub fn label(&self) -> &'static str {
        match self {
            Perspective::Utilitarianism => "공리주의",
            Perspective::Deontology => "의무론",
            Perspective::VirtueEthics => "덕 윤리",
            Perspective::Justice => "정의론",
            Perspective::CareEthics => "배려 윤리",
        }
    }

    /// Position in [`Perspective::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perspective::Utilitarianism => write!(f, "UTILITARIANISM"),
            Perspective::Deontology => write!(f, "DEONTOLOGY"),
            Perspective::VirtueEthics => write!(f, "VIRTUE_ETHICS"),
            Perspective::Justice => write!(f, "JUSTICE"),
            Perspective::CareEthics => write!(f, "CARE_ETHICS"),
        }
    }
}

/// How demanding a scenario is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "BEGINNER"),
            Difficulty::Intermediate => write!(f, "INTERMEDIATE"),
            Difficulty::Advanced => write!(f, "ADVANCED"),
        }
    }
}

/// Application domain a scenario belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    AutonomousVehicle,
    MedicalAi,
    JudicialAi,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::AutonomousVehicle => write!(f, "AUTONOMOUS_VEHICLE"),
            Category::MedicalAi => write!(f, "MEDICAL_AI"),
            Category::JudicialAi => write!(f, "JUDICIAL_AI"),
        }
    }
}

/// One resolution of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Identifier, unique within its scenario.
    pub id: String,
    /// Text shown on the choice button.
    pub text: String,
    /// Ethical framework the choice is based on.
    pub perspective: Perspective,
    /// What happens after the choice is made.
    pub consequence_summary: String,
}

/// A fixed ethical dilemma with two opposing choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub description: String,
    pub image_url: String,
    pub learning_points: Vec<String>,
    pub choices: Vec<Choice>,
}

impl Scenario {
    /// Look up one of this scenario's choices by id.
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

/// A completed simulation, appended to the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub scenario_id: String,
    pub choice_id: String,
    pub timestamp: DateTime<Utc>,
}

impl SimulationResult {
    /// Record a choice made right now.
    pub fn now(scenario_id: &str, choice_id: &str) -> Self {
        Self {
            scenario_id: scenario_id.to_string(),
            choice_id: choice_id.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Structured explanation of a decision.
///
/// Field names match the JSON schema requested from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub analysis: String,
    pub discussion_questions: Vec<String>,
    pub key_ethical_concepts: Vec<String>,
}

/// One bar of the perspective chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerspectiveStat {
    pub perspective: Perspective,
    pub label: &'static str,
    pub count: usize,
}

/// Titles awarded as the history grows.
pub const LEVEL_TITLES: [&str; 4] = [
    "AI 윤리 입문자",
    "딜레마 탐험가",
    "공정성 수호자",
    "윤리 마스터",
];

/// Simulations needed per level.
const SIMULATIONS_PER_LEVEL: usize = 3;

/// Player level derived from the number of completed simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub number: usize,
    pub title: &'static str,
}

impl Level {
    pub fn from_history_len(len: usize) -> Self {
        let tier = len / SIMULATIONS_PER_LEVEL;
        Self {
            number: tier + 1,
            title: LEVEL_TITLES[tier.min(LEVEL_TITLES.len() - 1)],
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lv.{} {}", self.number, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_order() {
        assert_eq!(Perspective::ALL[0], Perspective::Utilitarianism);
        assert_eq!(Perspective::ALL[4], Perspective::CareEthics);
        for (i, p) in Perspective::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn test_perspective_serde_names() {
        let json = serde_json::to_string(&Perspective::VirtueEthics).unwrap();
        assert_eq!(json, "\"VIRTUE_ETHICS\"");

        let parsed: Perspective = serde_json::from_str("\"CARE_ETHICS\"").unwrap();
        assert_eq!(parsed, Perspective::CareEthics);
        assert!(serde_json::from_str::<Perspective>("\"NIHILISM\"").is_err());
    }

    #[test]
    fn test_perspective_labels() {
        assert_eq!(Perspective::Utilitarianism.label(), "공리주의");
        assert_eq!(Perspective::Justice.label(), "정의론");
        assert_eq!(Perspective::Deontology.to_string(), "DEONTOLOGY");
    }

    #[test]
    fn test_analysis_response_wire_names() {
        let body = r#"{
            "analysis": "좋은 선택이에요.",
            "discussionQuestions": ["Q1", "Q2", "Q3"],
            "keyEthicalConcepts": ["책임", "공정성"]
        }"#;
        let parsed: AnalysisResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.discussion_questions.len(), 3);
        assert_eq!(parsed.key_ethical_concepts, vec!["책임", "공정성"]);
    }

    #[test]
    fn test_level_progression() {
        assert_eq!(Level::from_history_len(0).number, 1);
        assert_eq!(Level::from_history_len(2).title, "AI 윤리 입문자");
        assert_eq!(Level::from_history_len(3).title, "딜레마 탐험가");
        assert_eq!(Level::from_history_len(9).title, "윤리 마스터");

        // Title clamps at the last entry while the number keeps growing.
        let high = Level::from_history_len(30);
        assert_eq!(high.number, 11);
        assert_eq!(high.title, "윤리 마스터");
        assert_eq!(high.to_string(), "Lv.11 윤리 마스터");
    }
}
