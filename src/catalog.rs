//! Scenario catalog.
//!
//! The catalog is built once at startup, validated, and never mutated
//! afterwards.
//! Lookups are by scenario id, then by choice id within the scenario.

use crate::models::{Category, Choice, Difficulty, Perspective, Scenario};
use std::collections::HashSet;
use thiserror::Error;

/// Every scenario offers exactly this many choices.
pub const CHOICES_PER_SCENARIO: usize = 2;

/// Errors raised while assembling a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate scenario id: {0}")]
    DuplicateScenario(String),

    #[error("scenario {scenario} has {found} choices, expected {CHOICES_PER_SCENARIO}")]
    ChoiceCount { scenario: String, found: usize },

    #[error("scenario {scenario} has duplicate choice id: {choice}")]
    DuplicateChoice { scenario: String, choice: String },
}

/// Ordered, read-only list of scenarios.
#[derive(Debug, Clone)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// Check ids and choice counts.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();

        for scenario in &self.scenarios {
            if !seen.insert(scenario.id.as_str()) {
                return Err(CatalogError::DuplicateScenario(scenario.id.clone()));
            }

            if scenario.choices.len() != CHOICES_PER_SCENARIO {
                return Err(CatalogError::ChoiceCount {
                    scenario: scenario.id.clone(),
                    found: scenario.choices.len(),
                });
            }

            let mut choice_ids = HashSet::new();
            for choice in &scenario.choices {
                if !choice_ids.insert(choice.id.as_str()) {
                    return Err(CatalogError::DuplicateChoice {
                        scenario: scenario.id.clone(),
                        choice: choice.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// The three built-in dilemmas.
    pub fn builtin() -> Self {
        Self {
            scenarios: builtin_scenarios(),
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Look up a scenario by id.
    pub fn get(&self, scenario_id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == scenario_id)
    }

    /// Resolve a (scenario, choice) id pair.
    pub fn choice(&self, scenario_id: &str, choice_id: &str) -> Option<(&Scenario, &Choice)> {
        let scenario = self.get(scenario_id)?;
        let choice = scenario.choice(choice_id)?;
        Some((scenario, choice))
    }
}

fn choice(id: &str, text: &str, perspective: Perspective, consequence: &str) -> Choice {
    Choice {
        id: id.to_string(),
        text: text.to_string(),
        perspective,
        consequence_summary: consequence.to_string(),
    }
}

fn points(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "s1".to_string(),
            title: "자율주행차의 딜레마".to_string(),
            category: Category::AutonomousVehicle,
            difficulty: Difficulty::Beginner,
            description: "당신은 자율주행차 AI 개발자입니다. 브레이크 고장 상황에서 차는 두 가지 경로 중 하나를 선택해야 합니다. 직진하면 횡단보도를 건너던 5명의 보행자를 치게 되고, 방향을 틀면 벽에 부딪혀 탑승자 1명이 사망합니다.".to_string(),
            image_url: "https://picsum.photos/seed/car_crash/800/400".to_string(),
            learning_points: points(&[
                "공리주의 vs 의무론",
                "트롤리 딜레마의 이해",
                "알고리즘 설계의 책임",
            ]),
            choices: vec![
                choice(
                    "c1_1",
                    "방향을 틀어 탑승자를 희생시킨다 (다수 구출)",
                    Perspective::Utilitarianism,
                    "5명의 보행자는 무사하지만, 차량 탑승자가 사망했습니다. 다수의 행복을 위한 선택이었습니다.",
                ),
                choice(
                    "c1_2",
                    "직진하여 보행자를 희생시킨다 (탑승자 보호)",
                    Perspective::Deontology,
                    "탑승자는 무사하지만, 5명의 보행자가 희생되었습니다. 탑승자를 보호해야 한다는 의무를 우선시했습니다.",
                ),
            ],
        },
        Scenario {
            id: "s2".to_string(),
            title: "희귀병 치료제 분배".to_string(),
            category: Category::MedicalAi,
            difficulty: Difficulty::Intermediate,
            description: "의료 AI가 단 하나 남은 희귀병 치료제를 누구에게 투여할지 결정해야 합니다. 환자 A는 앞으로 수많은 생명을 구할 천재 과학자이고, 환자 B는 7살 어린아이입니다.".to_string(),
            image_url: "https://picsum.photos/seed/medical_ai/800/400".to_string(),
            learning_points: points(&[
                "생명의 가치 평가",
                "사회적 기여도 vs 생존권",
                "AI의 공정성",
            ]),
            choices: vec![
                choice(
                    "c2_1",
                    "천재 과학자에게 투여한다 (미래 가치 중시)",
                    Perspective::Utilitarianism,
                    "과학자가 생존하여 암 치료제 개발을 계속합니다. 하지만 어린아이의 생존 기회는 박탈되었습니다.",
                ),
                choice(
                    "c2_2",
                    "어린아이에게 투여한다 (기회의 평등 중시)",
                    Perspective::Justice,
                    "아이가 건강을 되찾았습니다. 생명은 사회적 가치로 저울질할 수 없다는 원칙을 지켰습니다.",
                ),
            ],
        },
        Scenario {
            id: "s3".to_string(),
            title: "범죄 예측 시스템의 오류".to_string(),
            category: Category::JudicialAi,
            difficulty: Difficulty::Advanced,
            description: "AI가 과거 데이터를 학습하여 범죄 가능성이 높은 지역을 순찰하도록 경찰을 배당합니다. 하지만 과거 데이터에는 특정 저소득층 지역에 대한 차별적 단속 기록이 포함되어 있습니다. 이 데이터를 그대로 사용할까요?".to_string(),
            image_url: "https://picsum.photos/seed/police_ai/800/400".to_string(),
            learning_points: points(&[
                "데이터 편향성(Bias)",
                "알고리즘적 차별",
                "피드백 루프",
            ]),
            choices: vec![
                choice(
                    "c3_1",
                    "데이터대로 효율성을 위해 배당한다",
                    Perspective::Utilitarianism,
                    "단기적으로 범죄 검거율은 올랐으나, 특정 지역 주민들에 대한 과잉 단속과 차별 논란이 심화되었습니다.",
                ),
                choice(
                    "c3_2",
                    "데이터를 보정하여 지역별로 균등 배당한다",
                    Perspective::Justice,
                    "검거 효율은 다소 떨어졌으나, 지역 간 차별 논란을 줄이고 공정한 치안 서비스를 제공했습니다.",
                ),
            ],
        },
    ]
}
