//! Text views for the home, simulation and analysis screens.

use crate::analyzer::AnalysisSource;
use crate::catalog::Catalog;
use crate::models::{Choice, Difficulty, PerspectiveStat, Scenario};
use crate::session::{AnalysisStatus, Session, View};
use crate::stats::dominant_perspective;

const RULE: &str = "────────────────────────────────────────────────────────────";
const PROGRESS_WIDTH: usize = 30;
const BAR_UNIT: &str = "██";

/// Render whatever view the session is on.
pub fn render_session(session: &Session) -> String {
    match session.view() {
        View::Home => render_home(session),
        View::Simulation => match session.active_scenario() {
            Some(scenario) => render_simulation(scenario),
            None => render_home(session),
        },
        View::Analysis => match (session.active_scenario(), session.active_choice()) {
            (Some(scenario), Some(choice)) => {
                render_analysis(scenario, choice, session.analysis_status())
            }
            _ => render_home(session),
        },
    }
}

/// Render the home view: progress, scenario cards and the stats chart.
pub fn render_home(session: &Session) -> String {
    let mut output = String::new();

    output.push_str(&render_header(session));
    output.push_str("\n🧠 AI 딜레마 랩\n");
    output.push_str("인공지능 개발자가 되어 복잡한 윤리적 딜레마를 해결하세요.\n");
    output.push_str("당신의 선택이 미래 사회의 알고리즘을 결정합니다.\n\n");

    output.push_str(&render_progress(session.progress_percent()));
    output.push('\n');

    let completed = session.completed_scenario_ids();
    for (i, scenario) in session.catalog().scenarios().iter().enumerate() {
        output.push_str(&render_scenario_card(
            i + 1,
            scenario,
            completed.contains(scenario.id.as_str()),
        ));
    }

    let stats = session.stats();
    if !stats.is_empty() {
        output.push_str(&format!("\n⚖️  나의 윤리적 성향 분석\n{}\n", RULE));
        output.push_str(&render_chart(&stats));
        if let Some(dominant) = dominant_perspective(&stats) {
            output.push_str(&format!("\n가장 많이 선택한 관점: {}\n", dominant.label()));
        }
    }

    output.push_str("\n[번호] 시나리오 시작 · [q] 종료\n");
    output
}

/// Render the simulation view for a scenario.
pub fn render_simulation(scenario: &Scenario) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", RULE));
    output.push_str(&format!("[{}] {}\n", scenario.category, scenario.title));
    output.push_str(&format!("{}\n\n", RULE));
    output.push_str(&format!("{}\n\n", scenario.description));

    output.push_str("📖 학습 포인트\n");
    for point in &scenario.learning_points {
        output.push_str(&format!("  • {}\n", point));
    }

    output.push_str("\n⚖️  어떤 결정을 내리시겠습니까?\n");
    for (i, choice) in scenario.choices.iter().enumerate() {
        output.push_str(&format!(
            "  [{}] {}  (CODE: {})\n",
            i + 1,
            choice.text,
            choice.id
        ));
    }

    output.push_str("\n[번호] 선택 · [b] 돌아가기\n");
    output
}

/// Render the analysis view for a decision.
pub fn render_analysis(scenario: &Scenario, choice: &Choice, status: &AnalysisStatus) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n🧠 시뮬레이션 결과 분석 · {}\n{}\n", scenario.title, RULE));
    output.push_str(&format!("당신의 선택: \"{}\"\n", choice.text));
    output.push_str(&format!("결과: {}\n", choice.consequence_summary));
    output.push_str(&format!(
        "윤리적 관점: {} 에 기반한 결정입니다.\n\n",
        choice.perspective.label()
    ));

    match status {
        AnalysisStatus::Idle | AnalysisStatus::Pending => {
            output.push_str("AI가 당신의 윤리적 결정을 분석 중입니다...\n");
        }
        AnalysisStatus::Ready(analysis) | AnalysisStatus::Failed(analysis) => {
            let heading = match analysis.source {
                AnalysisSource::Model => "✦ AI 윤리 해설",
                AnalysisSource::Offline => "✦ 윤리 해설 (오프라인)",
                AnalysisSource::Degraded => "⚠ 윤리 해설 (일시적 오류)",
            };
            output.push_str(&format!("{}\n", heading));
            output.push_str(&format!("{}\n\n", analysis.response.analysis));

            if !analysis.response.discussion_questions.is_empty() {
                output.push_str("토론해보기\n");
                for (i, question) in analysis.response.discussion_questions.iter().enumerate() {
                    output.push_str(&format!("  Q{}. {}\n", i + 1, question));
                }
                output.push('\n');
            }

            if !analysis.response.key_ethical_concepts.is_empty() {
                let tags: Vec<String> = analysis
                    .response
                    .key_ethical_concepts
                    .iter()
                    .map(|c| format!("#{}", c))
                    .collect();
                output.push_str(&format!("핵심 개념: {}\n", tags.join(" ")));
            }
        }
    }

    output.push_str("\n[h] 다음 시나리오로 이동\n");
    output
}

/// Render the perspective distribution as horizontal bars.
pub fn render_chart(stats: &[PerspectiveStat]) -> String {
    let mut chart = String::new();

    for stat in stats {
        chart.push_str(&format!(
            "  {:<6}\t{} {}\n",
            stat.label,
            BAR_UNIT.repeat(stat.count),
            stat.count
        ));
    }

    chart
}

/// Render the scenario list for `--list`.
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut output = String::new();

    for scenario in catalog.scenarios() {
        output.push_str(&format!(
            "{}  {} [{} · {}]\n",
            scenario.id, scenario.title, scenario.category, scenario.difficulty
        ));
        for choice in &scenario.choices {
            output.push_str(&format!(
                "    {}  {} ({})\n",
                choice.id,
                choice.text,
                choice.perspective.label()
            ));
        }
    }

    output
}

/// Render the end-of-session summary.
pub fn render_summary(session: &Session) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n📊 세션 요약\n{}\n", RULE));
    output.push_str(&format!("완료한 시뮬레이션: {}\n", session.history().len()));
    output.push_str(&format!("진척도: {}%\n", session.progress_percent()));
    output.push_str(&format!("레벨: {}\n", session.level()));

    let stats = session.stats();
    if !stats.is_empty() {
        output.push('\n');
        output.push_str(&render_chart(&stats));
    }

    output
}

fn render_header(session: &Session) -> String {
    format!("{}\n🏆 {}\n{}\n", RULE, session.level(), RULE)
}

fn render_progress(percent: u8) -> String {
    let filled = PROGRESS_WIDTH * percent.min(100) as usize / 100;
    format!(
        "나의 진척도 [{}{}] {}%\n",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        percent
    )
}

fn render_scenario_card(number: usize, scenario: &Scenario, completed: bool) -> String {
    let badge = match scenario.difficulty {
        Difficulty::Beginner => "🟢",
        Difficulty::Intermediate => "🟡",
        Difficulty::Advanced => "🔴",
    };
    let done = if completed { "  ✅ 완료됨" } else { "" };
    let tags: Vec<String> = scenario
        .learning_points
        .iter()
        .take(2)
        .map(|p| format!("#{}", p))
        .collect();

    format!(
        "  [{}] {} {} ({}){}\n      {}\n",
        number,
        badge,
        scenario.title,
        scenario.difficulty,
        done,
        tags.join(" ")
    )
}
