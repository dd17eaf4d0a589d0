//! Interactive and scripted front ends for a session.
//!
//! The interactive loop reads commands from stdin and prints the current
//! view after every transition. While an analysis is pending a spinner is
//! shown and `h` navigates away, abandoning the request.

use crate::cli::PlayStep;
use crate::render;
use crate::session::{Session, SessionError, View};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

/// A line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 1-based item number.
    Pick(usize),
    Back,
    Home,
    Quit,
    Unknown,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.to_lowercase().as_str() {
            "b" | "back" => Command::Back,
            "h" | "home" => Command::Home,
            "q" | "quit" | "exit" => Command::Quit,
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Command::Pick(n),
                _ => Command::Unknown,
            },
        }
    }
}

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// A choice was made; wait for its analysis.
    Analyze,
    Quit,
}

/// Apply a command to the session according to the current view.
fn dispatch(session: &mut Session, command: Command) -> Result<Flow, SessionError> {
    match (session.view(), command) {
        (_, Command::Quit) => return Ok(Flow::Quit),
        (_, Command::Home) => session.home(),
        (View::Home, Command::Pick(n)) => {
            let id = session
                .catalog()
                .scenarios()
                .get(n - 1)
                .map(|s| s.id.clone())
                .ok_or_else(|| SessionError::UnknownScenario(n.to_string()))?;
            session.start_scenario(&id)?;
        }
        (View::Simulation, Command::Pick(n)) => {
            let scenario = session
                .active_scenario()
                .ok_or(SessionError::NoActiveScenario)?;
            let id = scenario
                .choices
                .get(n - 1)
                .map(|c| c.id.clone())
                .ok_or_else(|| SessionError::UnknownChoice {
                    scenario: scenario.id.clone(),
                    choice: n.to_string(),
                })?;
            session.select_choice(&id)?;
            return Ok(Flow::Analyze);
        }
        (View::Simulation, Command::Back) => session.back()?,
        (View::Analysis, Command::Pick(_)) => session.home(),
        (view, command) => debug!("Ignoring {:?} on {}", command, view),
    }

    Ok(Flow::Continue)
}

/// Run the interactive loop until `q` or end of input.
pub async fn run_interactive(session: &mut Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("{}", render::render_session(session));

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match dispatch(session, Command::parse(&line)) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Ok(Flow::Analyze) => {
                if !await_analysis(session, &mut lines).await? {
                    break;
                }
            }
            Err(e) => {
                warn!("Rejected command '{}': {}", line.trim(), e);
                println!("⚠️  {}", e);
            }
        }
    }

    println!("{}", render::render_summary(session));
    Ok(())
}

/// Wait for the pending analysis while still accepting `h` and `q`.
///
/// Returns `false` when the user asked to quit.
async fn await_analysis(session: &mut Session, lines: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
    // Offline analyses resolve immediately; skip the spinner for them.
    tokio::task::yield_now().await;
    if session.poll_analysis().is_some() {
        return Ok(true);
    }

    let spinner = analysis_spinner();

    loop {
        let input = tokio::select! {
            _ = session.wait_for_analysis() => None,
            line = lines.next_line() => Some(line?),
        };

        match input {
            None => break,
            // End of input: let the analysis finish before the loop exits.
            Some(None) => {
                session.wait_for_analysis().await;
                break;
            }
            Some(Some(line)) => match Command::parse(&line) {
                Command::Home => {
                    session.home();
                    break;
                }
                Command::Quit => {
                    spinner.finish_and_clear();
                    return Ok(false);
                }
                _ => spinner.println("분석이 끝날 때까지 기다려 주세요. ([h] 홈으로)"),
            },
        }
    }

    spinner.finish_and_clear();
    Ok(true)
}

fn analysis_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("AI가 당신의 윤리적 결정을 분석 중입니다... ([h] 홈으로)");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Play a fixed list of decisions, printing each analysis.
pub async fn run_script(session: &mut Session, steps: &[PlayStep]) -> Result<()> {
    for step in steps {
        session.home();
        session.start_scenario(&step.scenario_id)?;
        session.select_choice(&step.choice_id)?;
        session.wait_for_analysis().await;

        println!("{}", render::render_session(session));
    }

    session.home();
    println!("{}", render::render_summary(session));
    Ok(())
}
