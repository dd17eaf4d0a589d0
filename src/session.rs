//! Session state machine.
//!
//! Tracks the current view, the active scenario and choice, and the
//! append-only history of completed simulations:
//!
//! ```text
//! HOME --start_scenario--> SIMULATION --select_choice--> ANALYSIS
//!   ^                          |                            |
//!   +----------back------------+                            |
//!   +-------------------------home--------------------------+
//! ```
//!
//! Selecting a choice records history synchronously and then runs the
//! analysis as a background task. Leaving the analysis view aborts that
//! task, and results carrying a stale ticket are discarded.

use crate::analyzer::{Analysis, AnalysisSource, DecisionAnalyzer};
use crate::catalog::Catalog;
use crate::models::{Choice, Level, PerspectiveStat, Scenario, SimulationResult};
use crate::stats;
use futures::FutureExt;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

/// Screen the session is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Simulation,
    Analysis,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Home => write!(f, "HOME"),
            View::Simulation => write!(f, "SIMULATION"),
            View::Analysis => write!(f, "ANALYSIS"),
        }
    }
}

/// State of the analysis for the current decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisStatus {
    /// No analysis requested for the current view.
    Idle,
    /// Request in flight.
    Pending,
    /// Analysis available (model output or offline fallback).
    Ready(Analysis),
    /// The request failed; holds the transient fallback.
    Failed(Analysis),
}

impl AnalysisStatus {
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            AnalysisStatus::Ready(a) | AnalysisStatus::Failed(a) => Some(a),
            AnalysisStatus::Idle | AnalysisStatus::Pending => None,
        }
    }
}

/// Identifies one analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub id: u64,
    pub scenario_id: String,
    pub choice_id: String,
}

/// Rejected session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} from the {view} view")]
    InvalidTransition { action: &'static str, view: View },

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("scenario {scenario} has no choice {choice}")]
    UnknownChoice { scenario: String, choice: String },

    #[error("no active scenario")]
    NoActiveScenario,
}

/// One user's walk through the catalog.
pub struct Session {
    catalog: Arc<Catalog>,
    analyzer: Arc<dyn DecisionAnalyzer>,
    view: View,
    active_scenario: Option<Scenario>,
    active_choice: Option<Choice>,
    history: Vec<SimulationResult>,
    status: AnalysisStatus,
    pending_ticket: Option<AnalysisTicket>,
    in_flight: Option<JoinHandle<Analysis>>,
    next_ticket: u64,
}

impl Session {
    /// Start a session on the home view.
    pub fn new(catalog: Arc<Catalog>, analyzer: Arc<dyn DecisionAnalyzer>) -> Self {
        Self {
            catalog,
            analyzer,
            view: View::Home,
            active_scenario: None,
            active_choice: None,
            history: Vec::new(),
            status: AnalysisStatus::Idle,
            pending_ticket: None,
            in_flight: None,
            next_ticket: 1,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_scenario(&self) -> Option<&Scenario> {
        self.active_scenario.as_ref()
    }

    pub fn active_choice(&self) -> Option<&Choice> {
        self.active_choice.as_ref()
    }

    pub fn history(&self) -> &[SimulationResult] {
        &self.history
    }

    pub fn analysis_status(&self) -> &AnalysisStatus {
        &self.status
    }

    /// Open a scenario from the home view.
    pub fn start_scenario(&mut self, scenario_id: &str) -> Result<&Scenario, SessionError> {
        self.expect_view(View::Home, "start a scenario")?;

        let scenario = self
            .catalog
            .get(scenario_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownScenario(scenario_id.to_string()))?;

        debug!("Starting scenario {}", scenario.id);
        self.active_choice = None;
        self.status = AnalysisStatus::Idle;
        self.view = View::Simulation;
        Ok(&*self.active_scenario.insert(scenario))
    }

    /// Commit to a choice in the active scenario.
    ///
    /// The history entry is recorded before the analysis task is spawned.
    /// Must be called within a tokio runtime.
    pub fn select_choice(&mut self, choice_id: &str) -> Result<AnalysisTicket, SessionError> {
        self.expect_view(View::Simulation, "select a choice")?;

        let scenario = self
            .active_scenario
            .clone()
            .ok_or(SessionError::NoActiveScenario)?;
        let choice = scenario
            .choice(choice_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownChoice {
                scenario: scenario.id.clone(),
                choice: choice_id.to_string(),
            })?;

        self.history
            .push(SimulationResult::now(&scenario.id, &choice.id));
        info!(
            "Recorded choice {}/{} ({})",
            scenario.id, choice.id, choice.perspective
        );

        let ticket = AnalysisTicket {
            id: self.next_ticket,
            scenario_id: scenario.id.clone(),
            choice_id: choice.id.clone(),
        };
        self.next_ticket += 1;

        self.cancel_in_flight();
        let analyzer = Arc::clone(&self.analyzer);
        let task_choice = choice.clone();
        self.in_flight = Some(tokio::spawn(async move {
            analyzer.analyze(&scenario, &task_choice).await
        }));

        self.pending_ticket = Some(ticket.clone());
        self.active_choice = Some(choice);
        self.status = AnalysisStatus::Pending;
        self.view = View::Analysis;

        Ok(ticket)
    }

    /// Leave the simulation view without recording anything.
    pub fn back(&mut self) -> Result<(), SessionError> {
        self.expect_view(View::Simulation, "go back")?;

        self.active_scenario = None;
        self.view = View::Home;
        Ok(())
    }

    /// Return to the home view from anywhere.
    ///
    /// Any in-flight analysis is aborted and its result ignored.
    pub fn home(&mut self) {
        if self.view != View::Home {
            debug!("Navigating home from {}", self.view);
        }

        self.cancel_in_flight();
        self.pending_ticket = None;
        self.active_scenario = None;
        self.active_choice = None;
        self.status = AnalysisStatus::Idle;
        self.view = View::Home;
    }

    /// Deliver an analysis result.
    ///
    /// Returns `false` and drops the result when the ticket no longer
    /// matches the pending request.
    pub fn apply_analysis(&mut self, ticket: &AnalysisTicket, analysis: Analysis) -> bool {
        let current = self.view == View::Analysis
            && self.pending_ticket.as_ref().map(|t| t.id) == Some(ticket.id);

        if !current {
            debug!(
                "Discarding stale analysis for {}/{} (ticket {})",
                ticket.scenario_id, ticket.choice_id, ticket.id
            );
            return false;
        }

        self.pending_ticket = None;
        self.status = match analysis.source {
            AnalysisSource::Degraded => AnalysisStatus::Failed(analysis),
            AnalysisSource::Model | AnalysisSource::Offline => AnalysisStatus::Ready(analysis),
        };
        true
    }

    /// Wait for the in-flight analysis, if any.
    ///
    /// Cancel-safe: dropping the future leaves the request running.
    pub async fn wait_for_analysis(&mut self) -> Option<&Analysis> {
        if let Some(handle) = self.in_flight.as_mut() {
            let joined = handle.await;
            self.in_flight = None;
            self.finish(joined);
        }

        self.status.analysis()
    }

    /// Check for a finished analysis without waiting.
    pub fn poll_analysis(&mut self) -> Option<&Analysis> {
        if let Some(handle) = self.in_flight.as_mut() {
            if let Some(joined) = handle.now_or_never() {
                self.in_flight = None;
                self.finish(joined);
            }
        }

        self.status.analysis()
    }

    /// Perspective distribution over the whole history.
    pub fn stats(&self) -> Vec<PerspectiveStat> {
        stats::compute_stats(&self.history, &self.catalog)
    }

    pub fn progress_percent(&self) -> u8 {
        stats::progress_percent(&self.history, &self.catalog)
    }

    pub fn completed_scenario_ids(&self) -> HashSet<&str> {
        stats::completed_scenarios(&self.history)
    }

    pub fn level(&self) -> Level {
        Level::from_history_len(self.history.len())
    }

    fn expect_view(&self, expected: View, action: &'static str) -> Result<(), SessionError> {
        if self.view == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                view: self.view,
            })
        }
    }

    fn finish(&mut self, joined: Result<Analysis, JoinError>) {
        let Some(ticket) = self.pending_ticket.clone() else {
            return;
        };

        match joined {
            Ok(analysis) => {
                self.apply_analysis(&ticket, analysis);
            }
            Err(e) if e.is_cancelled() => {
                debug!("Analysis task {} was cancelled", ticket.id);
            }
            Err(e) => {
                error!("Analysis task {} failed: {}", ticket.id, e);
                self.apply_analysis(&ticket, Analysis::degraded());
            }
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            debug!("Aborted in-flight analysis");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
