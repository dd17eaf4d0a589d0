//! Perspective aggregation and progress statistics.
//!
//! History entries are resolved against the catalog; entries whose
//! scenario or choice cannot be found are skipped without error.

use crate::catalog::Catalog;
use crate::models::{Choice, Perspective, PerspectiveStat, SimulationResult};
use std::collections::HashSet;

/// Resolve a history entry to the choice it refers to.
fn resolve<'a>(entry: &SimulationResult, catalog: &'a Catalog) -> Option<&'a Choice> {
    catalog
        .choice(&entry.scenario_id, &entry.choice_id)
        .map(|(_, choice)| choice)
}

/// Count how often each perspective was chosen.
///
/// Output follows [`Perspective::ALL`] order with zero counts removed.
pub fn compute_stats(history: &[SimulationResult], catalog: &Catalog) -> Vec<PerspectiveStat> {
    let mut counts = [0usize; Perspective::ALL.len()];

    for choice in history.iter().filter_map(|entry| resolve(entry, catalog)) {
        counts[choice.perspective.index()] += 1;
    }

    Perspective::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(perspective, count)| PerspectiveStat {
            perspective: *perspective,
            label: perspective.label(),
            count,
        })
        .collect()
}

/// Ids of scenarios that appear at least once in the history.
pub fn completed_scenarios(history: &[SimulationResult]) -> HashSet<&str> {
    history.iter().map(|h| h.scenario_id.as_str()).collect()
}

/// Share of the catalog completed so far, rounded to a whole percent.
pub fn progress_percent(history: &[SimulationResult], catalog: &Catalog) -> u8 {
    if catalog.is_empty() {
        return 0;
    }

    let completed = completed_scenarios(history)
        .into_iter()
        .filter(|id| catalog.get(id).is_some())
        .count();

    ((completed as f64 / catalog.len() as f64) * 100.0).round() as u8
}

/// The perspective chosen most often, ties broken by enumeration order.
pub fn dominant_perspective(stats: &[PerspectiveStat]) -> Option<Perspective> {
    stats
        .iter()
        .fold(None::<&PerspectiveStat>, |best, stat| match best {
            Some(b) if b.count >= stat.count => Some(b),
            _ => Some(stat),
        })
        .map(|s| s.perspective)
}
