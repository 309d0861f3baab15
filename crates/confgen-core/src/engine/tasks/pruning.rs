use super::distance_matrix::DistanceMatrix;
use crate::core::models::conformer::CandidateGeometry;
use crate::core::models::extended::ExtendedReal;
use std::fmt;
use tracing::{info, instrument};

/// Which selection rule produced the kept set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneRule {
    /// Diversity filtering disabled or a pool of at most one: the pool is kept unchanged.
    Identity,
    /// No candidate has a finite energy: the pool is kept unchanged.
    TotalEnergyFailure,
    /// Energy-ordered greedy selection subject to the RMSD threshold.
    Greedy,
}

impl fmt::Display for PruneRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Identity => "identity",
            Self::TotalEnergyFailure => "total-energy-failure",
            Self::Greedy => "greedy",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PruneOutcome {
    pub rule: PruneRule,
    /// Retained candidates, in the order they were kept.
    pub kept: Vec<CandidateGeometry>,
    /// Rejected candidates, kept for diagnostics only.
    pub discarded: Vec<CandidateGeometry>,
}

/// Indices of `energies` in ascending order; infinite energies go last in their original
/// relative order.
fn energy_order(energies: &[ExtendedReal]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..energies.len()).collect();
    order.sort_by_key(|&i| energies[i]);
    order
}

/// Greedy selection over energy order. Returns pool indices in the order kept.
fn greedy_selection(
    energies: &[ExtendedReal],
    distances: Option<&DistanceMatrix>,
    max_conformers: usize,
    rmsd_threshold: f64,
) -> Vec<usize> {
    let distance = |i: usize, j: usize| distances.map_or(ExtendedReal::Infinite, |d| d.get(i, j));
    let order = energy_order(energies);
    let mut kept: Vec<usize> = Vec::with_capacity(max_conformers);
    for index in order {
        if kept.len() >= max_conformers {
            break;
        }
        let diverse = kept
            .iter()
            .map(|&k| distance(index, k))
            .min()
            .is_none_or(|nearest| nearest.at_least(rmsd_threshold));
        if diverse {
            kept.push(index);
        }
    }
    kept
}

/// Selects the retained conformers from a scored pool.
///
/// `distances` must index the pool in the same order as `candidates`; `None` treats every
/// pair as incomparable.
#[instrument(skip_all, name = "pruning_task", fields(pool = candidates.len()))]
pub fn run(
    candidates: Vec<CandidateGeometry>,
    distances: Option<&DistanceMatrix>,
    max_conformers: usize,
    rmsd_threshold: f64,
) -> PruneOutcome {
    if rmsd_threshold < 0.0 || candidates.len() <= 1 {
        info!(kept = candidates.len(), "Pool kept unchanged.");
        return PruneOutcome {
            rule: PruneRule::Identity,
            kept: candidates,
            discarded: Vec::new(),
        };
    }

    let energies: Vec<ExtendedReal> = candidates.iter().map(|c| c.energy).collect();
    if energies.iter().all(|e| !e.is_finite()) {
        info!(kept = candidates.len(), "No finite energies; pool kept unchanged.");
        return PruneOutcome {
            rule: PruneRule::TotalEnergyFailure,
            kept: candidates,
            discarded: Vec::new(),
        };
    }

    let selected = greedy_selection(&energies, distances, max_conformers, rmsd_threshold);
    let mut slots: Vec<Option<CandidateGeometry>> = candidates.into_iter().map(Some).collect();
    let kept: Vec<CandidateGeometry> = selected
        .iter()
        .filter_map(|&i| slots[i].take())
        .collect();
    let discarded: Vec<CandidateGeometry> = slots.into_iter().flatten().collect();

    info!(
        kept = kept.len(),
        discarded = discarded.len(),
        threshold = rmsd_threshold,
        "Diversity pruning complete."
    );
    PruneOutcome {
        rule: PruneRule::Greedy,
        kept,
        discarded,
    }
}
