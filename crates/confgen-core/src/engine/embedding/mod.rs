//! Candidate pool generation: bounds-matrix distance geometry with a random-coordinate
//! fallback, each candidate drawn from its own seeded random stream. Written tetrahedral
//! and double-bond stereo is enforced by both methods.

pub mod bounds;
pub mod chirality;
pub mod distance_geometry;

use self::bounds::BoundsError;
use self::chirality::Restraints;
use self::distance_geometry::{candidate_rng, embed_distance_geometry, embed_random_coordinates};
use crate::core::models::conformer::CandidateGeometry;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::engine::config::{EmbeddingConfig, EmbeddingMethod};
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::Point3;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbeddingError {
    #[error("Molecule has no atoms to embed")]
    EmptyMolecule,
    #[error("Cannot derive distance bounds: {0}")]
    Bounds(#[from] BoundsError),
    #[error("No embedding method produced a structure ({methods} method(s), {attempts} attempt(s) per candidate)")]
    NoStructures { methods: usize, attempts: usize },
}

/// The embedded candidates together with the method that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePool {
    pub method: EmbeddingMethod,
    /// Successfully embedded candidates, in pool-index order.
    pub candidates: Vec<CandidateGeometry>,
    /// Pool slots the method could not fill.
    pub failed_slots: usize,
}

fn embed_slot(
    restraints: &Restraints,
    method: EmbeddingMethod,
    config: &EmbeddingConfig,
    slot: usize,
) -> Option<Vec<Point3<f64>>> {
    let mut rng = candidate_rng(config.random_seed, slot);
    (0..config.max_attempts).find_map(|_| match method {
        EmbeddingMethod::DistanceGeometry => {
            embed_distance_geometry(restraints, config.validation_tolerance, &mut rng)
        }
        EmbeddingMethod::RandomCoordinates => embed_random_coordinates(restraints, &mut rng),
    })
}

/// Embeds `pool_size` independent candidates of a hydrogen-complete molecule.
///
/// Methods are tried in the configured order; the first one that yields at least one
/// structure supplies the whole pool.
///
/// # Errors
///
/// Returns [`EmbeddingError`] when the graph admits no bounds or no method produced
/// any structure.
#[instrument(skip_all, name = "candidate_pool", fields(atoms = mol.atom_count(), pool_size = pool_size))]
pub fn generate_pool(
    mol: &Molecule,
    pool_size: usize,
    config: &EmbeddingConfig,
    reporter: &ProgressReporter,
) -> Result<CandidatePool, EmbeddingError> {
    if mol.atom_count() == 0 {
        return Err(EmbeddingError::EmptyMolecule);
    }
    let restraints = Restraints::build(mol)?;
    let elements: Vec<Element> = mol.atoms().iter().map(|a| a.element).collect();

    for &method in &config.methods {
        reporter.report(Progress::TaskStart {
            total_steps: pool_size as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let slots = 0..pool_size;

        #[cfg(feature = "parallel")]
        let slots = (0..pool_size).into_par_iter();

        let embedded: Vec<Option<Vec<Point3<f64>>>> = slots
            .map(|slot| {
                let positions = embed_slot(&restraints, method, config, slot);
                reporter.report(Progress::TaskIncrement);
                positions
            })
            .collect();
        reporter.report(Progress::TaskFinish);

        let candidates: Vec<CandidateGeometry> = embedded
            .into_iter()
            .enumerate()
            .filter_map(|(slot, positions)| {
                positions.map(|p| CandidateGeometry::embedded(slot, elements.clone(), p))
            })
            .collect();

        if candidates.is_empty() {
            warn!(%method, "Embedding method produced no structures.");
            continue;
        }
        let failed_slots = pool_size - candidates.len();
        if failed_slots > 0 {
            debug!(%method, failed_slots, "Some pool slots could not be embedded.");
        }
        info!(%method, embedded = candidates.len(), "Candidate pool generated.");
        return Ok(CandidatePool {
            method,
            candidates,
            failed_slots,
        });
    }

    Err(EmbeddingError::NoStructures {
        methods: config.methods.len(),
        attempts: config.max_attempts,
    })
}
