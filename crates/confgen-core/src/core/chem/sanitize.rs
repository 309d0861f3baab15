use super::perception::assign_hybridization;
use super::rings::ring_bonds;
use super::valence::{
    ValenceError, bond_valence, check_atom_valence, implicit_hydrogen_count,
    radical_electron_count,
};
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("Aromatic atom {atom} ({element}) is not in a ring")]
    NonRingAromaticAtom { atom: usize, element: Element },
    #[error("Aromatic bond between atoms {0} and {1} is not in a ring")]
    NonRingAromaticBond(usize, usize),
    #[error(transparent)]
    Valence(#[from] ValenceError),
}

/// The normalization operations applied by one sanitization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOps {
    /// Rewrite hypervalent nitro and N-oxide groups into charge-separated form.
    pub cleanup: bool,
    /// Strict valence checking.
    pub properties: bool,
    /// Ring validation of aromatic atoms and bonds.
    pub aromaticity: bool,
}

impl SanitizeOps {
    pub const FULL: Self = Self {
        cleanup: true,
        properties: true,
        aromaticity: true,
    };
    pub const WITHOUT_PROPERTIES: Self = Self {
        properties: false,
        ..Self::FULL
    };
    pub const WITHOUT_PROPERTIES_AND_CLEANUP: Self = Self {
        cleanup: false,
        ..Self::WITHOUT_PROPERTIES
    };

    /// Attempt order, from strictest to most lenient.
    pub const FALLBACK_ORDER: [Self; 3] = [
        Self::FULL,
        Self::WITHOUT_PROPERTIES,
        Self::WITHOUT_PROPERTIES_AND_CLEANUP,
    ];
}

impl fmt::Display for SanitizeOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.cleanup {
            names.push("cleanup");
        }
        if self.properties {
            names.push("properties");
        }
        if self.aromaticity {
            names.push("aromaticity");
        }
        write!(f, "[{}]", names.join(", "))
    }
}

/// Result of sanitizing one molecular graph.
#[derive(Debug, Clone)]
pub struct SanitizeOutcome {
    pub molecule: Molecule,
    /// The operation set that succeeded, or the most lenient one if none did.
    pub applied: SanitizeOps,
    /// True when every operation set failed and `molecule` is a best-effort graph.
    pub degraded: bool,
    /// Failures of the attempts that preceded the returned graph, in attempt order.
    pub failures: Vec<SanitizeError>,
}

/// Normalizes a raw graph, relaxing the operation set until one attempt succeeds.
///
/// Never fails: when every level fails, the graph from the last attempt is returned
/// with `degraded` set.
pub fn sanitize(mol: &Molecule) -> SanitizeOutcome {
    let mut failures = Vec::new();
    let mut last = mol.clone();

    for ops in SanitizeOps::FALLBACK_ORDER {
        let (candidate, result) = sanitize_with(mol, ops);
        match result {
            Ok(()) => {
                if !failures.is_empty() {
                    debug!(ops = %ops, "Sanitization succeeded with reduced operation set.");
                }
                return SanitizeOutcome {
                    molecule: candidate,
                    applied: ops,
                    degraded: false,
                    failures,
                };
            }
            Err(err) => {
                debug!(ops = %ops, error = %err, "Sanitization attempt failed.");
                failures.push(err);
                last = candidate;
            }
        }
    }

    warn!(
        attempts = failures.len(),
        "All sanitization levels failed; continuing with best-effort graph."
    );
    SanitizeOutcome {
        molecule: last,
        applied: SanitizeOps::WITHOUT_PROPERTIES_AND_CLEANUP,
        degraded: true,
        failures,
    }
}

/// One sanitization attempt. Hydrogen, radical and hybridization bookkeeping always runs,
/// so the returned graph is usable even when the result is an error.
pub fn sanitize_with(mol: &Molecule, ops: SanitizeOps) -> (Molecule, Result<(), SanitizeError>) {
    let mut working = mol.clone();
    if ops.cleanup {
        cleanup_hypervalent_nitrogen(&mut working);
    }

    let aromatic_check = if ops.aromaticity {
        check_aromatic_rings(&working)
    } else {
        Ok(())
    };

    assign_hydrogens_and_radicals(&mut working);
    assign_hybridization(&mut working);

    let result = aromatic_check.and_then(|()| {
        if ops.properties {
            for index in 0..working.atom_count() {
                check_atom_valence(&working, index)?;
            }
        }
        Ok(())
    });
    (working, result)
}

/// `R-N(=O)=O` and `R3N=O` become `R-[N+](=O)[O-]` and `R3[N+][O-]`.
fn cleanup_hypervalent_nitrogen(mol: &mut Molecule) {
    for n in 0..mol.atom_count() {
        let is_neutral_nitrogen = mol
            .atom(n)
            .is_some_and(|a| a.element == Element::N && a.formal_charge == 0 && !a.is_aromatic);
        if !is_neutral_nitrogen {
            continue;
        }
        let (valence, _) = bond_valence(mol, n);
        let hydrogens = mol.atom(n).map_or(0, |a| a.explicit_hydrogens.unwrap_or(0));
        if valence + hydrogens <= 3 {
            continue;
        }
        let terminal_oxo = mol.neighbors(n).iter().copied().find(|&(o, b)| {
            mol.atom(o).is_some_and(|a| a.element == Element::O && a.formal_charge == 0)
                && mol.degree(o) == 1
                && mol.bond(b).is_some_and(|bond| bond.order == BondOrder::Double)
        });
        if let Some((oxygen, bond)) = terminal_oxo {
            mol.set_bond_order(bond, BondOrder::Single);
            if let Some(atom) = mol.atom_mut(n) {
                atom.formal_charge = 1;
            }
            if let Some(atom) = mol.atom_mut(oxygen) {
                atom.formal_charge = -1;
            }
        }
    }
}

fn check_aromatic_rings(mol: &Molecule) -> Result<(), SanitizeError> {
    let in_ring = ring_bonds(mol);
    for (index, bond) in mol.bonds().iter().enumerate() {
        if bond.order == BondOrder::Aromatic && !in_ring[index] {
            return Err(SanitizeError::NonRingAromaticBond(bond.atom1, bond.atom2));
        }
    }
    for (index, atom) in mol.atoms().iter().enumerate() {
        if atom.is_aromatic && !mol.neighbors(index).iter().any(|&(_, b)| in_ring[b]) {
            return Err(SanitizeError::NonRingAromaticAtom {
                atom: index,
                element: atom.element,
            });
        }
    }
    Ok(())
}

fn assign_hydrogens_and_radicals(mol: &mut Molecule) {
    let updates: Vec<(u8, u8)> = (0..mol.atom_count())
        .map(|i| {
            let atom = &mol.atoms()[i];
            let (valence, alternate) = bond_valence(mol, i);
            let implicit = if atom.explicit_hydrogens.is_none() {
                implicit_hydrogen_count(atom, valence, alternate).unwrap_or(0)
            } else {
                0
            };
            let total = valence + atom.explicit_hydrogens.unwrap_or(0) + implicit;
            let radicals = radical_electron_count(atom, total, mol.degree(i));
            (implicit, radicals)
        })
        .collect();

    for (atom, (implicit, radicals)) in mol.atoms_mut().iter_mut().zip(updates) {
        atom.implicit_hydrogens = implicit;
        atom.radical_electrons = radicals;
    }
}
