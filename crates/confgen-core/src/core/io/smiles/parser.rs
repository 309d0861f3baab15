use super::error::SmilesError;
use super::tokenizer::{AtomToken, BondDirection, Token};
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use crate::core::models::stereo::{
    DoubleBondConfig, DoubleBondStereo, Handedness, StereoNeighbor, TetrahedralCenter,
};
use crate::core::models::topology::BondOrder;
use std::collections::HashMap;

struct OpenRing {
    atom: usize,
    order: Option<BondOrder>,
    direction: Option<BondDirection>,
    /// Position of the ring bond in the opening atom's neighbour order.
    slot: usize,
}

/// Neighbour order and bond directions as written, for stereo perception.
#[derive(Default)]
struct WrittenOrder {
    neighbors: Vec<Vec<Option<usize>>>,
    preceded: Vec<bool>,
    chirality: Vec<Option<(Handedness, u8)>>,
    /// `(first, second, direction)` in text order.
    directed: Vec<(usize, usize, BondDirection)>,
}

impl WrittenOrder {
    fn add_atom(&mut self, token: &AtomToken, previous: Option<usize>) {
        self.neighbors.push(Vec::new());
        self.preceded.push(previous.is_some());
        self.chirality
            .push(token.chirality.map(|h| (h, token.hydrogens.unwrap_or(0))));
    }

    fn link(&mut self, a: usize, b: usize, direction: Option<BondDirection>) {
        self.neighbors[a].push(Some(b));
        self.neighbors[b].push(Some(a));
        if let Some(direction) = direction {
            self.directed.push((a, b, direction));
        }
    }
}

/// Assembles a molecular graph from a token stream.
pub fn build(tokens: &[Token]) -> Result<Molecule, SmilesError> {
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }

    let mut mol = Molecule::new();
    let mut written = WrittenOrder::default();
    let mut previous: Option<usize> = None;
    let mut pending_bond: Option<(BondOrder, Option<BondDirection>, usize)> = None;
    let mut branches: Vec<(Option<usize>, usize)> = Vec::new();
    let mut rings: HashMap<u16, OpenRing> = HashMap::new();

    for token in tokens {
        match token {
            Token::Atom(atom_token) => {
                let index = mol.add_atom(atom_from_token(atom_token));
                written.add_atom(atom_token, previous);
                if let Some(prev) = previous {
                    let (order, direction) = match pending_bond.take() {
                        Some((order, direction, _)) => (order, direction),
                        None => (default_order(&mol, prev, index), None),
                    };
                    mol.add_bond(prev, index, order)
                        .map_err(|_| SmilesError::DanglingBond { pos: atom_token.pos })?;
                    written.link(prev, index, direction);
                } else if let Some((_, _, pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos });
                }
                previous = Some(index);
            }
            Token::Bond {
                order,
                direction,
                pos,
            } => {
                if previous.is_none() || pending_bond.is_some() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                pending_bond = Some((*order, *direction, *pos));
            }
            Token::RingClosure { digit, pos } => {
                let current = previous.ok_or(SmilesError::DanglingBond { pos: *pos })?;
                let (order_here, direction_here) = match pending_bond.take() {
                    Some((order, direction, _)) => (Some(order), direction),
                    None => (None, None),
                };
                match rings.remove(digit) {
                    Some(open) => {
                        let order = match (open.order, order_here) {
                            (Some(a), Some(b)) if a != b => {
                                return Err(SmilesError::RingBondConflict { digit: *digit });
                            }
                            (Some(a), _) | (None, Some(a)) => a,
                            (None, None) => default_order(&mol, open.atom, current),
                        };
                        mol.add_bond(open.atom, current, order).map_err(|_| {
                            SmilesError::InvalidRingBond {
                                digit: *digit,
                                pos: *pos,
                            }
                        })?;
                        written.neighbors[open.atom][open.slot] = Some(current);
                        written.neighbors[current].push(Some(open.atom));
                        if let Some(direction) = open.direction {
                            written.directed.push((open.atom, current, direction));
                        }
                        if let Some(direction) = direction_here {
                            written.directed.push((current, open.atom, direction));
                        }
                    }
                    None => {
                        written.neighbors[current].push(None);
                        rings.insert(
                            *digit,
                            OpenRing {
                                atom: current,
                                order: order_here,
                                direction: direction_here,
                                slot: written.neighbors[current].len() - 1,
                            },
                        );
                    }
                }
            }
            Token::OpenParen(pos) => {
                if previous.is_none() || pending_bond.is_some() {
                    return Err(SmilesError::UnmatchedParen { pos: *pos });
                }
                branches.push((previous, *pos));
            }
            Token::CloseParen(pos) => {
                if let Some((_, _, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let (anchor, _) = branches
                    .pop()
                    .ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                previous = anchor;
            }
            Token::Dot(pos) => {
                if pending_bond.is_some() || !branches.is_empty() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                previous = None;
            }
        }
    }

    if pending_bond.is_some() {
        return Err(SmilesError::UnexpectedEnd);
    }
    if let Some(&(_, pos)) = branches.last() {
        return Err(SmilesError::UnmatchedParen { pos });
    }
    if let Some(digit) = rings.keys().min() {
        return Err(SmilesError::UnclosedRing { digit: *digit });
    }
    if mol.atom_count() == 0 {
        return Err(SmilesError::EmptyInput);
    }

    assign_tetrahedral_centers(&mut mol, &written);
    assign_double_bond_stereo(&mut mol, &written);
    Ok(mol)
}

/// A bracket hydrogen, or the lone pair of a three-connected centre, takes the slot right
/// after the preceding atom.
fn assign_tetrahedral_centers(mol: &mut Molecule, written: &WrittenOrder) {
    for (center, chirality) in written.chirality.iter().enumerate() {
        let Some((handedness, hydrogens)) = *chirality else {
            continue;
        };
        let mut neighbors: Vec<StereoNeighbor> = written.neighbors[center]
            .iter()
            .flatten()
            .map(|&n| StereoNeighbor::Atom(n))
            .collect();
        let implicit = match (hydrogens, neighbors.len()) {
            (1, 3) | (0, 3) => true,
            (0, 4) => false,
            _ => continue,
        };
        if implicit {
            let slot = usize::from(written.preceded[center]);
            neighbors.insert(slot, StereoNeighbor::Implicit);
        }
        mol.add_tetrahedral_center(TetrahedralCenter {
            center,
            neighbors,
            handedness,
        });
    }
}

/// Side of substituent `s` of double-bond atom `d`, read from the first directional bond
/// joining them: `Up` if `s` is drawn above `d`.
fn substituent_side(written: &WrittenOrder, d: usize, s: usize) -> Option<BondDirection> {
    written.directed.iter().find_map(|&(a, b, direction)| {
        if (a, b) == (d, s) {
            Some(direction)
        } else if (a, b) == (s, d) {
            Some(match direction {
                BondDirection::Up => BondDirection::Down,
                BondDirection::Down => BondDirection::Up,
            })
        } else {
            None
        }
    })
}

fn directed_substituent(
    mol: &Molecule,
    written: &WrittenOrder,
    d: usize,
    other: usize,
) -> Option<(usize, BondDirection)> {
    mol.neighbor_indices(d)
        .filter(|&s| s != other)
        .find_map(|s| substituent_side(written, d, s).map(|side| (s, side)))
}

fn assign_double_bond_stereo(mol: &mut Molecule, written: &WrittenOrder) {
    let double_bonds: Vec<(usize, usize)> = mol
        .bonds()
        .iter()
        .filter(|b| b.order == BondOrder::Double)
        .map(|b| (b.atom1, b.atom2))
        .collect();
    for (begin, end) in double_bonds {
        let (Some((begin_substituent, begin_side)), Some((end_substituent, end_side))) = (
            directed_substituent(mol, written, begin, end),
            directed_substituent(mol, written, end, begin),
        ) else {
            continue;
        };
        let config = if begin_side == end_side {
            DoubleBondConfig::Cis
        } else {
            DoubleBondConfig::Trans
        };
        mol.add_double_bond_stereo(DoubleBondStereo {
            begin,
            end,
            begin_substituent,
            end_substituent,
            config,
        });
    }
}

fn atom_from_token(token: &AtomToken) -> Atom {
    let mut atom = Atom::new(token.element)
        .with_charge(token.charge)
        .aromatic(token.is_aromatic);
    atom.isotope = token.isotope;
    atom.explicit_hydrogens = if token.is_bracket {
        Some(token.hydrogens.unwrap_or(0))
    } else {
        None
    };
    atom
}

fn default_order(mol: &Molecule, a: usize, b: usize) -> BondOrder {
    let aromatic = |i: usize| mol.atom(i).is_some_and(|atom| atom.is_aromatic);
    if aromatic(a) && aromatic(b) {
        BondOrder::Aromatic
    } else {
        BondOrder::Single
    }
}
