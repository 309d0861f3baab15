use crate::core::models::molecule::Molecule;
use std::collections::VecDeque;

/// Length in bonds of the shortest path from `from` to `to`, optionally skipping one atom
/// and one bond. Returns `None` if `to` is unreachable.
pub fn shortest_path_avoiding(
    mol: &Molecule,
    from: usize,
    to: usize,
    avoid_atom: Option<usize>,
    avoid_bond: Option<usize>,
) -> Option<usize> {
    if from == to {
        return Some(0);
    }
    let mut distance = vec![usize::MAX; mol.atom_count()];
    let mut queue = VecDeque::new();
    distance[from] = 0;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for &(next, bond) in mol.neighbors(current) {
            if Some(next) == avoid_atom || Some(bond) == avoid_bond || distance[next] != usize::MAX {
                continue;
            }
            distance[next] = distance[current] + 1;
            if next == to {
                return Some(distance[next]);
            }
            queue.push_back(next);
        }
    }
    None
}

/// All-pairs topological distances (bond counts). Unreachable pairs are `None`.
pub fn topological_distances(mol: &Molecule) -> Vec<Vec<Option<usize>>> {
    let n = mol.atom_count();
    let mut table = vec![vec![None; n]; n];
    for (start, row) in table.iter_mut().enumerate() {
        let mut queue = VecDeque::from([start]);
        row[start] = Some(0);
        while let Some(current) = queue.pop_front() {
            let d = row[current].unwrap_or(0);
            for next in mol.neighbor_indices(current) {
                if row[next].is_none() {
                    row[next] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
    }
    table
}

/// Whether the bond at `bond_index` lies on any cycle.
pub fn is_ring_bond(mol: &Molecule, bond_index: usize) -> bool {
    mol.bond(bond_index).is_some_and(|bond| {
        shortest_path_avoiding(mol, bond.atom1, bond.atom2, None, Some(bond_index)).is_some()
    })
}

/// Ring membership flag for every bond.
pub fn ring_bonds(mol: &Molecule) -> Vec<bool> {
    (0..mol.bond_count()).map(|b| is_ring_bond(mol, b)).collect()
}

/// Ring membership flag for every atom, derived from its bonds.
pub fn ring_atoms(mol: &Molecule) -> Vec<bool> {
    let bonds = ring_bonds(mol);
    let mut atoms = vec![false; mol.atom_count()];
    for (index, bond) in mol.bonds().iter().enumerate() {
        if bonds[index] {
            atoms[bond.atom1] = true;
            atoms[bond.atom2] = true;
        }
    }
    atoms
}

/// Size of the smallest ring containing both bonds `i-j` and `j-k`, if any.
pub fn smallest_ring_through_angle(mol: &Molecule, i: usize, j: usize, k: usize) -> Option<usize> {
    shortest_path_avoiding(mol, i, k, Some(j), None).map(|path| path + 2)
}
