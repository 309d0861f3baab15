use super::generate::GenerationResult;
use crate::core::io::info::{InfoError, InfoFile, MoleculeInfo};
use crate::core::io::traits::RecordFile;
use crate::core::io::xyz::{XyzError, XyzFile, XyzFrame};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Subdirectory of a molecule directory that holds its generated files.
pub const CONFORMER_DIR: &str = "conformer";
/// Lowest-energy kept conformer.
pub const CONFORMER_FILE: &str = "conformer.xyz";
/// All kept conformers as frames, written only when more than one was kept.
pub const ALL_CONFORMERS_FILE: &str = "conformers.xyz";
pub const INFO_FILE: &str = "info.txt";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to write XYZ output: {0}")]
    Xyz(#[from] XyzError),
    #[error("Failed to write info record: {0}")]
    Info(#[from] InfoError),
    #[error("Nothing to write: no conformers were kept")]
    NoConformers,
}

/// Reduces a molecule name to `[A-Za-z0-9_-]`, turning spaces into underscores and
/// dropping everything else.
pub fn safe_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => Some(c),
            _ => None,
        })
        .collect()
}

/// `batch_0000`, `batch_0001`, ... for consecutive groups of `batch_size` molecules.
pub fn batch_dir_name(index: usize, batch_size: usize) -> String {
    format!("batch_{:04}", index / batch_size.max(1))
}

/// Where one molecule's output lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoleculeLayout {
    pub batch_dir: PathBuf,
    /// `<output>/<batch>/<name>`: created or removed as a unit.
    pub molecule_dir: PathBuf,
}

impl MoleculeLayout {
    pub fn new(output_root: &Path, index: usize, batch_size: usize, name: &str) -> Self {
        let batch_dir = output_root.join(batch_dir_name(index, batch_size));
        let molecule_dir = batch_dir.join(name);
        Self {
            batch_dir,
            molecule_dir,
        }
    }

    pub fn conformer_dir(&self) -> PathBuf {
        self.molecule_dir.join(CONFORMER_DIR)
    }

    /// Completed means both expected files are present.
    pub fn is_complete(&self) -> bool {
        is_complete(&self.conformer_dir())
    }
}

pub fn is_complete(conformer_dir: &Path) -> bool {
    conformer_dir.join(CONFORMER_FILE).is_file() && conformer_dir.join(INFO_FILE).is_file()
}

pub fn xyz_comment(smiles: &str, result: &GenerationResult) -> String {
    format!(
        "smiles={} charge={} spin={}",
        smiles, result.charge_spin.charge, result.charge_spin.spin_multiplicity
    )
}

/// Writes the conformer and info files straight into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns an [`OutputError`] if the result has no conformers or a write fails.
pub fn write_files(dir: &Path, smiles: &str, result: &GenerationResult) -> Result<(), OutputError> {
    let best = result
        .conformers
        .lowest_energy()
        .ok_or(OutputError::NoConformers)?;
    fs::create_dir_all(dir)?;

    let comment = xyz_comment(smiles, result);
    XyzFile::write_to_path(
        &vec![XyzFrame::from_geometry(best, comment.as_str())],
        dir.join(CONFORMER_FILE),
    )?;
    if result.conformers.len() > 1 {
        let frames: Vec<XyzFrame> = result
            .conformers
            .iter()
            .enumerate()
            .map(|(rank, c)| {
                XyzFrame::from_geometry(c, format!("{comment} conformer={rank} energy={:.6}", c.energy))
            })
            .collect();
        XyzFile::write_to_path(&frames, dir.join(ALL_CONFORMERS_FILE))?;
    }

    let info = MoleculeInfo {
        smiles: smiles.to_string(),
        atom_count: best.atom_count(),
        charge: result.charge_spin.charge,
        spin_multiplicity: result.charge_spin.spin_multiplicity,
    };
    InfoFile::write_to_path(&info, dir.join(INFO_FILE))?;
    Ok(())
}

fn staging_path(molecule_dir: &Path) -> PathBuf {
    let name = molecule_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    molecule_dir.with_file_name(format!(".{name}.staging-{}", std::process::id()))
}

/// Writes a molecule directory so that it either appears complete or not at all.
///
/// Files are written into a hidden sibling directory which is then renamed into place,
/// replacing any previous (stale or forced) directory of the same name.
///
/// # Errors
///
/// Returns an [`OutputError`] if any step fails; the staging directory is removed first.
pub fn write_molecule(
    layout: &MoleculeLayout,
    smiles: &str,
    result: &GenerationResult,
) -> Result<(), OutputError> {
    fs::create_dir_all(&layout.batch_dir)?;
    let staging = staging_path(&layout.molecule_dir);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }

    let written = write_files(&staging.join(CONFORMER_DIR), smiles, result).and_then(|()| {
        if layout.molecule_dir.exists() {
            fs::remove_dir_all(&layout.molecule_dir)?;
        }
        fs::rename(&staging, &layout.molecule_dir)?;
        Ok(())
    });
    if written.is_err() && staging.exists() {
        if let Err(e) = fs::remove_dir_all(&staging) {
            warn!(path = %staging.display(), error = %e, "Could not remove staging directory.");
        }
    }
    written
}

/// Deletes whatever exists of a molecule's output so it cannot pass a completion check.
pub fn remove_partial(layout: &MoleculeLayout) -> io::Result<()> {
    for path in [staging_path(&layout.molecule_dir), layout.molecule_dir.clone()] {
        if path.exists() {
            debug!(path = %path.display(), "Removing partial output.");
            fs::remove_dir_all(&path)?;
        }
    }
    Ok(())
}

fn collect_empty(dir: &Path, found: &mut Vec<PathBuf>) -> io::Result<bool> {
    let mut empty = true;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() && collect_empty(&path, found)? {
            found.push(path);
        } else {
            empty = false;
        }
    }
    Ok(empty)
}

/// Removes every directory under `root` that is empty or contains only empty
/// directories. `root` itself is kept. Returns the removed paths, deepest first.
///
/// With `dry_run` nothing is deleted; the paths that would be removed are returned.
pub fn remove_empty_dirs(root: &Path, dry_run: bool) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect_empty(root, &mut found)?;
    if !dry_run {
        for path in &found {
            fs::remove_dir(path)?;
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GeneratorConfigBuilder;
    use crate::engine::progress::ProgressReporter;
    use crate::workflows::generate::run_smiles;
    use tempfile::tempdir;

    fn generated(smiles: &str, max_conformers: usize) -> GenerationResult {
        let config = GeneratorConfigBuilder::new()
            .max_conformers(max_conformers)
            .rmsd_threshold(-1.0)
            .pool_multiplier(1)
            .build()
            .unwrap();
        run_smiles(smiles, &config, &ProgressReporter::new()).unwrap()
    }

    #[test]
    fn safe_name_keeps_portable_characters_only() {
        assert_eq!(safe_name("ethyl alcohol"), "ethyl_alcohol");
        assert_eq!(safe_name("  (R)-lim/onene* "), "R-limonene");
        assert_eq!(safe_name("mol_01"), "mol_01");
    }

    #[test]
    fn batch_names_group_consecutive_indices() {
        assert_eq!(batch_dir_name(0, 1000), "batch_0000");
        assert_eq!(batch_dir_name(999, 1000), "batch_0000");
        assert_eq!(batch_dir_name(1000, 1000), "batch_0001");
        assert_eq!(batch_dir_name(7, 3), "batch_0002");
    }

    #[test]
    fn atomic_write_produces_a_complete_directory() {
        let root = tempdir().unwrap();
        let layout = MoleculeLayout::new(root.path(), 0, 10, "water");
        let result = generated("O", 1);
        write_molecule(&layout, "O", &result).unwrap();

        assert!(layout.is_complete());
        let info = InfoFile::read_from_path(layout.conformer_dir().join(INFO_FILE)).unwrap();
        assert_eq!(info.smiles, "O");
        assert_eq!(info.atom_count, 3);
        assert_eq!(info.charge, 0);
        assert_eq!(info.spin_multiplicity, 1);

        let frames = XyzFile::read_from_path(layout.conformer_dir().join(CONFORMER_FILE)).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].comment, "smiles=O charge=0 spin=1");
        assert!(!layout.conformer_dir().join(ALL_CONFORMERS_FILE).exists());

        let leftovers: Vec<_> = fs::read_dir(&layout.batch_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("water")]);
    }

    #[test]
    fn several_kept_conformers_also_get_a_multi_frame_file() {
        let dir = tempdir().unwrap();
        let result = generated("CCCO", 3);
        assert!(result.conformers.len() > 1);
        write_files(dir.path(), "CCCO", &result).unwrap();
        let frames = XyzFile::read_from_path(dir.path().join(ALL_CONFORMERS_FILE)).unwrap();
        assert_eq!(frames.len(), result.conformers.len());
        assert!(is_complete(dir.path()));
    }

    #[test]
    fn rewriting_replaces_the_previous_directory() {
        let root = tempdir().unwrap();
        let layout = MoleculeLayout::new(root.path(), 0, 10, "mol");
        fs::create_dir_all(layout.conformer_dir()).unwrap();
        fs::write(layout.conformer_dir().join("stale.txt"), "old").unwrap();

        write_molecule(&layout, "C", &generated("C", 1)).unwrap();
        assert!(layout.is_complete());
        assert!(!layout.conformer_dir().join("stale.txt").exists());
    }

    #[test]
    fn partial_output_is_removed() {
        let root = tempdir().unwrap();
        let layout = MoleculeLayout::new(root.path(), 0, 10, "broken");
        fs::create_dir_all(layout.conformer_dir()).unwrap();
        fs::write(layout.conformer_dir().join(CONFORMER_FILE), "3\n").unwrap();
        assert!(!layout.is_complete());

        remove_partial(&layout).unwrap();
        assert!(!layout.molecule_dir.exists());
        assert!(layout.batch_dir.exists());
    }

    #[test]
    fn empty_directory_cleanup_is_recursive_and_spares_root() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("batch_0000/a/b")).unwrap();
        fs::create_dir_all(root.path().join("batch_0001/kept")).unwrap();
        fs::write(root.path().join("batch_0001/kept/file.txt"), "x").unwrap();

        let planned = remove_empty_dirs(root.path(), true).unwrap();
        assert_eq!(planned.len(), 3);
        assert!(root.path().join("batch_0000/a/b").exists());

        let removed = remove_empty_dirs(root.path(), false).unwrap();
        assert_eq!(removed, planned);
        assert!(!root.path().join("batch_0000").exists());
        assert!(root.path().join("batch_0001/kept/file.txt").exists());
        assert!(root.path().exists());
    }
}
