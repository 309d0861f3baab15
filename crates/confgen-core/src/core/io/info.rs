use crate::core::io::traits::RecordFile;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Key/value summary written next to each generated structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoleculeInfo {
    pub smiles: String,
    pub atom_count: usize,
    pub charge: i32,
    pub spin_multiplicity: u32,
}

const KEY_SMILES: &str = "SMILES";
const KEY_ATOMS: &str = "Number of Atoms";
const KEY_CHARGE: &str = "Charge";
const KEY_SPIN: &str = "Spin Multiplicity";

#[derive(Debug, Error)]
pub enum InfoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Missing required key '{0}'")]
    MissingKey(&'static str),
    #[error("Invalid value for '{key}': '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

pub struct InfoFile;

impl RecordFile for InfoFile {
    type Record = MoleculeInfo;
    type Error = InfoError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Record, Self::Error> {
        let (mut smiles, mut atoms, mut charge, mut spin) = (None, None, None, None);
        for line in reader.lines() {
            let line = line?;
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim() {
                KEY_SMILES => smiles = Some(value),
                KEY_ATOMS => atoms = Some(value),
                KEY_CHARGE => charge = Some(value),
                KEY_SPIN => spin = Some(value),
                _ => {}
            }
        }

        Ok(MoleculeInfo {
            smiles: smiles.ok_or(InfoError::MissingKey(KEY_SMILES))?,
            atom_count: parse_value(KEY_ATOMS, atoms)?,
            charge: parse_value(KEY_CHARGE, charge)?,
            spin_multiplicity: parse_value(KEY_SPIN, spin)?,
        })
    }

    fn write_to(record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "{KEY_SMILES}: {}", record.smiles)?;
        writeln!(writer, "{KEY_ATOMS}: {}", record.atom_count)?;
        writeln!(writer, "{KEY_CHARGE}: {}", record.charge)?;
        writeln!(writer, "{KEY_SPIN}: {}", record.spin_multiplicity)?;
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
) -> Result<T, InfoError> {
    let value = value.ok_or(InfoError::MissingKey(key))?;
    value
        .parse()
        .map_err(|_| InfoError::InvalidValue { key, value })
}
