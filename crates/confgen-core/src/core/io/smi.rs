use crate::core::io::traits::RecordFile;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// One molecule line of an input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmiEntry {
    /// Zero-based position among molecule lines; drives batch assignment.
    pub index: usize,
    /// One-based line number in the source file.
    pub line_number: usize,
    pub smiles: String,
    /// Everything after the first whitespace run, trimmed; `None` when absent.
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum SmiError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Plain-text molecule list: one line notation per line, optionally followed by a name.
/// Blank lines and lines starting with `#` are skipped.
pub struct SmiFile;

impl RecordFile for SmiFile {
    type Record = Vec<SmiEntry>;
    type Error = SmiError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Record, Self::Error> {
        let mut entries = Vec::new();
        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (smiles, name) = match line.split_once(char::is_whitespace) {
                Some((smiles, rest)) => {
                    let rest = rest.trim();
                    (smiles, (!rest.is_empty()).then(|| rest.to_string()))
                }
                None => (line, None),
            };
            entries.push(SmiEntry {
                index: entries.len(),
                line_number: line_index + 1,
                smiles: smiles.to_string(),
                name,
            });
        }
        Ok(entries)
    }

    fn write_to(record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error> {
        for entry in record {
            match &entry.name {
                Some(name) => writeln!(writer, "{} {}", entry.smiles, name)?,
                None => writeln!(writer, "{}", entry.smiles)?,
            }
        }
        Ok(())
    }
}
