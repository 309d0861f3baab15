use crate::core::io::traits::RecordFile;
use crate::core::models::conformer::CandidateGeometry;
use crate::core::models::element::Element;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// One structure of an XYZ file: a comment line and element-labelled Cartesian coordinates in Å.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzFrame {
    pub comment: String,
    pub elements: Vec<Element>,
    pub positions: Vec<Point3<f64>>,
}

impl XyzFrame {
    pub fn from_geometry(geometry: &CandidateGeometry, comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            elements: geometry.elements.clone(),
            positions: geometry.positions.clone(),
        }
    }

    pub fn atom_count(&self) -> usize {
        self.elements.len()
    }
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Frame has {elements} elements but {positions} positions")]
    Inconsistency { elements: usize, positions: usize },
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),
    #[error("Atom line needs a symbol and three coordinates")]
    MissingField,
    #[error("Frame ends after {found} of {expected} atom lines")]
    TruncatedFrame { expected: usize, found: usize },
}

/// Multi-frame XYZ reader and writer. A single-structure file is a one-frame record.
pub struct XyzFile;

impl RecordFile for XyzFile {
    type Record = Vec<XyzFrame>;
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Record, Self::Error> {
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        let mut frames = Vec::new();
        let mut cursor = 0;

        while cursor < lines.len() {
            let header = lines[cursor].trim();
            if header.is_empty() {
                cursor += 1;
                continue;
            }
            let count: usize = header.parse().map_err(|_| XyzError::Parse {
                line: cursor + 1,
                kind: XyzParseErrorKind::InvalidAtomCount(header.to_string()),
            })?;
            let comment = lines.get(cursor + 1).cloned().unwrap_or_default();
            let first_atom = cursor + 2;

            let mut elements = Vec::with_capacity(count);
            let mut positions = Vec::with_capacity(count);
            for offset in 0..count {
                let line_index = first_atom + offset;
                let Some(line) = lines.get(line_index) else {
                    return Err(XyzError::Parse {
                        line: line_index,
                        kind: XyzParseErrorKind::TruncatedFrame {
                            expected: count,
                            found: offset,
                        },
                    });
                };
                let (element, position) =
                    parse_atom_line(line).map_err(|kind| XyzError::Parse {
                        line: line_index + 1,
                        kind,
                    })?;
                elements.push(element);
                positions.push(position);
            }

            frames.push(XyzFrame {
                comment,
                elements,
                positions,
            });
            cursor = first_atom + count;
        }
        Ok(frames)
    }

    fn write_to(record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error> {
        for frame in record {
            if frame.elements.len() != frame.positions.len() {
                return Err(XyzError::Inconsistency {
                    elements: frame.elements.len(),
                    positions: frame.positions.len(),
                });
            }
            writeln!(writer, "{}", frame.atom_count())?;
            writeln!(writer, "{}", frame.comment.replace('\n', " "))?;
            for (element, p) in frame.elements.iter().zip(&frame.positions) {
                writeln!(
                    writer,
                    "{:<2} {:>15.8} {:>15.8} {:>15.8}",
                    element.symbol(),
                    p.x,
                    p.y,
                    p.z
                )?;
            }
        }
        Ok(())
    }
}

fn parse_atom_line(line: &str) -> Result<(Element, Point3<f64>), XyzParseErrorKind> {
    let mut fields = line.split_whitespace();
    let symbol = fields.next().ok_or(XyzParseErrorKind::MissingField)?;
    let element = Element::from_symbol(symbol)
        .ok_or_else(|| XyzParseErrorKind::UnknownElement(symbol.to_string()))?;
    let mut coords = [0.0; 3];
    for c in &mut coords {
        let text = fields.next().ok_or(XyzParseErrorKind::MissingField)?;
        *c = text
            .parse()
            .map_err(|_| XyzParseErrorKind::InvalidCoordinate(text.to_string()))?;
    }
    Ok((element, Point3::new(coords[0], coords[1], coords[2])))
}
