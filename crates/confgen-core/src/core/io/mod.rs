//! Provides input/output functionality for the pipeline's file formats.
//!
//! Line notation is parsed into molecular graphs; molecule lists, XYZ geometries and
//! the key/value info record share the [`traits::RecordFile`] interface.

pub mod info;
pub mod smi;
pub mod smiles;
pub mod traits;
pub mod xyz;
