//! Scheme files.
//!
//! This module provides:
//! - [`Document`] - the sectioned key-value text format
//! - [`encode`]/[`decode`] - circuit ↔ document, format version 2.0
//! - [`save_scheme`]/[`load_scheme`] - file I/O

pub mod codec;
pub mod doc;

pub use codec::{decode, encode, FORMAT_VERSION};
pub use doc::{Document, Section};

use std::fs;
use std::path::{Path, PathBuf};
use log::info;
use thiserror::Error;
use crate::circuit::Circuit;

/// Errors from reading or writing scheme files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("missing section [{0}]")]
    MissingSection(String),

    #[error("missing key '{key}' in [{section}]")]
    MissingKey { section: String, key: String },

    #[error("invalid value '{value}' for '{key}' in [{section}]")]
    InvalidValue { section: String, key: String, value: String },

    #[error("scheme version {0} is obsolete; re-save it with a current editor")]
    ObsoleteFormat(String),

    #[error("unsupported scheme version {0}")]
    UnsupportedVersion(String),

    #[error("unknown element type '{tag}' in [{section}]")]
    UnknownKind { section: String, tag: String },

    #[error("malformed scheme: {0}")]
    Malformed(String),
}

/// Render a circuit as scheme text.
pub fn to_string(circuit: &Circuit) -> String {
    encode(circuit).to_string()
}

/// Parse scheme text into a new circuit.
pub fn from_str(text: &str) -> Result<Circuit, SchemeError> {
    decode(&Document::parse(text)?)
}

/// Load a scheme file from disk.
pub fn load_scheme<P: AsRef<Path>>(path: P) -> Result<Circuit, SchemeError> {
    let text = fs::read_to_string(path.as_ref()).map_err(|e| SchemeError::Io(e.to_string()))?;
    from_str(&text)
}

/// Save a circuit to disk.
///
/// The text goes to a sibling temporary file that is then renamed over
/// `path`, so a failed save never leaves a half-written scheme behind.
pub fn save_scheme<P: AsRef<Path>>(path: P, circuit: &Circuit) -> Result<(), SchemeError> {
    let path = path.as_ref();
    let tmp = temp_path(path);
    let text = format!(
        "; Setun scheme\n; {} elements, {} connections\n\n{}",
        circuit.len(),
        circuit.connections().len(),
        to_string(circuit)
    );

    let written = fs::write(&tmp, text).and_then(|_| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(SchemeError::Io(e.to_string()));
    }
    info!("saved {} elements to {}", circuit.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
