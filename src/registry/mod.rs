//! Element registry.
//!
//! This module provides:
//! - [`Library`] - named element factories with optional categories
//! - [`Registry`] - the set of registered libraries and the current one
//! - [`LibraryPlugin`] - the registration boundary for library providers

pub mod library;
pub mod manager;
pub mod plugin;

pub use library::{Factory, Library, LibraryEntry};
pub use manager::Registry;
pub use plugin::{BuiltinLibrary, LibraryPlugin};

use thiserror::Error;

/// Errors from library registration and element creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("library '{0}' not found")]
    LibraryNotFound(String),

    #[error("element '{name}' not found in library '{library}'")]
    ElementNotFound { library: String, name: String },

    #[error("library '{0}' is already registered")]
    DuplicateRegistration(String),

    #[error("element '{name}' is already registered in library '{library}'")]
    DuplicateEntry { library: String, name: String },

    #[error("no current library")]
    NoCurrentLibrary,

    #[error("plugin '{plugin}' failed: {reason}")]
    PluginFailed { plugin: String, reason: String },
}
