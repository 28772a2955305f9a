//! Named collections of element factories.

use std::fmt;
use crate::circuit::{Element, ElementId, ElementKind};
use crate::registry::RegistryError;

/// Builds an element with the given id at (x, y).
pub type Factory = Box<dyn Fn(ElementId, i32, i32) -> Element + Send + Sync>;

/// One named factory.
pub struct LibraryEntry {
    name: String,
    category: Option<String>,
    factory: Factory,
}

impl LibraryEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl fmt::Debug for LibraryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

/// A named set of element factories.
#[derive(Debug)]
pub struct Library {
    name: String,
    entries: Vec<LibraryEntry>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a factory under `name`.
    pub fn add(&mut self, name: impl Into<String>, category: Option<&str>, factory: Factory) -> Result<(), RegistryError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(RegistryError::DuplicateEntry {
                library: self.name.clone(),
                name,
            });
        }
        self.entries.push(LibraryEntry {
            name,
            category: category.map(str::to_string),
            factory,
        });
        Ok(())
    }

    /// Register a factory for a fixed element kind.
    ///
    /// Created elements are named after the entry.
    pub fn add_kind(&mut self, name: &str, category: &str, make: fn() -> ElementKind) -> Result<(), RegistryError> {
        let label = name.to_string();
        self.add(
            name,
            Some(category),
            Box::new(move |id, x, y| {
                let mut element = Element::new(id, make(), x, y);
                element.name = label.clone();
                element
            }),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build an element from the factory registered under `name`.
    pub fn create(&self, name: &str, id: ElementId, x: i32, y: i32) -> Result<Element, RegistryError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| (e.factory)(id, x, y))
            .ok_or_else(|| RegistryError::ElementNotFound {
                library: self.name.clone(),
                name: name.to_string(),
            })
    }
}
