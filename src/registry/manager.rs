//! The library manager.

use log::{error, info};
use crate::circuit::{Element, ElementId};
use crate::registry::library::Library;
use crate::registry::plugin::{BuiltinLibrary, LibraryPlugin};
use crate::registry::RegistryError;

/// Holds every registered library and the current one.
#[derive(Debug, Default)]
pub struct Registry {
    libraries: Vec<Library>,
    current: Option<String>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in libraries installed; "Setun" is current.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in BuiltinLibrary::ALL {
            if let Err(e) = registry.install(&plugin) {
                error!("built-in library {} failed to register: {}", plugin.name(), e);
            }
        }
        registry
    }

    /// Add a library. The first one registered becomes current.
    pub fn register(&mut self, library: Library) -> Result<(), RegistryError> {
        if self.library(library.name()).is_some() {
            return Err(RegistryError::DuplicateRegistration(library.name().to_string()));
        }
        info!("registered library {} ({} elements)", library.name(), library.len());
        if self.current.is_none() {
            self.current = Some(library.name().to_string());
        }
        self.libraries.push(library);
        Ok(())
    }

    /// Remove a library. If it was current, the first remaining one takes over.
    pub fn unregister(&mut self, name: &str) -> Result<Library, RegistryError> {
        let pos = self
            .libraries
            .iter()
            .position(|l| l.name() == name)
            .ok_or_else(|| RegistryError::LibraryNotFound(name.to_string()))?;
        let library = self.libraries.remove(pos);
        if self.current.as_deref() == Some(name) {
            self.current = self.libraries.first().map(|l| l.name().to_string());
        }
        info!("unregistered library {}", name);
        Ok(library)
    }

    /// Run a plugin's registration entry point.
    pub fn install(&mut self, plugin: &dyn LibraryPlugin) -> Result<(), RegistryError> {
        info!("installing {} {}: {}", plugin.name(), plugin.version(), plugin.description());
        plugin.register(self)
    }

    /// Run a plugin's unregistration entry point.
    pub fn uninstall(&mut self, plugin: &dyn LibraryPlugin) -> Result<(), RegistryError> {
        plugin.unregister(self)
    }

    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|l| l.name() == name)
    }

    /// Libraries in registration order.
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    pub fn current(&self) -> Option<&Library> {
        self.current.as_deref().and_then(|name| self.library(name))
    }

    pub fn set_current(&mut self, name: &str) -> Result<(), RegistryError> {
        if self.library(name).is_none() {
            return Err(RegistryError::LibraryNotFound(name.to_string()));
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Create from a named library.
    pub fn create(&self, library: &str, name: &str, id: ElementId, x: i32, y: i32) -> Result<Element, RegistryError> {
        self.library(library)
            .ok_or_else(|| RegistryError::LibraryNotFound(library.to_string()))?
            .create(name, id, x, y)
    }

    /// Create from the current library.
    pub fn create_from_current(&self, name: &str, id: ElementId, x: i32, y: i32) -> Result<Element, RegistryError> {
        self.current().ok_or(RegistryError::NoCurrentLibrary)?.create(name, id, x, y)
    }

    /// Name of the library that would serve `name` in [`Registry::create_any`].
    pub fn find(&self, name: &str) -> Option<&str> {
        self.current()
            .filter(|l| l.contains(name))
            .or_else(|| self.libraries.iter().find(|l| l.contains(name)))
            .map(|l| l.name())
    }

    /// Create from the current library, falling back to any other.
    pub fn create_any(&self, name: &str, id: ElementId, x: i32, y: i32) -> Result<Element, RegistryError> {
        let library = self.find(name).ok_or_else(|| RegistryError::ElementNotFound {
            library: "*".to_string(),
            name: name.to_string(),
        })?;
        self.create(library, name, id, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ElementKind;

    fn lib(name: &str, entry: &str) -> Library {
        let mut lib = Library::new(name);
        lib.add_kind(entry, "Test", || ElementKind::Generator).unwrap();
        lib
    }

    #[test]
    fn test_first_registered_is_current() {
        let mut reg = Registry::new();
        assert!(matches!(reg.create_from_current("G", 1, 0, 0), Err(RegistryError::NoCurrentLibrary)));

        reg.register(lib("A", "G")).unwrap();
        reg.register(lib("B", "H")).unwrap();
        assert_eq!(reg.current().unwrap().name(), "A");
        assert!(reg.create_from_current("G", 1, 0, 0).is_ok());
        assert!(reg.create_from_current("H", 1, 0, 0).is_err());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut reg = Registry::new();
        reg.register(lib("A", "G")).unwrap();
        let err = reg.register(lib("A", "H")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateRegistration("A".into()));
    }

    #[test]
    fn test_unregister_current_reassigns() {
        let mut reg = Registry::new();
        reg.register(lib("A", "G")).unwrap();
        reg.register(lib("B", "H")).unwrap();
        reg.unregister("A").unwrap();
        assert_eq!(reg.current().unwrap().name(), "B");
        reg.unregister("B").unwrap();
        assert!(reg.current().is_none());
        assert!(matches!(reg.unregister("B"), Err(RegistryError::LibraryNotFound(_))));
    }

    #[test]
    fn test_cross_library_lookup() {
        let mut reg = Registry::new();
        reg.register(lib("A", "G")).unwrap();
        reg.register(lib("B", "H")).unwrap();
        assert_eq!(reg.find("H"), Some("B"));
        assert_eq!(reg.create_any("H", 4, 0, 0).unwrap().name, "H");
        assert!(reg.create_any("Z", 4, 0, 0).is_err());
        assert!(matches!(reg.create("C", "G", 1, 0, 0), Err(RegistryError::LibraryNotFound(_))));
    }

    #[test]
    fn test_builtins() {
        let reg = Registry::with_builtins();
        assert_eq!(reg.libraries().len(), 3);
        assert_eq!(reg.current().unwrap().name(), "Setun");
        let adder = reg.create_any("Ternary Adder", 1, 0, 0).unwrap();
        assert_eq!(adder.kind().tag(), "TernaryAdder");
        let dec = reg.create("Arithmetic", "Decoder 2x9", 2, 0, 0).unwrap();
        assert_eq!(dec.outputs().len(), 9);
    }
}
