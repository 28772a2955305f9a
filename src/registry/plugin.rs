//! Library registration boundary and the built-in libraries.
//!
//! A [`LibraryPlugin`] is anything that can add its libraries to a
//! [`Registry`] and take them out again. Statically linked libraries and
//! externally loaded ones go through the same two entry points.

use crate::circuit::ElementKind;
use crate::registry::library::Library;
use crate::registry::manager::Registry;
use crate::registry::RegistryError;
use crate::ternary::Trit;

/// Registration interface for a source of element libraries.
pub trait LibraryPlugin {
    /// Name of the library this plugin registers.
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "1.0"
    }

    fn description(&self) -> &str {
        ""
    }

    /// Add this plugin's libraries to `registry`.
    fn register(&self, registry: &mut Registry) -> Result<(), RegistryError>;

    /// Remove what [`LibraryPlugin::register`] added.
    fn unregister(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        registry.unregister(self.name()).map(|_| ())
    }
}

/// The libraries shipped with the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinLibrary {
    /// Amplifier, ternary cell, trigger, shift register, generator.
    Setun,
    /// Adders, decoders and counters.
    Arithmetic,
    /// Binary-style gates.
    Logic,
}

impl BuiltinLibrary {
    /// All built-ins in registration order.
    pub const ALL: [BuiltinLibrary; 3] = [BuiltinLibrary::Setun, BuiltinLibrary::Arithmetic, BuiltinLibrary::Logic];

    /// Build the library.
    pub fn library(self) -> Result<Library, RegistryError> {
        let mut lib = Library::new(self.name());
        match self {
            BuiltinLibrary::Setun => {
                lib.add_kind("Magnetic Amplifier", "Cells", || ElementKind::MagneticAmplifier)?;
                lib.add_kind("Ternary Element", "Cells", || ElementKind::TernaryElement)?;
                lib.add_kind("Ternary Trigger", "Memory", || ElementKind::Trigger { state: Trit::O })?;
                lib.add_kind("Shift Register", "Memory", || ElementKind::ShiftRegister)?;
                lib.add_kind("Generator", "Sources", || ElementKind::Generator)?;
            }
            BuiltinLibrary::Arithmetic => {
                lib.add_kind("Half Adder", "Adders", || ElementKind::HalfAdder)?;
                lib.add_kind("Ternary Adder", "Adders", || ElementKind::Adder)?;
                lib.add_kind("Decoder 1x3", "Decoders", || ElementKind::Decoder { select: 1 })?;
                lib.add_kind("Decoder 2x9", "Decoders", || ElementKind::Decoder { select: 2 })?;
                lib.add_kind("Counter 0..2", "Counters", || ElementKind::Counter { count: 0, max: 2 })?;
                lib.add_kind("Counter 0..8", "Counters", || ElementKind::Counter { count: 0, max: 8 })?;
            }
            BuiltinLibrary::Logic => {
                lib.add_kind("AND", "Gates", || ElementKind::And)?;
                lib.add_kind("OR", "Gates", || ElementKind::Or)?;
                lib.add_kind("Inhibit", "Gates", || ElementKind::Inhibit)?;
            }
        }
        Ok(lib)
    }
}

impl LibraryPlugin for BuiltinLibrary {
    fn name(&self) -> &str {
        match self {
            BuiltinLibrary::Setun => "Setun",
            BuiltinLibrary::Arithmetic => "Arithmetic",
            BuiltinLibrary::Logic => "Logic",
        }
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        match self {
            BuiltinLibrary::Setun => "Setun ferrite-diode cells and sources",
            BuiltinLibrary::Arithmetic => "Ternary adders, decoders and counters",
            BuiltinLibrary::Logic => "AND, OR and inhibit gates",
        }
    }

    fn register(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        registry.register(self.library()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl LibraryPlugin for Failing {
        fn name(&self) -> &str {
            "Broken"
        }

        fn register(&self, _registry: &mut Registry) -> Result<(), RegistryError> {
            Err(RegistryError::PluginFailed {
                plugin: self.name().to_string(),
                reason: "no factories".to_string(),
            })
        }
    }

    #[test]
    fn test_install_and_uninstall() {
        let mut reg = Registry::new();
        reg.install(&BuiltinLibrary::Logic).unwrap();
        assert!(reg.library("Logic").is_some());
        assert!(reg.install(&BuiltinLibrary::Logic).is_err());

        reg.uninstall(&BuiltinLibrary::Logic).unwrap();
        assert!(reg.library("Logic").is_none());
        assert!(reg.current().is_none());
    }

    #[test]
    fn test_failed_plugin_leaves_registry_alone() {
        let mut reg = Registry::with_builtins();
        assert!(matches!(reg.install(&Failing), Err(RegistryError::PluginFailed { .. })));
        assert_eq!(reg.libraries().len(), 3);
        assert_eq!(Failing.version(), "1.0");
    }

    #[test]
    fn test_every_builtin_entry_builds() {
        for builtin in BuiltinLibrary::ALL {
            let lib = builtin.library().unwrap();
            for (n, entry) in lib.entries().iter().enumerate() {
                let el = lib.create(entry.name(), n as u32 + 1, 0, 0).unwrap();
                assert_eq!(el.name, entry.name());
                assert!(entry.category().is_some());
            }
        }
    }
}
