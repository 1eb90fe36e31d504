use crate::diagnostics::Diagnostics;
use crate::types::Externals;

/// Bundles importable by name from other bundles (name -> name).
///
/// The first registration of a name wins; later ones are reported and
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalsRegistry {
    entries: Externals,
}

impl ExternalsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. Returns false if it was already registered.
    pub fn register(&mut self, name: &str, origin: &str, diagnostics: &dyn Diagnostics) -> bool {
        if self.entries.contains_key(name) {
            diagnostics.warn(&format!(
                "External module '{}' from {} is already registered, keeping the first registration",
                name, origin
            ));
            return false;
        }
        self.entries.insert(name.to_string(), name.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &Externals {
        &self.entries
    }
}
