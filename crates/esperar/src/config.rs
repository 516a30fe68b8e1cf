//! Suite catalog configuration.
//!
//! Maps test names to the suite metadata a runner needs: which suite file
//! drives the test, a short description, and whether the test is visible
//! to external tooling. Catalogs load and save as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::result::{EsperarError, EsperarResult};

/// Metadata for one registered test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteEntry {
    /// Suite definition file driving this test
    pub suite_file: String,
    /// Human-readable description
    pub description: String,
    /// Whether external tooling should surface this test
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl SuiteEntry {
    /// Create a visible entry
    #[must_use]
    pub fn new(suite_file: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            suite_file: suite_file.into(),
            description: description.into(),
            visible: true,
        }
    }

    /// Mark the entry as hidden from external tooling
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Registry of the suites a runner knows about.
///
/// Entries are keyed by test name. `BTreeMap` keeps serialized catalogs in
/// stable order so saved files diff cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteCatalog {
    entries: BTreeMap<String, SuiteEntry>,
}

impl SuiteCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test
    pub fn register(&mut self, test_name: impl Into<String>, entry: SuiteEntry) {
        self.entries.insert(test_name.into(), entry);
    }

    /// Look up a test by name
    #[must_use]
    pub fn get(&self, test_name: &str) -> Option<&SuiteEntry> {
        self.entries.get(test_name)
    }

    /// Remove a test, returning its entry if present
    pub fn remove(&mut self, test_name: &str) -> Option<SuiteEntry> {
        self.entries.remove(test_name)
    }

    /// All test names, in sorted order
    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Names of tests visible to external tooling
    pub fn visible_tests(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.visible)
            .map(|(name, _)| name.as_str())
    }

    /// Number of registered tests
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> EsperarResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|err| EsperarError::Config {
            message: format!("invalid suite catalog {}: {err}", path.display()),
        })
    }

    /// Save the catalog as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> EsperarResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
