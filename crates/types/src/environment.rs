//! Environment directory entries as supplied by the external directory service.

use serde::{Deserialize, Serialize};

/// A data environment available to the project.
///
/// `locked` and the two directional flags are mutually informative but not
/// mutually exclusive; an environment may be both `read_only` and `locked`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Environment {
    /// Stable identifier used in bindings.
    pub id: String,
    /// Optional display name; the id stands in when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Opaque locator mapped to a human project name for display.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Locked environments are ineligible for any binding.
    #[serde(default)]
    pub locked: bool,
    /// Read-only environments cannot fill a write-destination slot.
    #[serde(default)]
    pub read_only: bool,
    /// Write-only environments cannot fill a read-source slot.
    #[serde(default)]
    pub write_only: bool,
}

impl Environment {
    /// Returns the primary display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }
}
