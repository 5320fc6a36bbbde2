//! Strongly typed action template schema shared between the catalog adapter and the engine.
//!
//! The models intentionally preserve authoring order (slots, input fields,
//! and steps are plain vectors) so the guided configuration experience can
//! render them in a predictable sequence. Every collection field defaults so
//! sparse catalog documents still parse.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Reusable, named specification of environment slots, input fields, and execution steps.
///
/// Templates are created by the catalog service and never mutated by the
/// engine; deselecting replaces the value rather than editing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionTemplate {
    /// Canonical identifier used for lookups and the assembled snapshot.
    pub id: String,
    /// Human-readable template name shown in the picker.
    #[serde(default)]
    pub name: String,
    /// Optional descriptive copy surfaced in detail panes.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the template lives in the public catalog.
    #[serde(default)]
    pub public: bool,
    /// Ordered environment slots the operator must fill before running.
    #[serde(default)]
    pub environment_slots: Vec<EnvironmentSlot>,
    /// Ordered input field declarations.
    #[serde(default)]
    pub input_fields: Vec<InputFieldSpec>,
    /// Ordered, display-only execution steps.
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// A position in a template requiring one bound environment.
///
/// The slot's index is significant: when no role is declared, the first two
/// positions carry the implicit read-source/write-destination constraints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EnvironmentSlot {
    /// Optional display name for the slot.
    #[serde(default)]
    pub label: Option<String>,
    /// Optional declared role, taking precedence over the index rule.
    #[serde(default)]
    pub role: Option<SlotRole>,
}

impl EnvironmentSlot {
    /// Returns the label surfaced for this slot, falling back to its position.
    pub fn display_label(&self, index: usize) -> String {
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => format!("Environment {}", index + 1),
        }
    }
}

/// Role a slot declares for its bound environment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    /// The bound environment is read from; write-only environments are ineligible.
    ReadSource,
    /// The bound environment is written to; read-only environments are ineligible.
    WriteDestination,
    /// Only the lock check applies.
    Unconstrained,
}

/// Declares one operator-supplied input, in template authoring order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InputFieldSpec {
    /// Display name for the field.
    #[serde(default)]
    pub name: Option<String>,
    /// Descriptive text explaining the purpose of the input.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared value kind the supplied value must match.
    #[serde(default)]
    pub kind: InputKind,
    /// Whether a value must be supplied before the configuration assembles.
    #[serde(default)]
    pub required: bool,
    /// For environment-reference fields, the slot index the value points at.
    #[serde(default)]
    pub environment_slot: Option<usize>,
    /// Declarative validation metadata (enumerations, patterns, lengths).
    #[serde(default)]
    pub validate: Option<InputValidation>,
}

impl InputFieldSpec {
    /// Returns the label surfaced for this field, falling back to its position.
    pub fn display_label(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Input {}", index + 1),
        }
    }
}

/// Lists the value kinds an input field may declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Free-form text.
    #[default]
    Text,
    /// Numeric value.
    Number,
    /// True/false toggle.
    Boolean,
    /// References one of the template's environment slots by index.
    EnvironmentRef,
}

/// Declarative validation settings attached to an input field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InputValidation {
    /// Enumerated set of allowed values, if constrained.
    #[serde(rename = "enum")]
    #[serde(default)]
    pub allowed_values: Vec<JsonValue>,
    /// Regular expression pattern the value must match, when provided.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Minimum length for text inputs, when specified.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum length for text inputs, when specified.
    #[serde(default)]
    pub max_length: Option<usize>,
}

/// Describes a single execution step; purely displayed, never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StepSpec {
    /// Step name surfaced in the preview timeline.
    #[serde(default)]
    pub name: Option<String>,
    /// Step kind (for example, `copy`), opaque to this engine.
    #[serde(default)]
    pub kind: Option<String>,
    /// Optional descriptive copy.
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_basic_template() {
        let yaml_text = r#"
id: migrate-users
name: Migrate Users
environment_slots:
  - label: Source
  - label: Destination
    role: write_destination
input_fields:
  - name: Collection
    required: true
steps:
  - name: Copy collection
    kind: copy
"#;

        let template: ActionTemplate = serde_yaml::from_str(yaml_text).expect("deserialize template");

        assert_eq!(template.id, "migrate-users");
        assert_eq!(template.environment_slots.len(), 2);
        assert_eq!(template.environment_slots[1].role, Some(SlotRole::WriteDestination));
        assert_eq!(template.input_fields.len(), 1);
        assert!(template.input_fields[0].required);
        assert_eq!(template.steps[0].kind.as_deref(), Some("copy"));
    }

    #[test]
    fn sparse_template_defaults_collections() {
        let template: ActionTemplate = serde_json::from_str(r#"{"id": "noop"}"#).expect("parse sparse template");

        assert!(template.environment_slots.is_empty());
        assert!(template.input_fields.is_empty());
        assert!(template.steps.is_empty());
        assert!(!template.public);
    }

    #[test]
    fn slot_label_falls_back_to_position() {
        let slot = EnvironmentSlot::default();
        assert_eq!(slot.display_label(0), "Environment 1");

        let named = EnvironmentSlot {
            label: Some("Staging".into()),
            role: None,
        };
        assert_eq!(named.display_label(3), "Staging");
    }
}
