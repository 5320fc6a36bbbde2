//! Input field value storage and validation.
//!
//! One value per declared input field, kept in template declaration order.
//! Validation runs at entry time and again during readiness checks, since an
//! environment-reference field can be invalidated later by unbinding the
//! slot it points at. The binder only ever reads slot state for that
//! cross-check; it never mutates it.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use actrun_types::{ActionTemplate, InputFieldSpec, InputKind, validate_candidate_value, validate_value_kind};

use crate::environments::EnvironmentSlotBinder;

/// Failure surfaced when an operator-supplied value is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid value for input {field_index}: {constraint}")]
    InvalidInput { field_index: usize, constraint: String },

    #[error("input {field_index} is not declared by the selected template")]
    UnknownField { field_index: usize },
}

/// Maintains one optional value per input field of the selected template.
#[derive(Debug, Default)]
pub struct InputFieldBinder {
    fields: Vec<InputFieldSpec>,
    values: Vec<Option<Value>>,
}

impl InputFieldBinder {
    /// Creates an empty binder with no declared fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts a newly selected template's field shape, clearing all values.
    pub fn reset_for_template(&mut self, template: &ActionTemplate) {
        self.fields = template.input_fields.clone();
        self.values = vec![None; self.fields.len()];
    }

    /// Clears both the field shape and the stored values.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.values.clear();
    }

    /// Returns the declared fields the binder is currently shaped for.
    pub fn fields(&self) -> &[InputFieldSpec] {
        &self.fields
    }

    /// Returns the stored value for a field, if one has been accepted.
    pub fn value(&self, field_index: usize) -> Option<&Value> {
        self.values.get(field_index).and_then(Option::as_ref)
    }

    /// Returns all stored values in declaration order.
    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Stores a value for a field after validating it against the spec.
    pub fn set_value(&mut self, field_index: usize, value: Value, slots: &EnvironmentSlotBinder) -> Result<(), InputError> {
        let Some(field) = self.fields.get(field_index) else {
            return Err(InputError::UnknownField { field_index });
        };

        if let Err(constraint) = validate_against_spec(field, &value, slots) {
            debug!(field = field_index, %constraint, "input value rejected");
            return Err(InputError::InvalidInput { field_index, constraint });
        }

        debug!(field = field_index, "input value stored");
        self.values[field_index] = Some(value);
        Ok(())
    }

    /// Drops the stored value for a field.
    pub fn clear_value(&mut self, field_index: usize) {
        if let Some(slot) = self.values.get_mut(field_index) {
            *slot = None;
        }
    }

    /// True when every field is optional or holds a currently valid value.
    pub fn all_valid(&self, slots: &EnvironmentSlotBinder) -> bool {
        self.first_invalid_field(slots).is_none()
    }

    /// Returns the first required-but-missing field in declaration order.
    pub fn first_missing_field(&self, slots: &EnvironmentSlotBinder) -> Option<usize> {
        self.first_invalid_field(slots)
    }

    fn first_invalid_field(&self, slots: &EnvironmentSlotBinder) -> Option<usize> {
        self.fields.iter().enumerate().find_map(|(field_index, field)| {
            match self.values.get(field_index).and_then(Option::as_ref) {
                // Stored values revalidate so a later unbind surfaces here.
                Some(value) => validate_against_spec(field, value, slots).is_err().then_some(field_index),
                None => field.required.then_some(field_index),
            }
        })
    }
}

fn validate_against_spec(field: &InputFieldSpec, value: &Value, slots: &EnvironmentSlotBinder) -> Result<(), String> {
    validate_value_kind(value, field.kind)?;

    if field.kind == InputKind::EnvironmentRef {
        validate_environment_reference(field, value, slots)?;
    }

    if let Some(validation) = &field.validate {
        validate_candidate_value(value, validation)?;
    }

    Ok(())
}

fn validate_environment_reference(field: &InputFieldSpec, value: &Value, slots: &EnvironmentSlotBinder) -> Result<(), String> {
    let environment_id = value.as_str().unwrap_or_default();
    if slots.environment(environment_id).is_none() {
        return Err(format!("'{}' is not an environment in the directory", environment_id));
    }

    if let Some(slot_index) = field.environment_slot {
        let Some(bound_id) = slots.binding_for(slot_index) else {
            return Err(format!("environment slot {} is not bound yet", slot_index));
        };
        let bound = slots
            .environment(bound_id)
            .ok_or_else(|| format!("bound environment '{}' is missing from the directory", bound_id))?;
        slots
            .eligibility(slot_index, bound)
            .map_err(|reason| format!("binding for slot {} is no longer valid: {}", slot_index, reason))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actrun_types::{Environment, EnvironmentSlot, InputValidation};

    fn directory() -> Vec<Environment> {
        vec![
            Environment {
                id: "env-a".into(),
                ..Environment::default()
            },
            Environment {
                id: "env-b".into(),
                ..Environment::default()
            },
        ]
    }

    fn template_with_fields(fields: Vec<InputFieldSpec>) -> ActionTemplate {
        ActionTemplate {
            id: "t".into(),
            name: "T".into(),
            description: None,
            public: true,
            environment_slots: vec![EnvironmentSlot::default()],
            input_fields: fields,
            steps: Vec::new(),
        }
    }

    fn binders(fields: Vec<InputFieldSpec>) -> (InputFieldBinder, EnvironmentSlotBinder) {
        let template = template_with_fields(fields);
        let mut slots = EnvironmentSlotBinder::new(directory());
        slots.reset_for_template(&template);
        let mut inputs = InputFieldBinder::new();
        inputs.reset_for_template(&template);
        (inputs, slots)
    }

    #[test]
    fn accepts_matching_value_and_reports_readiness() {
        let (mut inputs, slots) = binders(vec![InputFieldSpec {
            name: Some("Collection".into()),
            required: true,
            ..InputFieldSpec::default()
        }]);

        assert!(!inputs.all_valid(&slots));
        assert_eq!(inputs.first_missing_field(&slots), Some(0));

        inputs
            .set_value(0, Value::String("users".into()), &slots)
            .expect("store text value");
        assert!(inputs.all_valid(&slots));
        assert_eq!(inputs.value(0), Some(&Value::String("users".into())));
    }

    #[test]
    fn rejects_kind_mismatch_with_constraint() {
        let (mut inputs, slots) = binders(vec![InputFieldSpec {
            kind: InputKind::Number,
            required: true,
            ..InputFieldSpec::default()
        }]);

        let error = inputs
            .set_value(0, Value::String("three".into()), &slots)
            .expect_err("text is not a number");
        assert!(matches!(
            error,
            InputError::InvalidInput { field_index: 0, ref constraint } if constraint.contains("number")
        ));
        assert_eq!(inputs.value(0), None);
    }

    #[test]
    fn declarative_constraints_apply() {
        let (mut inputs, slots) = binders(vec![InputFieldSpec {
            required: true,
            validate: Some(InputValidation {
                pattern: Some("^[a-z_]+$".into()),
                ..InputValidation::default()
            }),
            ..InputFieldSpec::default()
        }]);

        assert!(inputs.set_value(0, Value::String("Bad Name".into()), &slots).is_err());
        assert!(inputs.set_value(0, Value::String("good_name".into()), &slots).is_ok());
    }

    #[test]
    fn optional_fields_never_block_readiness() {
        let (inputs, slots) = binders(vec![InputFieldSpec {
            required: false,
            ..InputFieldSpec::default()
        }]);

        assert!(inputs.all_valid(&slots));
        assert_eq!(inputs.first_missing_field(&slots), None);
    }

    #[test]
    fn environment_reference_requires_a_known_environment() {
        let (mut inputs, slots) = binders(vec![InputFieldSpec {
            kind: InputKind::EnvironmentRef,
            required: true,
            ..InputFieldSpec::default()
        }]);

        let error = inputs
            .set_value(0, Value::String("nope".into()), &slots)
            .expect_err("unknown environment id");
        assert!(matches!(error, InputError::InvalidInput { .. }));

        inputs
            .set_value(0, Value::String("env-a".into()), &slots)
            .expect("known environment id");
    }

    #[test]
    fn environment_reference_requires_its_slot_bound() {
        let (mut inputs, mut slots) = binders(vec![InputFieldSpec {
            kind: InputKind::EnvironmentRef,
            environment_slot: Some(0),
            required: true,
            ..InputFieldSpec::default()
        }]);

        let error = inputs
            .set_value(0, Value::String("env-a".into()), &slots)
            .expect_err("slot 0 is not bound yet");
        assert!(matches!(
            error,
            InputError::InvalidInput { ref constraint, .. } if constraint.contains("not bound")
        ));

        slots.bind(0, "env-a").expect("bind slot 0");
        inputs
            .set_value(0, Value::String("env-a".into()), &slots)
            .expect("reference validates once the slot is bound");

        // Unbinding afterwards invalidates the stored reference.
        slots.unbind(0);
        assert!(!inputs.all_valid(&slots));
        assert_eq!(inputs.first_missing_field(&slots), Some(0));
    }

    #[test]
    fn unknown_field_index_is_rejected() {
        let (mut inputs, slots) = binders(Vec::new());

        assert_eq!(
            inputs.set_value(3, Value::Bool(true), &slots),
            Err(InputError::UnknownField { field_index: 3 })
        );
    }

    #[test]
    fn reset_clears_previous_values() {
        let (mut inputs, slots) = binders(vec![InputFieldSpec {
            required: true,
            ..InputFieldSpec::default()
        }]);
        inputs.set_value(0, Value::String("kept?".into()), &slots).expect("store value");

        let next = template_with_fields(vec![InputFieldSpec::default(), InputFieldSpec::default()]);
        inputs.reset_for_template(&next);

        assert_eq!(inputs.values(), &[None, None]);
    }
}
