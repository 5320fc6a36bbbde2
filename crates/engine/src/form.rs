//! The composing configuration form.
//!
//! Owns everything a configuration session accumulates: the selected
//! template, the source tab, the slot and input binders, section expansion
//! state, and the catalog session. Every operation here is a synchronous
//! reaction to one operator action; catalog responses re-enter through
//! [`CatalogSession`](crate::catalog::CatalogSession) so only the latest
//! query can update the candidate list.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::info;

use actrun_types::{ActionTemplate, Environment};

use crate::{
    catalog::{CatalogSession, QueryId},
    environments::{BindError, EnvironmentSlotBinder},
    inputs::{InputError, InputFieldBinder},
    sections::{Section, SectionExpansionController},
    steps::StepsPreviewer,
};

/// Which catalog the next template lookup goes against.
///
/// The tab only controls where the next query is sent; switching it never
/// clears the current template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceTab {
    /// Server-driven search over the shared catalog.
    #[default]
    Public,
    /// Eager listing of the project's own templates.
    Private,
}

/// The first unmet requirement, in declaration order (slots before fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingItem {
    /// A declared slot without a bound environment.
    EnvironmentSlot { slot_index: usize, label: String },
    /// A required field without a valid value.
    InputField { field_index: usize, label: String },
}

impl fmt::Display for MissingItem {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvironmentSlot { slot_index, label } => {
                write!(formatter, "environment slot {} ({})", slot_index, label)
            }
            Self::InputField { field_index, label } => {
                write!(formatter, "input field {} ({})", field_index, label)
            }
        }
    }
}

/// Failure surfaced by an assembly attempt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    #[error("no template selected")]
    NoTemplateSelected,

    #[error("configuration incomplete: {missing}")]
    Incomplete { missing: MissingItem },
}

/// Snapshot handed to the run-submission collaborator.
///
/// Both lists are indexed by declaration position; optional input fields the
/// operator left blank stay `null`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssembledConfiguration {
    pub template_id: String,
    pub environment_bindings: Vec<Option<String>>,
    pub input_values: Vec<Option<Value>>,
}

/// Aggregate state for one action configuration session.
#[derive(Debug, Default)]
pub struct ActionConfigurationForm {
    selected_template: Option<ActionTemplate>,
    source_tab: SourceTab,
    slots: EnvironmentSlotBinder,
    inputs: InputFieldBinder,
    sections: SectionExpansionController,
    catalog: CatalogSession,
    steps: StepsPreviewer,
}

impl ActionConfigurationForm {
    /// Creates an empty session over the given environment directory.
    pub fn new(directory: Vec<Environment>) -> Self {
        Self {
            slots: EnvironmentSlotBinder::new(directory),
            ..Self::default()
        }
    }

    /// Returns the currently selected template, if any.
    pub fn selected_template(&self) -> Option<&ActionTemplate> {
        self.selected_template.as_ref()
    }

    /// Returns the active catalog tab.
    pub fn source_tab(&self) -> SourceTab {
        self.source_tab
    }

    /// Switches the catalog tab, superseding in-flight queries.
    ///
    /// The current template selection is untouched; the tab only decides
    /// which catalog the next lookup targets.
    pub fn switch_source_tab(&mut self, tab: SourceTab) {
        if tab == self.source_tab {
            return;
        }
        self.source_tab = tab;
        self.catalog.invalidate();
    }

    /// Registers a new catalog query for the active tab.
    pub fn begin_catalog_query(&mut self) -> QueryId {
        self.catalog.begin_query()
    }

    /// Applies a catalog response unless a newer query superseded it.
    pub fn accept_catalog_response(&mut self, query_id: QueryId, templates: Vec<ActionTemplate>) -> bool {
        self.catalog.accept(query_id, templates)
    }

    /// Returns the current candidate templates.
    pub fn catalog_candidates(&self) -> &[ActionTemplate] {
        self.catalog.candidates()
    }

    /// Selects a template, resetting binder state to its slot/field shape.
    ///
    /// Bindings and values from a previous template never carry over, since
    /// the shapes differ per template. Section expansion is left untouched.
    pub fn select_template(&mut self, template: ActionTemplate) {
        info!(template = %template.id, "template selected");
        self.slots.reset_for_template(&template);
        self.inputs.reset_for_template(&template);
        self.steps = StepsPreviewer::new(template.steps.clone());
        self.selected_template = Some(template);
    }

    /// Deselects the template and clears all dependent state.
    pub fn clear_template(&mut self) {
        info!("template deselected");
        self.selected_template = None;
        self.slots.clear();
        self.inputs.clear();
        self.steps = StepsPreviewer::default();
    }

    /// Replaces the environment directory consulted for bindings.
    pub fn set_directory(&mut self, directory: Vec<Environment>) {
        self.slots.set_directory(directory);
    }

    /// Binds an environment to a slot of the selected template.
    pub fn bind_environment(&mut self, slot_index: usize, environment_id: &str) -> Result<(), BindError> {
        self.slots.bind(slot_index, environment_id)
    }

    /// Removes a slot binding.
    pub fn unbind_environment(&mut self, slot_index: usize) {
        self.slots.unbind(slot_index);
    }

    /// Stores an input value after validation.
    pub fn set_input_value(&mut self, field_index: usize, value: Value) -> Result<(), InputError> {
        self.inputs.set_value(field_index, value, &self.slots)
    }

    /// Drops a stored input value.
    pub fn clear_input_value(&mut self, field_index: usize) {
        self.inputs.clear_value(field_index);
    }

    /// Flips one section's expansion state.
    pub fn toggle_section(&mut self, section: Section) {
        self.sections.toggle(section);
    }

    /// Returns whether a section is expanded.
    pub fn is_section_expanded(&self, section: Section) -> bool {
        self.sections.is_expanded(section)
    }

    /// Read access to the slot binder (candidate rows, bindings).
    pub fn slots(&self) -> &EnvironmentSlotBinder {
        &self.slots
    }

    /// Read access to the input binder (fields, stored values).
    pub fn inputs(&self) -> &InputFieldBinder {
        &self.inputs
    }

    /// Read access to the steps preview for the selected template.
    pub fn steps(&self) -> &StepsPreviewer {
        &self.steps
    }

    /// Snapshots the bound configuration for submission.
    ///
    /// Succeeds only when every declared slot is bound and every required
    /// field holds a valid value; otherwise reports the first unmet slot or
    /// field in declaration order, slots before fields.
    pub fn assemble(&self) -> Result<AssembledConfiguration, AssembleError> {
        let template = self.selected_template.as_ref().ok_or(AssembleError::NoTemplateSelected)?;

        if let Some(slot_index) = self.slots.first_missing_slot() {
            let label = template
                .environment_slots
                .get(slot_index)
                .map(|slot| slot.display_label(slot_index))
                .unwrap_or_else(|| format!("Environment {}", slot_index + 1));
            return Err(AssembleError::Incomplete {
                missing: MissingItem::EnvironmentSlot { slot_index, label },
            });
        }

        if let Some(field_index) = self.inputs.first_missing_field(&self.slots) {
            let label = template
                .input_fields
                .get(field_index)
                .map(|field| field.display_label(field_index))
                .unwrap_or_else(|| format!("Input {}", field_index + 1));
            return Err(AssembleError::Incomplete {
                missing: MissingItem::InputField { field_index, label },
            });
        }

        let environment_bindings = (0..template.environment_slots.len())
            .map(|slot_index| self.slots.binding_for(slot_index).map(str::to_string))
            .collect();

        Ok(AssembledConfiguration {
            template_id: template.id.clone(),
            environment_bindings,
            input_values: self.inputs.values().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StaticCatalog, TemplateCatalog};
    use actrun_types::{EnvironmentSlot, InputFieldSpec};
    use serde_json::json;

    fn directory() -> Vec<Environment> {
        vec![
            Environment {
                id: "env-a".into(),
                read_only: true,
                ..Environment::default()
            },
            Environment {
                id: "env-b".into(),
                write_only: true,
                ..Environment::default()
            },
            Environment {
                id: "env-c".into(),
                ..Environment::default()
            },
        ]
    }

    fn migration_template() -> ActionTemplate {
        serde_yaml::from_str(
            r#"
id: migrate-users
name: Migrate Users
public: true
environment_slots:
  - label: Source
  - label: Destination
input_fields:
  - name: Collection
    required: true
steps:
  - name: Copy collection
    kind: copy
"#,
        )
        .expect("parse fixture template")
    }

    #[test]
    fn role_scenario_matches_the_eligibility_rule() {
        let mut form = ActionConfigurationForm::new(directory());
        form.select_template(migration_template());

        form.bind_environment(0, "env-a").expect("read-only reads");
        assert!(matches!(
            form.bind_environment(0, "env-b"),
            Err(BindError::IneligibleEnvironment { .. })
        ));
        form.bind_environment(1, "env-b").expect("write-only writes");
        assert!(matches!(
            form.bind_environment(1, "env-a"),
            Err(BindError::IneligibleEnvironment { .. })
        ));
        form.bind_environment(0, "env-c").expect("unflagged reads");
        form.bind_environment(1, "env-c").expect("unflagged writes");
    }

    #[test]
    fn reselecting_a_template_drops_previous_bindings_and_values() {
        let mut form = ActionConfigurationForm::new(directory());
        form.select_template(migration_template());
        form.bind_environment(0, "env-c").expect("bind source");
        form.set_input_value(0, json!("users")).expect("store input");

        let mut second = migration_template();
        second.id = "migrate-orders".into();
        form.select_template(second);

        assert!(form.slots().current_bindings().is_empty());
        assert_eq!(form.inputs().values(), &[None]);
    }

    #[test]
    fn assemble_reports_the_first_unmet_item_in_declaration_order() {
        let mut form = ActionConfigurationForm::new(directory());
        assert_eq!(form.assemble(), Err(AssembleError::NoTemplateSelected));

        form.select_template(migration_template());
        assert_eq!(
            form.assemble(),
            Err(AssembleError::Incomplete {
                missing: MissingItem::EnvironmentSlot {
                    slot_index: 0,
                    label: "Source".into()
                }
            })
        );

        form.bind_environment(0, "env-c").expect("bind source");
        assert_eq!(
            form.assemble(),
            Err(AssembleError::Incomplete {
                missing: MissingItem::EnvironmentSlot {
                    slot_index: 1,
                    label: "Destination".into()
                }
            })
        );

        form.bind_environment(1, "env-c").expect("bind destination");
        assert_eq!(
            form.assemble(),
            Err(AssembleError::Incomplete {
                missing: MissingItem::InputField {
                    field_index: 0,
                    label: "Collection".into()
                }
            })
        );

        form.set_input_value(0, json!("users")).expect("store input");
        let assembled = form.assemble().expect("assemble configuration");
        assert_eq!(assembled.template_id, "migrate-users");
        assert_eq!(assembled.environment_bindings, vec![Some("env-c".into()), Some("env-c".into())]);
        assert_eq!(assembled.input_values, vec![Some(json!("users"))]);
    }

    #[test]
    fn optional_fields_stay_null_in_the_snapshot() {
        let mut template = migration_template();
        template.environment_slots = vec![EnvironmentSlot::default()];
        template.input_fields = vec![InputFieldSpec::default()];

        let mut form = ActionConfigurationForm::new(directory());
        form.select_template(template);
        form.bind_environment(0, "env-c").expect("bind only slot");

        let assembled = form.assemble().expect("assemble with optional field blank");
        assert_eq!(assembled.input_values, vec![None]);
    }

    #[test]
    fn switching_tabs_keeps_the_selection_and_supersedes_queries() {
        let mut form = ActionConfigurationForm::new(directory());
        form.select_template(migration_template());

        let in_flight = form.begin_catalog_query();
        form.switch_source_tab(SourceTab::Private);

        assert!(form.selected_template().is_some());
        assert_eq!(form.source_tab(), SourceTab::Private);
        assert!(!form.accept_catalog_response(in_flight, vec![migration_template()]));
        assert!(form.catalog_candidates().is_empty());
    }

    #[test]
    fn section_toggles_never_touch_bound_data() {
        let mut form = ActionConfigurationForm::new(directory());
        form.select_template(migration_template());
        form.bind_environment(0, "env-c").expect("bind source");

        form.toggle_section(Section::Environments);
        form.toggle_section(Section::TemplatePicker);

        assert!(form.is_section_expanded(Section::Environments));
        assert!(!form.is_section_expanded(Section::TemplatePicker));
        assert_eq!(form.slots().binding_for(0), Some("env-c"));
    }

    #[test]
    fn selection_leaves_expansion_state_untouched() {
        let mut form = ActionConfigurationForm::new(directory());
        form.toggle_section(Section::Inputs);

        form.select_template(migration_template());

        assert!(form.is_section_expanded(Section::TemplatePicker));
        assert!(form.is_section_expanded(Section::Inputs));
    }

    #[tokio::test]
    async fn catalog_round_trip_applies_only_the_latest_response() {
        let catalog = StaticCatalog::new(vec![migration_template()]);
        let mut form = ActionConfigurationForm::new(directory());

        let stale = form.begin_catalog_query();
        let stale_results = catalog.search("nothing-matches", "proj").await.expect("first search");

        let latest = form.begin_catalog_query();
        let latest_results = catalog.search("migrate", "proj").await.expect("second search");

        assert!(form.accept_catalog_response(latest, latest_results));
        assert!(!form.accept_catalog_response(stale, stale_results));

        assert_eq!(form.catalog_candidates().len(), 1);
        assert_eq!(form.catalog_candidates()[0].id, "migrate-users");
    }

    #[test]
    fn steps_preview_follows_the_selected_template() {
        let mut form = ActionConfigurationForm::new(directory());
        assert!(form.steps().is_empty());

        form.select_template(migration_template());
        let rows = form.steps().rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].active);
        assert_eq!(rows[0].kind.as_deref(), Some("copy"));

        form.clear_template();
        assert!(form.steps().is_empty());
    }
}
