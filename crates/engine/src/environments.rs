//! Environment slot binding and eligibility policy.
//!
//! A template declares ordered environment slots; the directory supplies the
//! environments that may fill them. This module decides, per
//! `(slot, environment)` pair, whether a fill is legal, and maintains the
//! binding map the assembled configuration snapshots.
//!
//! The legacy template shape carries at most two role-constrained slots:
//! position 0 is the read source and position 1 the write destination. The
//! role check is a per-slot policy rather than a literal index comparison,
//! so templates that declare a role on the slot itself take precedence over
//! the index rule.

use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use actrun_types::{ActionTemplate, Environment, EnvironmentSlot, SlotRole};
use actrun_util::database_url_to_project_name;

/// Why an environment cannot fill a particular slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    /// The environment is locked; no slot may bind it.
    Locked,
    /// The slot is read from, but the environment is write-only.
    NotReadable,
    /// The slot is written to, but the environment is read-only.
    NotWritable,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Locked => "environment is locked",
            Self::NotReadable => "environment cannot be read from",
            Self::NotWritable => "environment cannot be written to",
        };
        formatter.write_str(text)
    }
}

/// Role policy applied to one slot when checking a candidate environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Legacy rule: slot 0 reads, slot 1 writes, later slots are unconstrained.
    IndexBased,
    /// The slot declares its own role, overriding the index rule.
    Declared(SlotRole),
}

impl SlotPolicy {
    /// Chooses the policy for a slot, preferring a declared role.
    pub fn for_slot(slot: Option<&EnvironmentSlot>) -> Self {
        match slot.and_then(|slot| slot.role) {
            Some(role) => Self::Declared(role),
            None => Self::IndexBased,
        }
    }

    /// Checks a candidate environment against this policy.
    ///
    /// The lock check always runs first; a locked environment is ineligible
    /// for every slot regardless of role.
    pub fn check(&self, slot_index: usize, environment: &Environment) -> Result<(), IneligibleReason> {
        if environment.locked {
            return Err(IneligibleReason::Locked);
        }

        let role = match self {
            Self::Declared(role) => *role,
            Self::IndexBased => match slot_index {
                0 => SlotRole::ReadSource,
                1 => SlotRole::WriteDestination,
                _ => SlotRole::Unconstrained,
            },
        };

        match role {
            SlotRole::ReadSource if environment.write_only => Err(IneligibleReason::NotReadable),
            SlotRole::WriteDestination if environment.read_only => Err(IneligibleReason::NotWritable),
            _ => Ok(()),
        }
    }
}

/// Failure surfaced by a binding attempt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("environment '{environment_id}' is not eligible for slot {slot_index}: {reason}")]
    IneligibleEnvironment {
        slot_index: usize,
        environment_id: String,
        reason: IneligibleReason,
    },

    #[error("unknown environment: '{environment_id}'")]
    UnknownEnvironment { environment_id: String },

    #[error("slot {slot_index} is not declared by the selected template")]
    UnknownSlot { slot_index: usize },
}

/// One directory environment as a slot candidate, disabled-with-reason when ineligible.
///
/// Ineligible environments stay visible so a renderer can gray them out
/// rather than hide them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    /// Directory id the binding would record.
    pub environment_id: String,
    /// Combined display label (name, project, flag annotations).
    pub label: String,
    /// Whether this environment may fill the slot.
    pub enabled: bool,
    /// Populated when `enabled` is false.
    pub disabled_reason: Option<IneligibleReason>,
}

/// Builds the display label for a candidate environment.
///
/// The label combines the environment's name (or id when absent), the
/// project name resolved from its database locator, and `Locked` /
/// `Read Only` / `Write Only` annotations in that fixed order.
pub fn candidate_label(environment: &Environment) -> String {
    let mut detail = environment
        .database_url
        .as_deref()
        .map(database_url_to_project_name)
        .unwrap_or_default();

    for (flagged, annotation) in [
        (environment.locked, "Locked"),
        (environment.read_only, "Read Only"),
        (environment.write_only, "Write Only"),
    ] {
        if flagged {
            if !detail.is_empty() {
                detail.push_str(" - ");
            }
            detail.push_str(annotation);
        }
    }

    if detail.is_empty() {
        environment.display_name().to_string()
    } else {
        format!("{} ({})", environment.display_name(), detail)
    }
}

/// Maintains the slot binding map for the currently selected template.
///
/// Holds a copy of the template's slot declarations and the directory list;
/// both are replaced wholesale when the selection or directory changes.
#[derive(Debug, Default)]
pub struct EnvironmentSlotBinder {
    slots: Vec<EnvironmentSlot>,
    directory: Vec<Environment>,
    bindings: IndexMap<usize, String>,
}

impl EnvironmentSlotBinder {
    /// Creates a binder over the given environment directory with no slots.
    pub fn new(directory: Vec<Environment>) -> Self {
        Self {
            slots: Vec::new(),
            directory,
            bindings: IndexMap::new(),
        }
    }

    /// Replaces the environment directory, keeping existing bindings.
    ///
    /// Bindings are validated against the directory at bind and assembly
    /// time, so a refreshed directory never silently rewrites them.
    pub fn set_directory(&mut self, directory: Vec<Environment>) {
        self.directory = directory;
    }

    /// Adopts a newly selected template's slot shape, clearing all bindings.
    pub fn reset_for_template(&mut self, template: &ActionTemplate) {
        self.slots = template.environment_slots.clone();
        self.bindings.clear();
    }

    /// Clears both the slot shape and the bindings.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.bindings.clear();
    }

    /// Returns the declared slots the binder is currently shaped for.
    pub fn slots(&self) -> &[EnvironmentSlot] {
        &self.slots
    }

    /// Returns the environment directory the binder consults.
    pub fn directory(&self) -> &[Environment] {
        &self.directory
    }

    /// Looks up a directory environment by id.
    pub fn environment(&self, environment_id: &str) -> Option<&Environment> {
        self.directory.iter().find(|environment| environment.id == environment_id)
    }

    /// Checks whether an environment may fill a slot, without binding it.
    pub fn eligibility(&self, slot_index: usize, environment: &Environment) -> Result<(), IneligibleReason> {
        SlotPolicy::for_slot(self.slots.get(slot_index)).check(slot_index, environment)
    }

    /// Binds an environment to a slot after the eligibility check.
    pub fn bind(&mut self, slot_index: usize, environment_id: &str) -> Result<(), BindError> {
        if slot_index >= self.slots.len() {
            return Err(BindError::UnknownSlot { slot_index });
        }

        let environment = self
            .environment(environment_id)
            .ok_or_else(|| BindError::UnknownEnvironment {
                environment_id: environment_id.to_string(),
            })?;

        if let Err(reason) = self.eligibility(slot_index, environment) {
            debug!(slot = slot_index, environment = environment_id, %reason, "binding rejected");
            return Err(BindError::IneligibleEnvironment {
                slot_index,
                environment_id: environment_id.to_string(),
                reason,
            });
        }

        debug!(slot = slot_index, environment = environment_id, "environment bound");
        self.bindings.insert(slot_index, environment_id.to_string());
        Ok(())
    }

    /// Removes the binding for a slot, if any.
    pub fn unbind(&mut self, slot_index: usize) {
        self.bindings.shift_remove(&slot_index);
    }

    /// Returns the environment id bound to a slot.
    pub fn binding_for(&self, slot_index: usize) -> Option<&str> {
        self.bindings.get(&slot_index).map(String::as_str)
    }

    /// Returns the full binding map in bind order.
    pub fn current_bindings(&self) -> &IndexMap<usize, String> {
        &self.bindings
    }

    /// True when every declared slot has a bound environment.
    ///
    /// A template with no declared slots is trivially complete.
    pub fn is_complete(&self) -> bool {
        self.first_missing_slot().is_none()
    }

    /// Returns the first unbound slot in declaration order.
    pub fn first_missing_slot(&self) -> Option<usize> {
        (0..self.slots.len()).find(|slot_index| !self.bindings.contains_key(slot_index))
    }

    /// Surfaces every directory environment as a candidate for one slot.
    pub fn candidate_rows(&self, slot_index: usize) -> Vec<CandidateRow> {
        self.directory
            .iter()
            .map(|environment| {
                let verdict = self.eligibility(slot_index, environment);
                CandidateRow {
                    environment_id: environment.id.clone(),
                    label: candidate_label(environment),
                    enabled: verdict.is_ok(),
                    disabled_reason: verdict.err(),
                }
            })
            .collect()
    }
}
