//! Owned form state passed through one challenge round trip.
//!
//! The form is always passed by exclusive reference for the duration of a
//! single engine call and never aliased across round trips; the host
//! serializes round trips per attempt.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The submitted action that requests a switch to the next fallback method.
pub const FALLBACK_ACTION: &str = "fallback";

/// Kind of a rendered form field.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Password,
    Checkbox,
    Hidden,
}

/// One field a plugin asks the host to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    /// Field name, also the key submitted values are looked up under.
    pub name: String,
    /// User-facing label. The host owns translation.
    pub label: String,
    /// Rendering kind.
    pub kind: FieldKind,
}

/// Per-round-trip form state: fields requested by plugins on the way out,
/// submitted values and the chosen action on the way back in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormState {
    fields: Vec<FormField>,
    values: HashMap<String, String>,
    action: Option<String>,
}

impl FormState {
    /// An empty form, ready for `present_form`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the host to render a field.
    pub fn push_field(&mut self, name: impl Into<String>, label: impl Into<String>, kind: FieldKind) {
        self.fields.push(FormField {
            name: name.into(),
            label: label.into(),
            kind,
        });
    }

    /// Fields requested so far, in insertion order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Record a submitted value.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// A submitted value by field name.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Record the action the user chose on submission.
    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = Some(action.into());
    }

    /// The action the user chose, if any.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

/// What the active validator requested when building its challenge.
#[derive(Debug, Clone, Copy)]
pub struct ChallengeOptions {
    /// When false, login plugins are not given the chance to append their
    /// affordances (trusted device, remember me) to this form.
    pub extend_with_login_plugins: bool,
}

impl Default for ChallengeOptions {
    fn default() -> Self {
        Self {
            extend_with_login_plugins: true,
        }
    }
}
