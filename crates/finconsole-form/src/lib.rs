//! # FinConsole Form
//!
//! Headless form logic for the debug console pages. A [`FormController`] keeps
//! a structured field model and its JSON-text twin consistent while the user
//! switches between per-field editing and raw JSON editing.

pub mod error;
pub mod schema;

pub use error::FormError;
pub use schema::{FieldKind, FieldSpec, HttpMethod, PageSpec, SelectOption};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name to current value, in field declaration order.
pub type FormModel = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Structured,
    Raw,
}

/// What happened to the model after a raw-text edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEdit {
    /// The text parsed as an object and the model now mirrors it.
    Synced,
    /// The text is not valid JSON; the model kept its last valid value.
    Invalid,
    /// Valid JSON, but not an object, so it cannot feed the fields.
    NotAnObject,
}

/// Keeps one authoritative [`FormModel`] and the raw JSON text in step.
#[derive(Debug, Clone)]
pub struct FormController {
    fields: Vec<FieldSpec>,
    model: FormModel,
    raw_text: String,
    mode: EditMode,
}

impl FormController {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let mut controller = Self {
            fields,
            model: FormModel::new(),
            raw_text: String::new(),
            mode: EditMode::Structured,
        };
        controller.reset();
        controller
    }

    /// Resets every field to its default (or the empty string) and
    /// regenerates the raw text. The edit mode is left as it is.
    pub fn reset(&mut self) {
        self.model = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.initial_value()))
            .collect();
        self.regenerate_raw();
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.model.get(name)
    }

    /// Updates one field. In structured mode the raw text is regenerated so it
    /// always mirrors the fields.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), FormError> {
        let slot = self
            .model
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        *slot = value;

        if self.mode == EditMode::Structured {
            self.regenerate_raw();
        }
        Ok(())
    }

    /// Replaces the raw text and tries to derive the model from it.
    ///
    /// Editing the text puts the controller in raw mode, since the text is
    /// then no longer a rendering of the model. Never fails: text that does
    /// not parse is still stored so the user can keep typing.
    pub fn edit_raw(&mut self, text: impl Into<String>) -> RawEdit {
        self.mode = EditMode::Raw;
        self.raw_text = text.into();

        match serde_json::from_str::<Value>(&self.raw_text) {
            Ok(Value::Object(parsed)) => {
                self.model = self.project(&parsed);
                RawEdit::Synced
            }
            Ok(_) => RawEdit::NotAnObject,
            Err(e) => {
                tracing::trace!(error = %e, "Raw JSON not parseable yet");
                RawEdit::Invalid
            }
        }
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        // Either direction renders the model: it already holds the last
        // successful derivation, whichever mode produced it.
        if mode != self.mode {
            self.regenerate_raw();
        }
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> EditMode {
        let next = match self.mode {
            EditMode::Structured => EditMode::Raw,
            EditMode::Raw => EditMode::Structured,
        };
        self.set_mode(next);
        next
    }

    /// The payload a submission would send right now.
    ///
    /// In raw mode the current text is parsed as-is (any JSON value, extra
    /// keys included). A parse failure aborts the submission.
    pub fn resolve_payload(&self) -> Result<Value, FormError> {
        match self.mode {
            EditMode::Raw => serde_json::from_str(&self.raw_text)
                .map_err(|e| FormError::InvalidJson(e.to_string())),
            EditMode::Structured => Ok(Value::Object(self.model.clone())),
        }
    }

    /// Merges suggested values into the model. Keys that are not fields are
    /// ignored; fields absent from the suggestion are left untouched.
    ///
    /// Returns the number of fields whose value changed.
    pub fn merge_suggestion(&mut self, suggestion: &Map<String, Value>) -> usize {
        let mut changed = 0;
        for (name, value) in suggestion {
            match self.model.get_mut(name) {
                Some(slot) if slot != value => {
                    *slot = value.clone();
                    changed += 1;
                }
                Some(_) => {}
                None => tracing::debug!(field = %name, "Ignoring suggestion for unknown field"),
            }
        }

        if changed > 0 && self.mode == EditMode::Structured {
            self.regenerate_raw();
        }
        changed
    }

    /// Names of required fields that are still empty.
    pub fn missing_required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| match self.model.get(&f.name) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .map(|f| f.name.as_str())
            .collect()
    }

    fn project(&self, parsed: &Map<String, Value>) -> FormModel {
        self.fields
            .iter()
            .map(|f| {
                let value = parsed
                    .get(&f.name)
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new()));
                (f.name.clone(), value)
            })
            .collect()
    }

    fn regenerate_raw(&mut self) {
        self.raw_text = serde_json::to_string_pretty(&self.model).unwrap_or_default();
    }
}
