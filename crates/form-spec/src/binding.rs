use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::form::FormInstance;
use crate::model::ModelSnapshot;
use crate::options::OptionTreeError;
use crate::schema::Schema;
use crate::spec::field::{InputDescriptor, WidgetKind};

/// Upload lifecycle state reported by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploading,
    Done,
    Error,
    Removed,
}

/// One entry of an upload widget's file list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFile {
    pub uid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UploadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UploadFile {
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            status: None,
            url: None,
            size: None,
            extra: Map::new(),
        }
    }
}

/// Incremental edit emitted by widgets that do not simply replace a scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Upload widgets: the file that was added or removed, and the full
    /// candidate list after that action.
    Upload {
        file: UploadFile,
        file_list: Vec<UploadFile>,
    },
    /// Checkbox groups and multiple selects: the toggled value and the full
    /// selection after the toggle.
    Selection { value: Value, selected: Vec<Value> },
    /// Cascaders: the chosen value path from root to leaf.
    Cascade { path: Vec<Value> },
}

impl ChangeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Upload { .. } => "upload",
            ChangeEvent::Selection { .. } => "selection",
            ChangeEvent::Cascade { .. } => "cascade",
        }
    }

    fn accepted_by(&self, input: &InputDescriptor) -> bool {
        match (self, input.widget()) {
            (ChangeEvent::Upload { .. }, Some(WidgetKind::Upload)) => true,
            (ChangeEvent::Selection { .. }, Some(WidgetKind::CheckboxGroup)) => true,
            (ChangeEvent::Selection { .. }, Some(WidgetKind::Select)) => input.attrs.multiple,
            (ChangeEvent::Cascade { .. }, Some(WidgetKind::Cascader)) => true,
            _ => false,
        }
    }
}

/// A write refused by the binding layer. The stored value is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingRejected {
    #[error("'{name}' accepts at most {max} item(s), got {attempted}")]
    TooManyItems {
        name: String,
        max: usize,
        attempted: usize,
    },
    #[error("no input is bound to '{0}'")]
    UnknownField(String),
    #[error("'{name}' ({widget}) does not accept {event} events")]
    EventMismatch {
        name: String,
        widget: String,
        event: &'static str,
    },
    #[error("'{name}' has no option {value}")]
    UnknownOption { name: String, value: Value },
    #[error("'{name}' received a malformed change: {reason}")]
    Malformed { name: String, reason: String },
}

impl BindingRejected {
    pub fn field(&self) -> &str {
        match self {
            BindingRejected::TooManyItems { name, .. }
            | BindingRejected::EventMismatch { name, .. }
            | BindingRejected::UnknownOption { name, .. }
            | BindingRejected::Malformed { name, .. } => name,
            BindingRejected::UnknownField(name) => name,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BindingRejected::TooManyItems { .. } => "max_items",
            BindingRejected::UnknownField(_) => "unknown_field",
            BindingRejected::EventMismatch { .. } => "event_mismatch",
            BindingRejected::UnknownOption { .. } => "unknown_option",
            BindingRejected::Malformed { .. } => "malformed",
        }
    }
}

/// Read/write access to a form's data model.
///
/// Every successful write re-resolves the form and notifies subscribers when
/// the resolved field list changed.
pub struct Bindings<'a> {
    form: &'a mut FormInstance,
}

impl<'a> Bindings<'a> {
    pub(crate) fn new(form: &'a mut FormInstance) -> Self {
        Self { form }
    }

    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.form.value(name)
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let mut staged = self.form.snapshot().into_model();
        staged.insert(name.clone(), value);
        self.form.clear_field_error(&name);
        self.form.commit(staged);
    }

    pub fn remove_value(&mut self, name: &str) -> Option<Value> {
        let mut staged = self.form.snapshot().into_model();
        let previous = staged.remove(name)?;
        self.form.clear_field_error(name);
        self.form.commit(staged);
        Some(previous)
    }

    /// Applies a typed widget event, or rejects it without touching the model.
    pub fn apply_change_event(
        &mut self,
        name: &str,
        event: ChangeEvent,
    ) -> Result<(), BindingRejected> {
        match accept_event(self.form.schema(), name, event) {
            Ok(value) => {
                self.set_value(name, value);
                Ok(())
            }
            Err(rejected) => {
                warn!(field = name, code = rejected.code(), %rejected, "change rejected");
                self.form.record_rejection(&rejected);
                Err(rejected)
            }
        }
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        self.form.snapshot()
    }
}

/// Checks an event against the input it targets and returns the value to store.
fn accept_event(
    schema: &Schema,
    name: &str,
    event: ChangeEvent,
) -> Result<Value, BindingRejected> {
    let candidates: Vec<&InputDescriptor> =
        schema.inputs_named(name).map(|(_, input)| input).collect();
    let first = candidates
        .first()
        .ok_or_else(|| BindingRejected::UnknownField(name.to_string()))?;
    let input = candidates
        .iter()
        .copied()
        .find(|input| event.accepted_by(input))
        .ok_or_else(|| BindingRejected::EventMismatch {
            name: name.to_string(),
            widget: first
                .attrs
                .type_name
                .clone()
                .unwrap_or_else(|| "slot".to_string()),
            event: event.kind(),
        })?;

    match event {
        ChangeEvent::Upload { file, file_list } => {
            check_count(input, file_list.len())?;
            debug!(field = name, file = %file.name, count = file_list.len(), "upload list changed");
            serde_json::to_value(file_list).map_err(|err| BindingRejected::Malformed {
                name: name.to_string(),
                reason: err.to_string(),
            })
        }
        ChangeEvent::Selection { value, selected } => {
            check_count(input, selected.len())?;
            if let Some(options) = &input.attrs.options
                && let Some(unknown) = selected.iter().find(|item| !options.contains_value(item))
            {
                return Err(BindingRejected::UnknownOption {
                    name: name.to_string(),
                    value: unknown.clone(),
                });
            }
            debug!(field = name, toggled = %value, count = selected.len(), "selection changed");
            Ok(Value::Array(selected))
        }
        ChangeEvent::Cascade { path } => {
            if let Some(options) = &input.attrs.options {
                options.lookup_path(&path).map_err(|err| match err {
                    OptionTreeError::NotFound { segment, .. } => BindingRejected::UnknownOption {
                        name: name.to_string(),
                        value: segment,
                    },
                })?;
            }
            Ok(Value::Array(path))
        }
    }
}

fn check_count(input: &InputDescriptor, attempted: usize) -> Result<(), BindingRejected> {
    match input.attrs.max_count {
        Some(max) if attempted > max => Err(BindingRejected::TooManyItems {
            name: input.name.clone(),
            max,
            attempted,
        }),
        _ => Ok(()),
    }
}
