use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::spec::field::{FieldDescriptor, InputDescriptor, WidgetKind};
use crate::spec::form::{FormOptions, FormSchema};
use crate::spec::rule::Rule;

/// Errors raised while loading or validating a form document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("item {index}: input name must not be empty")]
    EmptyName { index: usize },
    #[error("item {index}: unsupported widget '{type_name}'")]
    UnsupportedWidget { index: usize, type_name: String },
    #[error("item {index}: option value {value} repeats among its siblings")]
    DuplicateOption { index: usize, value: Value },
    #[error("no input is bound to '{0}'")]
    UnknownField(String),
    #[error("invalid JSON form document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML form document: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A validated form document. Immutable once built; clones share storage.
#[derive(Debug, Clone)]
pub struct Schema {
    document: Arc<FormSchema>,
}

impl Schema {
    pub fn new(document: FormSchema) -> Result<Self, SchemaError> {
        for (index, descriptor) in document.items.iter().enumerate() {
            if let FieldDescriptor::Input(input) = descriptor {
                check_input(index, input)?;
            }
        }
        Ok(Self {
            document: Arc::new(document),
        })
    }

    pub fn document(&self) -> &FormSchema {
        &self.document
    }

    pub fn form(&self) -> &FormOptions {
        &self.document.form
    }

    pub fn items(&self) -> &[FieldDescriptor] {
        &self.document.items
    }

    /// Rules declared for exactly this name.
    pub fn rules_for(&self, name: &str) -> &[Rule] {
        self.document
            .form
            .rules
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Inputs bound to `name`, with their item index, in declared order.
    pub fn inputs_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (usize, &'a InputDescriptor)> + 'a {
        self.inputs().filter(move |(_, input)| input.name == name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = (usize, &InputDescriptor)> {
        self.document
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, descriptor)| descriptor.as_input().map(|input| (index, input)))
    }
}

impl TryFrom<FormSchema> for Schema {
    type Error = SchemaError;

    fn try_from(document: FormSchema) -> Result<Self, Self::Error> {
        Schema::new(document)
    }
}

fn check_input(index: usize, input: &InputDescriptor) -> Result<(), SchemaError> {
    if input.name.trim().is_empty() {
        return Err(SchemaError::EmptyName { index });
    }
    if let Some(type_name) = &input.attrs.type_name
        && WidgetKind::parse(type_name).is_none()
    {
        return Err(SchemaError::UnsupportedWidget {
            index,
            type_name: type_name.clone(),
        });
    }
    if let Some(options) = &input.attrs.options
        && let Some(value) = options.duplicate_sibling()
    {
        return Err(SchemaError::DuplicateOption {
            index,
            value: value.clone(),
        });
    }
    Ok(())
}
