use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::SchemaError;
use crate::spec::field::FieldDescriptor;
use crate::spec::rule::Rule;

/// Grid placement of a label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LabelCol {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Options shared by every field of a form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_col: Option<LabelCol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_width: Option<u32>,
    /// Render inputs as read-only previews, except items with their own slot.
    #[serde(default)]
    pub detail: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, Vec<Rule>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Declarative form document: shared options plus the ordered field list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FormSchema {
    #[serde(default)]
    pub form: FormOptions,
    #[serde(default)]
    pub items: Vec<FieldDescriptor>,
}

impl FormSchema {
    pub fn new(form: FormOptions, items: Vec<FieldDescriptor>) -> Self {
        Self { form, items }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(raw)?)
    }

    /// JSON Schema describing the form document itself.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(FormSchema)
    }
}
