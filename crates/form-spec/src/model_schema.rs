use serde_json::{Map, Value, json};

use crate::options::OptionTree;
use crate::resolve::ResolvedField;
use crate::spec::field::WidgetKind;
use crate::spec::rule::Rule;

/// Generates a data-model JSON schema restricted to the resolved inputs.
///
/// When several inputs share a name, the first one describes the value.
pub fn generate(fields: &[ResolvedField]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        let Some(name) = &field.name else {
            continue;
        };
        if properties.contains_key(name) {
            continue;
        }
        properties.insert(name.clone(), field_schema(field));
        if field.rules.iter().any(|rule| rule.required) {
            required.push(Value::String(name.clone()));
        }
    }

    let mut root = Map::new();
    root.insert("type".into(), Value::String("object".into()));
    root.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        root.insert("required".into(), Value::Array(required));
    }

    Value::Object(root)
}

fn field_schema(field: &ResolvedField) -> Value {
    let mut schema = Map::new();
    let attrs = &field.attrs;

    match field.widget {
        Some(WidgetKind::Input | WidgetKind::Textarea | WidgetKind::Password) => {
            schema.insert("type".into(), Value::String("string".into()));
        }
        Some(WidgetKind::DatePicker | WidgetKind::TimePicker) => {
            schema.insert("type".into(), Value::String("string".into()));
            let format = if field.widget == Some(WidgetKind::DatePicker) {
                "date"
            } else {
                "time"
            };
            schema.insert("format".into(), Value::String(format.into()));
        }
        Some(WidgetKind::InputNumber) => {
            schema.insert("type".into(), Value::String("number".into()));
        }
        Some(WidgetKind::Switch) => {
            schema.insert("type".into(), Value::String("boolean".into()));
        }
        Some(WidgetKind::Select | WidgetKind::RadioGroup) if !attrs.multiple => {
            if let Some(options) = &attrs.options {
                schema.insert("enum".into(), enum_values(options));
            }
        }
        Some(WidgetKind::Select | WidgetKind::CheckboxGroup) => {
            schema.insert("type".into(), Value::String("array".into()));
            let mut items = Map::new();
            if let Some(options) = &attrs.options {
                items.insert("enum".into(), enum_values(options));
            }
            schema.insert("items".into(), Value::Object(items));
            insert_max_items(&mut schema, attrs.max_count);
        }
        Some(WidgetKind::RadioGroup) => {
            if let Some(options) = &attrs.options {
                schema.insert("enum".into(), enum_values(options));
            }
        }
        Some(WidgetKind::Cascader) => {
            schema.insert("type".into(), Value::String("array".into()));
            if let Some(options) = &attrs.options {
                insert_max_items(&mut schema, Some(options.depth()));
            }
        }
        Some(WidgetKind::Upload) => {
            schema.insert("type".into(), Value::String("array".into()));
            schema.insert(
                "items".into(),
                json!({
                    "type": "object",
                    "properties": {
                        "uid": { "type": "string" },
                        "name": { "type": "string" },
                        "url": { "type": "string" }
                    },
                    "required": ["uid", "name"]
                }),
            );
            insert_max_items(&mut schema, attrs.max_count);
        }
        Some(WidgetKind::Preview) | None => {}
    }

    if let Some(label) = &field.form_item.label {
        schema.insert("title".into(), Value::String(label.clone()));
    }
    for rule in &field.rules {
        apply_rule(&mut schema, rule);
    }

    Value::Object(schema)
}

fn apply_rule(schema: &mut Map<String, Value>, rule: &Rule) {
    if let Some(pattern) = &rule.pattern {
        schema.insert("pattern".into(), Value::String(pattern.clone()));
    }
    if let Some(min) = rule.min
        && let Some(num) = number_from_f64(min)
    {
        schema.insert("minimum".into(), num);
    }
    if let Some(max) = rule.max
        && let Some(num) = number_from_f64(max)
    {
        schema.insert("maximum".into(), num);
    }
    if let Some(min_len) = rule.min_len {
        schema.insert("minLength".into(), Value::Number(min_len.into()));
    }
    if let Some(max_len) = rule.max_len {
        schema.insert("maxLength".into(), Value::Number(max_len.into()));
    }
}

fn enum_values(options: &OptionTree) -> Value {
    Value::Array(options.nodes().iter().map(|node| node.value.clone()).collect())
}

fn insert_max_items(schema: &mut Map<String, Value>, max: Option<usize>) {
    if let Some(max) = max {
        schema.insert("maxItems".into(), Value::Number(max.into()));
    }
}

fn number_from_f64(value: f64) -> Option<Value> {
    serde_json::Number::from_f64(value).map(Value::Number)
}
