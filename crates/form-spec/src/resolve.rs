use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::ModelSnapshot;
use crate::schema::Schema;
use crate::spec::field::{Attrs, FieldDescriptor, FormItem, WidgetKind};
use crate::spec::rule::Rule;
use crate::visibility::is_visible;

/// Discriminant of a [`ResolvedField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Slot,
    Input,
}

/// A visible descriptor, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    /// Position of the descriptor in `items`.
    pub index: usize,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Slot to render: the slot name, or an input's `formItem.slot` override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetKind>,
    pub form_item: FormItem,
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// Render as a read-only preview (form in detail mode, no slot override).
    #[serde(default)]
    pub detail: bool,
}

impl ResolvedField {
    fn from_descriptor(schema: &Schema, index: usize, descriptor: &FieldDescriptor) -> Self {
        match descriptor {
            FieldDescriptor::Slot(slot) => ResolvedField {
                index,
                kind: FieldKind::Slot,
                name: None,
                slot: Some(slot.slot.clone()),
                widget: None,
                form_item: slot.form_item.clone(),
                attrs: slot.attrs.clone(),
                rules: Vec::new(),
                detail: false,
            },
            FieldDescriptor::Input(input) => ResolvedField {
                index,
                kind: FieldKind::Input,
                name: Some(input.name.clone()),
                slot: input.form_item.slot.clone(),
                widget: input.widget(),
                form_item: input.form_item.clone(),
                attrs: input.attrs.clone(),
                rules: schema.rules_for(&input.name).to_vec(),
                detail: schema.form().detail && input.form_item.slot.is_none(),
            },
        }
    }
}

/// Visible items, in declared order, decorated for rendering.
///
/// Pure: the same schema and snapshot always give the same list.
pub fn resolve(schema: &Schema, model: &ModelSnapshot) -> Vec<ResolvedField> {
    let resolved: Vec<ResolvedField> = schema
        .items()
        .iter()
        .enumerate()
        .filter(|(_, descriptor)| is_visible(descriptor, model))
        .map(|(index, descriptor)| ResolvedField::from_descriptor(schema, index, descriptor))
        .collect();
    debug!(
        items = schema.items().len(),
        visible = resolved.len(),
        "resolved form fields"
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::{InputDescriptor, SlotDescriptor};
    use crate::spec::form::{FormOptions, FormSchema};
    use crate::spec::rule::RuleTrigger;
    use serde_json::json;

    fn schema(detail: bool) -> Schema {
        let mut form = FormOptions {
            detail,
            ..FormOptions::default()
        };
        form.rules.insert(
            "username".into(),
            vec![Rule::required("请填写用户名", RuleTrigger::Blur)],
        );
        Schema::new(FormSchema::new(
            form,
            vec![
                SlotDescriptor::new("userInfo").title("用户信息 :").into(),
                InputDescriptor::new("username", WidgetKind::Input)
                    .label("用户名")
                    .into(),
                InputDescriptor::new("age", WidgetKind::Input)
                    .item_slot("age")
                    .into(),
            ],
        ))
        .expect("schema is valid")
    }

    #[test]
    fn rules_are_attached_per_name() {
        let fields = resolve(&schema(false), &ModelSnapshot::default());
        assert_eq!(fields.len(), 3);
        assert!(fields[0].rules.is_empty());
        assert_eq!(fields[1].rules.len(), 1);
        assert!(fields[1].rules[0].required);
        assert!(fields[2].rules.is_empty());
    }

    #[test]
    fn detail_mode_spares_slot_overrides() {
        let fields = resolve(&schema(true), &ModelSnapshot::default());
        assert!(!fields[0].detail);
        assert!(fields[1].detail);
        assert!(!fields[2].detail);
        assert_eq!(fields[2].slot.as_deref(), Some("age"));
    }

    #[test]
    fn serializes_as_plain_value_object() {
        let fields = resolve(&schema(false), &ModelSnapshot::default());
        let value = serde_json::to_value(&fields[0]).expect("serializes");
        assert_eq!(value["kind"], json!("slot"));
        assert_eq!(value["formItem"]["title"], json!("用户信息 :"));
        assert!(value.get("name").is_none());

        let input = serde_json::to_value(&fields[1]).expect("serializes");
        assert_eq!(input["name"], json!("username"));
        assert_eq!(input["widget"], json!("input"));
        assert_eq!(input["attrs"]["typeName"], json!("input"));
    }
}
