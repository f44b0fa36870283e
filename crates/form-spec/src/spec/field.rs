use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::expr::Expr;
use crate::model::ModelSnapshot;
use crate::options::OptionTree;
use crate::spec::form::LabelCol;
use crate::visibility::{Predicate, PredicateFault};

/// Widget kinds accepted in `attrs.typeName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Input,
    InputNumber,
    Textarea,
    Password,
    Select,
    RadioGroup,
    CheckboxGroup,
    Switch,
    DatePicker,
    TimePicker,
    Cascader,
    Upload,
    Preview,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 13] = [
        WidgetKind::Input,
        WidgetKind::InputNumber,
        WidgetKind::Textarea,
        WidgetKind::Password,
        WidgetKind::Select,
        WidgetKind::RadioGroup,
        WidgetKind::CheckboxGroup,
        WidgetKind::Switch,
        WidgetKind::DatePicker,
        WidgetKind::TimePicker,
        WidgetKind::Cascader,
        WidgetKind::Upload,
        WidgetKind::Preview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Input => "input",
            WidgetKind::InputNumber => "input-number",
            WidgetKind::Textarea => "textarea",
            WidgetKind::Password => "password",
            WidgetKind::Select => "select",
            WidgetKind::RadioGroup => "radio-group",
            WidgetKind::CheckboxGroup => "checkbox-group",
            WidgetKind::Switch => "switch",
            WidgetKind::DatePicker => "date-picker",
            WidgetKind::TimePicker => "time-picker",
            WidgetKind::Cascader => "cascader",
            WidgetKind::Upload => "upload",
            WidgetKind::Preview => "preview",
        }
    }

    /// Parses a `typeName` value; `None` for anything outside the vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    /// Widgets whose choices come from `attrs.options`.
    pub fn uses_options(&self) -> bool {
        matches!(
            self,
            WidgetKind::Select
                | WidgetKind::RadioGroup
                | WidgetKind::CheckboxGroup
                | WidgetKind::Cascader
        )
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout configuration handed to the form-item wrapper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_col: Option<LabelCol>,
    /// Slot name that replaces the default widget rendering for this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormItem {
    /// Passthrough `title`, used mostly by slot descriptors.
    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(Value::as_str)
    }

    /// Raw `visibleIf` condition carried as host metadata on the item.
    pub fn condition(&self) -> Option<&Value> {
        self.extra.get("visibleIf")
    }
}

/// Widget configuration: kind tag plus kind-specific options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionTree>,
    /// Widget slot names the renderer should expose (`prefix`, `suffix`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<String>,
    /// At-most-N cap for upload lists and multi selections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Named extension point rendered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotDescriptor {
    pub slot: String,
    #[serde(default)]
    pub form_item: FormItem,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<Expr>,
    #[serde(skip)]
    pub visible_when: Option<Predicate>,
}

impl SlotDescriptor {
    pub fn new(slot: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            form_item: FormItem::default(),
            attrs: Attrs::default(),
            visible_if: None,
            visible_when: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.form_item
            .extra
            .insert("title".into(), Value::String(title.into()));
        self
    }

    pub fn visible_if(mut self, expr: Expr) -> Self {
        self.visible_if = Some(expr);
        self
    }

    pub fn visible_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ModelSnapshot) -> bool + Send + Sync + 'static,
    {
        self.visible_when = Some(Predicate::new(predicate));
        self
    }
}

/// Field bound to one name of the data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub name: String,
    #[serde(default)]
    pub form_item: FormItem,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<Expr>,
    #[serde(skip)]
    pub visible_when: Option<Predicate>,
    /// Drop the stored value while the field is hidden.
    #[serde(default)]
    pub clear_on_hide: bool,
}

impl InputDescriptor {
    pub fn new(name: impl Into<String>, widget: WidgetKind) -> Self {
        Self {
            name: name.into(),
            form_item: FormItem::default(),
            attrs: Attrs {
                type_name: Some(widget.as_str().to_string()),
                ..Attrs::default()
            },
            visible_if: None,
            visible_when: None,
            clear_on_hide: false,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.form_item.label = Some(label.into());
        self
    }

    pub fn span(mut self, span: u32) -> Self {
        self.form_item.span = Some(span);
        self
    }

    pub fn item_slot(mut self, slot: impl Into<String>) -> Self {
        self.form_item.slot = Some(slot.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.attrs.placeholder = Some(placeholder.into());
        self
    }

    pub fn options(mut self, options: OptionTree) -> Self {
        self.attrs.options = Some(options);
        self
    }

    pub fn max_count(mut self, max: usize) -> Self {
        self.attrs.max_count = Some(max);
        self
    }

    pub fn multiple(mut self) -> Self {
        self.attrs.multiple = true;
        self
    }

    pub fn clear_on_hide(mut self) -> Self {
        self.clear_on_hide = true;
        self
    }

    pub fn visible_if(mut self, expr: Expr) -> Self {
        self.visible_if = Some(expr);
        self
    }

    pub fn visible_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ModelSnapshot) -> bool + Send + Sync + 'static,
    {
        self.visible_when = Some(Predicate::new(predicate));
        self
    }

    /// Same as [`visible_when`](Self::visible_when) for predicates that can fail.
    pub fn visible_when_fallible<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ModelSnapshot) -> Result<bool, PredicateFault> + Send + Sync + 'static,
    {
        self.visible_when = Some(Predicate::fallible(predicate));
        self
    }

    /// Widget kind, if `typeName` is set and known.
    pub fn widget(&self) -> Option<WidgetKind> {
        self.attrs.type_name.as_deref().and_then(WidgetKind::parse)
    }
}

/// One form element: a slot or a bound input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDescriptor {
    Slot(SlotDescriptor),
    Input(InputDescriptor),
}

impl FieldDescriptor {
    /// Name for inputs, slot name for slots; used in diagnostics.
    pub fn label(&self) -> &str {
        match self {
            FieldDescriptor::Slot(slot) => &slot.slot,
            FieldDescriptor::Input(input) => &input.name,
        }
    }

    pub fn as_input(&self) -> Option<&InputDescriptor> {
        match self {
            FieldDescriptor::Input(input) => Some(input),
            FieldDescriptor::Slot(_) => None,
        }
    }

    pub fn form_item(&self) -> &FormItem {
        match self {
            FieldDescriptor::Slot(slot) => &slot.form_item,
            FieldDescriptor::Input(input) => &input.form_item,
        }
    }

    pub fn attrs(&self) -> &Attrs {
        match self {
            FieldDescriptor::Slot(slot) => &slot.attrs,
            FieldDescriptor::Input(input) => &input.attrs,
        }
    }

    pub(crate) fn conditions(&self) -> (Option<&Expr>, Option<&Predicate>) {
        match self {
            FieldDescriptor::Slot(slot) => (slot.visible_if.as_ref(), slot.visible_when.as_ref()),
            FieldDescriptor::Input(input) => {
                (input.visible_if.as_ref(), input.visible_when.as_ref())
            }
        }
    }
}

impl From<SlotDescriptor> for FieldDescriptor {
    fn from(slot: SlotDescriptor) -> Self {
        FieldDescriptor::Slot(slot)
    }
}

impl From<InputDescriptor> for FieldDescriptor {
    fn from(input: InputDescriptor) -> Self {
        FieldDescriptor::Input(input)
    }
}
