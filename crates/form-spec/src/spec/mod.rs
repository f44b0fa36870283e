pub mod field;
pub mod form;
pub mod rule;

pub use field::{Attrs, FieldDescriptor, FormItem, InputDescriptor, SlotDescriptor, WidgetKind};
pub use form::{FormOptions, FormSchema, LabelCol};
pub use rule::{Rule, RuleTrigger};
