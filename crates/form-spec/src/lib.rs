#![allow(missing_docs)]

pub mod binding;
pub mod expr;
pub mod form;
pub mod model;
pub mod model_schema;
pub mod options;
pub mod resolve;
pub mod schema;
pub mod spec;
pub mod visibility;

pub use binding::{BindingRejected, Bindings, ChangeEvent, UploadFile, UploadStatus};
pub use expr::Expr;
pub use form::{FieldError, FormInstance, Subscription, create_form};
pub use model::{DataModel, ModelSnapshot};
pub use model_schema::generate as model_schema;
pub use options::{OptionNode, OptionTree, OptionTreeError};
pub use resolve::{FieldKind, ResolvedField, resolve};
pub use schema::{Schema, SchemaError};
pub use spec::{
    Attrs, FieldDescriptor, FormItem, FormOptions, FormSchema, InputDescriptor, LabelCol, Rule,
    RuleTrigger, SlotDescriptor, WidgetKind,
};
pub use visibility::{
    Predicate, PredicateFault, VisibilityMap, check_visibility, is_visible, visibility_map,
};
