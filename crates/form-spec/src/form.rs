use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::binding::{BindingRejected, Bindings};
use crate::model::{DataModel, ModelSnapshot};
use crate::model_schema;
use crate::options::OptionTree;
use crate::resolve::{ResolvedField, resolve};
use crate::schema::{Schema, SchemaError};
use crate::spec::field::FieldDescriptor;
use crate::spec::form::FormSchema;

/// User-facing error attached to one field, shown next to validation errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub name: String,
    pub message: String,
    pub code: String,
}

type Listener = dyn Fn(&[ResolvedField]);

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(u64, Rc<Listener>)>,
}

/// Handle returned by [`FormInstance::subscribe`].
///
/// The listener stays registered until the handle is dropped or
/// [`unsubscribe`](Self::unsubscribe) is called.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<ListenerRegistry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.registry.upgrade()
            && let Ok(mut registry) = shared.try_borrow_mut()
        {
            registry.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// A mounted form: schema, owned data model and the current resolution.
pub struct FormInstance {
    schema: Schema,
    model: ModelSnapshot,
    resolved: Vec<ResolvedField>,
    field_errors: BTreeMap<String, FieldError>,
    listeners: Rc<RefCell<ListenerRegistry>>,
}

/// Validates `schema` and mounts it with an optional initial model.
pub fn create_form(
    schema: FormSchema,
    initial_model: Option<DataModel>,
) -> Result<FormInstance, SchemaError> {
    let schema = Schema::new(schema)?;
    Ok(FormInstance::new(schema, initial_model.unwrap_or_default()))
}

impl FormInstance {
    pub fn new(schema: Schema, initial_model: DataModel) -> Self {
        let (model, resolved) = settle(&schema, initial_model);
        Self {
            schema,
            model,
            resolved,
            field_errors: BTreeMap::new(),
            listeners: Rc::new(RefCell::new(ListenerRegistry::default())),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Visible fields for the current model, in declared order.
    pub fn resolved_fields(&self) -> &[ResolvedField] {
        &self.resolved
    }

    pub fn bindings(&mut self) -> Bindings<'_> {
        Bindings::new(self)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.model.get(name)
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        self.model.clone()
    }

    pub fn field_errors(&self) -> impl Iterator<Item = &FieldError> {
        self.field_errors.values()
    }

    pub fn field_error(&self, name: &str) -> Option<&FieldError> {
        self.field_errors.get(name)
    }

    /// Registers a listener called with the new list whenever it changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[ResolvedField]) + 'static,
    {
        let mut registry = self.listeners.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push((id, Rc::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    /// Swaps in a new schema, keeping the current model.
    pub fn replace_schema(&mut self, document: FormSchema) -> Result<(), SchemaError> {
        self.schema = Schema::new(document)?;
        let schema = &self.schema;
        self.field_errors
            .retain(|name, _| schema.inputs_named(name).next().is_some());
        self.commit(self.model.as_map().clone());
        Ok(())
    }

    /// Replaces the option tree of every input bound to `name`.
    pub fn replace_options(&mut self, name: &str, options: OptionTree) -> Result<(), SchemaError> {
        let mut document = self.schema.document().clone();
        let mut replaced = 0;
        for descriptor in &mut document.items {
            if let FieldDescriptor::Input(input) = descriptor
                && input.name == name
            {
                input.attrs.options = Some(options.clone());
                replaced += 1;
            }
        }
        if replaced == 0 {
            return Err(SchemaError::UnknownField(name.to_string()));
        }
        self.replace_schema(document)
    }

    /// JSON Schema of the values the currently visible inputs accept.
    pub fn model_schema(&self) -> Value {
        model_schema::generate(&self.resolved)
    }

    pub(crate) fn commit(&mut self, staged: DataModel) {
        let (model, resolved) = settle(&self.schema, staged);
        self.model = model;
        if resolved != self.resolved {
            self.resolved = resolved;
            self.notify();
        }
    }

    pub(crate) fn clear_field_error(&mut self, name: &str) {
        self.field_errors.remove(name);
    }

    pub(crate) fn record_rejection(&mut self, rejected: &BindingRejected) {
        let name = rejected.field().to_string();
        self.field_errors.insert(
            name.clone(),
            FieldError {
                name,
                message: rejected.to_string(),
                code: rejected.code().to_string(),
            },
        );
    }

    fn notify(&self) {
        let listeners: Vec<Rc<Listener>> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&self.resolved);
        }
    }
}

impl fmt::Debug for FormInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormInstance")
            .field("items", &self.schema.items().len())
            .field("model", &self.model)
            .field("resolved", &self.resolved.len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Resolves `staged`, dropping values of hidden clear-on-hide inputs until
/// nothing else changes.
fn settle(schema: &Schema, staged: DataModel) -> (ModelSnapshot, Vec<ResolvedField>) {
    let mut snapshot = ModelSnapshot::new(staged);
    loop {
        let resolved = resolve(schema, &snapshot);
        let stale = hidden_values(schema, &resolved, &snapshot);
        if stale.is_empty() {
            return (snapshot, resolved);
        }
        let mut model = snapshot.into_model();
        for name in &stale {
            debug!(field = %name, "clearing value of hidden field");
            model.remove(name);
        }
        snapshot = ModelSnapshot::new(model);
    }
}

fn hidden_values(
    schema: &Schema,
    resolved: &[ResolvedField],
    snapshot: &ModelSnapshot,
) -> BTreeSet<String> {
    let visible: BTreeSet<&str> = resolved
        .iter()
        .filter_map(|field| field.name.as_deref())
        .collect();
    schema
        .inputs()
        .filter(|(_, input)| {
            input.clear_on_hide
                && !visible.contains(input.name.as_str())
                && snapshot.contains(&input.name)
        })
        .map(|(_, input)| input.name.clone())
        .collect()
}
