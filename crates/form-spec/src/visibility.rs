use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::expr::Expr;
use crate::model::ModelSnapshot;
use crate::schema::Schema;
use crate::spec::field::FieldDescriptor;

/// Item index → visible.
pub type VisibilityMap = BTreeMap<usize, bool>;

/// Failure of a visibility condition. Always recovered as "hidden".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateFault {
    #[error("condition could not be decided for the current model")]
    Undecidable,
    #[error("predicate panicked: {0}")]
    Panicked(String),
    #[error("predicate failed: {0}")]
    Host(String),
}

type PredicateFn = dyn Fn(&ModelSnapshot) -> Result<bool, PredicateFault> + Send + Sync;

/// Host-supplied visibility check over an immutable model snapshot.
///
/// Must be pure and deterministic for a given snapshot.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&ModelSnapshot) -> bool + Send + Sync + 'static,
    {
        Self::fallible(move |model| Ok(predicate(model)))
    }

    pub fn fallible<F>(predicate: F) -> Self
    where
        F: Fn(&ModelSnapshot) -> Result<bool, PredicateFault> + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Runs the predicate, turning a panic into [`PredicateFault::Panicked`].
    pub fn evaluate(&self, model: &ModelSnapshot) -> Result<bool, PredicateFault> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.0)(model)))
            .unwrap_or_else(|payload| Err(PredicateFault::Panicked(panic_message(&*payload))))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Evaluates every condition attached to a descriptor.
///
/// No condition means visible; otherwise each present condition must hold.
/// Slots also honor a `visibleIf` stored in their `formItem` metadata.
pub fn check_visibility(
    descriptor: &FieldDescriptor,
    model: &ModelSnapshot,
) -> Result<bool, PredicateFault> {
    let (visible_if, visible_when) = descriptor.conditions();
    if let Some(expr) = visible_if
        && !evaluate_expr(expr, model)?
    {
        return Ok(false);
    }
    if let FieldDescriptor::Slot(slot) = descriptor
        && let Some(raw) = slot.form_item.condition()
    {
        let expr: Expr =
            serde_json::from_value(raw.clone()).map_err(|_| PredicateFault::Undecidable)?;
        if !evaluate_expr(&expr, model)? {
            return Ok(false);
        }
    }
    if let Some(predicate) = visible_when
        && !predicate.evaluate(model)?
    {
        return Ok(false);
    }
    Ok(true)
}

fn evaluate_expr(expr: &Expr, model: &ModelSnapshot) -> Result<bool, PredicateFault> {
    expr.evaluate_bool(model).ok_or(PredicateFault::Undecidable)
}

/// Like [`check_visibility`], but a fault hides the field and is logged.
pub fn is_visible(descriptor: &FieldDescriptor, model: &ModelSnapshot) -> bool {
    match check_visibility(descriptor, model) {
        Ok(visible) => visible,
        Err(fault) => {
            warn!(field = descriptor.label(), %fault, "visibility condition failed; hiding field");
            false
        }
    }
}

/// Visibility of every item, including hidden ones.
pub fn visibility_map(schema: &Schema, model: &ModelSnapshot) -> VisibilityMap {
    schema
        .items()
        .iter()
        .enumerate()
        .map(|(index, descriptor)| (index, is_visible(descriptor, model)))
        .collect()
}

/// Wraps an expression as a predicate, for hosts mixing both styles.
impl From<Expr> for Predicate {
    fn from(expr: Expr) -> Self {
        Predicate::fallible(move |model| {
            expr.evaluate_bool(model)
                .ok_or(PredicateFault::Undecidable)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::{InputDescriptor, SlotDescriptor, WidgetKind};
    use serde_json::json;

    fn model(value: serde_json::Value) -> ModelSnapshot {
        ModelSnapshot::new(value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn unconditional_fields_are_visible() {
        let input: FieldDescriptor = InputDescriptor::new("username", WidgetKind::Input).into();
        let slot: FieldDescriptor = SlotDescriptor::new("custom").into();
        assert!(is_visible(&input, &model(json!({}))));
        assert!(is_visible(&slot, &model(json!({}))));
    }

    #[test]
    fn slot_conditions_are_honored() {
        let slot: FieldDescriptor = SlotDescriptor::new("custom")
            .visible_if(Expr::IsSet {
                path: "hobby".into(),
            })
            .into();
        assert!(!is_visible(&slot, &model(json!({}))));
        assert!(is_visible(&slot, &model(json!({ "hobby": 1 }))));
    }

    #[test]
    fn slot_form_item_condition_is_honored() {
        let mut slot = SlotDescriptor::new("custom").title("x");
        slot.form_item.extra.insert(
            "visibleIf".into(),
            json!({ "op": "is_set", "path": "hobby" }),
        );
        let slot: FieldDescriptor = slot.into();
        assert_eq!(check_visibility(&slot, &model(json!({}))), Ok(false));
        assert!(is_visible(&slot, &model(json!({ "hobby": 1 }))));
    }

    #[test]
    fn unreadable_slot_condition_hides_the_slot() {
        let mut slot = SlotDescriptor::new("custom");
        slot.form_item
            .extra
            .insert("visibleIf".into(), json!({ "op": "no_such_op" }));
        let slot: FieldDescriptor = slot.into();
        assert_eq!(
            check_visibility(&slot, &model(json!({}))),
            Err(PredicateFault::Undecidable)
        );
        assert!(!is_visible(&slot, &model(json!({}))));
    }

    #[test]
    fn both_conditions_must_hold() {
        let input: FieldDescriptor = InputDescriptor::new("hobbyName", WidgetKind::Input)
            .visible_if(Expr::field_equals("hobby", 2))
            .visible_when(|model| model.get("age").is_some())
            .into();
        assert!(!is_visible(&input, &model(json!({ "hobby": 2 }))));
        assert!(is_visible(&input, &model(json!({ "hobby": 2, "age": 3 }))));
        assert!(!is_visible(&input, &model(json!({ "hobby": 1, "age": 3 }))));
    }

    #[test]
    fn panicking_predicate_reports_fault() {
        let input: FieldDescriptor = InputDescriptor::new("broken", WidgetKind::Input)
            .visible_when(|_| panic!("boom"))
            .into();
        assert_eq!(
            check_visibility(&input, &model(json!({}))),
            Err(PredicateFault::Panicked("boom".into()))
        );
        assert!(!is_visible(&input, &model(json!({}))));
    }

    #[test]
    fn expression_predicates_share_semantics() {
        let predicate = Predicate::from(Expr::field_equals("hobby", 2));
        assert_eq!(predicate.evaluate(&model(json!({ "hobby": 2 }))), Ok(true));
        assert_eq!(predicate.evaluate(&model(json!({}))), Ok(false));
    }
}
