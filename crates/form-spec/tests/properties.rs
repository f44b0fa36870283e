use proptest::prelude::*;
use serde_json::json;

use form_spec::{
    Expr, FieldDescriptor, FormSchema, InputDescriptor, ModelSnapshot, Schema, SlotDescriptor,
    WidgetKind, is_visible, resolve,
};

/// Item shapes: always visible, shown when `switch == target`, or broken.
#[derive(Debug, Clone)]
enum Shape {
    Plain,
    Slot,
    When(i64),
    Broken,
}

fn shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Plain),
        Just(Shape::Slot),
        (0i64..4).prop_map(Shape::When),
        Just(Shape::Broken),
    ]
}

fn build(shapes: &[Shape]) -> Schema {
    let items: Vec<FieldDescriptor> = shapes
        .iter()
        .enumerate()
        .map(|(idx, shape)| match shape {
            Shape::Plain => InputDescriptor::new(format!("f{idx}"), WidgetKind::Input).into(),
            Shape::Slot => SlotDescriptor::new(format!("s{idx}")).into(),
            Shape::When(target) => InputDescriptor::new(format!("f{idx}"), WidgetKind::Input)
                .visible_if(Expr::field_equals("switch", *target))
                .into(),
            Shape::Broken => InputDescriptor::new(format!("f{idx}"), WidgetKind::Input)
                .visible_if(Expr::Lt {
                    left: Box::new(Expr::literal("text")),
                    right: Box::new(Expr::literal(1)),
                })
                .into(),
        })
        .collect();
    Schema::new(FormSchema::new(Default::default(), items)).expect("generated schema is valid")
}

fn snapshot(switch: Option<i64>) -> ModelSnapshot {
    let value = match switch {
        Some(switch) => json!({ "switch": switch }),
        None => json!({}),
    };
    ModelSnapshot::new(value.as_object().cloned().unwrap_or_default())
}

proptest! {
    #[test]
    fn resolution_is_the_visible_subsequence(
        shapes in proptest::collection::vec(shape(), 0..24),
        switch in proptest::option::of(0i64..4),
    ) {
        let schema = build(&shapes);
        let model = snapshot(switch);
        let resolved = resolve(&schema, &model);

        let expected: Vec<usize> = schema
            .items()
            .iter()
            .enumerate()
            .filter(|(_, descriptor)| is_visible(descriptor, &model))
            .map(|(index, _)| index)
            .collect();
        let actual: Vec<usize> = resolved.iter().map(|field| field.index).collect();
        prop_assert_eq!(actual, expected);

        for (idx, shape) in shapes.iter().enumerate() {
            let present = resolved.iter().any(|field| field.index == idx);
            let wanted = match shape {
                Shape::Plain | Shape::Slot => true,
                Shape::When(target) => switch == Some(*target),
                Shape::Broken => false,
            };
            prop_assert_eq!(present, wanted);
        }
    }

    #[test]
    fn resolution_is_idempotent(
        shapes in proptest::collection::vec(shape(), 0..24),
        switch in proptest::option::of(0i64..4),
    ) {
        let schema = build(&shapes);
        let model = snapshot(switch);
        let first = resolve(&schema, &model);
        let second = resolve(&schema, &model);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn switch_value_type_matters() {
    let schema = build(&[Shape::When(1)]);
    let model = ModelSnapshot::new(
        json!({ "switch": "1" })
            .as_object()
            .cloned()
            .unwrap_or_default(),
    );
    assert!(resolve(&schema, &model).is_empty());
}
