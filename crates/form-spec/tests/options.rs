use serde_json::json;

use form_spec::{OptionTree, OptionTreeError};

fn city_options() -> OptionTree {
    serde_json::from_value(json!([
        {
            "value": "湖北省",
            "label": "湖北省",
            "children": [
                {
                    "value": "武汉市",
                    "label": "武汉市",
                    "children": [{ "value": "黄陂区", "label": "黄陂区" }]
                }
            ]
        }
    ]))
    .expect("options parse")
}

#[test]
fn cascading_path_resolves_to_label_chain() {
    let tree = city_options();
    let labels = tree
        .label_chain(&[json!("湖北省"), json!("武汉市"), json!("黄陂区")])
        .expect("path exists");
    assert_eq!(labels, vec!["湖北省", "武汉市", "黄陂区"]);

    let nodes = tree
        .lookup_path(&[json!("湖北省"), json!("武汉市")])
        .expect("prefix exists");
    assert_eq!(nodes.len(), 2);
    assert!(!nodes[1].is_leaf());
}

#[test]
fn missing_segment_is_not_found() {
    let tree = city_options();
    let err = tree
        .label_chain(&[json!("湖北省"), json!("不存在")])
        .unwrap_err();
    assert!(matches!(err, OptionTreeError::NotFound { depth: 1, .. }));
    assert_eq!(err.to_string(), "no option \"不存在\" at depth 1");
}

#[test]
fn empty_path_yields_empty_chain() {
    let tree = city_options();
    assert_eq!(tree.label_chain(&[]), Ok(Vec::new()));
}
