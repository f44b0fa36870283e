use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../form-spec/tests/fixtures/user_form.json")
}

fn formctl() -> Command {
    Command::cargo_bin("formctl").expect("formctl binary")
}

#[test]
fn check_reports_item_counts() {
    formctl()
        .arg("check")
        .arg("--schema")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("16 items"))
        .stdout(predicate::str::contains("2 rule sets"));
}

#[test]
fn check_rejects_unknown_widget() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("broken.json");
    fs::write(
        &path,
        r#"{"items":[{"kind":"input","name":"x","attrs":{"typeName":"slider"}}]}"#,
    )
    .expect("write schema");

    formctl()
        .arg("check")
        .arg("--schema")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("slider"));
}

#[test]
fn check_accepts_toml_documents() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("form.toml");
    fs::write(
        &path,
        r#"
[form]
detail = true

[[items]]
kind = "input"
name = "nickname"

[items.attrs]
typeName = "input"
"#,
    )
    .expect("write schema");

    formctl()
        .arg("check")
        .arg("--schema")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 items, 1 inputs, 0 slots"));
}

#[test]
fn resolve_hides_conditional_input_until_hobby_is_two() {
    formctl()
        .arg("resolve")
        .arg("--schema")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("username *"))
        .stdout(predicate::str::contains("hobbyName").not());

    formctl()
        .arg("resolve")
        .arg("--schema")
        .arg(fixture())
        .args(["--set", "hobby=2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hobbyName (input) = <unset>"));
}

#[test]
fn resolve_reads_model_file_and_prints_json() {
    let dir = TempDir::new().expect("tempdir");
    let model = dir.path().join("model.json");
    fs::write(&model, r#"{"hobby": 2, "hobbyName": "soccer"}"#).expect("write model");

    let output = formctl()
        .arg("resolve")
        .arg("--schema")
        .arg(fixture())
        .arg("--model")
        .arg(&model)
        .arg("--json")
        .output()
        .expect("run formctl");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    let fields = value["fields"].as_array().expect("fields array");
    assert_eq!(fields.len(), 16);
    assert!(fields.iter().any(|field| field["name"] == "hobbyName"));
    assert_eq!(value["model"]["hobbyName"], "soccer");
}

#[test]
fn resolve_rejects_non_object_model() {
    let dir = TempDir::new().expect("tempdir");
    let model = dir.path().join("model.json");
    fs::write(&model, "[1, 2]").expect("write model");

    formctl()
        .arg("resolve")
        .arg("--schema")
        .arg(fixture())
        .arg("--model")
        .arg(&model)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a JSON object"));
}

#[test]
fn lookup_prints_cascading_labels() {
    formctl()
        .arg("lookup")
        .arg("--schema")
        .arg(fixture())
        .args(["--field", "city", "湖北省", "武汉市", "黄陂区"])
        .assert()
        .success()
        .stdout(predicate::str::contains("湖北省 / 武汉市 / 黄陂区"));
}

#[test]
fn lookup_reports_missing_segment() {
    formctl()
        .arg("lookup")
        .arg("--schema")
        .arg(fixture())
        .args(["--field", "city", "湖北省", "不存在"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("depth 1"));
}

#[test]
fn model_schema_lists_required_inputs() {
    let output = formctl()
        .arg("model-schema")
        .arg("--schema")
        .arg(fixture())
        .output()
        .expect("run formctl");
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(schema["type"], "object");
    assert_eq!(
        schema["required"],
        serde_json::json!(["username", "password"])
    );
    assert!(schema["properties"].get("hobbyName").is_none());
}

#[test]
fn document_schema_describes_items() {
    formctl()
        .arg("document-schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"items\""));
}
