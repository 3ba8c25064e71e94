#![cfg(feature = "cli")]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const DEFINITIONS: &str = r#"{
    "enums": [{"name": "Gender", "variants": {"male": "m", "female": "f"}}],
    "types": [
        {"name": "Person", "fields": [
            {"name": "name", "type": "string"},
            {"name": "gender", "type": "Gender"},
            {"name": "nick", "type": {"kind": "optional", "of": "string"}},
            {"name": "phone", "type": {"kind": "described", "of": "string",
                "description": "phone number", "pattern": "\\d{3}-\\d{3}-\\d{4}"}}
        ]},
        {"name": "Frozen", "extends": ["Person"], "immutable": true}
    ]
}"#;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "rectypes-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("file should be writable");
    path
}

fn rectypes(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rectypes"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .args(args)
        .output()
        .expect("rectypes should run")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path should be utf-8")
}

#[test]
fn types_lists_declared_record_types() {
    let dir = unique_temp_dir("types");
    let defs = write_file(&dir, "defs.json", DEFINITIONS);

    let output = rectypes(&["types", path_str(&defs)]);
    assert!(output.status.success());
    let listed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("types output should be JSON");
    assert_eq!(listed[0]["name"], "Person");
    assert_eq!(listed[0]["required"], serde_json::json!(["name", "gender", "phone"]));
    assert_eq!(listed[1]["name"], "Frozen");
    assert_eq!(listed[1]["immutable"], true);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn schema_prints_derived_document() {
    let dir = unique_temp_dir("schema");
    let defs = write_file(&dir, "defs.json", DEFINITIONS);

    let output = rectypes(&["schema", path_str(&defs), "Person", "--strict"]);
    assert!(output.status.success());
    let document: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("schema output should be JSON");
    assert_eq!(document["$schema"], "http://json-schema.org/draft-07/schema#");
    assert_eq!(document["additionalProperties"], false);
    assert_eq!(
        document["properties"]["gender"],
        serde_json::json!({"type": "string", "enum": ["m", "f"]})
    );
    assert_eq!(
        document["properties"]["phone"]["pattern"],
        "\\d{3}-\\d{3}-\\d{4}"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn check_accepts_valid_instance_and_normalizes_order() {
    let dir = unique_temp_dir("check-ok");
    let defs = write_file(&dir, "defs.json", DEFINITIONS);
    let instance = write_file(
        &dir,
        "ann.json",
        r#"{"phone": "555-123-4567", "gender": "f", "name": "ann"}"#,
    );

    let output = rectypes(&["check", path_str(&defs), "Person", path_str(&instance), "--schema"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"name":"ann","gender":"f","phone":"555-123-4567"}"#
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn check_reads_instance_from_stdin() {
    let dir = unique_temp_dir("check-stdin");
    let defs = write_file(&dir, "defs.json", DEFINITIONS);

    let mut child = Command::new(env!("CARGO_BIN_EXE_rectypes"))
        .args(["--log-level", "error", "--format", "json", "check"])
        .arg(&defs)
        .args(["Person", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("check should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(br#"{"name": "bo", "gender": "m", "phone": "000-000-0000"}"#)
        .expect("stdin should be writable");
    let output = child.wait_with_output().expect("check should finish");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(r#""name":"bo""#));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn check_invalid_instance_returns_60() {
    let dir = unique_temp_dir("check-invalid");
    let defs = write_file(&dir, "defs.json", DEFINITIONS);
    let bad_phone = write_file(
        &dir,
        "bad.json",
        r#"{"name": "ann", "gender": "f", "phone": "oops"}"#,
    );
    let missing = write_file(&dir, "missing.json", r#"{"gender": "f", "phone": "555-123-4567"}"#);

    let output = rectypes(&["check", path_str(&defs), "Person", path_str(&bad_phone)]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("phone"));

    let output = rectypes(&["check", path_str(&defs), "Person", path_str(&missing)]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("name is a mandatory field of Person"));

    let output = rectypes(&[
        "check",
        path_str(&defs),
        "Person",
        path_str(&bad_phone),
        "--schema",
    ]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("validation failed for Person"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_type_returns_usage_error() {
    let dir = unique_temp_dir("unknown-type");
    let defs = write_file(&dir, "defs.json", DEFINITIONS);
    let instance = write_file(&dir, "x.json", "{}");

    let output = rectypes(&["check", path_str(&defs), "Nobody", path_str(&instance)]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown record type: Nobody"));

    let output = rectypes(&["schema", path_str(&defs), "Gender"]);
    assert_eq!(output.status.code(), Some(64));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn broken_definitions_return_usage_error() {
    let dir = unique_temp_dir("broken-defs");
    let defs = write_file(
        &dir,
        "defs.json",
        r#"{"types": [{"name": "Bad", "fields": [
            {"name": "n", "type": {"kind": "described", "of": "integer", "pattern": "\\d+"}}
        ]}]}"#,
    );

    let output = rectypes(&["types", path_str(&defs)]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("pattern"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = rectypes(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("rectypes {}", env!("CARGO_PKG_VERSION"))
    );

    let output = rectypes(&["version", "--extended"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("features: schema=true"));
}
