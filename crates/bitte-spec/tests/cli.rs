use assert_cmd::Command;
use eyre::Context as _;
use predicates::prelude::*;

fn bitte_spec() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bitte-spec"))
}

#[test]
fn example_output_validates() -> eyre::Result<()> {
    let out = bitte_spec()
        .arg("example")
        .output()
        .context("run bitte-spec example")?;
    assert!(out.status.success(), "example exited non-zero");

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("openapi.json");
    std::fs::write(&path, &out.stdout)?;

    bitte_spec()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("valid: "));
    Ok(())
}

#[test]
fn file_named_like_a_scheme_is_read_from_disk() -> eyre::Result<()> {
    let out = bitte_spec()
        .arg("example")
        .output()
        .context("run bitte-spec example")?;
    assert!(out.status.success(), "example exited non-zero");

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("http-api.json");
    std::fs::write(&path, &out.stdout)?;

    bitte_spec()
        .current_dir(dir.path())
        .args(["validate", "http-api.json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("valid: "));
    Ok(())
}

#[test]
fn invalid_spec_exits_non_zero_with_message() -> eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("openapi.json");
    std::fs::write(
        &path,
        r#"{
  "openapi": "3.0.0",
  "info": { "title": "Broken", "version": "1.0.0" },
  "paths": {},
  "x-mb": { "assistant": { "description": "d", "instructions": "i" } }
}"#,
    )?;

    bitte_spec()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Missing field x-mb.assistant.name expected string",
        ));
    Ok(())
}

#[test]
fn validate_json_prints_the_result_object() -> eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("openapi.json");
    std::fs::write(&path, "{ not json")?;

    let out = bitte_spec()
        .args(["validate", "--json"])
        .arg(&path)
        .output()
        .context("run bitte-spec validate --json")?;
    assert_eq!(out.status.code(), Some(1));

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).context("parse result json")?;
    assert_eq!(v.get("valid").and_then(serde_json::Value::as_bool), Some(false));
    assert_eq!(
        v.get("errorMessage").and_then(|x| x.as_str()),
        Some("Invalid spec format. Must be valid JSON string or object.")
    );
    assert_eq!(
        v.pointer("/errors/0/code").and_then(|x| x.as_str()),
        Some("INVALID_SPEC_FORMAT")
    );
    Ok(())
}

#[test]
fn validate_reads_stdin() {
    bitte_spec()
        .args(["validate", "-"])
        .write_stdin("[]")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("INVALID_DOCUMENT"));
}

#[test]
fn missing_file_is_an_error() {
    bitte_spec()
        .args(["validate", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not/here.json"));
}

#[test]
fn bad_config_is_reported() -> eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = dir.path().join("config.toml");
    std::fs::write(&cfg, "[fetch]\nmax_retries = \"many\"\n")?;
    let spec = dir.path().join("openapi.json");
    std::fs::write(&spec, "{}")?;

    bitte_spec()
        .args(["validate", "--config"])
        .arg(&cfg)
        .arg(&spec)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
    Ok(())
}

#[test]
fn schema_describes_the_extension() -> eyre::Result<()> {
    let out = bitte_spec()
        .arg("schema")
        .output()
        .context("run bitte-spec schema")?;
    assert!(out.status.success(), "schema exited non-zero");

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).context("parse schema json")?;
    assert!(v.pointer("/properties/assistant").is_some(), "schema: {v}");
    Ok(())
}
