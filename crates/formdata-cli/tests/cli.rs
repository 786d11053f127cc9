use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("formdata"))
}

fn sample_payload() -> Vec<u8> {
    concat!(
        "------WebKitFormBoundary\r\n",
        "Content-Disposition: form-data; name=\"username\"\r\n",
        "\r\n",
        "john_doe\r\n",
        "------WebKitFormBoundary\r\n",
        "Content-Disposition: form-data; name=\"metadata\"\r\n",
        "Content-Type: application/json\r\n",
        "\r\n",
        "{\"age\":30}\r\n",
        "------WebKitFormBoundary--\r\n",
    )
    .as_bytes()
    .to_vec()
}

fn write_sample(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("payload.bin");
    std::fs::write(&path, sample_payload()).expect("write payload");
    path
}

#[test]
fn help_supports_decode_and_parse() {
    cmd().arg("decode").arg("--help").assert().success();
    cmd().arg("parse").arg("--help").assert().success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.bin");
    let report = temp.path().join("form.json");

    cmd()
        .arg("decode")
        .arg(missing)
        .arg("-b")
        .arg("----WebKitFormBoundary")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn stdout_outputs_report_json() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample(&temp);

    let assert = cmd()
        .arg("decode")
        .arg(input)
        .arg("-b")
        .arg("----WebKitFormBoundary")
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: Value = serde_json::from_str(&stdout).expect("valid json");

    assert_eq!(report["report_version"], 1);
    assert_eq!(report["tool"]["name"], "formdata");
    assert_eq!(report["fields"]["username"]["data"], "john_doe");
    assert_eq!(report["fields"]["metadata"]["data"]["age"], 30);
}

#[test]
fn content_type_header_supplies_boundary() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample(&temp);

    let assert = cmd()
        .arg("decode")
        .arg(input)
        .arg("--content-type")
        .arg("multipart/form-data; boundary=\"----WebKitFormBoundary\"")
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(report["fields"]["username"]["data"], "john_doe");
}

#[test]
fn content_type_without_boundary_fails_with_hint() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample(&temp);

    cmd()
        .arg("decode")
        .arg(input)
        .arg("--content-type")
        .arg("multipart/form-data")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("no boundary parameter").and(contains("hint:")));
}

#[test]
fn report_is_written_to_file() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample(&temp);
    let report = temp.path().join("out").join("form.json");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("-b")
        .arg("----WebKitFormBoundary")
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: report written"));

    let written = std::fs::read_to_string(&report).expect("read report");
    let json: Value = serde_json::from_str(&written).expect("valid json");
    assert_eq!(json["fields"]["username"]["data"], "john_doe");
}

#[test]
fn quiet_suppresses_status_line() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample(&temp);
    let report = temp.path().join("form.json");

    let assert = cmd()
        .arg("decode")
        .arg(input)
        .arg("-b")
        .arg("----WebKitFormBoundary")
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 stderr");
    assert!(stderr.is_empty(), "unexpected stderr: {stderr}");
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample(&temp);
    let report = temp.path().join("form.json");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("-b")
        .arg("----WebKitFormBoundary")
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn boundary_and_content_type_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample(&temp);

    cmd()
        .arg("decode")
        .arg(input)
        .arg("-b")
        .arg("tok")
        .arg("--content-type")
        .arg("multipart/form-data; boundary=tok")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample(&temp);

    cmd()
        .arg("decode")
        .arg(input)
        .arg("-b")
        .arg("----WebKitFormBoundary")
        .arg("--stdout")
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn malformed_payload_fails_with_decode_error() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("broken.bin");
    std::fs::write(&path, b"no boundary in here at all\r\n").expect("write payload");

    cmd()
        .arg("decode")
        .arg(path)
        .arg("-b")
        .arg("----WebKitFormBoundary")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("error:"));
}
