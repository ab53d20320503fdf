//! Integration tests for the `rulekit` binary.
//!
//! Each test launches the binary via `assert_cmd`, writes any required
//! fixture files to a temp directory, and asserts on exit code + output.

use std::io::Write;
use std::os::unix::net::UnixDatagram;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rulekit() -> Command {
    Command::cargo_bin("rulekit").expect("binary not found")
}

/// Write `contents` to a temporary .json file and return it.
fn definition_file(contents: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const MAP_STAGE: &str = r#"[
    {"map": {"normalized": "yes"}}
]"#;

const CHECK_AND_MAP_STAGE: &str = r#"[
    {
        "check": [{"message": "+exists"}],
        "map": {"tagged": "yes"}
    }
]"#;

// ---------------------------------------------------------------------------
// compile
// ---------------------------------------------------------------------------

#[test]
fn compile_prints_operator_tree() {
    let def = definition_file(MAP_STAGE);
    rulekit()
        .arg("compile")
        .arg(def.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("chain: stage.normalize"))
        .stdout(predicate::str::contains("and: subblock"))
        .stdout(predicate::str::contains("term: map.value[normalized]"));
}

#[test]
fn compile_rejects_wrong_definition_shape() {
    let def = definition_file(r#"{"map": {}}"#);
    rulekit()
        .arg("compile")
        .arg(def.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "invalid definition type: expected \"array\"",
        ));
}

#[test]
fn compile_reports_block_context_for_unknown_operator() {
    let def = definition_file(r#"[{"enrich": {}}]"#);
    rulekit()
        .arg("compile")
        .arg(def.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Stage block \"enrich\" building failed: unknown operator: stage.enrich",
        ));
}

#[test]
fn compile_rejects_empty_helper_argument() {
    let def = definition_file(r#"[{"map": {"ar_write.result": "+ar_write/"}}]"#);
    rulekit()
        .arg("compile")
        .arg(def.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a non-empty argument"));
}

#[test]
fn compile_missing_file_fails() {
    rulekit()
        .arg("compile")
        .arg("/no/such/definition.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading"));
}

// ---------------------------------------------------------------------------
// eval
// ---------------------------------------------------------------------------

#[test]
fn eval_single_event_flag() {
    let def = definition_file(MAP_STAGE);
    rulekit()
        .arg("eval")
        .arg(def.path())
        .arg("--event")
        .arg(r#"{"message": "hello"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""normalized":"yes""#))
        .stdout(predicate::str::contains(r#""message":"hello""#));
}

#[test]
fn eval_ndjson_stdin_preserves_order() {
    let def = definition_file(CHECK_AND_MAP_STAGE);
    let output = rulekit()
        .arg("eval")
        .arg(def.path())
        .write_stdin("{\"message\": \"a\"}\n{\"message\": \"b\"}\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines: Vec<&str> = std::str::from_utf8(&output)
        .unwrap()
        .lines()
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(r#""message":"a""#));
    assert!(lines[1].contains(r#""message":"b""#));
    assert!(lines.iter().all(|l| l.contains(r#""tagged":"yes""#)));
}

#[test]
fn eval_invalid_event_json_fails() {
    let def = definition_file(MAP_STAGE);
    rulekit()
        .arg("eval")
        .arg(def.path())
        .arg("--event")
        .arg("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON event"));
}

#[test]
fn eval_delivers_active_response_to_queue_socket() {
    let dir = tempfile::tempdir().unwrap();
    let queue_path = dir.path().join("ar");
    let socket = UnixDatagram::bind(&queue_path).unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let def = definition_file(r#"[{"map": {"ar_write.result": "+ar_write/block-host\n"}}]"#);
    rulekit()
        .arg("eval")
        .arg(def.path())
        .arg("--ar-queue")
        .arg(&queue_path)
        .arg("--event")
        .arg(r#"{"src": "10.0.0.1"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""result":true"#));

    let mut buf = [0u8; 1024];
    let n = socket.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"block-host\n");
}

#[test]
fn eval_transport_failure_degrades_to_false_outcome() {
    // nothing listens at the queue path: the event still comes out, with
    // a false outcome recorded
    let dir = tempfile::tempdir().unwrap();
    let def = definition_file(r#"[{"map": {"ar_write.result": "+ar_write/cmd\n"}}]"#);
    rulekit()
        .arg("eval")
        .arg(def.path())
        .arg("--ar-queue")
        .arg(dir.path().join("unbound"))
        .arg("--event")
        .arg("{}")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""result":false"#));
}
