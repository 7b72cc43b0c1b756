//! End-to-end tests for the berth binary.

use std::path::Path;

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

const CONTAINER: &str = "9a1b2c3d4e5f";

fn berth(config: &Path, store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("berth").unwrap();
    cmd.arg("--config")
        .arg(config)
        .arg("--store")
        .arg(store)
        .env_remove("RUST_LOG");
    cmd
}

fn workspace(endpoint: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("berth.toml"),
        "[aws]\naccesskey = \"access\"\nsecretkey = \"secret\"\n\n[docker]\ntimeout_secs = 5\n",
    )
    .unwrap();
    std::fs::write(
        temp.path().join("request.yaml"),
        format!(
            r#"id: AMS001
name: shop
inputs:
  - key: endpoint
    value: "{endpoint}"
components:
  - id: COM001
    name: web
    inputs:
      - key: source
        value: nginx:latest
      - key: domain
        value: example.com
"#
        ),
    )
    .unwrap();
    temp
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("berth")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("provisioners"));
}

#[test]
fn provisioners_lists_docker() {
    let temp = workspace("10.0.0.5:2375");
    berth(&temp.path().join("berth.toml"), &temp.path().join("store"))
        .arg("provisioners")
        .assert()
        .success()
        .stdout("docker\n");
}

#[test]
fn missing_request_file_fails() {
    let temp = workspace("10.0.0.5:2375");
    berth(&temp.path().join("berth.toml"), &temp.path().join("store"))
        .args(["create", "--request"])
        .arg(temp.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read request"));
}

#[test]
fn show_unknown_component_fails() {
    let temp = workspace("10.0.0.5:2375");
    berth(&temp.path().join("berth.toml"), &temp.path().join("store"))
        .args(["show", "COM404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("component not found"));
}

#[test]
fn create_show_delete_against_engine() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/containers/create")
            .query_param("name", "web.example.com")
            .json_body(json!({ "Image": "nginx:latest" }));
        then.status(201).json_body(json!({ "Id": CONTAINER, "Warnings": [] }));
    });
    let start = server.mock(|when, then| {
        when.method(POST).path(format!("/containers/{CONTAINER}/start"));
        then.status(204);
    });
    let inspect = server.mock(|when, then| {
        when.method(GET).path(format!("/containers/{CONTAINER}/json"));
        then.status(200).json_body(json!({
            "Id": CONTAINER,
            "State": { "Running": true, "Status": "running" },
            "NetworkSettings": { "IPAddress": "172.17.0.9" }
        }));
    });
    let kill = server.mock(|when, then| {
        when.method(POST).path(format!("/containers/{CONTAINER}/kill"));
        then.status(204);
    });

    let temp = workspace(&server.address().to_string());
    let config = temp.path().join("berth.toml");
    let store = temp.path().join("store");
    let request = temp.path().join("request.yaml");

    let output = berth(&config, &store)
        .arg("create")
        .arg("--request")
        .arg(&request)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let outcome: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(outcome["container_id"], CONTAINER);
    assert_eq!(outcome["ip"], "172.17.0.9");
    assert_eq!(outcome["hostname"], "web.example.com");
    assert_eq!(outcome["degraded"], json!([]));
    create.assert();
    start.assert();
    inspect.assert();

    berth(&config, &store)
        .args(["show", "COM001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("172.17.0.9"))
        .stdout(predicate::str::contains(CONTAINER));

    // The request file has no outputs; the recorded ID comes from the store.
    berth(&config, &store)
        .arg("delete")
        .arg("--request")
        .arg(&request)
        .arg("--from-store")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Container {CONTAINER} killed")));
    kill.assert();
}
