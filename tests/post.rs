use std::path::Path;
use std::process::{Command, Output};

/// Run `ugs-badge` in `dir` with no UGS settings inherited from the environment.
fn ugs_badge(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ugs-badge"))
        .args(args)
        .current_dir(dir)
        .env_remove("UGS_BADGE_CONFIG")
        .env_remove("UGS_API_URL")
        .env_remove("UGS_CREDENTIAL_ID")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

const FULL_POST: &[&str] = &[
    "post",
    "--project",
    "//UE5/Main/Game",
    "--changelist",
    "1234",
    "--result",
    "success",
    "--name",
    "Editor",
    "--url",
    "https://ci.example.com/job/1",
];

#[test]
fn post_without_api_url_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = ugs_badge(dir.path(), FULL_POST);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("neither the config file"), "stderr: {stderr}");
}

#[test]
fn post_with_missing_name_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = ugs_badge(
        dir.path(),
        &[
            "post",
            "--api-url",
            "http://127.0.0.1:9",
            "--project",
            "//UE5/Main/Game",
            "--changelist",
            "1234",
            "--result",
            "success",
            "--url",
            "https://ci.example.com/job/1",
        ],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no badge name specified"), "stderr: {stderr}");
}

#[test]
fn post_rejects_unknown_result() {
    let dir = tempfile::tempdir().unwrap();

    let mut args = FULL_POST.to_vec();
    args[6] = "exploded";
    let output = ugs_badge(dir.path(), &args);

    assert!(!output.status.success());
}

#[test]
fn post_rejects_changelist_beyond_server_range() {
    let dir = tempfile::tempdir().unwrap();

    let mut args = FULL_POST.to_vec();
    args[4] = "2147483648";
    args.extend(["--api-url", "http://127.0.0.1:9"]);
    let output = ugs_badge(dir.path(), &args);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2147483648"), "stderr: {stderr}");
}

#[test]
fn post_with_unknown_credential_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".ugs-badge.toml"),
        "[server]\napi_url = \"http://127.0.0.1:9\"\ncredential_id = \"ghost\"\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_ugs-badge"))
        .args(FULL_POST)
        .current_dir(dir.path())
        .env_remove("UGS_BADGE_CONFIG")
        .env_remove("UGS_API_URL")
        .env_remove("UGS_CREDENTIAL_ID")
        .env_remove("UGS_CREDENTIAL_GHOST")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not find a credential with id ghost"), "stderr: {stderr}");
}

#[test]
fn doctor_reports_missing_api_url_as_json() {
    let dir = tempfile::tempdir().unwrap();

    let output = ugs_badge(dir.path(), &["doctor", "--format", "json"]);

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let checks = report["checks"].as_array().unwrap();
    let api = checks.iter().find(|c| c["name"] == "api_url").unwrap();
    assert_eq!(api["status"], "fail");
}

#[test]
fn doctor_passes_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".ugs-badge.toml"),
        "[server]\napi_url = \"http://ugs.example.com/\"\n",
    )
    .unwrap();

    let output = ugs_badge(dir.path(), &["doctor", "--format", "json"]);

    assert!(
        output.status.success(),
        "stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let api = report["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "api_url")
        .unwrap()
        .clone();
    assert_eq!(api["detail"], "posting to http://ugs.example.com/api/build");
}
