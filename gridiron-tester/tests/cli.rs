use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "gridiron-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_gridiron-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("snapshot-resume"));
}

#[test]
fn cli_runs_smoke_with_a_share_code_and_json_report() {
    let exe = env!("CARGO_BIN_EXE_gridiron-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "smoke,schedule",
            "--iterations",
            "1",
            "--seeds",
            "2024-BLITZ42",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Gridiron Automated Tester"));

    let report = std::fs::read_to_string(output_path).expect("read report");
    let value: serde_json::Value = serde_json::from_str(&report).expect("json report");
    assert_eq!(value["failed"], 0);
    assert_eq!(value["results"][0]["seed_label"], "2024-BLITZ42");
}

#[test]
fn cli_rejects_unknown_seed_tokens() {
    let exe = env!("CARGO_BIN_EXE_gridiron-tester");
    let output = Command::new(exe)
        .args(["--seeds", "not-a-seed"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unrecognized seed token"));
}
