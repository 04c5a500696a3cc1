//! Prober CLI integration tests

use std::process::Command;

#[test]
fn test_prober_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "latency-probe", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Prober help should succeed");
    assert!(
        stdout.contains("Active TCP latency prober"),
        "Should show description"
    );
    assert!(stdout.contains("--config"), "Should show config option");
    assert!(stdout.contains("--output-dir"), "Should show output option");
    assert!(stdout.contains("--metrics-port"), "Should show metrics option");
    assert!(stdout.contains("--log-json"), "Should show log format option");
}

#[test]
fn test_prober_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "latency-probe", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Prober version should succeed");
    assert!(stdout.contains("latency-probe"), "Should show binary name");
}

#[test]
fn test_prober_rejects_missing_config_file() {
    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "latency-probe",
            "--",
            "--config",
            "/nonexistent/probe.toml",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(
        !output.status.success(),
        "Missing config file should fail before probing"
    );
}
