// tests/cli_init_test.rs
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_battery-relay"))
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("battery-relay.toml");

    let output = Command::new(binary())
        .arg("init")
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to run command");

    assert!(
        output.status.success(),
        "Command failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(config_path.exists(), "Config file was not created");

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[broker]"));
    assert!(content.contains("telemetry_ingest = \"subCarData\""));
    assert!(content.contains("history_tip = \"subHistoryTip\""));
}

#[test]
fn test_init_fails_if_exists_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("battery-relay.toml");
    fs::write(&config_path, "existing").unwrap();

    let output = Command::new(binary())
        .arg("init")
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to run command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"), "stderr: {}", stderr);
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "existing");
}

#[test]
fn test_init_with_force_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("battery-relay.toml");
    fs::write(&config_path, "existing").unwrap();

    let output = Command::new(binary())
        .args(["init", "--force"])
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to run command");

    assert!(output.status.success());
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[topics]"));
}

#[test]
fn test_check_prints_routing_table() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("relay.toml");
    fs::write(
        &config_path,
        "[topics]\nbattery_history_query = \"battery/history\"\n",
    )
    .unwrap();

    let output = Command::new(binary())
        .args(["check", "--config"])
        .arg(&config_path)
        .env_remove("BATTERY_RELAY_CONFIG")
        .output()
        .expect("Failed to run command");

    assert!(
        output.status.success(),
        "Command failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("battery/history -> subAllMsg"), "stdout: {}", stdout);
    assert!(stdout.contains("subCarData"));
}

#[test]
fn test_check_rejects_shared_topics() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("relay.toml");
    fs::write(&config_path, "[topics]\nstatus_ingest = \"subCarData\"\n").unwrap();

    let output = Command::new(binary())
        .args(["check", "--config"])
        .arg(&config_path)
        .output()
        .expect("Failed to run command");

    assert!(!output.status.success());
}
