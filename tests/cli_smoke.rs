use assert_cmd::Command;
use serde_json::Value;
use std::io::Write;

fn futon() -> Command {
    let mut cmd = Command::cargo_bin("futon").unwrap();
    cmd.env_remove("FUTON_MAX_RETRIES")
        .env_remove("FUTON_RELOAD_RANGE")
        .env_remove("FUTON_WAIT_DELAY_MS")
        .env("RUST_LOG", "warn");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn config_show_prints_defaults() {
    let json = stdout_json(futon().args(["--output", "json", "config", "show"]));
    assert_eq!(json["max.retries"], 100);
    assert_eq!(json["reload.range"], 10);
    assert_eq!(json["wait.delay.ms"], 100);
}

#[test]
fn environment_overrides_settings() {
    let json = stdout_json(
        futon()
            .env("FUTON_MAX_RETRIES", "7")
            .args(["--output", "json", "config", "show"]),
    );
    assert_eq!(json["max.retries"], 7);
}

#[test]
fn settings_file_is_read() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "reload:\n  range: 4").unwrap();
    let path = file.path().to_str().unwrap().to_string();
    let json = stdout_json(futon().args(["--config", &path, "--output", "json", "config", "show"]));
    assert_eq!(json["reload.range"], 4);
}

#[test]
fn zero_max_retries_fails_validation() {
    futon()
        .env("FUTON_MAX_RETRIES", "0")
        .args(["config", "validate"])
        .assert()
        .failure();
}

#[test]
fn missing_settings_file_fails() {
    futon()
        .args(["--config", "/nonexistent/futon.yaml", "config", "validate"])
        .assert()
        .failure();
}

#[test]
fn simulate_reports_engine_activity() {
    let json = stdout_json(futon().args([
        "--output",
        "json",
        "simulate",
        "--fail-first",
        "4",
        "--reload-range",
        "2",
        "--no-wait",
    ]));
    assert_eq!(json["outcome"], "synchronized");
    assert_eq!(json["lookups"], 5);
    assert_eq!(json["sleeps"], 4);
    assert_eq!(json["reloads"], 2);
}

#[test]
fn simulate_nested_exhaustion() {
    let json = stdout_json(futon().args([
        "--output",
        "json",
        "simulate",
        "--fail-first",
        "100",
        "--max-retries",
        "3",
        "--layering",
        "nested",
        "--no-wait",
    ]));
    assert_eq!(json["outcome"], "element_not_found");
    assert_eq!(json["lookups"], 9);
}

#[test]
fn help_names_log_override() {
    let output = futon().arg("--help").assert().success().get_output().stdout.clone();
    let help = String::from_utf8_lossy(&output);
    assert!(help.contains("RUST_LOG"));
}

#[test]
fn async_engine_rejects_nested_layering() {
    let output = futon()
        .args(["simulate", "--engine", "async", "--layering", "nested", "--no-wait"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("blocking engine"));
}
