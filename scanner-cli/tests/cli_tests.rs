use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const MODES: &str = r#"
- name: DEFAULT
  endpoint: http://127.0.0.1:9/scan
- name: INVENTORY
  endpoint: http://127.0.0.1:9/inventory
  method: GET
  trigger: MODE-INV
  prefix_trigger: INV-
"#;

/// Modes directory plus an empty settings file, so the user's own config is never read
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("modes")).unwrap();
    fs::write(dir.path().join("modes").join("modes.yaml"), MODES).unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();
    dir
}

fn run_scanner(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let modes = dir.join("modes");
    let config = dir.join("config.toml");
    let mut child = Command::new(env!("CARGO_BIN_EXE_scanner"))
        .arg("--config")
        .arg(&config)
        .arg("--modes-dir")
        .arg(&modes)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start scanner");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_version_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_scanner"))
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_list_modes() {
    let dir = workspace();
    let output = run_scanner(dir.path(), &["--list-modes"], "");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("NAME"));
    assert!(stdout.contains("INVENTORY"));
    assert!(stdout.contains("http://127.0.0.1:9/inventory"));
    assert!(stdout.contains("INV-"));
}

#[test]
fn test_end_of_input_exits_cleanly() {
    let dir = workspace();
    let output = run_scanner(dir.path(), &[], "MODE-INV\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SCANNER CLI v"));
    assert!(stdout.contains("Switched mode to"));
}

#[test]
fn test_unknown_default_mode_fails() {
    let dir = workspace();
    let output = run_scanner(dir.path(), &["--default-mode", "MISSING"], "");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Default mode MISSING not found. Available: [DEFAULT, INVENTORY]"));
}

#[test]
fn test_missing_modes_dir_fails() {
    let dir = workspace();
    let config = dir.path().join("config.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_scanner"))
        .arg("--config")
        .arg(&config)
        .arg("--modes-dir")
        .arg(dir.path().join("absent"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent"));
}

#[test]
fn test_log_file_receives_events() {
    let dir = workspace();
    let log = dir.path().join("scanner.log");
    let log_arg = log.to_string_lossy().to_string();
    let output = run_scanner(dir.path(), &["-v", "--log-file", &log_arg], "MODE-INV\n");

    assert!(output.status.success());
    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("mode_switch"));
    assert!(contents.contains("shutdown"));
}
