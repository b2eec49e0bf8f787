use std::fs;
use std::process::Command;

fn depthgen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_depthgen"))
}

#[test]
fn missing_input_dir_fails() {
    let output = depthgen().output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT_DIR"));
}

#[test]
fn nonexistent_input_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = depthgen().arg(dir.path().join("nope")).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn empty_input_dir_reports_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();

    let output = depthgen().arg(dir.path()).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("No images found in"));
    assert!(dir.path().join("output").is_dir());
    assert_eq!(fs::read_dir(dir.path().join("output")).unwrap().count(), 0);
}

#[test]
fn rejects_unknown_device() {
    let dir = tempfile::tempdir().unwrap();
    let output = depthgen()
        .arg(dir.path())
        .args(["--device", "tpu"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn invalid_quality_fails_even_without_images() {
    let dir = tempfile::tempdir().unwrap();

    let output = depthgen()
        .arg(dir.path())
        .args(["--photo-quality", "0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("No images found"));
    assert!(!dir.path().join("output").exists());
}
