use std::path::Path;
use std::process::Command;

#[test]
fn test_list_from_inside_posts_directory() {
    let output = Command::new(env!("CARGO_BIN_EXE_folio"))
        .args(&["list", "--project", "."])
        .current_dir(Path::new("testdata/site/posts"))
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!("September 2022", lines[0]);
    assert!(lines[1].contains("Rust for TypeScript developers"));
    assert!(lines[1].ends_with("[LogRocket]"));
    assert!(stdout.contains("March 2022"));
    assert!(stdout.contains("October 2021"));
}

#[test]
fn test_missing_project_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_folio"))
        .args(&["list", "--project", "."])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("folio.yaml"));
}
