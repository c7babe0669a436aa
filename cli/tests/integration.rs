use std::process::Command;

use tempfile::tempdir;

fn fontctl() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fontctl"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_font_file_exits_with_error_prefix() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("missing.ttf");

    let output = fontctl()
        .arg("getname")
        .arg(&missing)
        .output()
        .expect("run fontctl");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error - "), "stderr: {stderr}");
    assert!(stderr.contains("missing.ttf"), "stderr: {stderr}");
}

#[test]
fn directory_is_not_a_font_file() {
    let tmp = tempdir().expect("tempdir");

    let output = fontctl()
        .arg("getname")
        .arg(tmp.path())
        .output()
        .expect("run fontctl");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error - "), "stderr: {stderr}");
}

#[test]
fn usage_errors_exit_with_one() {
    for args in [
        &[][..],
        &["install"][..],
        &["preview", "font", "Arial"][..],
        &["frobnicate"][..],
    ] {
        let output = fontctl().args(args).output().expect("run fontctl");
        assert_eq!(output.status.code(), Some(1), "fontctl {args:?}");
        assert!(!output.stderr.is_empty(), "fontctl {args:?}");
    }
}

#[test]
fn version_exits_with_zero() {
    let output = fontctl().arg("--version").output().expect("run fontctl");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("fontctl "));
}

#[test]
fn mddocs_prints_markdown_reference() {
    let output = fontctl().arg("mddocs").output().expect("run fontctl");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# fontctl"));
    assert!(stdout.contains("## fontctl install"));
    assert!(stdout.contains("## fontctl preview"));
}

#[test]
fn help_hides_mddocs() {
    let output = fontctl().arg("--help").output().expect("run fontctl");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("install"));
    assert!(stdout.contains("getname"));
    assert!(!stdout.contains("mddocs"));
}
