use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const UNFORMATTED: &str = "Feature: test\n  test\n\nScenario:            scenario1\n  Given       whatever\n  Then                  whatever\n\"\"\"\nhello world\n\"\"\"\n\n";

const FORMATTED_AT_4: &str = "Feature: test\n    test\n\n    Scenario: scenario1\n        Given whatever\n        Then whatever\n            \"\"\"\n            hello world\n            \"\"\"\n\n";

fn run_ferkin(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ferkin"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to execute ferkin")
}

#[test]
fn format_rewrites_a_file_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("file1.feature"), UNFORMATTED).unwrap();

    let output = run_ferkin(&["format", "file1.feature", "-i", "4"], tmp.path());

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(tmp.path().join("file1.feature")).unwrap(),
        FORMATTED_AT_4
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("formatted: file1.feature"));
}

#[test]
fn format_processes_a_directory_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let nested = tmp.path().join("sub/dir");
    fs::create_dir_all(&nested).unwrap();
    fs::write(tmp.path().join("file1.feature"), UNFORMATTED).unwrap();
    fs::write(nested.join("file2.feature"), UNFORMATTED).unwrap();
    fs::write(tmp.path().join("ignored.txt"), "not gherkin").unwrap();

    let output = run_ferkin(&["format", ".", "-i", "4"], tmp.path());

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(tmp.path().join("file1.feature")).unwrap(),
        FORMATTED_AT_4
    );
    assert_eq!(
        fs::read_to_string(nested.join("file2.feature")).unwrap(),
        FORMATTED_AT_4
    );
    assert_eq!(fs::read_to_string(tmp.path().join("ignored.txt")).unwrap(), "not gherkin");
}

#[test]
fn check_fails_on_an_unformatted_file_without_touching_it() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("file1.feature"), UNFORMATTED).unwrap();

    let output = run_ferkin(&["check", "file1.feature"], tmp.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(
        "an error occurred with file \"file1.feature\" : file is not properly formatted"
    ));
    assert_eq!(
        fs::read_to_string(tmp.path().join("file1.feature")).unwrap(),
        UNFORMATTED
    );
}

#[test]
fn check_passes_a_formatted_tree() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("file1.feature"), FORMATTED_AT_4).unwrap();

    let output = run_ferkin(&["check", ".", "-i", "4"], tmp.path());

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn parse_errors_exit_nonzero_with_the_parser_message() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("broken.feature"),
        format!("whatever{UNFORMATTED}"),
    )
    .unwrap();

    let output = run_ferkin(&["check", "."], tmp.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parser errors:"));
    assert!(stderr.contains(
        "(1:1): expected: #EOF, #Language, #TagLine, #FeatureLine, #Comment, #Empty, \
         got 'whateverFeature: test'"
    ));
}

#[test]
fn missing_path_exits_nonzero() {
    let tmp = tempfile::tempdir().unwrap();
    let output = run_ferkin(&["check", "whatever/whatever"], tmp.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stat whatever/whatever:"));
}

#[test]
fn version_flag_prints_the_crate_version() {
    let tmp = tempfile::tempdir().unwrap();
    let output = run_ferkin(&["--version"], tmp.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_both_commands() {
    let tmp = tempfile::tempdir().unwrap();
    let output = run_ferkin(&["--help"], tmp.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("format"));
    assert!(stdout.contains("check"));
}
