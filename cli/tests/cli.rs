use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// project/ with a.txt, b.log, sub/c.py and a pruned .git directory.
fn create_project(tmp: &TempDir) -> PathBuf {
    let root = tmp.path().join("project");
    fs::create_dir_all(root.join("sub")).expect("Creating sub dir failed");
    fs::create_dir_all(root.join(".git")).expect("Creating .git dir failed");
    fs::write(root.join("a.txt"), "alpha").expect("Writing a.txt failed");
    fs::write(root.join("b.log"), "noise").expect("Writing b.log failed");
    fs::write(root.join("sub").join("c.py"), "print('c')").expect("Writing c.py failed");
    fs::write(root.join(".git").join("HEAD"), "ref").expect("Writing HEAD failed");
    root
}

fn dirbundle() -> Command {
    Command::cargo_bin("dirbundle").expect("Binary exists")
}

#[test]
fn generate_writes_bundle_and_reports_summary() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);
    let output = tmp.path().join("out").join("bundle.txt");

    dirbundle()
        .arg("generate")
        .arg("--root-dir")
        .arg(&root)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bundle saved to"));

    let document = fs::read_to_string(&output).expect("Bundle file exists");
    assert!(document.starts_with("Directory Tree:\nproject/\n├── sub/\n│   └── c.py\n└── a.txt\n"));
    assert!(document.contains("File: a.txt"));
    assert!(!document.contains("b.log"));
    assert!(!document.contains("HEAD"));
}

#[test]
fn generate_to_stdout_without_tree() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);

    dirbundle()
        .current_dir(tmp.path())
        .args(["gen", "--stdout", "--no-tree", "--root-dir"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("\n{}\nFile: a.txt", "=".repeat(40))))
        .stdout(predicate::str::contains("Directory Tree:").not());

    assert!(!tmp.path().join("giveAi.txt").exists());
}

#[test]
fn binary_file_produces_diagnostic_on_stderr() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);
    fs::write(root.join("blob.bin2"), [0xff_u8, 0xfe, 0xfd]).unwrap();

    dirbundle()
        .args(["generate", "--stdout", "--root-dir"])
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped binary file: blob.bin2"))
        .stdout(predicate::str::contains("File: blob.bin2").not());
}

#[test]
fn quiet_suppresses_diagnostics() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);
    fs::write(root.join("blob.bin2"), [0xff_u8, 0xfe, 0xfd]).unwrap();

    dirbundle()
        .args(["-q", "generate", "--stdout", "--root-dir"])
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn tree_command_honours_exclusions() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);

    dirbundle()
        .args(["tree", "--exclude-dir", "sub", "--root-dir"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::eq("project/\n└── a.txt\n"));
}

#[test]
fn no_default_excludes_reveals_git_and_logs() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);

    dirbundle()
        .args(["tree", "--no-default-excludes", "--root-dir"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("├── .git/"))
        .stdout(predicate::str::contains("b.log"));
}

#[test]
fn debug_json_lists_planned_files() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);

    let assert = dirbundle()
        .args(["debug", "-f", "json", "--root-dir"])
        .arg(&root)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Valid JSON");

    let files: Vec<&str> = parsed["files_to_include"]
        .as_array()
        .expect("files_to_include is an array")
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0], "a.txt");
    assert_eq!(parsed["effective_config"]["emit_tree"], true);
}

#[test]
fn invalid_pattern_exits_with_config_code() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);

    dirbundle()
        .args(["generate", "--stdout", "--exclude-file", "[z-a]", "--root-dir"])
        .arg(&root)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Glob Pattern Error"));
}

#[test]
fn unwritable_output_exits_with_filesystem_code() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "file, not dir").unwrap();

    dirbundle()
        .arg("generate")
        .arg("--root-dir")
        .arg(&root)
        .arg("-o")
        .arg(blocker.join("bundle.txt"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Directory Creation Error"));
}

#[test]
fn missing_root_is_an_error() {
    let tmp = TempDir::new().unwrap();

    dirbundle()
        .args(["tree", "--root-dir"])
        .arg(tmp.path().join("nope"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to determine root directory"));
}

#[test]
fn tree_from_inside_root_keeps_file_named_like_default_output() {
    let tmp = TempDir::new().unwrap();
    let root = create_project(&tmp);
    fs::write(root.join("giveAi.txt"), "my own notes").unwrap();

    dirbundle()
        .current_dir(&root)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("└── giveAi.txt"));

    dirbundle()
        .current_dir(&root)
        .args(["generate", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File: giveAi.txt"))
        .stdout(predicate::str::contains("my own notes"));
}
