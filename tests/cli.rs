//! Integration tests for the emuctl CLI.
//!
//! These tests run the compiled binary and verify its output. Tests that write
//! and then exec fake tool scripts are serialized to avoid ETXTBSY races.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serial_test::serial;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Get emuctl command for testing.
///
/// Clears `EMUCTL_CONFIG` and `RUST_LOG` so the host environment cannot leak
/// into assertions.
fn emuctl() -> Command {
    let mut cmd = cargo_bin_cmd!("emuctl");
    cmd.env_remove("EMUCTL_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn running_as_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Write an executable fake style checker that records its arguments to
/// `$ARGS_OUT` and exits with `code`.
fn fake_checker(dir: &Path, name: &str, code: i32) {
    let path = dir.join(name);
    std::fs::write(
        &path,
        format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$ARGS_OUT\"\nexit {code}\n"),
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn python_project() -> assert_fs::TempDir {
    let project = assert_fs::TempDir::new().unwrap();
    project.child("setup.py").write_str("import setuptools\n").unwrap();
    project
        .child("keylime/cloud_verifier_tornado.py")
        .write_str("x = 1\n")
        .unwrap();
    project
        .child("keylime/cmd/verifier.py")
        .write_str("x = 1\n")
        .unwrap();
    project
        .child("test/test_restful.py")
        .write_str("x = 1\n")
        .unwrap();
    project.child("docs/conf.py").write_str("x = 1\n").unwrap();
    project
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
#[serial]
fn cli_no_args_shows_help() {
    emuctl()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
#[serial]
fn cli_help_flag_shows_help() {
    emuctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Install the TPM emulator service stack"))
        .stdout(predicate::str::contains("stylecheck"));
}

#[test]
#[serial]
fn cli_version_flag_shows_version() {
    emuctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("emuctl"));
}

#[test]
#[serial]
fn install_rejects_positional_arguments() {
    emuctl()
        .args(["install", "extra"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

// ============================================================================
// Install command tests
// ============================================================================

#[test]
#[serial]
fn install_requires_root() {
    if running_as_root() {
        eprintln!("Skipping install_requires_root: running as root");
        return;
    }
    let stage = assert_fs::TempDir::new().unwrap();

    emuctl()
        .arg("install")
        .arg("--root")
        .arg(stage.path())
        .assert()
        .code(1)
        .stderr(predicate::eq("This script must be run as root\n"));

    assert_eq!(std::fs::read_dir(stage.path()).unwrap().count(), 0);
}

#[test]
#[serial]
fn install_dry_run_lists_plan_without_changes() {
    let stage = assert_fs::TempDir::new().unwrap();

    emuctl()
        .args(["--dry-run", "install", "--root"])
        .arg(stage.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("tpm2-abrmd.conf"))
        .stdout(predicate::str::contains("Would enable tpm_emulator.service"))
        .stdout(predicate::str::contains("Would enable tpm2-abrmd.service"))
        .stdout(predicate::str::contains(
            "Would start keylime_ima_emulator.service",
        ))
        .stdout(predicate::str::contains("Would start tpm_emulator.service").not());

    assert_eq!(std::fs::read_dir(stage.path()).unwrap().count(), 0);
}

#[test]
#[serial]
fn install_help_shows_options() {
    emuctl()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--root"))
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("--backend"));
}

// ============================================================================
// Stylecheck command tests
// ============================================================================

#[test]
#[serial]
fn stylecheck_without_checker_fails() {
    let empty_bin = assert_fs::TempDir::new().unwrap();
    let project = python_project();

    emuctl()
        .arg("stylecheck")
        .env("PATH", empty_bin.path())
        .current_dir(project.path())
        .assert()
        .code(1)
        .stderr(predicate::eq("Either pycodestyle-3 or pep8 is required\n"));
}

#[test]
#[serial]
fn stylecheck_forwards_checker_status_and_arguments() {
    let bin = assert_fs::TempDir::new().unwrap();
    fake_checker(bin.path(), "pycodestyle-3", 3);
    let project = python_project();
    let args_out = project.path().join("args.txt");

    emuctl()
        .arg("stylecheck")
        .env("PATH", bin.path())
        .env("ARGS_OUT", &args_out)
        .current_dir(project.path())
        .assert()
        .code(3);

    let recorded = std::fs::read_to_string(&args_out).unwrap();
    let lines: Vec<&str> = recorded.lines().collect();
    assert_eq!(
        lines,
        vec![
            "--max-line-length=2000",
            "--ignore=E741,W503",
            "setup.py",
            "keylime/cloud_verifier_tornado.py",
            "keylime/cmd/verifier.py",
            "test/test_restful.py",
        ]
    );
}

#[test]
#[serial]
fn pep8_alias_falls_back_to_legacy_name() {
    let bin = assert_fs::TempDir::new().unwrap();
    fake_checker(bin.path(), "pep8", 0);
    let project = python_project();
    let args_out = project.path().join("args.txt");

    emuctl()
        .arg("pep8")
        .env("PATH", bin.path())
        .env("ARGS_OUT", &args_out)
        .current_dir(project.path())
        .assert()
        .success();

    assert!(args_out.exists());
}

#[test]
#[serial]
fn stylecheck_dry_run_does_not_execute() {
    let bin = assert_fs::TempDir::new().unwrap();
    fake_checker(bin.path(), "pycodestyle-3", 5);
    let project = python_project();
    let args_out = project.path().join("args.txt");

    emuctl()
        .args(["stylecheck", "--dry-run"])
        .env("PATH", bin.path())
        .env("ARGS_OUT", &args_out)
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Would run:"))
        .stdout(predicate::str::contains("pycodestyle-3"))
        .stdout(predicate::str::contains("--max-line-length=2000"));

    assert!(!args_out.exists());
}

// ============================================================================
// Config command tests
// ============================================================================

#[test]
#[serial]
fn config_show_prints_effective_json() {
    let output = emuctl().args(["config", "show"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["install"]["policy_file"], "tpm2-abrmd.conf");
    assert_eq!(json["install"]["unit_mode"], 0o644);
    assert_eq!(json["stylecheck"]["max_line_length"], 2000);
}

#[test]
#[serial]
fn config_file_overrides_defaults() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("emuctl.json");
    config
        .write_str(r#"{"stylecheck": {"max_line_length": 79, "ignore": ["E501"]}}"#)
        .unwrap();
    let bin = assert_fs::TempDir::new().unwrap();
    fake_checker(bin.path(), "pep8", 0);
    let project = python_project();

    emuctl()
        .args(["--dry-run", "stylecheck"])
        .env("EMUCTL_CONFIG", config.path())
        .env("PATH", bin.path())
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-line-length=79"))
        .stdout(predicate::str::contains("--ignore=E501"));
}

#[test]
#[serial]
fn invalid_config_is_reported() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("emuctl.json");
    config
        .write_str(r#"{"install": {"start_units": ["nope.service"]}}"#)
        .unwrap();

    emuctl()
        .arg("--config")
        .arg(config.path())
        .args(["config", "show"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error:"))
        .stderr(predicate::str::contains("nope.service"));
}

#[test]
#[serial]
fn config_schema_describes_fields() {
    emuctl()
        .args(["config", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_line_length"))
        .stdout(predicate::str::contains("bus_reload_command"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
#[serial]
fn completions_bash_mentions_binary() {
    emuctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("emuctl"));
}
