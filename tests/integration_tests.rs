//! Binary-level smoke tests: help, catalogue listing, fixture-backed reports
//! and layout management against an isolated config file.

mod common;

use std::fs;

use common::{run_cli_case, write_fixtures};

fn empty_config(dir: &std::path::Path) -> String {
    let path = dir.join("clustermon.toml");
    fs::write(&path, "").expect("write config");
    path.to_string_lossy().into_owned()
}

#[test]
fn help_lists_subcommands() {
    let result = run_cli_case("help_lists_subcommands", &["--help"]);
    assert!(
        result.status.success(),
        "log: {}",
        result.log_path.display()
    );
    assert!(result.stdout.contains("Usage: clustermon"));
    for sub in ["monitor", "describe", "panels", "layouts"] {
        assert!(result.stdout.contains(sub), "missing {sub}");
    }
}

#[test]
fn version_flag_prints_version() {
    let result = run_cli_case("version_flag_prints_version", &["--version"]);
    assert!(result.status.success());
    assert!(result.stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn panels_lists_catalogue() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let result = run_cli_case("panels_lists_catalogue", &["--config", &config, "panels"]);
    assert!(
        result.status.success(),
        "log: {}",
        result.log_path.display()
    );
    assert!(result.stdout.starts_with("PANEL"));
    assert!(result.stdout.contains("cache-details"));
    assert!(result.stdout.contains("members"));
}

#[test]
fn describe_reads_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let fixtures = dir.path().join("fixtures");
    fs::create_dir_all(&fixtures).unwrap();
    write_fixtures(&fixtures);
    let fixtures = fixtures.to_string_lossy().into_owned();

    let result = run_cli_case(
        "describe_reads_fixtures",
        &["--config", &config, "--fixtures", &fixtures, "describe"],
    );
    assert!(
        result.status.success(),
        "log: {}",
        result.log_path.display()
    );
    assert!(
        result
            .stdout
            .starts_with("Cluster grid-a (14.1.2.0.0), 2 member(s)")
    );
    assert!(result.stdout.contains("Members\n-------\n"));
    assert!(result.stdout.contains("Services\n--------\n"));
    assert!(result.stdout.contains("PartitionedCache"));
    assert!(result.stdout.contains("orders"));
}

#[test]
fn describe_output_is_capped_once_to_max_height() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let fixtures = dir.path().join("fixtures");
    fs::create_dir_all(&fixtures).unwrap();
    write_fixtures(&fixtures);
    let fixtures = fixtures.to_string_lossy().into_owned();

    let full = run_cli_case(
        "describe_uncapped",
        &["--config", &config, "--fixtures", &fixtures, "describe"],
    );
    assert!(full.status.success(), "log: {}", full.log_path.display());
    let full_lines = full.stdout.lines().count();
    assert!(full_lines > 12, "fixture report too short: {full_lines}");

    let capped = run_cli_case(
        "describe_capped",
        &[
            "--config", &config, "--fixtures", &fixtures, "describe", "--max-height", "12",
        ],
    );
    assert!(capped.status.success(), "log: {}", capped.log_path.display());
    let lines: Vec<&str> = capped.stdout.lines().collect();
    assert_eq!(lines.len(), 9);
    assert!(lines[0].starts_with("Cluster grid-a"));
    let hidden = full_lines - 8;
    assert_eq!(lines[8], format!("…{hidden} more lines"));
    assert_eq!(capped.stdout.matches("more line").count(), 1);
}

#[test]
fn describe_single_panel_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let fixtures = dir.path().join("fixtures");
    fs::create_dir_all(&fixtures).unwrap();
    write_fixtures(&fixtures);
    let fixtures = fixtures.to_string_lossy().into_owned();

    let result = run_cli_case(
        "describe_single_panel_layout",
        &[
            "--config", &config, "--fixtures", &fixtures, "describe", "-l", "caches",
        ],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("Caches\n------\n"));
    assert!(!result.stdout.contains("Members\n"));
}

#[test]
fn layouts_add_list_remove_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());

    let added = run_cli_case(
        "layouts_add",
        &["--config", &config, "layouts", "add", "mine", "members:caches"],
    );
    assert!(added.status.success(), "log: {}", added.log_path.display());
    assert!(added.stdout.contains("Added layout mine"));
    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("members:caches"));

    let listed = run_cli_case("layouts_list", &["--config", &config, "layouts", "list"]);
    assert!(listed.status.success());
    let mine = listed
        .stdout
        .lines()
        .find(|l| l.starts_with("mine"))
        .expect("user layout listed");
    assert!(mine.contains("user"));

    let removed = run_cli_case(
        "layouts_remove",
        &["--config", &config, "layouts", "remove", "mine"],
    );
    assert!(removed.status.success());
    let listed = run_cli_case("layouts_relist", &["--config", &config, "layouts"]);
    assert!(!listed.stdout.lines().any(|l| l.starts_with("mine")));
}

#[test]
fn builtin_layout_names_are_reserved() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let result = run_cli_case(
        "builtin_layout_names_are_reserved",
        &["--config", &config, "layouts", "add", "default", "members"],
    );
    assert_eq!(result.status.code(), Some(1));
}

#[test]
fn removing_unknown_layout_is_a_user_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());
    let result = run_cli_case(
        "removing_unknown_layout_is_a_user_error",
        &["--config", &config, "layouts", "remove", "nope"],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("nope"));
}

#[test]
fn unknown_panels_fail_before_any_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());

    let monitor = run_cli_case(
        "unknown_panel_monitor",
        &["--config", &config, "monitor", "-l", "zzz"],
    );
    assert_eq!(monitor.status.code(), Some(1), "log: {}", monitor.log_path.display());
    assert!(monitor.stderr.contains("MON-1"));

    let describe = run_cli_case(
        "unknown_panel_describe",
        &["--config", &config, "describe", "-l", "members,zzz"],
    );
    assert_eq!(describe.status.code(), Some(1));
    assert!(describe.stderr.contains("zzz"));
}

#[test]
fn missing_explicit_config_is_a_user_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let result = run_cli_case(
        "missing_explicit_config_is_a_user_error",
        &["--config", &missing.to_string_lossy(), "panels"],
    );
    assert_eq!(result.status.code(), Some(1));
}
