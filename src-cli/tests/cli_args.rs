use std::collections::HashMap;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use incident_tracker::cli::{resolve_config, Cli, Commands, ListArgs};
use itr_core::sort::SortMode;
use pretty_assertions::assert_eq;
use time::macros::datetime;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("incident-tracker").chain(args.iter().copied()))
        .expect("parse")
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn list_defaults_to_priority_sort() {
    let cli = parse(&["list", "--status", "Abierto"]);
    let Commands::List { status, sort, .. } = cli.command else {
        panic!("expected list");
    };
    assert_eq!(status.as_deref(), Some("Abierto"));
    assert_eq!(sort, "priority");
}

#[test]
fn list_args_build_filter_and_sort() {
    let args = ListArgs {
        category: Some("Red".to_string()),
        since: Some("2026-05-01".to_string()),
        sort: "oldest".to_string(),
        ..ListArgs::default()
    };
    let spec = args.filter_spec().expect("spec");
    assert_eq!(spec.category.as_deref(), Some("Red"));
    assert_eq!(spec.min_created_at, Some(datetime!(2026-05-01 00:00 UTC)));
    assert_eq!(args.sort_mode().expect("mode"), SortMode::Oldest);

    let bad_sort = ListArgs {
        sort: "alphabetical".to_string(),
        ..ListArgs::default()
    };
    assert_eq!(
        bad_sort.sort_mode().unwrap_err().code,
        "VALIDATION_INVALID_SORT_MODE"
    );

    let bad_date = ListArgs {
        since: Some("01/05/2026".to_string()),
        sort: "id".to_string(),
        ..ListArgs::default()
    };
    assert_eq!(bad_date.filter_spec().unwrap_err().code, "VALIDATION_INVALID_DATE");
}

#[test]
fn assign_without_technician_means_unassign() {
    let cli = parse(&["assign", "7"]);
    let Commands::Assign { id, technician } = cli.command else {
        panic!("expected assign");
    };
    assert_eq!(id, 7);
    assert_eq!(technician, None);
}

#[test]
fn flags_override_env_which_overrides_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("itr.toml");
    std::fs::write(
        &file,
        "base_url = \"http://file-host:8000/api\"\ntimeout_ms = 1500\ndata_dir = \"from-file\"\n",
    )
    .expect("write config");

    let env: HashMap<&str, &str> = [("ITR_TIMEOUT_MS", "3000"), ("ITR_DATA_DIR", "from-env")]
        .into_iter()
        .collect();
    let lookup = |k: &str| env.get(k).map(|v| v.to_string());

    let cli = parse(&["--config", file.to_str().expect("utf8 path"), "ping"]);
    let cfg = resolve_config(&cli, lookup).expect("config");
    assert_eq!(cfg.base_url, "http://file-host:8000/api");
    assert_eq!(cfg.timeout_ms, 3000);
    assert_eq!(cfg.data_dir, PathBuf::from("from-env"));

    let cli = parse(&[
        "--config",
        file.to_str().expect("utf8 path"),
        "--api-url",
        "https://flag-host/api/",
        "--data-dir",
        "from-flag",
        "ping",
    ]);
    let cfg = resolve_config(&cli, lookup).expect("config");
    assert_eq!(cfg.base_url, "https://flag-host/api");
    assert_eq!(cfg.data_dir, PathBuf::from("from-flag"));
}

#[test]
fn defaults_apply_without_file_or_env() {
    let cfg = resolve_config(&parse(&["whoami"]), no_env).expect("config");
    assert_eq!(cfg.base_url, "http://localhost:8000/api");
    assert!(cfg.session_store().path().ends_with("currentUser.json"));
}

#[test]
fn invalid_api_url_flag_is_rejected() {
    let cli = parse(&["--api-url", "localhost:8000", "ping"]);
    let err = resolve_config(&cli, no_env).unwrap_err();
    assert_eq!(err.code, "API_INVALID_BASE_URL");
}
