use clap::Parser;
use qb_core::errors::is_usage_error;

use super::*;

fn parse(args: &[&str]) -> QbecCommandRoot {
    QbecCommandRoot::try_parse_from(args).unwrap()
}

#[rstest]
fn test_conflicting_component_filters_are_a_usage_error() {
    let root = parse(&["qbec", "apply", "dev", "-c", "a", "-C", "b"]);
    let QbecSubcommand::Apply(args) = &root.subcommand else {
        panic!("expected apply");
    };

    let err = args.filter.to_filter().unwrap_err();
    assert!(is_usage_error(&err));
    assert_eq!(format!("{err}"), "cannot include as well as exclude components");
}

#[rstest]
fn test_filter_flags_round_trip() {
    let root = parse(&[
        "qbec", "diff", "dev", "-c", "svc", "-k", "cm", "-p", "ns1", "--include-cluster-objects", "true",
    ]);
    let QbecSubcommand::Diff(args) = &root.subcommand else {
        panic!("expected diff");
    };

    // different axes combine freely
    let filter = args.filter.to_filter().unwrap();
    assert!(filter.matches_parts(Some("svc"), "ConfigMap", Some("ns1"), Some(true), "default"));
    assert!(!filter.matches_parts(Some("svc"), "Secret", Some("ns1"), Some(true), "default"));
}

#[rstest]
fn test_global_flags_parse_anywhere() {
    let root = parse(&["qbec", "apply", "dev", "--root", "/some/app", "--yes", "--app-tag", "pr-12"]);
    assert_eq!(root.root.to_str(), Some("/some/app"));
    assert!(root.yes);
    assert_eq!(root.app_tag.as_deref(), Some("pr-12"));
}

#[rstest]
fn test_apply_defaults() {
    let root = parse(&["qbec", "apply", "dev"]);
    let QbecSubcommand::Apply(args) = &root.subcommand else {
        panic!("expected apply");
    };
    assert!(args.gc);
    assert!(!args.dry_run);
    assert_eq!(args.wait_timeout, "5m");

    let root = parse(&["qbec", "apply", "dev", "--gc", "false", "-n"]);
    let QbecSubcommand::Apply(args) = &root.subcommand else {
        panic!("expected apply");
    };
    assert!(!args.gc);
    assert!(args.dry_run);
}
