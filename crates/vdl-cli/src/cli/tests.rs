use clap::Parser;

use super::{Cli, CliCommand};
use vdl_core::job::Quality;

#[test]
fn parses_fetch_with_options() {
    let cli = Cli::try_parse_from([
        "vdl",
        "fetch",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "--quality",
        "1080p",
        "--format",
        "mkv",
        "--timeout",
        "600",
        "--only",
        "3",
        "--json",
    ])
    .unwrap();

    match cli.command {
        CliCommand::Fetch {
            url,
            quality,
            format,
            timeout,
            only,
            json,
            ..
        } => {
            assert_eq!(url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
            assert_eq!(quality, Some(Quality::P1080));
            assert_eq!(format.as_deref(), Some("mkv"));
            assert_eq!(timeout, Some(600));
            assert_eq!(only, Some(3));
            assert!(json);
        }
        other => panic!("expected fetch, got {:?}", other),
    }
}

#[test]
fn fetch_rejects_unknown_quality() {
    let parsed = Cli::try_parse_from(["vdl", "fetch", "https://example.com", "--quality", "4k"]);
    assert!(parsed.is_err());
}

#[test]
fn parses_info_strategies_and_sweep() {
    assert!(matches!(
        Cli::try_parse_from(["vdl", "info", "https://youtu.be/dQw4w9WgXcQ"])
            .unwrap()
            .command,
        CliCommand::Info { .. }
    ));
    assert!(matches!(
        Cli::try_parse_from(["vdl", "strategies"]).unwrap().command,
        CliCommand::Strategies
    ));
    assert!(matches!(
        Cli::try_parse_from(["vdl", "sweep"]).unwrap().command,
        CliCommand::Sweep { watch: false }
    ));
    assert!(matches!(
        Cli::try_parse_from(["vdl", "sweep", "--watch"]).unwrap().command,
        CliCommand::Sweep { watch: true }
    ));
}

#[test]
fn fetch_requires_a_url() {
    assert!(Cli::try_parse_from(["vdl", "fetch"]).is_err());
}
