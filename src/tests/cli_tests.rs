//! Command-line parsing for the binary.

use crate::{parse_browse_command, parse_utc, Args, BrowseCommand, Commands, SortOrder};
use chrono::{TimeZone, Utc};
use clap::Parser;
use std::path::PathBuf;
use tide_browser_lib::DisplayMode;

#[test]
fn list_defaults_to_engine_order() {
    let args = Args::try_parse_from(["tide-browser", "list"]).unwrap();
    assert_eq!(
        args.command,
        Commands::List {
            sort: SortOrder::Engine,
            from: None,
            json: false
        }
    );
}

#[test]
fn list_accepts_distance_from_a_station() {
    let args = Args::try_parse_from([
        "tide-browser",
        "list",
        "--sort",
        "distance",
        "--from",
        "Hilo, Hawaii",
    ])
    .unwrap();
    assert_eq!(
        args.command,
        Commands::List {
            sort: SortOrder::Distance,
            from: Some("Hilo, Hawaii".to_string()),
            json: false
        }
    );
}

#[test]
fn show_parses_mode_codes_and_instants() {
    let args = Args::try_parse_from([
        "tide-browser",
        "--verbose",
        "show",
        "-s",
        "Hilo, Hawaii",
        "-m",
        "C",
        "--at",
        "2024-06-16 12:30",
    ])
    .unwrap();

    assert!(args.verbose);
    assert_eq!(
        args.command,
        Commands::Show {
            station: Some("Hilo, Hawaii".to_string()),
            mode: DisplayMode::CalendarAlternative,
            at: Some(Utc.with_ymd_and_hms(2024, 6, 16, 12, 30, 0).unwrap()),
            image: None,
        }
    );
}

#[test]
fn show_defaults_to_graph() {
    let args = Args::try_parse_from(["tide-browser", "show"]).unwrap();
    match args.command {
        Commands::Show { mode, station, .. } => {
            assert_eq!(mode, DisplayMode::Graph);
            assert_eq!(station, None);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn show_rejects_unknown_modes() {
    assert!(Args::try_parse_from(["tide-browser", "show", "-m", "tabular"]).is_err());
    assert!(Args::try_parse_from(["tide-browser", "show", "--at", "noon"]).is_err());
}

#[test]
fn init_config_has_a_default_path() {
    let args = Args::try_parse_from(["tide-browser", "init-config"]).unwrap();
    assert_eq!(
        args.command,
        Commands::InitConfig {
            path: PathBuf::from("tide-browser.toml")
        }
    );
}

#[test]
fn browse_commands() {
    assert_eq!(parse_browse_command("f"), Ok(Some(BrowseCommand::Forward)));
    assert_eq!(parse_browse_command(" b "), Ok(Some(BrowseCommand::Backward)));
    assert_eq!(parse_browse_command(""), Ok(None));
    assert_eq!(
        parse_browse_command("m medium-rare"),
        Ok(Some(BrowseCommand::Mode(DisplayMode::MediumRare)))
    );
    assert_eq!(
        parse_browse_command("s  Honolulu, Oahu, Hawaii "),
        Ok(Some(BrowseCommand::Station(
            "Honolulu, Oahu, Hawaii".to_string()
        )))
    );
    assert_eq!(
        parse_browse_command("j 2025-01-01 08:00"),
        Ok(Some(BrowseCommand::Jump(
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
        )))
    );
    assert_eq!(parse_browse_command("q"), Ok(Some(BrowseCommand::Quit)));
}

#[test]
fn browse_rejects_bad_input() {
    assert!(parse_browse_command("s").is_err());
    assert!(parse_browse_command("m sideways").is_err());
    assert!(parse_browse_command("j tomorrow").is_err());
    assert!(parse_browse_command("x").is_err());
}

#[test]
fn utc_instants_need_minutes() {
    assert!(parse_utc("2024-06-16 12:30").is_ok());
    assert!(parse_utc("2024-06-16").is_err());
}
