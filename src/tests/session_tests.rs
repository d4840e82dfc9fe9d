//! # Session Scenarios
//!
//! These tests walk a session through the same commands a user would issue and
//! check what the engine was asked for. The scripted engine echoes render
//! arguments back as content, so `-b` and `-m` can be read straight off the screen.

use super::scripted_engine::{rendered_arg, scripted_engine};
use chrono::{DateTime, TimeZone, Utc};
use tide_browser_lib::config::DisplayConfig;
use tide_browser_lib::session::{Content, Session};
use tide_browser_lib::timezone::TimezoneCache;
use tide_browser_lib::{sort, DisplayMode};

const SEATTLE: &str = "Seattle, Puget Sound, Washington";
const HONOLULU: &str = "Honolulu, Oahu, Hawaii";

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 16, 12, 0, 0).unwrap()
}

/// Opening a session renders a text graph starting at the station's local time.
#[test]
fn open_renders_graph_in_station_local_time() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();

    let session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, noon()).unwrap();

    let content = session.content();
    assert_eq!(rendered_arg(content, "-m"), "g");
    assert_eq!(rendered_arg(content, "-b"), "2024-06-16 05:00");
    assert_eq!(rendered_arg(content, "-l"), SEATTLE);
    assert_eq!(rendered_arg(content, "-tw"), "79");
    assert_eq!(rendered_arg(content, "-gw"), "960");
}

/// Stepping moves six hours of absolute time and back again exactly.
#[test]
fn step_forward_then_backward_restores_instant() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let mut session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, noon()).unwrap();

    let forward = session.step_forward().clone();
    assert_eq!(rendered_arg(&forward, "-b"), "2024-06-16 11:00");
    assert_eq!(session.instant(), noon() + chrono::Duration::hours(6));

    let back = session.step_backward().clone();
    assert_eq!(rendered_arg(&back, "-b"), "2024-06-16 05:00");
    assert_eq!(session.instant(), noon());

    session.step_backward();
    assert_eq!(rendered_arg(session.content(), "-b"), "2024-06-15 23:00");
}

/// Switching stations keeps the moment and shows it on the new station's clock.
#[test]
fn set_station_uses_the_new_station_time_zone() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let mut session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, noon()).unwrap();

    let content = session.set_station(HONOLULU).unwrap().clone();

    assert_eq!(rendered_arg(&content, "-b"), "2024-06-16 02:00");
    assert_eq!(rendered_arg(&content, "-l"), HONOLULU);
    assert_eq!(session.instant(), noon());
    assert_eq!(session.mode(), DisplayMode::Graph);

    session.set_station("Botany Bay, Australia").unwrap();
    assert_eq!(rendered_arg(session.content(), "-b"), "2024-06-16 22:00");
}

/// Changing mode re-renders with the new code and leaves the instant alone.
#[test]
fn set_mode_changes_only_the_mode() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let mut session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, noon()).unwrap();

    session.set_mode(DisplayMode::CalendarAlternative);
    assert_eq!(rendered_arg(session.content(), "-m"), "C");
    assert_eq!(rendered_arg(session.content(), "-b"), "2024-06-16 05:00");

    session.set_mode(DisplayMode::Statistics);
    assert_eq!(rendered_arg(session.content(), "-m"), "s");
    assert_eq!(session.mode(), DisplayMode::Statistics);
}

/// An unknown station shows the engine's diagnostic and the session stays usable.
#[test]
fn failed_render_is_shown_and_recoverable() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let mut session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, noon()).unwrap();

    let content = session.set_station("Atlantis").unwrap().clone();
    match content {
        Content::Failure(message) => {
            assert_eq!(message, "tide exited with status 0 but produced no output")
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(session.station(), "Atlantis");
    assert_eq!(session.instant(), noon());

    session.set_station(SEATTLE).unwrap();
    assert_eq!(rendered_arg(session.content(), "-l"), SEATTLE);
}

/// A blank station name is refused and nothing changes.
#[test]
fn blank_station_switch_is_refused() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let mut session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, noon()).unwrap();
    let before = session.content().clone();

    assert!(session.set_station("   ").is_err());
    assert_eq!(session.station(), SEATTLE);
    assert_eq!(session.content(), &before);
}

/// Only the first render of a station asks the engine for its zone.
#[test]
fn time_zone_is_looked_up_once_per_station() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let mut session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, noon()).unwrap();

    session.step_forward();
    session.step_forward();
    session.set_mode(DisplayMode::Banner);
    session.refresh();

    assert_eq!(engine.runner().count_with("-ma"), 1);
    assert_eq!(engine.runner().count_with("-m"), 5);
    assert_eq!(timezones.get(SEATTLE).as_deref(), Some(":America/Los_Angeles"));
}

/// Sessions sharing a cache share lookups.
#[test]
fn cache_is_shared_between_sessions() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();

    Session::open(&engine, &timezones, DisplayConfig::default(), HONOLULU, noon()).unwrap();
    Session::open(&engine, &timezones, DisplayConfig::default(), HONOLULU, noon()).unwrap();

    assert_eq!(engine.runner().count_with("-ma"), 1);
    assert_eq!(engine.runner().invocations().len(), 3);
}

/// Graphs become images when the host can show them; other modes stay text.
#[test]
fn graph_prefers_images_when_supported() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let display = DisplayConfig { images: true };
    let mut session = Session::open(&engine, &timezones, display, SEATTLE, noon()).unwrap();

    assert!(matches!(session.content(), Content::Image(_)));
    assert_eq!(rendered_arg(session.content(), "-m"), "g");
    let invocations = engine.runner().invocations();
    assert_eq!(invocations.last().unwrap()[0], "-fp");

    session.set_mode(DisplayMode::PlainTimes);
    assert!(matches!(session.content(), Content::Text(_)));
    let invocations = engine.runner().invocations();
    assert_eq!(invocations.last().unwrap()[0], "-ft");
}

/// Jumping to a picked date and back to now.
#[test]
fn jump_to_sets_an_absolute_instant() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let mut session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, noon()).unwrap();

    let new_year = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
    session.jump_to(new_year);
    assert_eq!(rendered_arg(session.content(), "-b"), "2025-01-01 00:00");

    session.jump_to_now(noon());
    assert_eq!(session.instant(), noon());
    assert_eq!(rendered_arg(session.content(), "-b"), "2024-06-16 05:00");
}

/// Stepping past the last representable instant reports it and keeps the state.
#[test]
fn stepping_off_the_calendar_is_reported() {
    let engine = scripted_engine();
    let timezones = TimezoneCache::new();
    let last_evening = Utc.with_ymd_and_hms(262142, 12, 31, 20, 0, 0).unwrap();
    let mut session =
        Session::open(&engine, &timezones, DisplayConfig::default(), SEATTLE, last_evening)
            .unwrap();
    let renders = engine.runner().count_with("-m");

    match session.step_forward().clone() {
        Content::Failure(message) => {
            assert!(message.contains("outside the supported date range"))
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(session.instant(), last_evening);
    assert_eq!(engine.runner().count_with("-m"), renders);

    session.step_backward();
    assert_eq!(session.instant(), last_evening - chrono::Duration::hours(6));
    assert!(matches!(session.content(), Content::Text(_)));
}

/// The directory flow: fetch, sort by distance from a station, open the nearest other one.
#[test]
fn directory_to_session_flow() {
    let engine = scripted_engine();
    let mut directory = engine.list_locations().unwrap();
    assert_eq!(directory.records().count(), 4);

    sort::sort_by_distance_from(&mut directory, SEATTLE).unwrap();
    let names: Vec<&str> = directory.records().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            SEATTLE,
            "Tacoma, Commencement Bay, Washington",
            HONOLULU,
            "Botany Bay, Australia"
        ]
    );

    let timezones = TimezoneCache::new();
    let session =
        Session::open(&engine, &timezones, DisplayConfig::default(), names[1], noon()).unwrap();
    assert_eq!(rendered_arg(session.content(), "-b"), "2024-06-16 05:00");
}

/// The listing is requested wide enough that names never wrap.
#[test]
fn listing_uses_the_wide_width_hint() {
    let engine = scripted_engine();
    engine.list_locations().unwrap();
    assert_eq!(
        engine.runner().invocations()[0],
        vec!["-tw".to_string(), "110".to_string(), "-ml".to_string()]
    );
}
