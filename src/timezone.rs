//! # Station Time Zones
//!
//! The engine's `-b` start time is read in the *station's* local civil time, so every
//! render first needs the station's zone. The engine reports it in its "about" mode
//! as a line such as:
//!
//! ```text
//! Time zone                  :America/Los_Angeles
//! ```
//!
//! Lookups are memoized in a [`TimezoneCache`] for as long as the cache lives. Only
//! successes are stored: a station the engine failed to describe is asked about
//! again next time.

use crate::engine::{decode_latin1, engine_arg, CommandRunner, Engine, START_FORMAT};
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Label the engine puts in front of the zone rule
const TIME_ZONE_LABEL: &str = "Time zone";

/// Station name → zone rule, append-only.
#[derive(Debug, Default)]
pub struct TimezoneCache {
    entries: Mutex<HashMap<String, String>>,
}

impl TimezoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached rule for a station, without asking the engine.
    pub fn get(&self, station: &str) -> Option<String> {
        self.lock().get(station).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The station's zone rule, from the cache or from one engine query.
    pub fn resolve<R: CommandRunner>(&self, engine: &Engine<R>, station: &str) -> Option<String> {
        if let Some(rule) = self.get(station) {
            debug!(station, rule = %rule, "time zone cache hit");
            return Some(rule);
        }

        let rule = query_timezone(engine, station)?;
        self.lock().insert(station.to_string(), rule.clone());
        Some(rule)
    }
}

/// Ask the engine for a station's zone rule. Never touches a cache.
pub fn query_timezone<R: CommandRunner>(engine: &Engine<R>, station: &str) -> Option<String> {
    let output = match engine.run(vec!["-ma".into(), "-l".into(), engine_arg(station)]) {
        Ok(output) => output,
        Err(e) => {
            warn!(station, error = %e, "could not run engine for time zone lookup");
            return None;
        }
    };

    if output.exit_code != Some(0) {
        warn!(station, exit_code = ?output.exit_code, "time zone lookup failed");
        return None;
    }

    let mut text = decode_latin1(&output.stdout);
    text.push('\n');
    text.push_str(&decode_latin1(&output.stderr));

    let rule = parse_timezone_line(&text).map(str::to_string);
    if rule.is_none() {
        warn!(station, "engine output has no time zone line");
    }
    rule
}

/// Find the `Time zone` line and return the rule after the label.
pub fn parse_timezone_line(text: &str) -> Option<&str> {
    text.lines()
        .find_map(|line| line.strip_prefix(TIME_ZONE_LABEL))
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
}

/// Interpret a zone rule. The engine writes IANA names with a leading `:`.
pub fn parse_rule(rule: &str) -> Option<Tz> {
    rule.trim().trim_start_matches(':').parse::<Tz>().ok()
}

/// Format `instant` as the engine's start argument in the zone named by `rule`.
///
/// Without a usable rule the host's local zone is used.
pub fn local_start(instant: DateTime<Utc>, rule: Option<&str>) -> String {
    match rule.map(|r| (r, parse_rule(r))) {
        Some((_, Some(zone))) => instant.with_timezone(&zone).format(START_FORMAT).to_string(),
        Some((rule, None)) => {
            warn!(rule, "unrecognized time zone rule, using local time");
            instant.with_timezone(&Local).format(START_FORMAT).to_string()
        }
        None => instant.with_timezone(&Local).format(START_FORMAT).to_string(),
    }
}
