//! # Tide Browser Core Library
//!
//! This library drives an external tide prediction engine (XTide's `tide` binary)
//! and turns its plain-text output into something a host shell can browse. It never
//! computes tides itself: every prediction comes from the engine subprocess.
//!
//! ## Design Philosophy
//!
//! ### One Encoding Boundary
//! The engine emits its text in ISO-8859-1 regardless of the caller's locale. All
//! bytes that cross the process boundary go through [`engine::decode_latin1`] and
//! [`engine::encode_latin1`], and the child always runs with `LANG=C`.
//!
//! ### Pure Parsing, Blocking I/O
//! - **Parsing**: one line at a time, no I/O ([`directory::parse_location_line`])
//! - **Sorting**: stable, in-place reorders of the directory body ([`sort`])
//! - **I/O**: synchronous subprocess calls behind the [`engine::CommandRunner`] trait,
//!   so tests can script the engine
//!
//! ### Data Flow
//! 1. **Directory**: `tide -tw 110 -ml` → [`LocationDirectory`] → sort → pick a station
//! 2. **Session**: station + instant + display mode → [`session::Session`]
//! 3. **Render**: resolve the station's time zone (cached) → `tide -ft -m g ...` → content
//!
//! ## Core Types
//!
//! - [`LocationRecord`]: a single station with its coordinates in radians
//! - [`DirectoryLine`]: one line of the engine's listing, station or not
//! - [`LocationDirectory`]: the whole listing, header kept apart from the sortable body

use serde::Serialize;

pub mod config;
pub mod directory;
pub mod display_mode;
pub mod engine;
pub mod error;
pub mod logging;
pub mod session;
pub mod sort;
pub mod timezone;

pub use display_mode::DisplayMode;
pub use error::TideError;

/// Whether a station carries its own harmonic constants or is derived from one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StationKind {
    /// `Ref` in the listing
    Reference,
    /// `Sub` in the listing
    Subordinate,
}

impl StationKind {
    /// The marker token the engine prints for this kind.
    pub fn marker(self) -> &'static str {
        match self {
            StationKind::Reference => "Ref",
            StationKind::Subordinate => "Sub",
        }
    }
}

/// A single tide prediction station.
///
/// Coordinates are stored in radians, north and east positive:
/// - `latitude` in [-π/2, π/2]
/// - `longitude` in [-π, π]
///
/// The name is kept exactly as the engine prints it, including any trailing
/// annotation such as `(2)` or ` - READ flaterco.com/pol.html`. The engine
/// recognizes stations by that full name.
///
/// # Example
/// ```
/// use tide_browser_lib::directory::parse_location_line;
///
/// let record = parse_location_line("Botany Bay, Australia        Ref 33.9833 S, 151.2167 E")
///     .unwrap();
/// assert_eq!(record.name, "Botany Bay, Australia");
/// assert!(record.latitude < 0.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocationRecord {
    /// Full station name as the engine knows it
    pub name: String,
    /// Reference or subordinate station
    pub kind: StationKind,
    /// Latitude in radians
    pub latitude: f64,
    /// Longitude in radians
    pub longitude: f64,
}

impl LocationRecord {
    /// `(latitude, longitude)` in radians.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// One line of the engine's station listing.
///
/// Lines that do not match the station pattern are kept verbatim so the listing
/// can be shown exactly as the engine produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectoryLine {
    /// A station line, with the raw text it was parsed from
    Location { record: LocationRecord, raw: String },
    /// Anything else: column headings, rulers, malformed entries
    Other(String),
}

impl DirectoryLine {
    /// The line exactly as the engine printed it.
    pub fn raw(&self) -> &str {
        match self {
            DirectoryLine::Location { raw, .. } => raw,
            DirectoryLine::Other(raw) => raw,
        }
    }

    /// The parsed station, if this line is one.
    pub fn record(&self) -> Option<&LocationRecord> {
        match self {
            DirectoryLine::Location { record, .. } => Some(record),
            DirectoryLine::Other(_) => None,
        }
    }
}

/// The full station listing from one engine invocation.
///
/// Everything before the first station line is the header; the rest is the body.
/// Sorting in [`sort`] reorders the body only and never adds or drops a line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationDirectory {
    /// Leading lines before the first station
    pub header: Vec<String>,
    /// Data lines, in engine order until a sort is applied
    pub body: Vec<DirectoryLine>,
}

impl LocationDirectory {
    /// Iterate over the station records in the body, in current order.
    pub fn records(&self) -> impl Iterator<Item = &LocationRecord> {
        self.body.iter().filter_map(DirectoryLine::record)
    }

    /// Look up a station by its exact name.
    pub fn find(&self, name: &str) -> Option<&LocationRecord> {
        self.records().find(|record| record.name == name)
    }

    /// All lines, header first, as they would be displayed.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.header
            .iter()
            .map(String::as_str)
            .chain(self.body.iter().map(DirectoryLine::raw))
    }
}
