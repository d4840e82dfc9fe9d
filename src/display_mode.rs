//! Display modes the engine can produce, and their `-m` codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the engine's fixed output styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    AboutLocation,
    Banner,
    Calendar,
    CalendarAlternative,
    #[default]
    Graph,
    MediumRare,
    PlainTimes,
    RawTimes,
    Statistics,
}

impl DisplayMode {
    /// Every mode, in menu order.
    pub const ALL: [DisplayMode; 9] = [
        DisplayMode::AboutLocation,
        DisplayMode::Banner,
        DisplayMode::Calendar,
        DisplayMode::CalendarAlternative,
        DisplayMode::Graph,
        DisplayMode::MediumRare,
        DisplayMode::PlainTimes,
        DisplayMode::RawTimes,
        DisplayMode::Statistics,
    ];

    /// The character passed to the engine after `-m`.
    pub fn code(self) -> char {
        match self {
            DisplayMode::AboutLocation => 'a',
            DisplayMode::Banner => 'b',
            DisplayMode::Calendar => 'c',
            DisplayMode::CalendarAlternative => 'C',
            DisplayMode::Graph => 'g',
            DisplayMode::MediumRare => 'm',
            DisplayMode::PlainTimes => 'p',
            DisplayMode::RawTimes => 'r',
            DisplayMode::Statistics => 's',
        }
    }

    /// Inverse of [`DisplayMode::code`].
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.code() == code)
    }

    /// Kebab-case name, as accepted on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::AboutLocation => "about-location",
            DisplayMode::Banner => "banner",
            DisplayMode::Calendar => "calendar",
            DisplayMode::CalendarAlternative => "calendar-alternative",
            DisplayMode::Graph => "graph",
            DisplayMode::MediumRare => "medium-rare",
            DisplayMode::PlainTimes => "plain-times",
            DisplayMode::RawTimes => "raw-times",
            DisplayMode::Statistics => "statistics",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    /// Accepts a kebab-case name or a single engine code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            if let Some(mode) = Self::from_code(code) {
                return Ok(mode);
            }
        }

        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| format!("unknown display mode: {s}"))
    }
}
