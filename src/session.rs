//! # Browsing Session
//!
//! A session is the state behind one tide window: which station, which instant and
//! which display mode. Every navigation command updates that state and immediately
//! re-renders through the engine.
//!
//! ## State
//! - **Station**: never empty
//! - **Instant**: absolute (UTC). Steps move it by exactly six hours of real time, so
//!   the "now" marker on a graph stays put as the view approaches it, whatever the
//!   station's offset
//! - **Mode**: starts at [`DisplayMode::Graph`]
//!
//! ## Rendering
//! The instant is translated into the station's own civil time just before each
//! render, so switching stations shows the same moment on the new station's clock.
//! A failed render replaces the content with the engine's diagnostic and leaves the
//! state alone; the user can retry or navigate away.

use crate::config::{normalize_station, DisplayConfig};
use crate::engine::{CommandRunner, Engine, OutputKind, RenderOutput, RenderRequest, Subprocess};
use crate::timezone::{local_start, TimezoneCache};
use crate::{DisplayMode, TideError};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Size of one navigation step
pub const STEP_SECONDS: i64 = 6 * 60 * 60;

/// What the session currently shows.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    /// Nothing rendered yet
    Empty,
    Text(String),
    /// Encoded image bytes, for the host to decode
    Image(Vec<u8>),
    /// The engine's diagnostic, shown in place of content
    Failure(String),
}

impl From<Result<RenderOutput, TideError>> for Content {
    fn from(result: Result<RenderOutput, TideError>) -> Self {
        match result {
            Ok(RenderOutput::Text(text)) => Content::Text(text),
            Ok(RenderOutput::Image(bytes)) => Content::Image(bytes),
            Err(e) => Content::Failure(e.to_string()),
        }
    }
}

/// The active browsing context for one station.
pub struct Session<'a, R: CommandRunner = Subprocess> {
    engine: &'a Engine<R>,
    timezones: &'a TimezoneCache,
    display: DisplayConfig,
    station: String,
    instant: DateTime<Utc>,
    mode: DisplayMode,
    content: Content,
}

impl<'a, R: CommandRunner> Session<'a, R> {
    /// Create a session without rendering.
    ///
    /// An empty (or all-blank) station is a [`TideError::Configuration`]; callers
    /// without a station should go through the directory instead.
    pub fn new(
        engine: &'a Engine<R>,
        timezones: &'a TimezoneCache,
        display: DisplayConfig,
        station: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, TideError> {
        let station = normalize_station(station).ok_or_else(|| {
            TideError::Configuration("a session needs a station".to_string())
        })?;

        Ok(Session {
            engine,
            timezones,
            display,
            station,
            instant: now,
            mode: DisplayMode::Graph,
            content: Content::Empty,
        })
    }

    /// Create a session and render its first view.
    pub fn open(
        engine: &'a Engine<R>,
        timezones: &'a TimezoneCache,
        display: DisplayConfig,
        station: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, TideError> {
        let mut session = Self::new(engine, timezones, display, station, now)?;
        session.render();
        Ok(session)
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Switch display mode.
    pub fn set_mode(&mut self, mode: DisplayMode) -> &Content {
        self.mode = mode;
        self.render()
    }

    /// Six hours later.
    pub fn step_forward(&mut self) -> &Content {
        let target = self
            .instant
            .checked_add_signed(Duration::seconds(STEP_SECONDS));
        self.step_to(target)
    }

    /// Six hours earlier.
    pub fn step_backward(&mut self) -> &Content {
        let target = self
            .instant
            .checked_sub_signed(Duration::seconds(STEP_SECONDS));
        self.step_to(target)
    }

    /// Moves to `target`, or reports the end of the calendar and stays put.
    fn step_to(&mut self, target: Option<DateTime<Utc>>) -> &Content {
        match target {
            Some(instant) => self.jump_to(instant),
            None => {
                warn!(instant = %self.instant, "step leaves the supported date range");
                self.content = Content::Failure(format!(
                    "cannot step six hours from {}: outside the supported date range",
                    self.instant.format("%Y-%m-%d %H:%M UTC")
                ));
                &self.content
            }
        }
    }

    /// Show another station at the same instant.
    pub fn set_station(&mut self, station: &str) -> Result<&Content, TideError> {
        self.station = normalize_station(station).ok_or_else(|| {
            TideError::Configuration("a session needs a station".to_string())
        })?;
        Ok(self.render())
    }

    /// Show an arbitrary instant, e.g. one picked from a calendar.
    pub fn jump_to(&mut self, instant: DateTime<Utc>) -> &Content {
        self.instant = instant;
        self.render()
    }

    /// Back to the caller's clock.
    pub fn jump_to_now(&mut self, now: DateTime<Utc>) -> &Content {
        self.jump_to(now)
    }

    /// Render again without changing anything.
    pub fn refresh(&mut self) -> &Content {
        self.render()
    }

    /// Graphs come back as images when the host can show them; everything else is text.
    pub fn output_kind(&self) -> OutputKind {
        match self.mode {
            DisplayMode::Graph if self.display.images => OutputKind::Image,
            _ => OutputKind::Text,
        }
    }

    /// The request the current state renders with.
    ///
    /// Resolves the station's time zone, which may run the engine once.
    pub fn request(&self) -> RenderRequest {
        let rule = self.timezones.resolve(self.engine, &self.station);
        let config = self.engine.config();

        RenderRequest {
            mode: self.mode,
            kind: self.output_kind(),
            start: local_start(self.instant, rule.as_deref()),
            text_width: config.text_width,
            graphics_width: config.graphics_width,
            station: Some(self.station.clone()),
        }
    }

    fn render(&mut self) -> &Content {
        let request = self.request();
        debug!(station = %self.station, mode = %self.mode, start = %request.start, "rendering");
        self.content = self.engine.render(&request).into();
        &self.content
    }
}
