//! # Tide Browser Entry Point
//!
//! A small terminal host for the core library: list and sort the engine's stations,
//! render one view, or browse interactively with line commands on stdin.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tide_browser_lib::config::{Config, DisplayConfig, CONFIG_FILE};
use tide_browser_lib::engine::Engine;
use tide_browser_lib::session::{Content, Session};
use tide_browser_lib::timezone::TimezoneCache;
use tide_browser_lib::{logging, sort, DisplayMode, LocationDirectory, LocationRecord};
use tracing::info;

/// Browse tide stations and predictions from the XTide engine
#[derive(Parser, Debug)]
#[command(name = "tide-browser")]
#[command(version)]
#[command(about = "Browse tide stations and predictions from the XTide engine")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log engine command lines and cache activity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Print the station directory
    List {
        /// Order of the listing
        #[arg(long, value_enum, default_value_t = SortOrder::Engine)]
        sort: SortOrder,

        /// Station to measure distances from (default: the configured home)
        #[arg(long)]
        from: Option<String>,

        /// Print station records as JSON instead of the raw listing
        #[arg(long)]
        json: bool,
    },

    /// Render one view of a station
    Show {
        /// Station name (default: XTIDE_DEFAULT_LOCATION or the config file)
        #[arg(short, long)]
        station: Option<String>,

        /// Display mode, by name or engine code
        #[arg(short, long, default_value = "graph")]
        mode: DisplayMode,

        /// Start instant in UTC, "YYYY-MM-DD HH:MM" (default: now)
        #[arg(long, value_parser = parse_utc)]
        at: Option<DateTime<Utc>>,

        /// Request graphs as images and write them to this file
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Print a station's time zone rule
    Timezone {
        /// Station name
        station: String,
    },

    /// Interactive session driven by line commands on stdin
    Browse {
        /// Station name (default: XTIDE_DEFAULT_LOCATION or the config file)
        #[arg(short, long)]
        station: Option<String>,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Destination
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,
    },
}

/// Directory orderings offered by `list`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// As the engine prints it
    Engine,
    /// Alphabetical on the raw line
    Alpha,
    /// Broadest locality first
    Locality,
    /// Nearest first
    Distance,
}

/// One line of input in `browse`.
#[derive(Clone, Debug, PartialEq)]
pub enum BrowseCommand {
    Forward,
    Backward,
    Now,
    Refresh,
    Mode(DisplayMode),
    Station(String),
    Jump(DateTime<Utc>),
    Quit,
}

const BROWSE_HELP: &str = "commands: f (forward 6h), b (back 6h), n (now), r (refresh), \
m <mode>, s <station>, j <YYYY-MM-DD HH:MM UTC>, q (quit)";

/// Parse `"YYYY-MM-DD HH:MM"` as a UTC instant.
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM\": {e}"))
}

/// Parse one `browse` input line. Blank lines give `Ok(None)`.
pub fn parse_browse_command(line: &str) -> Result<Option<BrowseCommand>, String> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(command, rest)| (command, rest.trim()))
        .unwrap_or((line, ""));

    let parsed = match command {
        "" => return Ok(None),
        "f" => BrowseCommand::Forward,
        "b" => BrowseCommand::Backward,
        "n" => BrowseCommand::Now,
        "r" => BrowseCommand::Refresh,
        "q" => BrowseCommand::Quit,
        "m" => BrowseCommand::Mode(rest.parse()?),
        "s" if !rest.is_empty() => BrowseCommand::Station(rest.to_string()),
        "j" => BrowseCommand::Jump(parse_utc(rest)?),
        _ => return Err(BROWSE_HELP.to_string()),
    };
    Ok(Some(parsed))
}

/// Write content to the terminal. Images go to `image_path` when given, else raw to stdout.
fn print_content(content: &Content, image_path: Option<&Path>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    match content {
        Content::Empty => {}
        Content::Text(text) => stdout.write_all(text.as_bytes())?,
        Content::Image(bytes) => match image_path {
            Some(path) => fs::write(path, bytes)
                .with_context(|| format!("writing image to {}", path.display()))?,
            None => stdout.write_all(bytes)?,
        },
        Content::Failure(message) => eprintln!("{message}"),
    }
    stdout.flush()?;
    Ok(())
}

fn sort_directory(
    directory: &mut LocationDirectory,
    order: SortOrder,
    from: Option<&str>,
    config: &Config,
) -> anyhow::Result<()> {
    match order {
        SortOrder::Engine => {}
        SortOrder::Alpha => sort::sort_alphabetical(directory),
        SortOrder::Locality => sort::sort_by_locality(directory),
        SortOrder::Distance => match from {
            Some(station) => sort::sort_by_distance_from(directory, station)?,
            None => {
                let home = config
                    .home
                    .context("distance sort needs --from or a [home] location in the config")?;
                sort::sort_by_distance(directory, home.coordinates())?
            }
        },
    }
    Ok(())
}

fn run_list(
    config: &Config,
    engine: &Engine,
    order: SortOrder,
    from: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let mut directory = engine
        .list_locations()
        .context("fetching the station list")?;
    sort_directory(&mut directory, order, from, config)?;

    let mut stdout = io::stdout().lock();
    if json {
        let records: Vec<&LocationRecord> = directory.records().collect();
        serde_json::to_writer_pretty(&mut stdout, &records)?;
        writeln!(stdout)?;
    } else {
        for line in directory.lines() {
            writeln!(stdout, "{line}")?;
        }
    }
    Ok(())
}

fn run_show(
    config: &Config,
    engine: &Engine,
    station: Option<&str>,
    mode: DisplayMode,
    at: Option<DateTime<Utc>>,
    image: Option<&Path>,
) -> anyhow::Result<()> {
    let station = config.station(station)?;
    let timezones = TimezoneCache::new();
    let display = DisplayConfig {
        images: config.display.images || image.is_some(),
    };

    let mut session = Session::new(
        engine,
        &timezones,
        display,
        &station,
        at.unwrap_or_else(Utc::now),
    )?;

    match session.set_mode(mode) {
        Content::Failure(message) => bail!("{message}"),
        content => print_content(content, image),
    }
}

fn run_browse(config: &Config, engine: &Engine, station: Option<&str>) -> anyhow::Result<()> {
    let station = config.station(station)?;
    let timezones = TimezoneCache::new();
    // A terminal cannot show images
    let mut session = Session::open(
        engine,
        &timezones,
        DisplayConfig::default(),
        &station,
        Utc::now(),
    )?;
    print_content(session.content(), None)?;

    for line in io::stdin().lock().lines() {
        let command = match parse_browse_command(&line?) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        let content = match command {
            BrowseCommand::Forward => session.step_forward(),
            BrowseCommand::Backward => session.step_backward(),
            BrowseCommand::Now => session.jump_to_now(Utc::now()),
            BrowseCommand::Refresh => session.refresh(),
            BrowseCommand::Mode(mode) => session.set_mode(mode),
            BrowseCommand::Station(name) => session.set_station(&name)?,
            BrowseCommand::Jump(instant) => session.jump_to(instant),
            BrowseCommand::Quit => break,
        };
        print_content(content, None)?;
    }

    info!(station = %session.station(), cached_zones = timezones.len(), "session closed");
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .with_environment(|key| std::env::var(key).ok());

    let engine = Engine::new(config.engine.clone());

    match &args.command {
        Commands::List { sort, from, json } => {
            run_list(&config, &engine, *sort, from.as_deref(), *json)
        }
        Commands::Show {
            station,
            mode,
            at,
            image,
        } => run_show(
            &config,
            &engine,
            station.as_deref(),
            *mode,
            *at,
            image.as_deref(),
        ),
        Commands::Timezone { station } => {
            match TimezoneCache::new().resolve(&engine, station) {
                Some(rule) => {
                    println!("{rule}");
                    Ok(())
                }
                None => bail!("no time zone found for {station}"),
            }
        }
        Commands::Browse { station } => run_browse(&config, &engine, station.as_deref()),
        Commands::InitConfig { path } => config.save(path),
    }
}
