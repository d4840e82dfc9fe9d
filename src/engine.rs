//! # Prediction Engine Invocation
//!
//! Every piece of content comes from one blocking run of the engine binary. This
//! module builds the argument lists, runs the child, and decides whether what came
//! back counts as content or as a failure.
//!
//! ## Invocation Rules
//!
//! - **Locale**: the child always gets `LANG=C`, `LC_ALL=C`, `LC_CTYPE=C` merged into
//!   its environment, so its text is ISO-8859-1 whatever the caller's locale is
//! - **Encoding**: text output is decoded byte-for-byte as ISO-8859-1; image output is
//!   returned untouched; station names are encoded to ISO-8859-1 on the way in
//! - **Standard error**: written to an anonymous temporary file owned by the call and
//!   released when it goes out of scope, on every exit path
//! - **Success**: exit status 0 *and* at least one byte on standard output. The engine
//!   exits 0 with no output for a station it does not know, so that case is
//!   [`TideError::StationNotFound`]
//! - **Failure text**: captured standard error, then the exit status or the reason
//!   the child could not be started
//!
//! ## Command Lines
//! ```text
//! tide -tw 110 -ml                                          station listing
//! tide -ma -l <station>                                     about (time zone lookup)
//! tide -ft|-fp -m <code> -tw <w> -gw <px> -b <start> [-l <station>]   render
//! ```

use crate::config::EngineConfig;
use crate::directory::parse_directory;
use crate::{DisplayMode, LocationDirectory, TideError};
use std::ffi::OsString;
use std::io::{self, Read, Seek, SeekFrom};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Format of the `-b` start argument, in the station's local civil time
pub const START_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A fully prepared engine command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    /// Program to run
    pub program: String,
    /// Arguments, already encoded for the engine
    pub args: Vec<OsString>,
    /// Variables added to the inherited environment
    pub environment: Vec<(String, String)>,
}

/// What a finished child left behind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the child was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs an [`Invocation`] to completion.
///
/// [`Subprocess`] is the real implementation; tests substitute a scripted one.
pub trait CommandRunner {
    /// Run the child and wait for it. `Err` means it could not be started at all.
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

/// Runs the engine as an operating system process.
#[derive(Clone, Copy, Debug, Default)]
pub struct Subprocess;

impl CommandRunner for Subprocess {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        // Closed (and so removed) when this function returns, however it returns
        let mut stderr_capture = tempfile::tempfile()?;

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.environment.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stderr(Stdio::from(stderr_capture.try_clone()?))
            .output()?;

        let mut stderr = Vec::new();
        stderr_capture.seek(SeekFrom::Start(0))?;
        stderr_capture.read_to_end(&mut stderr)?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr,
        })
    }
}

/// Requested output kind for a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    /// Plain text (`-ft`)
    Text,
    /// PNG image (`-fp`), returned as opaque bytes
    Image,
}

impl OutputKind {
    /// The engine's format flag.
    pub fn flag(self) -> &'static str {
        match self {
            OutputKind::Text => "-ft",
            OutputKind::Image => "-fp",
        }
    }
}

/// Content produced by a successful render.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutput {
    Text(String),
    Image(Vec<u8>),
}

/// Parameters for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    pub mode: DisplayMode,
    pub kind: OutputKind,
    /// Start instant in the station's local civil time, formatted with [`START_FORMAT`]
    pub start: String,
    pub text_width: u32,
    pub graphics_width: u32,
    /// Station to render; the engine picks its own default when absent
    pub station: Option<String>,
}

impl RenderRequest {
    /// The protocol arguments for this request.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.kind.flag().into(),
            "-m".into(),
            self.mode.code().to_string().into(),
            "-tw".into(),
            self.text_width.to_string().into(),
            "-gw".into(),
            self.graphics_width.to_string().into(),
            "-b".into(),
            engine_arg(&self.start),
        ];
        if let Some(station) = &self.station {
            args.push("-l".into());
            args.push(engine_arg(station));
        }
        args
    }
}

/// Decode ISO-8859-1 text: every byte is the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text as ISO-8859-1. Characters outside the range become `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Turn a string into an engine argument, encoded as ISO-8859-1 where the
/// platform allows raw bytes in arguments.
#[cfg(unix)]
pub fn engine_arg(text: &str) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(encode_latin1(text))
}

#[cfg(not(unix))]
pub fn engine_arg(text: &str) -> OsString {
    OsString::from(text)
}

/// Decide whether a finished child produced content.
///
/// `program` only appears in the failure text.
pub fn classify(
    program: &str,
    output: ProcessOutput,
    kind: OutputKind,
) -> Result<RenderOutput, TideError> {
    match output.exit_code {
        Some(0) if !output.stdout.is_empty() => Ok(match kind {
            OutputKind::Text => RenderOutput::Text(decode_latin1(&output.stdout)),
            OutputKind::Image => RenderOutput::Image(output.stdout),
        }),
        Some(0) => Err(TideError::StationNotFound {
            diagnostics: failure_text(
                &output.stderr,
                &format!("{program} exited with status 0 but produced no output"),
            ),
        }),
        Some(code) => Err(TideError::ProcessFailure {
            diagnostics: failure_text(
                &output.stderr,
                &format!("{program} exited with status {code}"),
            ),
        }),
        None => Err(TideError::ProcessFailure {
            diagnostics: failure_text(&output.stderr, &format!("{program} was killed by a signal")),
        }),
    }
}

/// Captured standard error first, then the reason.
fn failure_text(stderr: &[u8], reason: &str) -> String {
    let stderr = decode_latin1(stderr);
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        reason.to_string()
    } else {
        format!("{stderr}\n{reason}")
    }
}

/// The prediction engine, as configured.
#[derive(Clone, Debug)]
pub struct Engine<R = Subprocess> {
    config: EngineConfig,
    runner: R,
}

impl Engine<Subprocess> {
    /// An engine that runs real processes.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_runner(config, Subprocess)
    }
}

impl<R: CommandRunner> Engine<R> {
    /// An engine that runs through the given runner.
    pub fn with_runner(config: EngineConfig, runner: R) -> Self {
        Engine { config, runner }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Build the full command line for a list of protocol arguments.
    pub fn invocation(&self, args: Vec<OsString>) -> Invocation {
        let mut full: Vec<OsString> = self.config.leading_args.iter().map(OsString::from).collect();
        full.extend(args);
        Invocation {
            program: self.config.command.clone(),
            args: full,
            environment: self.config.child_environment(),
        }
    }

    /// Run the engine with raw protocol arguments, without classifying the result.
    pub fn run(&self, args: Vec<OsString>) -> io::Result<ProcessOutput> {
        let invocation = self.invocation(args);
        debug!(program = %invocation.program, args = ?invocation.args, "running engine");
        self.runner.run(&invocation)
    }

    /// Run and classify. A child that cannot be started is a [`TideError::ProcessFailure`].
    fn invoke(&self, args: Vec<OsString>, kind: OutputKind) -> Result<RenderOutput, TideError> {
        let output = self.run(args).map_err(|e| TideError::ProcessFailure {
            diagnostics: format!("could not run {}: {e}", self.config.command),
        })?;
        classify(&self.config.command, output, kind)
    }

    /// Fetch and parse the full station listing.
    pub fn list_locations(&self) -> Result<LocationDirectory, TideError> {
        let args = vec![
            "-tw".into(),
            self.config.listing_width.to_string().into(),
            "-ml".into(),
        ];
        let text = match self.invoke(args, OutputKind::Text)? {
            RenderOutput::Text(text) => text,
            RenderOutput::Image(bytes) => decode_latin1(&bytes),
        };

        let directory = parse_directory(&text)?;
        info!(stations = directory.records().count(), "fetched station listing");
        Ok(directory)
    }

    /// Render one request.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderOutput, TideError> {
        let result = self.invoke(request.args(), request.kind);
        if let Err(e) = &result {
            warn!(mode = %request.mode, station = ?request.station, error = %e, "render failed");
        }
        result
    }
}
