//! mz-logging: append-only NDJSON event log for run post-mortems.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

/// One learn-loop iteration: self-play volume plus the gate verdict.
#[derive(Debug, Clone, Serialize)]
pub struct IterationEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,

    pub iteration: u32,
    pub episodes: u32,
    pub new_examples: usize,
    pub buffer_examples: usize,

    pub gate_games: u32,
    pub new_wins: u32,
    pub prev_wins: u32,
    pub draws: u32,
    pub win_rate: f64,
    /// "promote" | "reject"
    pub decision: &'static str,
}

impl IterationEventV1 {
    pub const EVENT: &'static str = "iteration_v1";
}

/// Terminal run summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummaryEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,

    pub iterations: u32,
    pub promotions: u32,
    pub rejections: u32,
}

impl RunSummaryEventV1 {
    pub const EVENT: &'static str = "run_summary_v1";
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for NdjsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "ndjson io: {e}"),
            Self::Json(e) => write!(f, "ndjson json: {e}"),
        }
    }
}

impl std::error::Error for NdjsonError {}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
#[derive(Debug)]
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}
