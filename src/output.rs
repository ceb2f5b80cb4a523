// ABOUTME: Output formatting for CLI feedback; the pipeline's info/error log channel.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes, plus in-memory capture.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Captured lines, shared with the `Output` that writes them.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl OutputBuffer {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }
}

#[derive(Debug)]
enum Sink {
    Console,
    Buffer(OutputBuffer),
}

/// Handles CLI output based on the configured mode.
#[derive(Debug)]
pub struct Output {
    mode: OutputMode,
    sink: Sink,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            sink: Sink::Console,
            start_time: None,
        }
    }

    /// An output that records every line instead of printing it.
    pub fn buffered(mode: OutputMode) -> (Self, OutputBuffer) {
        let buffer = OutputBuffer::default();
        let output = Self {
            mode,
            sink: Sink::Buffer(buffer.clone()),
            start_time: None,
        };
        (output, buffer)
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print an informational line (suppressed in quiet mode).
    pub fn info(&self, message: &str) {
        tracing::debug!(target: "ebpush::output", "{message}");
        match self.mode {
            OutputMode::Normal => self.stdout(message.to_string()),
            OutputMode::Quiet => {}
            OutputMode::Json => self.json_stdout("info", message),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    self.stdout(format!("{message} ({:.1}s)", elapsed));
                } else {
                    self.stdout(message.to_string());
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                self.stdout(message.to_string());
            }
            OutputMode::Json => self.json_stdout("success", message),
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => self.stderr(format!("Warning: {message}")),
            OutputMode::Json => self.json_stderr("warning", message),
        }
    }

    /// Print an error. Accepts anything displayable so causes can be passed directly.
    pub fn error(&self, cause: &dyn Display) {
        let message = cause.to_string();
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => self.stderr(format!("Error: {message}")),
            OutputMode::Json => self.json_stderr("error", &message),
        }
    }

    fn json_line(&self, event: &str, message: &str) -> Option<String> {
        let event = JsonEvent {
            event,
            message,
            timestamp: Utc::now(),
            duration_secs: if self.start_time.is_some() {
                Some(self.elapsed_secs())
            } else {
                None
            },
        };
        serde_json::to_string(&event).ok()
    }

    fn json_stdout(&self, event: &str, message: &str) {
        if let Some(json) = self.json_line(event, message) {
            self.stdout(json);
        }
    }

    fn json_stderr(&self, event: &str, message: &str) {
        if let Some(json) = self.json_line(event, message) {
            self.stderr(json);
        }
    }

    fn stdout(&self, line: String) {
        match &self.sink {
            Sink::Console => println!("{line}"),
            Sink::Buffer(buffer) => buffer.lines.lock().push(line),
        }
    }

    fn stderr(&self, line: String) {
        match &self.sink {
            Sink::Console => eprintln!("{line}"),
            Sink::Buffer(buffer) => buffer.lines.lock().push(line),
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
