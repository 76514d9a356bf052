//! Output capability for command payloads and diagnostics.
//!
//! Commands never print directly; they receive a `Logger` so tests can
//! capture output and assert on it (including asserting that a successful
//! delete prints nothing at all). Shaped payloads go to stdout as pretty
//! JSON; diagnostics go to stderr.

use std::sync::Mutex;

/// Output capability handed to every command invocation.
pub trait Logger {
    /// Writes a shaped JSON payload to stdout.
    fn log(&self, payload: &serde_json::Value);

    /// Writes a raw line to stdout verbatim.
    fn log_raw(&self, line: &str);

    /// Writes a diagnostic line to stderr.
    fn log_to_stderr(&self, line: &str);
}

/// Logger that writes to the real console.
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, payload: &serde_json::Value) {
        match serde_json::to_string_pretty(payload) {
            Ok(text) => println!("{text}"),
            // Value-to-string serialization only fails for non-string map
            // keys, which serde_json::Value cannot hold; fall back anyway.
            Err(_) => println!("{payload}"),
        }
    }

    fn log_raw(&self, line: &str) {
        println!("{line}");
    }

    fn log_to_stderr(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Logger that records everything in memory, for tests.
///
/// Production-visible (like `ScriptedPrompter`) so integration tests can
/// assert on exactly what a command printed — or that it printed nothing.
#[derive(Default)]
pub struct CaptureLogger {
    stdout: Mutex<Vec<String>>,
    stderr: Mutex<Vec<String>>,
}

impl CaptureLogger {
    /// Creates an empty capture logger.
    pub fn new() -> Self {
        CaptureLogger::default()
    }

    /// Everything written to stdout so far, in order.
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout.lock().expect("capture lock poisoned").clone()
    }

    /// Everything written to stderr so far, in order.
    pub fn stderr_lines(&self) -> Vec<String> {
        self.stderr.lock().expect("capture lock poisoned").clone()
    }

    /// True when nothing was written to either stream.
    pub fn is_silent(&self) -> bool {
        self.stdout_lines().is_empty() && self.stderr_lines().is_empty()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, payload: &serde_json::Value) {
        self.stdout
            .lock()
            .expect("capture lock poisoned")
            .push(payload.to_string());
    }

    fn log_raw(&self, line: &str) {
        self.stdout
            .lock()
            .expect("capture lock poisoned")
            .push(line.to_string());
    }

    fn log_to_stderr(&self, line: &str) {
        self.stderr
            .lock()
            .expect("capture lock poisoned")
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_logger_records_streams_separately() {
        let logger = CaptureLogger::new();
        logger.log(&serde_json::json!({"id": "abc"}));
        logger.log_raw("raw line");
        logger.log_to_stderr("Error: nope");

        assert_eq!(logger.stdout_lines().len(), 2);
        assert_eq!(logger.stderr_lines(), vec!["Error: nope".to_string()]);
        assert!(!logger.is_silent());
    }

    #[test]
    fn fresh_capture_logger_is_silent() {
        assert!(CaptureLogger::new().is_silent());
    }
}
