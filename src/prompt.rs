//! Interactive prompt capability for confirmation and disambiguation.
//!
//! Prompting is modeled as a trait so the pipeline can be exercised in
//! tests with scripted answers instead of a terminal. The stdin-backed
//! implementation writes prompts to **stderr** so that stdout stays
//! reserved for command output (pipable JSON).
//!
//! Prompts suspend the invocation until the user answers; there is no
//! timeout. The only cancellation path is answering "no" to a
//! confirmation, which aborts the pipeline cleanly before any mutating
//! call.

use std::io::{self, BufRead, Write};

/// Capability interface for interactive prompts.
///
/// Two operations cover everything the pipeline needs:
/// - [`Prompter::confirm`] — yes/no gate before destructive actions.
/// - [`Prompter::pick`] — choose one candidate among several, used for
///   name disambiguation and deferred selection.
pub trait Prompter {
    /// Asks a yes/no question describing the action and target. Returns
    /// `Ok(true)` only on an affirmative answer.
    fn confirm(&self, description: &str) -> io::Result<bool>;

    /// Presents `items` and returns the index of the chosen one.
    fn pick(&self, prompt: &str, items: &[String]) -> io::Result<usize>;
}

/// Prompter backed by stdin/stderr for real terminal sessions.
pub struct StdinPrompter;

impl StdinPrompter {
    fn read_line() -> io::Result<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            // EOF — stdin closed, e.g. piped input exhausted.
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed while awaiting prompt answer",
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl Prompter for StdinPrompter {
    fn confirm(&self, description: &str) -> io::Result<bool> {
        let mut err = io::stderr().lock();
        write!(err, "{description} [y/N] ")?;
        err.flush()?;
        drop(err);

        let answer = Self::read_line()?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn pick(&self, prompt: &str, items: &[String]) -> io::Result<usize> {
        let mut err = io::stderr().lock();
        writeln!(err, "{prompt}")?;
        for (i, item) in items.iter().enumerate() {
            writeln!(err, "  {}. {item}", i + 1)?;
        }
        drop(err);

        // Re-ask until a valid 1-based index is entered; EOF propagates.
        loop {
            let mut err = io::stderr().lock();
            write!(err, "Select an option [1-{}]: ", items.len())?;
            err.flush()?;
            drop(err);

            let answer = Self::read_line()?;
            if let Ok(n) = answer.parse::<usize>() {
                if (1..=items.len()).contains(&n) {
                    return Ok(n - 1);
                }
            }
        }
    }
}

/// Prompter with scripted answers and call counters, for tests.
///
/// Analogous to `TokenProvider::with_token` — a production-visible test
/// double so integration tests can drive the pipeline without a terminal.
pub struct ScriptedPrompter {
    confirm_answer: bool,
    pick_index: usize,
    confirms: std::sync::atomic::AtomicUsize,
    picks: std::sync::atomic::AtomicUsize,
}

impl ScriptedPrompter {
    /// Answers every confirmation with `answer` and every pick with index 0.
    pub fn answering(answer: bool) -> Self {
        ScriptedPrompter {
            confirm_answer: answer,
            pick_index: 0,
            confirms: std::sync::atomic::AtomicUsize::new(0),
            picks: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Answers every pick with `index` and every confirmation with yes.
    pub fn picking(index: usize) -> Self {
        ScriptedPrompter {
            confirm_answer: true,
            pick_index: index,
            confirms: std::sync::atomic::AtomicUsize::new(0),
            picks: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of confirmation prompts issued so far.
    pub fn confirm_count(&self) -> usize {
        self.confirms.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of pick prompts issued so far.
    pub fn pick_count(&self) -> usize {
        self.picks.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, _description: &str) -> io::Result<bool> {
        self.confirms
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.confirm_answer)
    }

    fn pick(&self, _prompt: &str, items: &[String]) -> io::Result<usize> {
        self.picks.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.pick_index >= items.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "scripted pick index out of range",
            ));
        }
        Ok(self.pick_index)
    }
}
