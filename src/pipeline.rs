//! The per-invocation command pipeline: context, confirmation gate, and
//! outcome.
//!
//! Every command follows the same stage sequence:
//!
//! ```text
//! Validating → Resolving (optional) → Confirming (optional) → Executing
//!     → Succeeded | Failed
//! ```
//!
//! Failed is reachable from every stage (all failures converge on
//! [`CliError`]); Succeeded only from Executing. Declining a confirmation
//! is not a failure — it yields [`Outcome::Aborted`], which exits cleanly
//! with no output and no side effects.
//!
//! Execution is strictly sequential: each invocation owns its options,
//! target reference, and response values exclusively, and no network call
//! fans out in parallel. Authentication state is read-only from the
//! pipeline's perspective (the client refreshes tokens internally).

use crate::client::GraphClient;
use crate::error::{CliError, Result};
use crate::logger::Logger;
use crate::options::ValidationPolicy;
use crate::prompt::Prompter;

/// Everything a command invocation needs, injected explicitly.
///
/// No process-wide singletons: tests construct an independent context per
/// case with a mock client, a capture logger, and a scripted prompter.
pub struct CommandContext<'a> {
    /// Authenticated Graph client.
    pub client: &'a GraphClient,
    /// Output sink for shaped payloads and diagnostics.
    pub logger: &'a dyn Logger,
    /// Interactive prompt capability.
    pub prompter: &'a dyn Prompter,
    /// Whether interactive prompts are allowed at all. When `false`,
    /// ambiguity becomes an error and missing confirmations fail instead
    /// of asking.
    pub interactive: bool,
    /// Validation-time policy for missing selection criteria.
    pub policy: ValidationPolicy,
}

impl CommandContext<'_> {
    /// The prompter handed to the resolver: present only in interactive
    /// mode, so non-interactive runs classify multi-matches as errors.
    pub fn resolver_prompter(&self) -> Option<&dyn Prompter> {
        if self.interactive {
            Some(self.prompter)
        } else {
            None
        }
    }
}

/// How a command invocation ended, short of an error.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The executor ran; any payload has already been handed to the logger.
    Done,
    /// The user declined the confirmation prompt. No mutating call was
    /// issued, nothing was printed, and the process exits 0.
    Aborted,
}

/// Confirmation gate for destructive operations.
///
/// - `force` set → proceed immediately, no prompt.
/// - interactive → ask; `Ok(false)` means the user declined and the
///   command must abort with no further side effects.
/// - non-interactive without `force` → error, because the command can
///   neither ask nor assume consent.
pub fn confirm_gate(ctx: &CommandContext<'_>, force: bool, description: &str) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if !ctx.interactive {
        return Err(CliError::Validation(
            "This command requires confirmation. Pass --force to proceed without a prompt."
                .to_string(),
        ));
    }
    ctx.prompter.confirm(description).map_err(CliError::Prompt)
}
