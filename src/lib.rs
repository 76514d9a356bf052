//! Command-line client library for Microsoft Graph.
//!
//! Every command follows the same **resolve-then-act** pipeline: validate
//! options against a declarative schema, resolve a display name to an
//! identifier when no id was supplied, gate destructive actions behind a
//! confirmation prompt, issue exactly one REST call, and normalize any
//! upstream error envelope to a single message.
//!
//! # Modules
//!
//! - [`auth`] — OAuth2 client-credentials token provider with expiry tracking.
//! - [`client`] — Authenticated HTTP wrapper for the Graph REST API.
//! - [`error`] — Unified error type (`CliError`) and envelope normalization.
//! - [`options`] — Declarative option schemas (exactly-one-of, shapes).
//! - [`resolve`] — Name-to-id resolution with zero/one/many classification.
//! - [`prompt`] — Confirmation and disambiguation prompt capability.
//! - [`logger`] — Output capability (console and capturing implementations).
//! - [`pipeline`] — Per-invocation context, confirmation gate, outcome.
//! - [`groups`], [`admin_units`], [`users`] — entity command families.
//!
//! # Quick Start
//!
//! ```ignore
//! use graphctl::auth::{GRAPH_SCOPE, TokenProvider};
//! use graphctl::client::GraphClient;
//! use graphctl::groups;
//!
//! let tp = TokenProvider::new("tenant", "client_id", "secret", GRAPH_SCOPE);
//! let client = GraphClient::new(tp);
//! let finance = groups::list_groups(&client, Some("displayName eq 'Finance'")).await?;
//! ```

#![warn(missing_docs)]

pub mod admin_units;
pub mod auth;
pub mod client;
pub mod error;
pub mod groups;
pub mod logger;
pub mod options;
pub mod pipeline;
pub mod prompt;
pub mod resolve;
pub mod users;
