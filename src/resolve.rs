//! Name-to-identifier resolution for Graph directory entities.
//!
//! Commands accept either a direct identifier or a human-readable display
//! name. When a name is given, the resolver issues one server-side
//! filtered list query and classifies the candidate set:
//!
//! - zero matches → `The specified <entity> '<name>' does not exist.`
//! - exactly one match → its id, deterministically.
//! - more than one match → non-interactive: an error enumerating every
//!   candidate id (comma-joined, response order); interactive: the
//!   candidates are presented for a manual pick.
//!
//! Resolution is skipped entirely when the caller already supplied an id.
//! The candidate set exists only for the duration of the lookup and is
//! never persisted.

use serde::Deserialize;

use crate::client::GraphClient;
use crate::error::{CliError, Result};
use crate::options::Options;
use crate::prompt::Prompter;

// ── Entity descriptors ─────────────────────────────────────────────────

/// Describes one Graph entity family to the resolver.
///
/// Each entity module exports a `const` descriptor (see `groups::GROUP`);
/// the resolver is generic over it, so adding a new addressable entity is
/// one constant, not a new resolver.
pub struct Entity {
    /// Singular label used in not-found messages, e.g. `"administrative unit"`.
    pub singular: &'static str,
    /// Plural label used in ambiguity messages, e.g. `"groups"`.
    pub plural: &'static str,
    /// Collection path relative to the API base, e.g. `"v1.0/groups"`.
    pub base_path: &'static str,
    /// The display-name property filtered on, e.g. `"displayName"`.
    pub name_field: &'static str,
}

impl Entity {
    /// Path of a single item, e.g. `v1.0/groups/{id}`.
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{id}", self.base_path)
    }

    /// Server-side exact-match filter for a display name.
    pub fn name_filter(&self, name: &str) -> String {
        format!("{} eq '{}'", self.name_field, escape_odata(name))
    }
}

/// Doubles single quotes per OData string-literal escaping, so names like
/// `O'Brien's Team` survive the `$filter` round-trip.
fn escape_odata(value: &str) -> String {
    value.replace('\'', "''")
}

/// The identifying fields of a lookup candidate. Other properties on the
/// wire are ignored — the resolver only needs id and display name.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// The entity's unique identifier.
    pub id: String,
    /// The display name, when the API returns one.
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// OData collection wrapper returned by Graph list endpoints:
/// `{ "value": [...] }` with optional `@odata.context` metadata.
#[derive(Debug, Deserialize)]
pub struct ODataList<T> {
    /// The array of result items.
    pub value: Vec<T>,
}

// ── Selector ───────────────────────────────────────────────────────────

/// How the caller addressed the target entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// A direct identifier — resolution is skipped.
    Id(String),
    /// A display name to resolve.
    Name(String),
    /// Nothing supplied. Reaches the resolver only when the validation
    /// policy deferred the missing selection to an interactive pick.
    None,
}

impl Selector {
    /// Builds a selector from a validated option bag.
    pub fn from_options(opts: &Options, id_option: &str, name_option: &str) -> Self {
        if let Some(id) = opts.get_str(id_option) {
            Selector::Id(id.to_string())
        } else if let Some(name) = opts.get_str(name_option) {
            Selector::Name(name.to_string())
        } else {
            Selector::None
        }
    }
}

// ── Resolution ─────────────────────────────────────────────────────────

/// Resolves a selector to exactly one identifier, or fails.
///
/// `prompter` carries the interactive-mode decision: `Some` enables manual
/// disambiguation (and deferred selection for `Selector::None`); `None`
/// turns multiple matches into an [`CliError::Ambiguous`] error and a
/// missing selector into a validation error.
///
/// Resolution is idempotent: the same name against the same candidate set
/// always yields the same identifier.
pub async fn resolve_id(
    client: &GraphClient,
    entity: &Entity,
    selector: &Selector,
    prompter: Option<&dyn Prompter>,
) -> Result<String> {
    match selector {
        Selector::Id(id) => Ok(id.clone()),
        Selector::Name(name) => {
            let filter = entity.name_filter(name);
            let list: ODataList<Candidate> = client
                .get_with_query(entity.base_path, &[("$filter", filter.as_str())])
                .await?;
            match list.value.as_slice() {
                [] => Err(CliError::NotFound {
                    entity: entity.singular.to_string(),
                    name: name.clone(),
                }),
                [single] => Ok(single.id.clone()),
                candidates => match prompter {
                    Some(p) => pick_candidate(p, entity, name, candidates),
                    None => Err(ambiguous_error(entity, name, candidates)),
                },
            }
        }
        Selector::None => {
            // Deferred selection: list everything in scope and ask.
            let Some(p) = prompter else {
                return Err(CliError::Validation(format!(
                    "Specify the {} to target by id or name.",
                    entity.singular
                )));
            };
            let list: ODataList<Candidate> = client.get(entity.base_path).await?;
            if list.value.is_empty() {
                return Err(CliError::Validation(format!(
                    "No {} available to select from.",
                    entity.plural
                )));
            }
            let prompt = format!("Select the {}:", entity.singular);
            let index = pick_index(p, &prompt, &list.value)?;
            Ok(list.value[index].id.clone())
        }
    }
}

/// Builds the non-interactive multi-match error, enumerating every
/// candidate id in response order.
pub(crate) fn ambiguous_error(entity: &Entity, name: &str, candidates: &[Candidate]) -> CliError {
    let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    CliError::Ambiguous {
        entity: entity.plural.to_string(),
        name: name.to_string(),
        ids: ids.join(", "),
    }
}

fn pick_candidate(
    prompter: &dyn Prompter,
    entity: &Entity,
    name: &str,
    candidates: &[Candidate],
) -> Result<String> {
    let prompt = format!(
        "Multiple {} with name '{name}' found. Select one:",
        entity.plural
    );
    let index = pick_index(prompter, &prompt, candidates)?;
    Ok(candidates[index].id.clone())
}

fn pick_index(prompter: &dyn Prompter, prompt: &str, candidates: &[Candidate]) -> Result<usize> {
    let labels: Vec<String> = candidates
        .iter()
        .map(|c| match &c.display_name {
            Some(dn) => format!("{dn} ({})", c.id),
            None => c.id.clone(),
        })
        .collect();
    prompter.pick(prompt, &labels).map_err(CliError::Prompt)
}
