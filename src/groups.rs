//! Group commands and endpoint bindings for the Microsoft Graph API.
//!
//! This module covers the `/v1.0/groups` endpoint family:
//!
//! - [`list_groups`] — retrieve a filtered list of groups.
//! - [`get_group`] — retrieve a single group by id.
//! - [`update_group`] — PATCH mutable group properties.
//! - [`delete_group`] — permanently delete a group.
//!
//! and the command entry points (`get_command`, `list_command`,
//! `set_command`, `remove_command`) that run the full pipeline: schema
//! validation, name-to-id resolution, confirmation gating for the
//! destructive path, one executing call, and payload hand-off to the
//! logger.
//!
//! ## OData filtering
//!
//! [`list_groups`] accepts an optional `$filter` expression for
//! server-side filtering on fields like `displayName`, `mailEnabled`,
//! and `securityEnabled`. Pass `None` to retrieve all groups.
//!
//! ## Permissions
//!
//! Read paths require `Group.Read.All`; the update and delete paths
//! require `Group.ReadWrite.All` (application permission).

use serde::{Deserialize, Serialize};

use crate::client::GraphClient;
use crate::error::{CliError, Result};
use crate::options::{Options, Schema, Shape};
use crate::pipeline::{CommandContext, Outcome, confirm_gate};
use crate::resolve::{Entity, ODataList, Selector, resolve_id};

/// Resolver descriptor for the groups collection.
pub const GROUP: Entity = Entity {
    singular: "group",
    plural: "groups",
    base_path: "v1.0/groups",
    name_field: "displayName",
};

// ── Response types ─────────────────────────────────────────────────────

/// A group as returned by the Graph API.
///
/// Field names use camelCase to match the Graph contract exactly.
/// Optional fields are those Graph may omit depending on group type
/// (security vs. Microsoft 365) and tenant configuration.
///
/// Reference: <https://learn.microsoft.com/en-us/graph/api/resources/group>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Unique GUID identifier for this group.
    pub id: String,

    /// Display name of the group.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// SMTP address, present for mail-enabled groups.
    #[serde(default)]
    pub mail: Option<String>,

    /// Mail alias, unique in the tenant.
    #[serde(default)]
    pub mail_nickname: Option<String>,

    /// Whether the group is mail-enabled.
    #[serde(default)]
    pub mail_enabled: Option<bool>,

    /// Whether the group is a security group.
    #[serde(default)]
    pub security_enabled: Option<bool>,

    /// `"Private"`, `"Public"`, or `"HiddenMembership"` for Microsoft 365
    /// groups; absent for security groups.
    #[serde(default)]
    pub visibility: Option<String>,

    /// ISO 8601 timestamp of group creation.
    #[serde(default)]
    pub created_date_time: Option<String>,

    /// `["Unified"]` for Microsoft 365 groups, empty for security groups.
    #[serde(default)]
    pub group_types: Vec<String>,
}

// ── Request types ──────────────────────────────────────────────────────

/// Request body for PATCH `/v1.0/groups/{id}`.
///
/// Every field is optional — omitted fields are left unchanged by Graph,
/// so `skip_serializing_if` keeps them out of the body entirely.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    /// New display name. `None` leaves it unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// New description. `None` leaves it unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New mail nickname. `None` leaves it unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_nickname: Option<String>,
}

impl UpdateGroupRequest {
    fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.description.is_none() && self.mail_nickname.is_none()
    }
}

// ── Endpoint functions ─────────────────────────────────────────────────

/// Retrieves groups, optionally narrowed by an OData `$filter`.
///
/// # Errors
///
/// - `CliError::Api` — Graph rejected the request (e.g. 400 for a
///   malformed filter, 403 for insufficient permissions).
/// - `CliError::Auth` — token acquisition or refresh failed.
/// - `CliError::Network` — transport-level failure.
pub async fn list_groups(client: &GraphClient, filter: Option<&str>) -> Result<Vec<Group>> {
    let query: Vec<(&str, &str)> = filter.into_iter().map(|f| ("$filter", f)).collect();
    let response: ODataList<Group> = client.get_with_query(GROUP.base_path, &query).await?;
    Ok(response.value)
}

/// Retrieves a single group by its GUID.
///
/// # Errors
///
/// - `CliError::Api` — non-success status; 404 means the id was not found.
/// - `CliError::Auth` / `CliError::Network` — as above.
pub async fn get_group(client: &GraphClient, id: &str) -> Result<Group> {
    client.get(&GROUP.item_path(id)).await
}

/// Updates mutable group properties. Graph answers `204 No Content`.
pub async fn update_group(
    client: &GraphClient,
    id: &str,
    update: &UpdateGroupRequest,
) -> Result<()> {
    client.patch_no_content(&GROUP.item_path(id), update).await
}

/// Permanently deletes a group. Graph answers `204 No Content`.
///
/// Note: deleted Microsoft 365 groups are restorable for 30 days via the
/// directory deletedItems endpoint; that recovery surface is out of scope
/// here.
pub async fn delete_group(client: &GraphClient, id: &str) -> Result<()> {
    client.delete(&GROUP.item_path(id)).await
}

// ── Commands ───────────────────────────────────────────────────────────

fn selector_schema() -> Schema {
    Schema::new()
        .exactly_one_of_or_pick(&["id", "name"])
        .shape("id", Shape::Guid)
}

fn selector(ctx: &CommandContext<'_>, id: Option<String>, name: Option<String>) -> Result<Selector> {
    let opts = Options::new().set_opt("id", id).set_opt("name", name);
    selector_schema()
        .validate(&opts, &ctx.policy)
        .map_err(CliError::Validation)?;
    Ok(Selector::from_options(&opts, "id", "name"))
}

/// `graphctl group get` — print one group addressed by id or name.
pub async fn get_command(
    ctx: &CommandContext<'_>,
    id: Option<String>,
    name: Option<String>,
) -> Result<Outcome> {
    let selector = selector(ctx, id, name)?;
    let id = resolve_id(ctx.client, &GROUP, &selector, ctx.resolver_prompter()).await?;
    let group = get_group(ctx.client, &id).await?;
    ctx.logger.log(&serde_json::to_value(group)?);
    Ok(Outcome::Done)
}

/// `graphctl group list` — print groups, optionally filtered.
pub async fn list_command(ctx: &CommandContext<'_>, filter: Option<String>) -> Result<Outcome> {
    let groups = list_groups(ctx.client, filter.as_deref()).await?;
    ctx.logger.log(&serde_json::to_value(groups)?);
    Ok(Outcome::Done)
}

/// `graphctl group set` — PATCH group properties.
///
/// At least one changed property must be supplied; an empty update is a
/// validation error rather than a no-op network call.
pub async fn set_command(
    ctx: &CommandContext<'_>,
    id: Option<String>,
    name: Option<String>,
    update: UpdateGroupRequest,
) -> Result<Outcome> {
    if update.is_empty() {
        return Err(CliError::Validation(
            "Specify at least one property to update: display-name, description, mail-nickname."
                .to_string(),
        ));
    }
    let selector = selector(ctx, id, name)?;
    let id = resolve_id(ctx.client, &GROUP, &selector, ctx.resolver_prompter()).await?;
    update_group(ctx.client, &id, &update).await?;
    Ok(Outcome::Done)
}

/// `graphctl group remove` — delete a group, gated on confirmation.
///
/// With `--force` the prompt is skipped; otherwise declining aborts the
/// command before the DELETE is issued. A successful delete prints
/// nothing.
pub async fn remove_command(
    ctx: &CommandContext<'_>,
    id: Option<String>,
    name: Option<String>,
    force: bool,
) -> Result<Outcome> {
    let selector = selector(ctx, id, name)?;

    // Resolve before gating so the prompt can describe the exact target.
    // The lookup is a read; the only mutating call stays behind the gate.
    let label = match &selector {
        Selector::Name(name) => name.clone(),
        Selector::Id(id) => id.clone(),
        Selector::None => GROUP.singular.to_string(),
    };
    let id = resolve_id(ctx.client, &GROUP, &selector, ctx.resolver_prompter()).await?;

    if !confirm_gate(ctx, force, &format!("Remove group '{label}'?"))? {
        return Ok(Outcome::Aborted);
    }

    delete_group(ctx.client, &id).await?;
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Group deserialization ────────────────────────────────────────

    #[test]
    fn group_deserializes_full_response() {
        // Based on the documented Graph group resource example.
        let json = r#"{
            "id": "b320ee12-b1cd-4cca-b648-a437be61c5cd",
            "displayName": "CLI Test Group",
            "description": "Self help community for library",
            "mail": "library@contoso.onmicrosoft.com",
            "mailNickname": "library",
            "mailEnabled": true,
            "securityEnabled": false,
            "visibility": "Public",
            "createdDateTime": "2019-01-23T19:31:19Z",
            "groupTypes": ["Unified"]
        }"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.id, "b320ee12-b1cd-4cca-b648-a437be61c5cd");
        assert_eq!(group.display_name.as_deref(), Some("CLI Test Group"));
        assert_eq!(group.mail.as_deref(), Some("library@contoso.onmicrosoft.com"));
        assert_eq!(group.mail_enabled, Some(true));
        assert_eq!(group.security_enabled, Some(false));
        assert_eq!(group.visibility.as_deref(), Some("Public"));
        assert_eq!(group.group_types, vec!["Unified"]);
    }

    #[test]
    fn group_deserializes_sparse_security_group() {
        // Security groups carry no visibility/mail; optional fields must
        // default cleanly.
        let json = r#"{"id": "sec-group-1", "securityEnabled": true, "groupTypes": []}"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.id, "sec-group-1");
        assert!(group.display_name.is_none());
        assert!(group.visibility.is_none());
        assert!(group.group_types.is_empty());
    }

    #[test]
    fn group_ignores_unknown_fields() {
        // Forward compatibility: new Graph properties must not break
        // deserialization.
        let json = r#"{"id": "g", "brandNewField": {"nested": true}}"#;
        assert!(serde_json::from_str::<Group>(json).is_ok());
    }

    // ── UpdateGroupRequest serialization ─────────────────────────────

    #[test]
    fn update_request_omits_unset_fields() {
        let req = UpdateGroupRequest {
            description: Some("Updated".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["description"], "Updated");
        assert!(json.get("displayName").is_none());
        assert!(json.get("mailNickname").is_none());
    }

    #[test]
    fn update_request_serializes_camel_case() {
        let req = UpdateGroupRequest {
            display_name: Some("Renamed".to_string()),
            mail_nickname: Some("renamed".to_string()),
            description: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["displayName"], "Renamed");
        assert_eq!(json["mailNickname"], "renamed");
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateGroupRequest::default().is_empty());
        assert!(
            !UpdateGroupRequest {
                description: Some(String::new()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    // ── descriptor ───────────────────────────────────────────────────

    #[test]
    fn group_entity_paths() {
        assert_eq!(GROUP.item_path("abc"), "v1.0/groups/abc");
        assert_eq!(
            GROUP.name_filter("CLI Test Group"),
            "displayName eq 'CLI Test Group'"
        );
    }
}
