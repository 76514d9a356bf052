//! User commands for the Microsoft Graph API.
//!
//! Covers the `/v1.0/users` endpoint family:
//!
//! - [`list_users`] — retrieve a filtered list of users.
//! - [`get_user`] — retrieve one by GUID or UPN.
//! - [`delete_user`] — permanently delete a user.
//!
//! Users are addressable three ways: by GUID, by UPN (Graph accepts a
//! User Principal Name directly in the item path), or by display name via
//! the resolver. GUID and UPN shapes are validated before any network
//! call; display names go through the standard zero/one/many
//! classification.
//!
//! Read paths require `User.Read.All`; delete requires `User.ReadWrite.All`
//! plus a privileged directory role.

use serde::{Deserialize, Serialize};

use crate::client::GraphClient;
use crate::error::{CliError, Result};
use crate::options::{Options, Schema, Shape};
use crate::pipeline::{CommandContext, Outcome, confirm_gate};
use crate::resolve::{Entity, ODataList, Selector, resolve_id};

/// Resolver descriptor for the users collection.
pub const USER: Entity = Entity {
    singular: "user",
    plural: "users",
    base_path: "v1.0/users",
    name_field: "displayName",
};

// ── Response types ─────────────────────────────────────────────────────

/// A user as returned by the Graph API (default property set).
///
/// Reference: <https://learn.microsoft.com/en-us/graph/api/resources/user>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique GUID identifier.
    pub id: String,

    /// Display name, e.g. `"Adele Vance"`.
    #[serde(default)]
    pub display_name: Option<String>,

    /// User Principal Name — the email-shaped sign-in identifier.
    #[serde(default)]
    pub user_principal_name: Option<String>,

    /// Primary SMTP address.
    #[serde(default)]
    pub mail: Option<String>,

    /// Job title.
    #[serde(default)]
    pub job_title: Option<String>,

    /// Office location.
    #[serde(default)]
    pub office_location: Option<String>,

    /// First name.
    #[serde(default)]
    pub given_name: Option<String>,

    /// Last name.
    #[serde(default)]
    pub surname: Option<String>,

    /// Whether the account is enabled. Only returned when explicitly
    /// selected or with directory permissions.
    #[serde(default)]
    pub account_enabled: Option<bool>,
}

// ── Endpoint functions ─────────────────────────────────────────────────

/// Retrieves users, optionally narrowed by an OData `$filter`.
pub async fn list_users(client: &GraphClient, filter: Option<&str>) -> Result<Vec<User>> {
    let query: Vec<(&str, &str)> = filter.into_iter().map(|f| ("$filter", f)).collect();
    let response: ODataList<User> = client.get_with_query(USER.base_path, &query).await?;
    Ok(response.value)
}

/// Retrieves a single user by GUID or UPN — Graph accepts either in the
/// item path.
pub async fn get_user(client: &GraphClient, id_or_upn: &str) -> Result<User> {
    client.get(&USER.item_path(id_or_upn)).await
}

/// Permanently deletes a user. Graph answers `204 No Content`.
pub async fn delete_user(client: &GraphClient, id_or_upn: &str) -> Result<()> {
    client.delete(&USER.item_path(id_or_upn)).await
}

// ── Commands ───────────────────────────────────────────────────────────

fn selector_schema() -> Schema {
    Schema::new()
        .exactly_one_of_or_pick(&["id", "upn", "name"])
        .shape("id", Shape::Guid)
        .shape("upn", Shape::Upn)
}

/// Builds the user selector. A UPN addresses the item path directly, so
/// it maps to `Selector::Id` — no lookup round-trip needed.
fn selector(
    ctx: &CommandContext<'_>,
    id: Option<String>,
    upn: Option<String>,
    name: Option<String>,
) -> Result<Selector> {
    let opts = Options::new()
        .set_opt("id", id)
        .set_opt("upn", upn)
        .set_opt("name", name);
    selector_schema()
        .validate(&opts, &ctx.policy)
        .map_err(CliError::Validation)?;
    if let Some(upn) = opts.get_str("upn") {
        return Ok(Selector::Id(upn.to_string()));
    }
    Ok(Selector::from_options(&opts, "id", "name"))
}

/// `graphctl user get` — print one user addressed by id, UPN, or name.
pub async fn get_command(
    ctx: &CommandContext<'_>,
    id: Option<String>,
    upn: Option<String>,
    name: Option<String>,
) -> Result<Outcome> {
    let selector = selector(ctx, id, upn, name)?;
    let id = resolve_id(ctx.client, &USER, &selector, ctx.resolver_prompter()).await?;
    let user = get_user(ctx.client, &id).await?;
    ctx.logger.log(&serde_json::to_value(user)?);
    Ok(Outcome::Done)
}

/// `graphctl user list` — print users, optionally filtered.
pub async fn list_command(ctx: &CommandContext<'_>, filter: Option<String>) -> Result<Outcome> {
    let users = list_users(ctx.client, filter.as_deref()).await?;
    ctx.logger.log(&serde_json::to_value(users)?);
    Ok(Outcome::Done)
}

/// `graphctl user remove` — delete a user, gated on confirmation.
pub async fn remove_command(
    ctx: &CommandContext<'_>,
    id: Option<String>,
    upn: Option<String>,
    name: Option<String>,
    force: bool,
) -> Result<Outcome> {
    let selector = selector(ctx, id, upn, name)?;

    let label = match &selector {
        Selector::Name(name) => name.clone(),
        Selector::Id(id) => id.clone(),
        Selector::None => USER.singular.to_string(),
    };
    let id = resolve_id(ctx.client, &USER, &selector, ctx.resolver_prompter()).await?;

    if !confirm_gate(ctx, force, &format!("Remove user '{label}'?"))? {
        return Ok(Outcome::Aborted);
    }

    delete_user(ctx.client, &id).await?;
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_default_property_set() {
        let json = r#"{
            "id": "87d349ed-44d7-43e1-9a83-5f2406dee5bd",
            "displayName": "Adele Vance",
            "userPrincipalName": "AdeleV@contoso.onmicrosoft.com",
            "mail": "AdeleV@contoso.onmicrosoft.com",
            "jobTitle": "Product Marketing Manager",
            "officeLocation": "18/2111",
            "givenName": "Adele",
            "surname": "Vance"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "87d349ed-44d7-43e1-9a83-5f2406dee5bd");
        assert_eq!(user.display_name.as_deref(), Some("Adele Vance"));
        assert_eq!(
            user.user_principal_name.as_deref(),
            Some("AdeleV@contoso.onmicrosoft.com")
        );
        assert!(user.account_enabled.is_none());
    }

    #[test]
    fn user_deserializes_minimal_response() {
        let json = r#"{"id": "sparse-user"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "sparse-user");
        assert!(user.user_principal_name.is_none());
    }

    #[test]
    fn user_entity_paths_accept_upn() {
        // Graph accepts a UPN in place of the GUID in the item path.
        assert_eq!(
            USER.item_path("AdeleV@contoso.onmicrosoft.com"),
            "v1.0/users/AdeleV@contoso.onmicrosoft.com"
        );
    }
}
