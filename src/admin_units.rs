//! Administrative unit commands for the Microsoft Graph API.
//!
//! Covers the `/v1.0/directory/administrativeUnits` endpoint family:
//!
//! - [`list_admin_units`] — retrieve a filtered list of administrative units.
//! - [`get_admin_unit`] — retrieve one by id.
//! - [`delete_admin_unit`] — permanently delete one.
//!
//! plus the command entry points running the full pipeline. Resolving a
//! name with zero matches reports
//! `The specified administrative unit '<name>' does not exist.`
//!
//! Read paths require `AdministrativeUnit.Read.All`; delete requires
//! `AdministrativeUnit.ReadWrite.All`.

use serde::{Deserialize, Serialize};

use crate::client::GraphClient;
use crate::error::{CliError, Result};
use crate::options::{Options, Schema, Shape};
use crate::pipeline::{CommandContext, Outcome, confirm_gate};
use crate::resolve::{Entity, ODataList, Selector, resolve_id};

/// Resolver descriptor for the administrative units collection.
pub const ADMIN_UNIT: Entity = Entity {
    singular: "administrative unit",
    plural: "administrative units",
    base_path: "v1.0/directory/administrativeUnits",
    name_field: "displayName",
};

// ── Response types ─────────────────────────────────────────────────────

/// An administrative unit as returned by the Graph API.
///
/// Reference: <https://learn.microsoft.com/en-us/graph/api/resources/administrativeunit>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrativeUnit {
    /// Unique GUID identifier.
    pub id: String,

    /// Display name of the unit.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// `"HiddenMembership"` when membership is hidden; absent (public)
    /// otherwise.
    #[serde(default)]
    pub visibility: Option<String>,

    /// `"Dynamic"` or `"Assigned"`; absent on older units.
    #[serde(default)]
    pub membership_type: Option<String>,
}

// ── Endpoint functions ─────────────────────────────────────────────────

/// Retrieves administrative units, optionally narrowed by an OData `$filter`.
pub async fn list_admin_units(
    client: &GraphClient,
    filter: Option<&str>,
) -> Result<Vec<AdministrativeUnit>> {
    let query: Vec<(&str, &str)> = filter.into_iter().map(|f| ("$filter", f)).collect();
    let response: ODataList<AdministrativeUnit> =
        client.get_with_query(ADMIN_UNIT.base_path, &query).await?;
    Ok(response.value)
}

/// Retrieves a single administrative unit by its GUID.
pub async fn get_admin_unit(client: &GraphClient, id: &str) -> Result<AdministrativeUnit> {
    client.get(&ADMIN_UNIT.item_path(id)).await
}

/// Permanently deletes an administrative unit. Graph answers `204 No Content`.
pub async fn delete_admin_unit(client: &GraphClient, id: &str) -> Result<()> {
    client.delete(&ADMIN_UNIT.item_path(id)).await
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

/// `graphctl adminunit get` — print one administrative unit.
pub async fn get_command(
    ctx: &CommandContext<'_>,
    id: Option<String>,
    name: Option<String>,
) -> Result<Outcome> {
    let selector = selector(ctx, id, name)?;
    let id = resolve_id(ctx.client, &ADMIN_UNIT, &selector, ctx.resolver_prompter()).await?;
    let unit = get_admin_unit(ctx.client, &id).await?;
    ctx.logger.log(&serde_json::to_value(unit)?);
    Ok(Outcome::Done)
}

/// `graphctl adminunit list` — print administrative units.
pub async fn list_command(ctx: &CommandContext<'_>, filter: Option<String>) -> Result<Outcome> {
    let units = list_admin_units(ctx.client, filter.as_deref()).await?;
    ctx.logger.log(&serde_json::to_value(units)?);
    Ok(Outcome::Done)
}

/// `graphctl adminunit remove` — delete one, gated on confirmation.
pub async fn remove_command(
    ctx: &CommandContext<'_>,
    id: Option<String>,
    name: Option<String>,
    force: bool,
) -> Result<Outcome> {
    let selector = selector(ctx, id, name)?;

    let label = match &selector {
        Selector::Name(name) => name.clone(),
        Selector::Id(id) => id.clone(),
        Selector::None => ADMIN_UNIT.singular.to_string(),
    };
    let id = resolve_id(ctx.client, &ADMIN_UNIT, &selector, ctx.resolver_prompter()).await?;

    if !confirm_gate(ctx, force, &format!("Remove administrative unit '{label}'?"))? {
        return Ok(Outcome::Aborted);
    }

    delete_admin_unit(ctx.client, &id).await?;
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_unit_deserializes_full_response() {
        let json = r#"{
            "id": "4d7ea995-bc0f-45c0-8c3e-132e93bf95f8",
            "displayName": "European Region",
            "description": "Administrators for the European region",
            "visibility": "HiddenMembership",
            "membershipType": "Assigned"
        }"#;
        let unit: AdministrativeUnit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.id, "4d7ea995-bc0f-45c0-8c3e-132e93bf95f8");
        assert_eq!(unit.display_name.as_deref(), Some("European Region"));
        assert_eq!(unit.visibility.as_deref(), Some("HiddenMembership"));
        assert_eq!(unit.membership_type.as_deref(), Some("Assigned"));
    }

    #[test]
    fn admin_unit_deserializes_minimal_response() {
        let json = r#"{"id": "au-sparse"}"#;
        let unit: AdministrativeUnit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.id, "au-sparse");
        assert!(unit.display_name.is_none());
        assert!(unit.membership_type.is_none());
    }

    #[test]
    fn admin_unit_entity_paths() {
        assert_eq!(
            ADMIN_UNIT.item_path("au-1"),
            "v1.0/directory/administrativeUnits/au-1"
        );
        assert_eq!(
            ADMIN_UNIT.name_filter("European"),
            "displayName eq 'European'"
        );
    }
}
