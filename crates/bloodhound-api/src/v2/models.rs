// Request and response types for BloodHound `/api/v2/` endpoints
//
// Field names follow the wire format; Rust-side names are snake_case with
// `#[serde(rename)]` where the server uses lowercase run-together keys.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::v2::de;

// ── Search ───────────────────────────────────────────────────────────

/// One hit from `GET /api/v2/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "objectid")]
    pub object_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub object_type: String,
    #[serde(default, deserialize_with = "de::nullable")]
    pub system_tags: String,
}

// ── Relationships ────────────────────────────────────────────────────

/// An element of a relationship list (members, sessions, controllers, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "objectid", alias = "objectID")]
    pub object_id: String,
    #[serde(default, alias = "type")]
    pub object_type: String,
    #[serde(default, alias = "isTierZero", deserialize_with = "de::nullable")]
    pub is_tier_zero: bool,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub login_method: &'a str,
    pub username: &'a str,
    pub secret: &'a str,
}

/// `data` of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginSession {
    pub session_token: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_dn: Option<String>,
}

// ── Application users ────────────────────────────────────────────────

/// A BloodHound application (login) user, not an AD user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppUser {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "email_address")]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub is_admin: bool,
    #[serde(default)]
    pub user_dn: Option<String>,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelfData {
    pub user: AppUser,
    #[serde(default)]
    pub user_dn: Option<String>,
}

/// Payload for `create_app_user`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAppUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "secret")]
    pub password: String,
    pub is_admin: bool,
}

/// Partial update for `update_app_user`; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateAppUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

// ── Domains ──────────────────────────────────────────────────────────

/// Entry of `GET /api/v2/available-domains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableDomain {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub domain_type: String,
    #[serde(default, deserialize_with = "de::nullable")]
    pub collected: bool,
    #[serde(default, rename = "impactValue")]
    pub impact_value: Option<i64>,
}

// ── Graph ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ShortestPathRequest<'a> {
    pub start_node: &'a str,
    pub end_node: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CypherRequest<'a> {
    pub query: &'a str,
    pub include_properties: bool,
}

/// Node/edge graph returned by path queries. Nodes are keyed by graph ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
    #[serde(default, deserialize_with = "de::nullable")]
    pub nodes: HashMap<String, GraphNode>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, rename = "objectId")]
    pub object_id: String,
    #[serde(default, rename = "isTierZero", deserialize_with = "de::nullable")]
    pub is_tier_zero: bool,
    #[serde(default, rename = "lastSeen")]
    pub last_seen: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Stats ────────────────────────────────────────────────────────────

/// Node count for one label set, from `MATCH (n) RETURN labels(n), count(n)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    #[serde(rename = "type", default, deserialize_with = "de::labels")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub count: i64,
}

/// Per-domain object counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomainStats {
    pub total_users: i64,
    pub admin_users: i64,
    pub kerberoastable_users: i64,
    pub total_computers: i64,
    /// Computers whose operating system mentions "Server".
    pub domain_controllers: i64,
    pub total_groups: i64,
    pub total_gpos: i64,
    pub total_ous: i64,
}

// ── Saved queries ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedQuery {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::nullable")]
    pub public: bool,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SavedQueryRequest<'a> {
    pub name: &'a str,
    pub query: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShareRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    pub user_sids: &'a [String],
}

// ── Ingest ───────────────────────────────────────────────────────────

/// A file-upload job created by `start_file_upload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileUploadJob {
    pub id: i64,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub start_time: Option<DateTime<Utc>>,
}

// ── Admin ────────────────────────────────────────────────────────────

/// What `clear_database` should delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearDatabase {
    pub delete_collected_graph_data: bool,
    pub delete_file_ingest_history: bool,
    pub delete_data_quality_history: bool,
}

impl ClearDatabase {
    /// Wipe graph data, ingest history, and data-quality history.
    pub fn everything() -> Self {
        Self {
            delete_collected_graph_data: true,
            delete_file_ingest_history: true,
            delete_data_quality_history: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetGroup {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default, deserialize_with = "de::nullable")]
    pub system_group: bool,
    #[serde(default, rename = "memberCount")]
    pub member_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetGroupList {
    #[serde(default, deserialize_with = "de::nullable")]
    pub asset_groups: Vec<AssetGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorAction {
    Add,
    Remove,
}

/// One selector change for the "Owned" asset group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipUpdate {
    pub selector_name: String,
    pub sid: String,
    pub action: SelectorAction,
}

impl OwnershipUpdate {
    pub fn add(object_id: impl Into<String>) -> Self {
        let sid = object_id.into();
        Self {
            selector_name: sid.clone(),
            sid,
            action: SelectorAction::Add,
        }
    }

    pub fn remove(object_id: impl Into<String>) -> Self {
        let sid = object_id.into();
        Self {
            selector_name: sid.clone(),
            sid,
            action: SelectorAction::Remove,
        }
    }
}

// ── Attack paths ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackPath {
    #[serde(default, deserialize_with = "de::nullable")]
    pub object_ids: Vec<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub node_counts: HashMap<String, i64>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub severity: f64,
    #[serde(default)]
    pub path_finding: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackPathFinding {
    #[serde(default)]
    pub finding: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Data quality ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdDataQualityStat {
    pub domain_sid: String,
    pub users: i64,
    pub groups: i64,
    pub computers: i64,
    pub ous: i64,
    pub containers: i64,
    pub gpos: i64,
    pub aiacas: i64,
    pub rootcas: i64,
    pub enterprisecas: i64,
    pub ntauthstores: i64,
    pub certtemplates: i64,
    pub issuancepolicies: i64,
    pub acls: i64,
    pub sessions: i64,
    pub relationships: i64,
    pub session_completeness: f64,
    pub local_group_completeness: f64,
    pub run_id: String,
    pub id: i64,
    #[serde(deserialize_with = "de::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureDataQualityStat {
    #[serde(rename = "tenantid")]
    pub tenant_id: String,
    pub users: i64,
    pub groups: i64,
    pub apps: i64,
    pub service_principals: i64,
    pub devices: i64,
    pub management_groups: i64,
    pub subscriptions: i64,
    pub resource_groups: i64,
    pub vms: i64,
    pub key_vaults: i64,
    pub automation_accounts: i64,
    pub container_registries: i64,
    pub function_apps: i64,
    pub logic_apps: i64,
    pub managed_clusters: i64,
    pub vm_scale_sets: i64,
    pub web_apps: i64,
    pub relationships: i64,
    pub run_id: String,
    pub id: i64,
    #[serde(deserialize_with = "de::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn clear_database_uses_camel_case() {
        let body = serde_json::to_value(ClearDatabase::everything()).unwrap();
        assert_eq!(
            body,
            json!({
                "deleteCollectedGraphData": true,
                "deleteFileIngestHistory": true,
                "deleteDataQualityHistory": true
            })
        );
    }

    #[test]
    fn ownership_update_wire_shape() {
        let body = serde_json::to_value(OwnershipUpdate::add("S-1-5-21-1-1104")).unwrap();
        assert_eq!(
            body,
            json!({"selector_name": "S-1-5-21-1-1104", "sid": "S-1-5-21-1-1104", "action": "add"})
        );
    }

    #[test]
    fn relationship_record_accepts_alternate_keys() {
        let rec: RelationshipRecord =
            serde_json::from_value(json!({"name": "BOB", "objectid": "S-1", "type": "User"}))
                .unwrap();
        assert_eq!(rec.object_id, "S-1");
        assert_eq!(rec.object_type, "User");
        assert!(!rec.is_tier_zero);
    }

    #[test]
    fn update_app_user_omits_unset_fields() {
        let patch = UpdateAppUser {
            is_admin: Some(true),
            ..UpdateAppUser::default()
        };
        assert_eq!(serde_json::to_value(patch).unwrap(), json!({"is_admin": true}));
    }
}
