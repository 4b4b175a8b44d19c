// Typed entity model
//
// Single-entity endpoints answer with
//   {"data": {"props": {...}, "base"?: {...}, "<relationship>": <int>, ...}}
// `props` carries the graph properties, `base` (when present) the common
// identity fields, and every integer sibling is a relationship counter
// ("sessions": 3, "adminRights": 12). `Entity<P>` folds all of that into one
// value: common fields at the top, kind-specific fields in `P`, counters in
// `counts`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::v2::de;
use crate::v2::kinds::EntityKind;

/// Kind-specific property set decoded from `props`.
pub trait EntityProperties: DeserializeOwned {
    const KIND: EntityKind;
}

/// Relationship counters keyed by their wire name (`"sessions"`,
/// `"adminRights"`, `"inboundTrusts"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RelationshipCounts(BTreeMap<String, i64>);

impl RelationshipCounts {
    /// Counter value, `None` if the server did not report it.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A fully decoded BloodHound node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity<P> {
    pub object_id: String,
    pub name: String,
    pub object_type: String,
    pub distinguished_name: Option<String>,
    pub system_tags: Option<String>,
    pub when_created: Option<DateTime<Utc>>,
    pub properties: P,
    pub counts: RelationshipCounts,
}

impl<P> Entity<P> {
    /// Counter value, `0` when absent.
    pub fn count(&self, key: &str) -> i64 {
        self.counts.get(key).unwrap_or(0)
    }

    /// Tagged `admin_tier_0` by the server.
    pub fn is_tier_zero(&self) -> bool {
        self.system_tags
            .as_deref()
            .is_some_and(|tags| tags.split_whitespace().any(|t| t == "admin_tier_0"))
    }
}

pub type AdUser = Entity<UserProps>;
pub type Computer = Entity<ComputerProps>;
pub type Group = Entity<GroupProps>;
pub type Domain = Entity<DomainProps>;
pub type Ou = Entity<OuProps>;
pub type Gpo = Entity<GpoProps>;
pub type Container = Entity<ContainerProps>;
pub type AzureUser = Entity<AzureUserProps>;
pub type AzureGroup = Entity<AzureGroupProps>;
pub type AzureVm = Entity<AzureVmProps>;

// ── Property sets ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProps {
    #[serde(default, deserialize_with = "de::nullable")]
    pub enabled: bool,
    #[serde(default, rename = "hassidhistory", deserialize_with = "de::nullable")]
    pub has_sid_history: bool,
    #[serde(default, rename = "admincount", deserialize_with = "de::nullable")]
    pub is_admin: bool,
    /// Everything else from `props`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for UserProps {
    const KIND: EntityKind = EntityKind::User;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputerProps {
    #[serde(default, rename = "operatingsystem")]
    pub operating_system: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub enabled: bool,
    #[serde(default, rename = "haslaps", deserialize_with = "de::nullable")]
    pub has_laps: bool,
    #[serde(default, rename = "lastseen", deserialize_with = "de::timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for ComputerProps {
    const KIND: EntityKind = EntityKind::Computer;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupProps {
    #[serde(default, rename = "admincount", deserialize_with = "de::nullable")]
    pub is_admin: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for GroupProps {
    const KIND: EntityKind = EntityKind::Group;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainProps {
    #[serde(default, rename = "functionallevel")]
    pub functional_level: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub collected: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for DomainProps {
    const KIND: EntityKind = EntityKind::Domain;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OuProps {
    #[serde(default, rename = "blocksinheritance", deserialize_with = "de::nullable")]
    pub blocks_inheritance: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for OuProps {
    const KIND: EntityKind = EntityKind::Ou;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpoProps {
    #[serde(default, rename = "gpcpath")]
    pub gpc_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for GpoProps {
    const KIND: EntityKind = EntityKind::Gpo;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerProps {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for ContainerProps {
    const KIND: EntityKind = EntityKind::Container;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureUserProps {
    #[serde(default, rename = "userprincipalname")]
    pub user_principal_name: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub enabled: bool,
    #[serde(default, rename = "tenantid")]
    pub tenant_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for AzureUserProps {
    const KIND: EntityKind = EntityKind::AzureUser;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureGroupProps {
    #[serde(default, rename = "securityenabled", deserialize_with = "de::nullable")]
    pub security_enabled: bool,
    #[serde(default, rename = "tenantid")]
    pub tenant_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for AzureGroupProps {
    const KIND: EntityKind = EntityKind::AzureGroup;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureVmProps {
    #[serde(default, rename = "operatingsystem")]
    pub operating_system: Option<String>,
    #[serde(default, rename = "tenantid")]
    pub tenant_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityProperties for AzureVmProps {
    const KIND: EntityKind = EntityKind::AzureVm;
}

// ── Wire decoding ────────────────────────────────────────────────────

/// The `data` object of a single-entity response.
#[derive(Debug, Deserialize)]
pub(crate) struct EntityData {
    #[serde(default, deserialize_with = "de::nullable")]
    props: Map<String, Value>,
    #[serde(default)]
    base: Option<Map<String, Value>>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Identity fields that may live in `base` or `props`.
#[derive(Debug, Default, Deserialize)]
struct CommonFields {
    #[serde(default, alias = "objectId", alias = "objectID")]
    objectid: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    distinguishedname: Option<String>,
    #[serde(default)]
    system_tags: Option<String>,
    #[serde(default, deserialize_with = "de::timestamp")]
    whencreated: Option<DateTime<Utc>>,
}

impl CommonFields {
    fn from_map(map: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        Self::deserialize(Value::Object(map.clone()))
    }

    /// Field-wise merge; `self` wins where both are set.
    fn or(self, other: Self) -> Self {
        Self {
            objectid: self.objectid.or(other.objectid),
            name: self.name.or(other.name),
            distinguishedname: self.distinguishedname.or(other.distinguishedname),
            system_tags: self.system_tags.or(other.system_tags),
            whencreated: self.whencreated.or(other.whencreated),
        }
    }
}

impl EntityData {
    /// Fold the wire shape into an [`Entity`].
    ///
    /// `requested_id` fills `object_id` when the server omits it.
    pub(crate) fn into_entity<P: EntityProperties>(
        self,
        requested_id: &str,
    ) -> Result<Entity<P>, serde_json::Error> {
        let from_props = CommonFields::from_map(&self.props)?;
        let common = match &self.base {
            Some(base) => CommonFields::from_map(base)?.or(from_props),
            None => from_props,
        };

        let counts = self
            .rest
            .iter()
            .filter_map(|(key, value)| value.as_i64().map(|n| (key.clone(), n)))
            .collect();

        let properties = P::deserialize(Value::Object(self.props))?;

        Ok(Entity {
            object_id: common
                .objectid
                .unwrap_or_else(|| requested_id.to_owned()),
            name: common.name.unwrap_or_default(),
            // The endpoint decides the type, whatever `type` the payload carries.
            object_type: P::KIND.object_type().to_owned(),
            distinguished_name: common.distinguishedname,
            system_tags: common.system_tags,
            when_created: common.whencreated,
            properties,
            counts: RelationshipCounts(counts),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn decode<P: EntityProperties>(data: Value, id: &str) -> Entity<P> {
        serde_json::from_value::<EntityData>(data)
            .unwrap()
            .into_entity(id)
            .unwrap()
    }

    #[test]
    fn user_props_and_counters() {
        let user: AdUser = decode(
            json!({
                "props": {
                    "objectid": "S-1-5-21-123-456-500",
                    "name": "ADMINISTRATOR@CORP.LOCAL",
                    "distinguishedname": "CN=ADMINISTRATOR,CN=USERS,DC=CORP,DC=LOCAL",
                    "enabled": true,
                    "admincount": true,
                    "hassidhistory": null,
                    "whencreated": 1_600_000_000,
                    "description": "Built-in account"
                },
                "sessions": 3,
                "adminRights": 12,
                "groupMembership": 5
            }),
            "S-1-5-21-123-456-500",
        );

        assert_eq!(user.object_id, "S-1-5-21-123-456-500");
        assert_eq!(user.name, "ADMINISTRATOR@CORP.LOCAL");
        assert_eq!(user.object_type, "User");
        assert!(user.properties.is_admin);
        assert!(user.properties.enabled);
        assert!(!user.properties.has_sid_history);
        assert_eq!(user.count("sessions"), 3);
        assert_eq!(user.count("adminRights"), 12);
        assert_eq!(user.count("groupMembership"), 5);
        assert_eq!(user.count("rdpRights"), 0);
        assert_eq!(user.counts.len(), 3);
        assert_eq!(
            user.properties.extra.get("description"),
            Some(&json!("Built-in account"))
        );
        assert_eq!(
            user.when_created.map(|t| t.timestamp()),
            Some(1_600_000_000)
        );
    }

    #[test]
    fn base_takes_precedence_over_props() {
        let group: Group = decode(
            json!({
                "base": {
                    "objectid": "S-1-5-21-1-512",
                    "name": "DOMAIN ADMINS@CORP.LOCAL",
                    "type": "Group",
                    "system_tags": "admin_tier_0"
                },
                "props": {
                    "name": "stale name",
                    "admincount": true,
                    "distinguishedname": "CN=DOMAIN ADMINS,CN=USERS,DC=CORP,DC=LOCAL"
                },
                "members": 4
            }),
            "ignored",
        );

        assert_eq!(group.object_id, "S-1-5-21-1-512");
        assert_eq!(group.name, "DOMAIN ADMINS@CORP.LOCAL");
        assert_eq!(
            group.distinguished_name.as_deref(),
            Some("CN=DOMAIN ADMINS,CN=USERS,DC=CORP,DC=LOCAL")
        );
        assert!(group.is_tier_zero());
        assert!(group.properties.is_admin);
        assert_eq!(group.count("members"), 4);
    }

    #[test]
    fn non_integer_siblings_are_not_counters() {
        let computer: Computer = decode(
            json!({
                "props": {"name": "WS01.CORP.LOCAL", "lastseen": "2024-05-01T12:00:00Z"},
                "sessions": 2,
                "note": "not a count",
                "ratio": 0.5,
                "flag": true
            }),
            "S-1-5-21-1-1104",
        );

        assert_eq!(computer.object_id, "S-1-5-21-1-1104");
        assert_eq!(computer.counts.len(), 1);
        assert_eq!(computer.count("sessions"), 2);
        assert!(computer.properties.last_seen.is_some());
    }

    #[test]
    fn endpoint_kind_overrides_payload_type() {
        let user: AdUser = decode(
            json!({
                "props": {
                    "objectid": "S-1-5-21-1-500",
                    "name": "ADMIN@CORP.LOCAL",
                    "type": "Base"
                },
                "sessions": 1
            }),
            "S-1-5-21-1-500",
        );
        assert_eq!(user.object_type, "User");

        let gpo: Gpo = decode(
            json!({"base": {"name": "DEFAULT DOMAIN POLICY@CORP.LOCAL", "type": "Container"}}),
            "gpo-guid",
        );
        assert_eq!(gpo.object_type, "GPO");
    }

    #[test]
    fn azure_kind_overrides_type() {
        let vm: AzureVm = decode(
            json!({"props": {"name": "VM01", "type": "something", "tenantid": "t-1"}}),
            "vm-guid",
        );
        assert_eq!(vm.object_type, "AZVM");
        assert_eq!(vm.properties.tenant_id.as_deref(), Some("t-1"));
    }

    #[test]
    fn missing_props_decode_to_defaults() {
        let ou: Ou = decode(json!({"users": 0}), "ou-guid");
        assert_eq!(ou.object_id, "ou-guid");
        assert_eq!(ou.object_type, "OU");
        assert!(ou.name.is_empty());
        assert_eq!(ou.counts.get("users"), Some(0));
    }

    #[test]
    fn invalid_timestamp_is_a_decode_error() {
        let data: EntityData =
            serde_json::from_value(json!({"props": {"whencreated": "not a date"}})).unwrap();
        assert!(data.into_entity::<DomainProps>("x").is_err());
    }
}
