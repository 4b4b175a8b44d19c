// Entity kinds and relationship endpoints
//
// Each kind maps to a REST resource (`/api/v2/users`, `/api/v2/azure/entities`,
// ...) and an object-type literal used both for search scoping and as the
// `object_type` of every entity fetched from that resource.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A BloodHound node type with its own REST resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum EntityKind {
    User,
    Computer,
    Group,
    Domain,
    #[strum(serialize = "OU")]
    Ou,
    #[strum(serialize = "GPO")]
    Gpo,
    Container,
    #[strum(serialize = "AZUser")]
    AzureUser,
    #[strum(serialize = "AZGroup")]
    AzureGroup,
    #[strum(serialize = "AZVM")]
    AzureVm,
}

impl EntityKind {
    /// Object-type literal (`"User"`, `"OU"`, `"AZVM"`, ...). Also the value of
    /// the search endpoint's `type` filter.
    pub fn object_type(self) -> &'static str {
        self.into()
    }

    /// Path segments of the resource under `/api/v2/`.
    pub fn resource(self) -> &'static [&'static str] {
        match self {
            Self::User => &["users"],
            Self::Computer => &["computers"],
            Self::Group => &["groups"],
            Self::Domain => &["domains"],
            Self::Ou => &["ous"],
            Self::Gpo => &["gpos"],
            Self::Container => &["containers"],
            Self::AzureUser | Self::AzureGroup | Self::AzureVm => &["azure", "entities"],
        }
    }

    /// Whether the resolver may retry `name@domain` as `name` and accept a
    /// lone non-exact candidate.
    pub fn allows_account_fallback(self) -> bool {
        matches!(self, Self::User | Self::Computer | Self::Group)
    }

    pub fn is_azure(self) -> bool {
        matches!(self, Self::AzureUser | Self::AzureGroup | Self::AzureVm)
    }

    /// Relationship lists exposed for this kind.
    pub fn relationships(self) -> &'static [Relationship] {
        use Relationship as R;
        match self {
            Self::User => &[
                R::AdminRights,
                R::Sessions,
                R::RdpRights,
                R::DcomRights,
                R::PsRemoteRights,
                R::SqlAdminRights,
                R::ConstrainedDelegationRights,
                R::Memberships,
                R::Controllers,
                R::Controllables,
            ],
            Self::Computer => &[
                R::AdminRights,
                R::Sessions,
                R::RdpRights,
                R::DcomRights,
                R::PsRemoteRights,
                R::SqlAdmins,
                R::ConstrainedDelegationRights,
                R::GroupMembership,
                R::Controllers,
                R::Controllables,
            ],
            Self::Group => &[
                R::Members,
                R::Memberships,
                R::Controllers,
                R::Controllables,
                R::Sessions,
                R::RdpRights,
                R::DcomRights,
                R::PsRemoteRights,
                R::AdminRights,
            ],
            Self::Domain => &[
                R::Users,
                R::Computers,
                R::Groups,
                R::Gpos,
                R::Ous,
                R::LinkedGpos,
                R::ForeignUsers,
                R::ForeignGroups,
                R::ForeignAdmins,
                R::ForeignGpoControllers,
                R::InboundTrusts,
                R::OutboundTrusts,
                R::DcSyncers,
                R::Controllers,
            ],
            Self::Ou => &[R::Users, R::Computers, R::Groups, R::Gpos],
            Self::Gpo => &[R::Controllers, R::Computers, R::Users, R::Ous],
            Self::Container => &[R::Users, R::Computers, R::Groups, R::Controllers],
            Self::AzureUser | Self::AzureGroup | Self::AzureVm => &[],
        }
    }

    pub fn supports(self, relationship: Relationship) -> bool {
        self.relationships().contains(&relationship)
    }
}

/// A relationship sub-resource, e.g. `/api/v2/groups/{id}/members`.
///
/// The string form is the URL path segment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Relationship {
    AdminRights,
    Sessions,
    RdpRights,
    DcomRights,
    PsRemoteRights,
    SqlAdminRights,
    SqlAdmins,
    ConstrainedDelegationRights,
    Memberships,
    GroupMembership,
    Members,
    Controllers,
    Controllables,
    Users,
    Computers,
    Groups,
    Gpos,
    Ous,
    LinkedGpos,
    ForeignUsers,
    ForeignGroups,
    ForeignAdmins,
    ForeignGpoControllers,
    InboundTrusts,
    OutboundTrusts,
    DcSyncers,
}

impl Relationship {
    pub fn path_segment(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn object_type_literals() {
        assert_eq!(EntityKind::User.object_type(), "User");
        assert_eq!(EntityKind::Ou.object_type(), "OU");
        assert_eq!(EntityKind::Gpo.to_string(), "GPO");
        assert_eq!(EntityKind::AzureVm.object_type(), "AZVM");
        assert_eq!(EntityKind::from_str("azgroup").unwrap(), EntityKind::AzureGroup);
    }

    #[test]
    fn relationship_segments_are_kebab_case() {
        assert_eq!(Relationship::AdminRights.path_segment(), "admin-rights");
        assert_eq!(Relationship::PsRemoteRights.path_segment(), "ps-remote-rights");
        assert_eq!(Relationship::LinkedGpos.path_segment(), "linked-gpos");
        assert_eq!(Relationship::DcSyncers.path_segment(), "dc-syncers");
        assert_eq!(
            Relationship::ForeignGpoControllers.path_segment(),
            "foreign-gpo-controllers"
        );
        assert_eq!(
            Relationship::from_str("constrained-delegation-rights").unwrap(),
            Relationship::ConstrainedDelegationRights
        );
    }

    #[test]
    fn every_relationship_belongs_to_some_kind() {
        for rel in Relationship::iter() {
            assert!(
                EntityKind::iter().any(|kind| kind.supports(rel)),
                "{rel} is not reachable from any kind"
            );
        }
    }

    #[test]
    fn account_fallback_only_for_principals() {
        let fallback: Vec<_> = EntityKind::iter()
            .filter(|k| k.allows_account_fallback())
            .collect();
        assert_eq!(
            fallback,
            vec![EntityKind::User, EntityKind::Computer, EntityKind::Group]
        );
        assert!(EntityKind::Group.supports(Relationship::Members));
        assert!(!EntityKind::User.supports(Relationship::Members));
        assert!(EntityKind::AzureUser.relationships().is_empty());
    }
}
