// Relationship list endpoints
//
// `GET /api/v2/<resource>/<id>/<relationship>[?limit=n]`, one request per
// call. Responses go through the envelope normalizer, so an empty
// relationship (which the server reports as a bare count) is an empty list.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Error;
use crate::v2::client::{BloodHoundClient, limit_query};
use crate::v2::envelope::Page;
use crate::v2::kinds::{EntityKind, Relationship};
use crate::v2::models::RelationshipRecord;

impl BloodHoundClient {
    /// Fetch one page of a relationship list with its paging metadata.
    ///
    /// `limit`: `None` or `Some(0)` leaves the page size to the server.
    pub async fn relationship_page<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        object_id: &str,
        relationship: Relationship,
        limit: Option<u32>,
    ) -> Result<Page<T>, Error> {
        if !kind.supports(relationship) {
            return Err(Error::UnsupportedRelationship {
                kind: kind.into(),
                relationship: relationship.into(),
            });
        }
        let object_id = object_id.trim();
        if object_id.is_empty() {
            return Err(Error::InvalidArgument(format!("{kind} object ID is empty")));
        }

        let mut segments: Vec<&str> = kind.resource().to_vec();
        segments.push(object_id);
        segments.push(relationship.path_segment());

        debug!(%kind, object_id, %relationship, ?limit, "listing relationship");
        let page = self.get_page(&segments, &limit_query(limit)).await?;
        debug!(%kind, object_id, %relationship, items = page.items.len(), count = ?page.count, "relationship listed");
        Ok(page)
    }

    /// List related objects (members, sessions, controllers, ...).
    pub async fn list_relationships(
        &self,
        kind: EntityKind,
        object_id: &str,
        relationship: Relationship,
        limit: Option<u32>,
    ) -> Result<Vec<RelationshipRecord>, Error> {
        let page = self
            .relationship_page(kind, object_id, relationship, limit)
            .await?;
        Ok(page.items)
    }

    // ── Named wrappers ───────────────────────────────────────────────

    /// Direct members of a group.
    ///
    /// `GET /api/v2/groups/{id}/members`
    pub async fn get_group_members(
        &self,
        object_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RelationshipRecord>, Error> {
        self.list_relationships(EntityKind::Group, object_id, Relationship::Members, limit)
            .await
    }

    /// Groups a user belongs to.
    ///
    /// `GET /api/v2/users/{id}/memberships`
    pub async fn get_ad_user_memberships(
        &self,
        object_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RelationshipRecord>, Error> {
        self.list_relationships(EntityKind::User, object_id, Relationship::Memberships, limit)
            .await
    }

    /// Principals with local admin rights on a computer.
    ///
    /// `GET /api/v2/computers/{id}/admin-rights`
    pub async fn get_computer_admins(
        &self,
        object_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RelationshipRecord>, Error> {
        self.list_relationships(
            EntityKind::Computer,
            object_id,
            Relationship::AdminRights,
            limit,
        )
        .await
    }

    /// Sessions on a computer.
    ///
    /// `GET /api/v2/computers/{id}/sessions`
    pub async fn get_computer_sessions(
        &self,
        object_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RelationshipRecord>, Error> {
        self.list_relationships(EntityKind::Computer, object_id, Relationship::Sessions, limit)
            .await
    }

    /// Domains trusting this one.
    ///
    /// `GET /api/v2/domains/{id}/inbound-trusts`
    pub async fn get_domain_inbound_trusts(
        &self,
        object_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RelationshipRecord>, Error> {
        self.list_relationships(
            EntityKind::Domain,
            object_id,
            Relationship::InboundTrusts,
            limit,
        )
        .await
    }
}
