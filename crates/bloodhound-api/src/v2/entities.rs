// Single-entity fetch endpoints
//
// One generic fetcher drives every kind: `GET /api/v2/<resource>/<id>`,
// decoded through `EntityData` into `Entity<P>`.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::v2::client::{BloodHoundClient, RequestBody, decode_error};
use crate::v2::entity::{
    AdUser, AzureGroup, AzureUser, AzureVm, Computer, Container, Domain, Entity, EntityData,
    EntityProperties, Gpo, Group, Ou,
};
use crate::v2::envelope::DataEnvelope;

impl BloodHoundClient {
    /// Fetch one entity by object ID (SID or GUID).
    ///
    /// `GET /api/v2/<resource>/<id>`
    pub async fn get_entity<P: EntityProperties>(&self, object_id: &str) -> Result<Entity<P>, Error> {
        let object_id = object_id.trim();
        if object_id.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "{} object ID is empty",
                P::KIND
            )));
        }

        let mut segments: Vec<&str> = P::KIND.resource().to_vec();
        segments.push(object_id);

        debug!(kind = %P::KIND, object_id, "fetching entity");
        let resp = self
            .execute(Method::GET, &segments, &[], RequestBody::Empty)
            .await?;
        let envelope: DataEnvelope<EntityData> = Self::decode(&resp)?;
        envelope
            .data
            .into_entity(object_id)
            .map_err(|e| decode_error(&e, resp.text()))
    }

    /// Like [`get_entity`](Self::get_entity), but a 404 is `Ok(None)`.
    pub async fn find_entity<P: EntityProperties>(
        &self,
        object_id: &str,
    ) -> Result<Option<Entity<P>>, Error> {
        match self.get_entity::<P>(object_id).await {
            Ok(entity) => Ok(Some(entity)),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ── Per-kind conveniences ────────────────────────────────────────

    /// `GET /api/v2/users/{id}`
    pub async fn get_ad_user(&self, object_id: &str) -> Result<AdUser, Error> {
        self.get_entity(object_id).await
    }

    /// `GET /api/v2/computers/{id}`
    pub async fn get_computer(&self, object_id: &str) -> Result<Computer, Error> {
        self.get_entity(object_id).await
    }

    /// `GET /api/v2/groups/{id}`
    pub async fn get_group(&self, object_id: &str) -> Result<Group, Error> {
        self.get_entity(object_id).await
    }

    /// `GET /api/v2/domains/{id}`
    pub async fn get_domain(&self, object_id: &str) -> Result<Domain, Error> {
        self.get_entity(object_id).await
    }

    /// `GET /api/v2/ous/{id}`
    pub async fn get_ou(&self, object_id: &str) -> Result<Ou, Error> {
        self.get_entity(object_id).await
    }

    /// `GET /api/v2/gpos/{id}`
    pub async fn get_gpo(&self, object_id: &str) -> Result<Gpo, Error> {
        self.get_entity(object_id).await
    }

    /// `GET /api/v2/containers/{id}`
    pub async fn get_container(&self, object_id: &str) -> Result<Container, Error> {
        self.get_entity(object_id).await
    }

    // ── Azure ────────────────────────────────────────────────────────

    pub async fn get_azure_user(&self, object_id: &str) -> Result<AzureUser, Error> {
        self.get_entity(object_id).await
    }

    pub async fn get_azure_group(&self, object_id: &str) -> Result<AzureGroup, Error> {
        self.get_entity(object_id).await
    }

    pub async fn get_azure_vm(&self, object_id: &str) -> Result<AzureVm, Error> {
        self.get_entity(object_id).await
    }

    /// Any Azure node, undecoded.
    ///
    /// `GET /api/v2/azure/entities/{id}`
    pub async fn get_azure_entity(&self, object_id: &str) -> Result<Value, Error> {
        if object_id.trim().is_empty() {
            return Err(Error::InvalidArgument("Azure object ID is empty".into()));
        }
        debug!(object_id, "fetching raw azure entity");
        self.get_data(&["azure", "entities", object_id.trim()], &[])
            .await
    }
}
