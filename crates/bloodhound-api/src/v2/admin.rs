// Administrative endpoints: database reset and asset-group ownership

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::v2::client::BloodHoundClient;
use crate::v2::models::{AssetGroup, AssetGroupList, ClearDatabase, OwnershipUpdate};

const OWNED_GROUP_NAME: &str = "Owned";

impl BloodHoundClient {
    /// Delete collected data. Irreversible.
    ///
    /// `POST /api/v2/clear-database`
    pub async fn clear_database(&self, what: ClearDatabase) -> Result<(), Error> {
        warn!(?what, "clearing database");
        self.send_json_no_response(Method::POST, &["clear-database"], &what)
            .await?;
        info!("database cleared");
        Ok(())
    }

    /// `GET /api/v2/asset-groups`
    pub async fn list_asset_groups(&self) -> Result<Vec<AssetGroup>, Error> {
        debug!("listing asset groups");
        let list: AssetGroupList = self.get_data(&["asset-groups"], &[]).await?;
        Ok(list.asset_groups)
    }

    /// ID of the built-in "Owned" asset group.
    pub async fn owned_asset_group_id(&self) -> Result<i64, Error> {
        self.list_asset_groups()
            .await?
            .into_iter()
            .find(|group| group.name == OWNED_GROUP_NAME)
            .map(|group| group.id)
            .ok_or_else(|| Error::NotFound {
                kind: "AssetGroup".into(),
                name: OWNED_GROUP_NAME.into(),
            })
    }

    /// Add objects to, or remove them from, the "Owned" asset group.
    ///
    /// `PUT /api/v2/asset-groups/{owned}/selectors`
    pub async fn update_owned_status(&self, updates: &[OwnershipUpdate]) -> Result<(), Error> {
        if updates.is_empty() {
            return Ok(());
        }
        let group_id = self.owned_asset_group_id().await?.to_string();
        debug!(%group_id, changes = updates.len(), "updating owned selectors");
        self.send_json_no_response(
            Method::PUT,
            &["asset-groups", group_id.as_str(), "selectors"],
            updates,
        )
        .await
    }

    /// Mark the given object IDs as owned.
    pub async fn mark_owned(&self, object_ids: &[&str]) -> Result<(), Error> {
        let updates: Vec<_> = object_ids.iter().map(|id| OwnershipUpdate::add(*id)).collect();
        self.update_owned_status(&updates).await
    }

    /// Remove the owned mark from the given object IDs.
    pub async fn unmark_owned(&self, object_ids: &[&str]) -> Result<(), Error> {
        let updates: Vec<_> = object_ids
            .iter()
            .map(|id| OwnershipUpdate::remove(*id))
            .collect();
        self.update_owned_status(&updates).await
    }
}
