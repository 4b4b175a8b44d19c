// Available-domains endpoint

use tracing::debug;

use crate::error::Error;
use crate::v2::client::BloodHoundClient;
use crate::v2::models::AvailableDomain;

impl BloodHoundClient {
    /// Domains and tenants with collected data.
    ///
    /// `GET /api/v2/available-domains`
    pub async fn list_available_domains(&self) -> Result<Vec<AvailableDomain>, Error> {
        debug!("listing available domains");
        let page = self.get_page(&["available-domains"], &[]).await?;
        Ok(page.items)
    }
}
