// Data-quality statistics per AD domain or Azure tenant

use tracing::debug;

use crate::error::Error;
use crate::v2::client::BloodHoundClient;
use crate::v2::models::{AdDataQualityStat, AzureDataQualityStat};

impl BloodHoundClient {
    /// Latest collection statistics for an AD domain.
    ///
    /// `GET /api/v2/ad-domains/{id}/data-quality-stats`
    pub async fn ad_data_quality_stats(&self, domain_id: &str) -> Result<AdDataQualityStat, Error> {
        debug!(domain_id, "fetching AD data quality stats");
        let page = self
            .get_page(&["ad-domains", domain_id, "data-quality-stats"], &[])
            .await?;
        page.items.into_iter().next().ok_or_else(|| Error::NotFound {
            kind: "AD data quality stats".into(),
            name: domain_id.to_owned(),
        })
    }

    /// Latest collection statistics for an Azure tenant.
    ///
    /// `GET /api/v2/azure-tenants/{id}/data-quality-stats`
    pub async fn azure_data_quality_stats(
        &self,
        tenant_id: &str,
    ) -> Result<AzureDataQualityStat, Error> {
        debug!(tenant_id, "fetching Azure data quality stats");
        let page = self
            .get_page(&["azure-tenants", tenant_id, "data-quality-stats"], &[])
            .await?;
        page.items.into_iter().next().ok_or_else(|| Error::NotFound {
            kind: "Azure data quality stats".into(),
            name: tenant_id.to_owned(),
        })
    }
}
