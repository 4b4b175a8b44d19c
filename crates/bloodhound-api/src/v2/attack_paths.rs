// Attack path endpoints
//
// These lists are informational; a payload that does not match the expected
// element shape is reported as an empty list rather than an error.

use tracing::debug;

use crate::error::Error;
use crate::v2::client::BloodHoundClient;
use crate::v2::models::{AttackPath, AttackPathFinding};

impl BloodHoundClient {
    /// `GET /api/v2/attack-paths`
    pub async fn list_attack_paths(&self) -> Result<Vec<AttackPath>, Error> {
        debug!("listing attack paths");
        let page = self.get_page(&["attack-paths"], &[]).await?;
        Ok(page.items)
    }

    /// `GET /api/v2/attack-paths/findings`
    pub async fn list_attack_path_findings(&self) -> Result<Vec<AttackPathFinding>, Error> {
        debug!("listing attack path findings");
        let page = self.get_page(&["attack-paths", "findings"], &[]).await?;
        Ok(page.items)
    }
}
