// Database statistics built on the Cypher endpoint

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Error;
use crate::v2::client::BloodHoundClient;
use crate::v2::envelope::ListPayload;
use crate::v2::models::{DomainStats, Stat};

const GLOBAL_STATS_QUERY: &str = "MATCH (n) RETURN labels(n) as type, count(n) as count";

#[derive(Deserialize)]
struct CountRow {
    #[serde(default)]
    count: i64,
}

/// Quote `value` as a single-quoted Cypher string literal.
fn cypher_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if matches!(ch, '\\' | '\'') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

impl BloodHoundClient {
    /// Run a Cypher query whose `data` is a list of rows.
    ///
    /// A payload that is not a row list (a graph, `{}`) yields no rows.
    async fn cypher_rows<T: DeserializeOwned>(&self, query: &str) -> Result<Vec<T>, Error> {
        let data = self.run_cypher(query, false).await?;
        Ok(ListPayload::<T>::probe(data).into_items())
    }

    async fn cypher_count(&self, query: &str) -> Result<i64, Error> {
        let rows: Vec<CountRow> = self.cypher_rows(query).await?;
        Ok(rows.first().map_or(0, |row| row.count))
    }

    /// Node counts per label set across the whole database.
    pub async fn global_stats(&self) -> Result<Vec<Stat>, Error> {
        debug!("fetching global stats");
        self.cypher_rows(GLOBAL_STATS_QUERY).await
    }

    /// Object counts for one domain, matched on the nodes' `domain` property.
    ///
    /// Runs one Cypher query per counter, in sequence.
    pub async fn domain_stats(&self, domain: &str) -> Result<DomainStats, Error> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(Error::InvalidArgument("domain name is empty".into()));
        }
        debug!(domain, "fetching domain stats");
        let d = cypher_string(domain);

        Ok(DomainStats {
            total_users: self
                .cypher_count(&format!(
                    "MATCH (u:User) WHERE u.domain = {d} RETURN count(u) as count"
                ))
                .await?,
            admin_users: self
                .cypher_count(&format!(
                    "MATCH (u:User) WHERE u.domain = {d} AND u.admincount = true RETURN count(u) as count"
                ))
                .await?,
            kerberoastable_users: self
                .cypher_count(&format!(
                    "MATCH (u:User) WHERE u.domain = {d} AND u.hasspn = true RETURN count(u) as count"
                ))
                .await?,
            total_computers: self
                .cypher_count(&format!(
                    "MATCH (c:Computer) WHERE c.domain = {d} RETURN count(c) as count"
                ))
                .await?,
            domain_controllers: self
                .cypher_count(&format!(
                    "MATCH (c:Computer) WHERE c.domain = {d} AND c.operatingsystem CONTAINS 'Server' RETURN count(c) as count"
                ))
                .await?,
            total_groups: self
                .cypher_count(&format!(
                    "MATCH (g:Group) WHERE g.domain = {d} RETURN count(g) as count"
                ))
                .await?,
            total_gpos: self
                .cypher_count(&format!(
                    "MATCH (g:GPO) WHERE g.domain = {d} RETURN count(g) as count"
                ))
                .await?,
            total_ous: self
                .cypher_count(&format!(
                    "MATCH (o:OU) WHERE o.domain = {d} RETURN count(o) as count"
                ))
                .await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_names_are_quoted_literals() {
        assert_eq!(cypher_string("CORP.LOCAL"), "'CORP.LOCAL'");
        assert_eq!(
            cypher_string(r"X' OR 1=1 RETURN n //\"),
            r"'X\' OR 1=1 RETURN n //\\'"
        );
    }
}
