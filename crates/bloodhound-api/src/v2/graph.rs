// Graph query endpoints: shortest path and raw Cypher

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::v2::client::{BloodHoundClient, RequestBody};
use crate::v2::envelope::MaybeEnveloped;
use crate::v2::models::{CypherRequest, GraphResponse, ShortestPathRequest};

impl BloodHoundClient {
    /// Shortest path between two nodes, by object ID.
    ///
    /// `POST /api/v2/graphs/shortest-path`. A 404 means no path exists.
    pub async fn shortest_path(&self, start_node: &str, end_node: &str) -> Result<GraphResponse, Error> {
        if start_node.trim().is_empty() || end_node.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "shortest path needs both a start and an end node".into(),
            ));
        }
        debug!(start_node, end_node, "querying shortest path");

        let body = RequestBody::json(&ShortestPathRequest {
            start_node,
            end_node,
        })?;
        let resp = self
            .execute(Method::POST, &["graphs", "shortest-path"], &[], body)
            .await?;
        let graph: MaybeEnveloped<GraphResponse> = Self::decode(&resp)?;
        Ok(graph.into_inner())
    }

    /// Run a Cypher query and return the `data` payload untouched.
    ///
    /// `POST /api/v2/graphs/cypher`. An empty response body yields `{}`.
    pub async fn run_cypher(&self, query: &str, include_properties: bool) -> Result<Value, Error> {
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument("cypher query is empty".into()));
        }
        debug!(include_properties, "running cypher query");

        let body = RequestBody::json(&CypherRequest {
            query,
            include_properties,
        })?;
        let resp = self
            .execute(Method::POST, &["graphs", "cypher"], &[], body)
            .await?;

        if resp.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        let root: Value = Self::decode(&resp)?;
        Ok(match root {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Object(map)),
            other => other,
        })
    }
}
