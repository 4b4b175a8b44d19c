// BloodHound v2 API client modules
//
// Hand-written client for the `/api/v2/` REST surface. Single objects come
// wrapped in `{"data": ...}`; lists in `{"count", "limit", "skip", "data"}`
// where `data` is not always an array (see `envelope`).

mod admin;
mod app_users;
mod attack_paths;
mod auth;
pub mod client;
mod data_quality;
mod de;
mod domains;
mod entities;
pub mod entity;
pub mod envelope;
mod graph;
pub mod kinds;
pub mod models;
mod relationships;
pub mod resolve;
mod saved_queries;
mod search;
mod stats;
pub mod uploads;

pub use client::{BloodHoundClient, ClientConfig, RawResponse, RequestBody};
pub use entity::{Entity, EntityProperties, RelationshipCounts};
pub use envelope::{ListPayload, Page};
pub use kinds::{EntityKind, Relationship};
