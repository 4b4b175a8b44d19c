// bloodhound-api: Async Rust client for the BloodHound CE REST API (`/api/v2/`)

pub mod auth;
pub mod error;
pub mod transport;
pub mod v2;

pub use auth::Credentials;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use v2::{BloodHoundClient, ClientConfig, EntityKind, Relationship};
