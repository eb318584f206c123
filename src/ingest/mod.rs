// src/ingest/mod.rs
//! Catalog side of the pipeline: credential exchange and listing fetch.

pub mod auth;
pub mod catalog;
pub mod types;

pub use auth::OAuthCredentials;
pub use catalog::{parse_listings, ProductHuntCatalog};
pub use types::{AccessToken, CredentialProvider, Listing, ListingSource, UNCATEGORIZED};
