//! Repository modules implementing the catalog persistence layer.
//!
//! Each module adds methods to `CatalogService` via `impl CatalogService`
//! blocks. Every mutation runs in one transaction that also carries its audit
//! rows.

pub mod artists;
pub mod audit;
pub mod comments;
pub(crate) mod links;
pub mod playlists;
pub mod ratings;
pub mod songs;
pub mod users;
