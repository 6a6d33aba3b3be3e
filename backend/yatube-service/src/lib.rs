/// Yatube Service Library
///
/// REST API for a small blogging platform: users publish posts, optionally in
/// a group, and comment on each other's posts. Reads need a JWT; writes on a
/// post, comment or account are reserved for its author.
///
/// # Modules
///
/// - `config`: environment-driven configuration
/// - `db`: the `Store` trait with Postgres and in-memory backends
/// - `error`: `AppError` and its JSON rendering
/// - `handlers`: HTTP handlers
/// - `middleware`: JWT authentication, `AuthUser`, authorship checks, metrics
/// - `models`: rows, response bodies and request payloads
/// - `services`: lookup, permission, validation and write for each resource
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod routes;
pub mod security;
pub mod services;

pub use config::{Config, StorageBackend};
pub use error::{AppError, Result};

use std::sync::Arc;

use db::{MemoryStore, Store};

/// Shared state handed to every handler via `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub backend: StorageBackend,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, backend: StorageBackend) -> Self {
        Self { store, backend }
    }

    /// State over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), StorageBackend::Memory)
    }
}
