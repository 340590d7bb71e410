// src/db.rs

pub mod layout;
pub mod pg_store;
pub mod predicate;
pub mod schema_catalog;
pub mod sources;
pub mod staging_store;

#[cfg(test)]
pub mod memory_store;

pub use pg_store::PgStagingStore;
pub use schema_catalog::{SchemaCatalog, TenantSchema};
pub use staging_store::{StagingStore, StagingTable};
