//! Storage layer for Folio.
//!
//! This crate provides the store collaborators of `folio-core`: the
//! ordered collections behind every connection and the single-node
//! lookups behind URI resolution.
//!
//! # Architecture
//!
//! - [`memory::MemoryStore`] - Serves a site from a JSON fixture snapshot
//! - [`postgres::Database`] - Connection pool management and migrations
//! - [`postgres::PgRepositories`] - PostgreSQL store with keyset pagination
//! - [`records`] - Rows shared by both stores and their conversion to nodes
//!
//! Both stores compute canonical URIs through the same
//! [`records::NodeBuilder`], so a fixture served from memory and the same
//! fixture imported into PostgreSQL resolve identically.
//!
//! # Usage
//!
//! ```ignore
//! use folio_storage::{Database, DatabaseConfig, PgRepositories};
//!
//! // Connect to the database
//! let config = DatabaseConfig::for_graphql(&database_url);
//! let db = Database::connect(&config).await?;
//!
//! // Run migrations
//! db.migrate().await?;
//!
//! // Create repositories
//! let repositories = Arc::new(PgRepositories::new(Arc::new(db), site, Vec::new()));
//! ```

pub mod memory;
pub mod postgres;
pub mod records;

pub use memory::MemoryStore;
pub use postgres::{Database, DatabaseConfig, ImportStats, PgRepositories};
pub use records::{SiteContent, default_roles};
