//! Core domain layer for Folio.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! services of the content query layer: cursor pagination over ordered
//! collections and resolution of URIs into nodes. It follows hexagonal
//! architecture principles - this is the innermost layer with no
//! dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      folio (binary)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │      folio-graphql       │         folio-routing            │
//! │         (API)            │      (rewrite rules)             │
//! ├──────────────────────────┴──────────────────────────────────┤
//! │                      folio-storage                          │
//! │               (in-memory fixture, PostgreSQL)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      folio-core  ← YOU ARE HERE             │
//! │               (models, ports, services)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Nodes and the site configuration snapshot
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Connection engine and URI resolver
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Ports
//!
//! - [`ports::CollectionSource`] - An ordered, filterable collection
//! - [`ports::Repositories`] - Hands out the collections the API pages over
//! - [`ports::NodeStore`] - Materializes a single node by kind and key
//! - [`ports::Router`] - Maps a normalized path to query variables
//! - [`ports::RequestHook`] - Observes routing before materialization
//!
//! ## Pagination
//!
//! [`services::ConnectionResolver`] validates `first`/`after`/`last`/`before`,
//! fetches one item past the page to detect more results, and checks the
//! opposite side of the cursor with a single-row existence query. Cursors
//! are opaque base64 tokens carrying the connection tag and order key.
//!
//! ## URI Resolution
//!
//! [`services::NodeResolver`] runs these steps:
//!
//! 1. Parse and reject URIs on other hosts
//! 2. Strip the home sub-directory and surrounding slashes
//! 3. Serve the root from the reading settings
//! 4. Route the path and notify request hooks
//! 5. Materialize the selected node and verify hierarchical paths exactly

pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
