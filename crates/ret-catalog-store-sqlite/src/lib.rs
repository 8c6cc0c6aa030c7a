// crates/ret-catalog-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Catalog Source Crate
// Description: SQLite-backed TableSource for the retriever catalog.
// Purpose: Crate entry point and public re-exports.
// Dependencies: ret-catalog-core, rusqlite, serde, thiserror
// ============================================================================

//! # Retriever Catalog SQLite Source
//!
//! `SQLite`-backed implementation of the retriever catalog's tabular source.
//! The catalog schema holds the relational form of the configuration graph;
//! each retriever query is served with the sort order the graph loader
//! requires.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::source::SqliteCatalogSource;
pub use self::source::SqliteJournalMode;
pub use self::source::SqliteSourceConfig;
pub use self::source::SqliteSourceError;
pub use self::source::SqliteSyncMode;
