// crates/ret-catalog-core/src/lib.rs
// ============================================================================
// Module: Retriever Catalog Core
// Description: Retriever configuration graph model, loader, and operations.
// Purpose: Deterministic, backend-agnostic retriever configuration handling.
// Dependencies: serde, thiserror, time
// ============================================================================

//! # Retriever Catalog Core
//!
//! Core library for reconstructing a process's retriever configuration graph
//! from flat, pre-sorted relational query results, specializing it to a
//! deployment site and facility, and rendering it for inspection.
//!
//! ## Design Principles
//!
//! - Deterministic: no wall-clock reads, no ambient I/O; every operation is a
//!   function of its inputs.
//! - Backend-agnostic: rows arrive through the [`TableSource`] trait; the
//!   core never speaks SQL.
//! - Strict ownership: the graph is an aggregate root with one owning list
//!   per entity type and opaque handles everywhere else, so removals are
//!   always total.
//!
//! ## Usage
//!
//! ```ignore
//! let loaded = load_retriever(&source, &process)?;
//! let mut config = loaded.config;
//! set_location(&mut config, "nsa", "C1")?;
//! println!("{}", render_retriever(&config));
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::CoordDim;
pub use self::core::CoordSystem;
pub use self::core::CoordSystemId;
pub use self::core::DataStream;
pub use self::core::DatastreamId;
pub use self::core::DateParseError;
pub use self::core::DependencyDate;
pub use self::core::Group;
pub use self::core::ModelError;
pub use self::core::ProcessKey;
pub use self::core::RetrieverConfig;
pub use self::core::SubGroup;
pub use self::core::SubgroupId;
pub use self::core::TransParams;
pub use self::core::VarMap;
pub use self::core::VarOutput;
pub use self::core::Variable;
pub use self::interfaces::RetrieverQuery;
pub use self::interfaces::SourceError;
pub use self::interfaces::TableResult;
pub use self::interfaces::TableShapeError;
pub use self::interfaces::TableSource;
pub use self::interfaces::columns;
pub use self::runtime::LoadError;
pub use self::runtime::LoadedRetriever;
pub use self::runtime::LocationError;
pub use self::runtime::MemoryTableSource;
pub use self::runtime::RequiredVariableLoss;
pub use self::runtime::load_retriever;
pub use self::runtime::render_retriever;
pub use self::runtime::set_location;
pub use self::runtime::write_retriever;
