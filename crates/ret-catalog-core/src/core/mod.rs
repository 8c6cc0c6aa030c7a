// crates/ret-catalog-core/src/core/mod.rs
// ============================================================================
// Module: Retriever Catalog Core Types
// Description: Identifiers, time values, and the configuration data model.
// Purpose: Group the core type definitions behind one module path.
// Dependencies: crate::core::{identifiers, model, time}
// ============================================================================

//! ## Overview
//! Core types for the retriever configuration graph: process keys and entity
//! handles, dependency dates, and the entity structs owned by
//! [`RetrieverConfig`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod model;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::identifiers::CoordSystemId;
pub use self::identifiers::DatastreamId;
pub use self::identifiers::ProcessKey;
pub use self::identifiers::SubgroupId;
pub use self::model::CoordDim;
pub use self::model::CoordSystem;
pub use self::model::DataStream;
pub use self::model::Group;
pub use self::model::ModelError;
pub use self::model::RetrieverConfig;
pub use self::model::SubGroup;
pub use self::model::TransParams;
pub use self::model::VarMap;
pub use self::model::VarOutput;
pub use self::model::Variable;
pub use self::time::DateParseError;
pub use self::time::DependencyDate;
