// crates/ret-catalog-core/src/runtime/mod.rs
// ============================================================================
// Module: Retriever Catalog Runtime
// Description: Graph loading, location specialization, and rendering.
// Purpose: Group the operations that act on a retriever configuration.
// Dependencies: crate::runtime::{loader, location, memory, render}
// ============================================================================

//! ## Overview
//! The runtime operations: [`load_retriever`] reconstructs the configuration
//! graph from a tabular source, [`set_location`] specializes it to one
//! deployment, and [`render_retriever`] produces the inspection report.
//! [`MemoryTableSource`] is the map-backed source used by tests and
//! embedders that already hold the rows.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod loader;
pub mod location;
pub mod memory;
pub mod render;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::loader::LoadError;
pub use self::loader::LoadedRetriever;
pub use self::loader::load_retriever;
pub use self::location::LocationError;
pub use self::location::RequiredVariableLoss;
pub use self::location::set_location;
pub use self::memory::MemoryTableSource;
pub use self::render::render_retriever;
pub use self::render::write_retriever;
