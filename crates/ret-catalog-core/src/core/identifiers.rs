// crates/ret-catalog-core/src/core/identifiers.rs
// ============================================================================
// Module: Retriever Catalog Identifiers
// Description: Process keys and opaque entity handles for the catalog model.
// Purpose: Provide stable, typed references into the owning entity lists.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The relational source assigns numeric identifiers to datastreams,
//! subgroups, and coordinate systems. The loader uses them to reconnect rows
//! across query phases; afterwards they survive only as opaque handles so
//! that non-owning references remain valid while the owning lists are
//! compacted during location specialization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Process Key
// ============================================================================

/// Process type + process name pair identifying one retriever definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessKey {
    /// Process type, usually "VAP".
    pub proc_type: String,
    /// Process name.
    pub proc_name: String,
}

impl ProcessKey {
    /// Creates a new process key.
    #[must_use]
    pub fn new(proc_type: impl Into<String>, proc_name: impl Into<String>) -> Self {
        Self {
            proc_type: proc_type.into(),
            proc_name: proc_name.into(),
        }
    }
}

impl fmt::Display for ProcessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.proc_type, self.proc_name)
    }
}

// ============================================================================
// SECTION: Entity Handles
// ============================================================================

/// Opaque handle referencing a datastream in the owning list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatastreamId(i64);

impl DatastreamId {
    /// Creates a datastream handle from a source row identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DatastreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque handle referencing a subgroup in the owning list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubgroupId(i64);

impl SubgroupId {
    /// Creates a subgroup handle from a source row identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubgroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque handle referencing a coordinate system in the owning list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoordSystemId(i64);

impl CoordSystemId {
    /// Creates a coordinate system handle from a source row identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CoordSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
