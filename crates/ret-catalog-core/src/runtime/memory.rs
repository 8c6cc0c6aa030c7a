// crates/ret-catalog-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Table Source
// Description: Map-backed tabular source for tests and embedding.
// Purpose: Serve pre-built query results without a database backend.
// Dependencies: crate::interfaces, std::collections
// ============================================================================

//! ## Overview
//! A [`MemoryTableSource`] holds one pre-built [`TableResult`] per query and
//! serves it for any process key; fixtures are built per process, so the key
//! is not consulted. Queries with no stored result yield an empty result of
//! the query's declared width, which the loader treats as nothing configured.
//! Callers remain responsible for the per-query sort contracts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use crate::core::ProcessKey;
use crate::interfaces::RetrieverQuery;
use crate::interfaces::SourceError;
use crate::interfaces::TableResult;
use crate::interfaces::TableSource;

// ============================================================================
// SECTION: Memory Table Source
// ============================================================================

/// Map-backed tabular source.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableSource {
    /// Stored results keyed by query.
    results: HashMap<RetrieverQuery, TableResult>,
}

impl MemoryTableSource {
    /// Creates a source with no stored results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the result served for a query, replacing any previous one.
    pub fn insert(&mut self, query: RetrieverQuery, result: TableResult) {
        self.results.insert(query, result);
    }

    /// Builder-style variant of [`MemoryTableSource::insert`].
    #[must_use]
    pub fn with_result(mut self, query: RetrieverQuery, result: TableResult) -> Self {
        self.insert(query, result);
        self
    }
}

impl TableSource for MemoryTableSource {
    fn fetch(
        &self,
        query: RetrieverQuery,
        _process: &ProcessKey,
    ) -> Result<TableResult, SourceError> {
        match self.results.get(&query) {
            Some(result) => Ok(result.clone()),
            None => Ok(TableResult::empty(query.column_count())),
        }
    }
}
