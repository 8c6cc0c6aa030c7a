// crates/ret-catalog-core/src/interfaces/mod.rs
// ============================================================================
// Module: Retriever Catalog Interfaces
// Description: Tabular query collaborator contract and result shapes.
// Purpose: Define the seam between the graph loader and its data backends.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The loader consumes query results from an external tabular collaborator.
//! Each result is a rectangular set of nullable text cells, pre-sorted by
//! the query's documented sort keys. Backends implement [`TableSource`];
//! the loader never re-sorts, so the sort contract is a hard precondition
//! of every implementation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ProcessKey;

// ============================================================================
// SECTION: Queries
// ============================================================================

/// The catalog queries consumed by the graph loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrieverQuery {
    /// Groups and their subgroups, sorted by group id then subgroup order.
    GroupsAndSubgroups,
    /// Datastreams per subgroup, sorted by subgroup id then priority.
    Datastreams,
    /// Coordinate systems, sorted by coordinate system id.
    CoordSystems,
    /// Coordinate dimensions, sorted by coordinate system id then dimension
    /// order.
    CoordDims,
    /// Coordinate variable name candidates, sorted by dimension id,
    /// datastream id, then priority.
    CoordVarNames,
    /// Variables per group, sorted by group id then variable id.
    Variables,
    /// Variable dimension names, sorted by variable id then dimension order.
    VarDims,
    /// Input variable name candidates, sorted by variable id, datastream id,
    /// then priority.
    VarNames,
    /// Variable output targets, sorted by variable id.
    VarOutputs,
    /// Transformation parameters per coordinate system.
    TransParams,
}

impl RetrieverQuery {
    /// Returns the query name used in error context.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GroupsAndSubgroups => "groups_and_subgroups",
            Self::Datastreams => "datastreams",
            Self::CoordSystems => "coord_systems",
            Self::CoordDims => "coord_dims",
            Self::CoordVarNames => "coord_var_names",
            Self::Variables => "variables",
            Self::VarDims => "var_dims",
            Self::VarNames => "var_names",
            Self::VarOutputs => "var_outputs",
            Self::TransParams => "trans_params",
        }
    }

    /// Returns the column count of the query's result rows.
    #[must_use]
    pub const fn column_count(self) -> usize {
        match self {
            Self::GroupsAndSubgroups => columns::groups_and_subgroups::COUNT,
            Self::Datastreams => columns::datastreams::COUNT,
            Self::CoordSystems => columns::coord_systems::COUNT,
            Self::CoordDims => columns::coord_dims::COUNT,
            Self::CoordVarNames => columns::coord_var_names::COUNT,
            Self::Variables => columns::variables::COUNT,
            Self::VarDims => columns::var_dims::COUNT,
            Self::VarNames => columns::var_names::COUNT,
            Self::VarOutputs => columns::var_outputs::COUNT,
            Self::TransParams => columns::trans_params::COUNT,
        }
    }
}

// ============================================================================
// SECTION: Column Layouts
// ============================================================================

/// Column index constants for every query result shape.
pub mod columns {
    /// Columns of [`super::RetrieverQuery::GroupsAndSubgroups`].
    pub mod groups_and_subgroups {
        /// Group identifier.
        pub const GROUP_ID: usize = 0;
        /// Group name.
        pub const GROUP_NAME: usize = 1;
        /// Subgroup identifier.
        pub const SUBGROUP_ID: usize = 2;
        /// Subgroup order within the group.
        pub const SUBGROUP_ORDER: usize = 3;
        /// Subgroup name.
        pub const SUBGROUP_NAME: usize = 4;
        /// Column count.
        pub const COUNT: usize = 5;
    }

    /// Columns of [`super::RetrieverQuery::Datastreams`].
    pub mod datastreams {
        /// Subgroup identifier.
        pub const SUBGROUP_ID: usize = 0;
        /// Fallback priority within the subgroup.
        pub const PRIORITY: usize = 1;
        /// Datastream identifier.
        pub const DS_ID: usize = 2;
        /// Datastream class name.
        pub const NAME: usize = 3;
        /// Datastream class level.
        pub const LEVEL: usize = 4;
        /// Site, nullable.
        pub const SITE: usize = 5;
        /// Facility, nullable.
        pub const FACILITY: usize = 6;
        /// Site dependency, nullable.
        pub const SITE_DEP: usize = 7;
        /// Facility dependency, nullable.
        pub const FAC_DEP: usize = 8;
        /// Begin date dependency, nullable.
        pub const BEGIN_DATE_DEP: usize = 9;
        /// End date dependency, nullable.
        pub const END_DATE_DEP: usize = 10;
        /// Column count.
        pub const COUNT: usize = 11;
    }

    /// Columns of [`super::RetrieverQuery::CoordSystems`].
    pub mod coord_systems {
        /// Coordinate system identifier.
        pub const ID: usize = 0;
        /// Coordinate system name.
        pub const NAME: usize = 1;
        /// Column count.
        pub const COUNT: usize = 2;
    }

    /// Columns of [`super::RetrieverQuery::CoordDims`].
    pub mod coord_dims {
        /// Coordinate system identifier.
        pub const SYSTEM_ID: usize = 0;
        /// Dimension order within the coordinate system.
        pub const DIM_ORDER: usize = 1;
        /// Dimension identifier.
        pub const DIM_ID: usize = 2;
        /// Dimension name.
        pub const NAME: usize = 3;
        /// Data type, nullable.
        pub const DATA_TYPE: usize = 4;
        /// Units, nullable.
        pub const UNITS: usize = 5;
        /// Start value, nullable.
        pub const START: usize = 6;
        /// Interval, nullable.
        pub const INTERVAL: usize = 7;
        /// Length, nullable.
        pub const LENGTH: usize = 8;
        /// Transformation type, nullable.
        pub const TRANS_TYPE: usize = 9;
        /// Transformation range, nullable.
        pub const TRANS_RANGE: usize = 10;
        /// Transformation alignment, nullable.
        pub const TRANS_ALIGN: usize = 11;
        /// Subgroup supplying the coordinate variable, nullable.
        pub const SUBGROUP_ID: usize = 12;
        /// Column count.
        pub const COUNT: usize = 13;
    }

    /// Columns of [`super::RetrieverQuery::CoordVarNames`].
    pub mod coord_var_names {
        /// Coordinate dimension identifier.
        pub const DIM_ID: usize = 0;
        /// Datastream identifier.
        pub const DS_ID: usize = 1;
        /// Name priority.
        pub const PRIORITY: usize = 2;
        /// Candidate variable name.
        pub const NAME: usize = 3;
        /// Column count.
        pub const COUNT: usize = 4;
    }

    /// Columns of [`super::RetrieverQuery::Variables`].
    pub mod variables {
        /// Group identifier.
        pub const GROUP_ID: usize = 0;
        /// Variable identifier.
        pub const VAR_ID: usize = 1;
        /// Variable name.
        pub const NAME: usize = 2;
        /// Data type, nullable.
        pub const DATA_TYPE: usize = 3;
        /// Units, nullable.
        pub const UNITS: usize = 4;
        /// Retrieval window start offset in seconds, nullable.
        pub const START_OFFSET: usize = 5;
        /// Retrieval window end offset in seconds, nullable.
        pub const END_OFFSET: usize = 6;
        /// Valid minimum, nullable.
        pub const VALID_MIN: usize = 7;
        /// Valid maximum, nullable.
        pub const VALID_MAX: usize = 8;
        /// Valid delta, nullable.
        pub const VALID_DELTA: usize = 9;
        /// Required-to-run flag, nullable.
        pub const REQ_TO_RUN: usize = 10;
        /// Retrieve-QC flag, nullable.
        pub const RETRIEVE_QC: usize = 11;
        /// QC-required-to-run flag, nullable.
        pub const QC_REQ_TO_RUN: usize = 12;
        /// Coordinate system identifier, nullable.
        pub const COORD_SYSTEM_ID: usize = 13;
        /// Column count.
        pub const COUNT: usize = 14;
    }

    /// Columns of [`super::RetrieverQuery::VarDims`].
    pub mod var_dims {
        /// Variable identifier.
        pub const VAR_ID: usize = 0;
        /// Dimension order.
        pub const DIM_ORDER: usize = 1;
        /// Dimension name.
        pub const NAME: usize = 2;
        /// Column count.
        pub const COUNT: usize = 3;
    }

    /// Columns of [`super::RetrieverQuery::VarNames`].
    pub mod var_names {
        /// Variable identifier.
        pub const VAR_ID: usize = 0;
        /// Datastream identifier.
        pub const DS_ID: usize = 1;
        /// Name priority.
        pub const PRIORITY: usize = 2;
        /// Candidate variable name.
        pub const NAME: usize = 3;
        /// Column count.
        pub const COUNT: usize = 4;
    }

    /// Columns of [`super::RetrieverQuery::VarOutputs`].
    pub mod var_outputs {
        /// Variable identifier.
        pub const VAR_ID: usize = 0;
        /// Output datastream class name.
        pub const DS_NAME: usize = 1;
        /// Output datastream class level.
        pub const DS_LEVEL: usize = 2;
        /// Output variable name.
        pub const VAR_NAME: usize = 3;
        /// Column count.
        pub const COUNT: usize = 4;
    }

    /// Columns of [`super::RetrieverQuery::TransParams`].
    pub mod trans_params {
        /// Coordinate system name.
        pub const COORD_SYSTEM: usize = 0;
        /// Opaque parameter text.
        pub const PARAMS: usize = 1;
        /// Column count.
        pub const COUNT: usize = 2;
    }
}

// ============================================================================
// SECTION: Table Result
// ============================================================================

/// A rectangular, row/column-addressable set of nullable text cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableResult {
    /// Column count every row must match.
    width: usize,
    /// Row-major cells.
    rows: Vec<Vec<Option<String>>>,
}

impl TableResult {
    /// Creates a table result, validating rectangularity.
    ///
    /// # Errors
    ///
    /// Returns [`TableShapeError`] when a row width differs from `width`.
    pub fn new(width: usize, rows: Vec<Vec<Option<String>>>) -> Result<Self, TableShapeError> {
        for (index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(TableShapeError::RowWidth {
                    row: index,
                    expected: width,
                    actual: row.len(),
                });
            }
        }
        Ok(Self {
            width,
            rows,
        })
    }

    /// Creates an empty result with the given width.
    #[must_use]
    pub const fn empty(width: usize) -> Self {
        Self {
            width,
            rows: Vec::new(),
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the column count.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.width
    }

    /// Returns the cell at (row, column), or `None` when the cell is null or
    /// the coordinates are out of range.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }
}

/// Table result shape violations.
#[derive(Debug, Error)]
pub enum TableShapeError {
    /// A row's width differs from the declared column count.
    #[error("row {row} has {actual} columns, expected {expected}")]
    RowWidth {
        /// Offending row index.
        row: usize,
        /// Declared column count.
        expected: usize,
        /// Actual column count.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Table Source
// ============================================================================

/// Tabular query collaborator errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backend reported an error.
    #[error("tabular source error for {query}: {message}")]
    Backend {
        /// Query that failed.
        query: &'static str,
        /// Backend message.
        message: String,
    },
}

/// Backend-agnostic tabular query collaborator.
///
/// Implementations must return rows pre-sorted by each query's documented
/// sort keys. The loader does not re-sort; an out-of-order result silently
/// splits children across multiple parent instances.
pub trait TableSource {
    /// Fetches one query result for the process.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the backend fails.
    fn fetch(&self, query: RetrieverQuery, process: &ProcessKey)
    -> Result<TableResult, SourceError>;
}
