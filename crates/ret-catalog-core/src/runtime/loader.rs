// crates/ret-catalog-core/src/runtime/loader.rs
// ============================================================================
// Module: Retriever Graph Loader
// Description: Reconstructs a retriever configuration graph from flat rows.
// Purpose: Run the five ordered load phases against a tabular source.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! Each load phase consumes one query result and reconnects its rows to the
//! entities created by earlier phases through the numeric row identifiers
//! carried in the result. Rows are grouped by detecting contiguous runs of
//! equal parent keys, which assumes (and does not verify) the query's sort
//! contract. A child row whose parent key was never created aborts the whole
//! load; partial graphs are never returned as success.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CoordDim;
use crate::core::CoordSystem;
use crate::core::CoordSystemId;
use crate::core::DataStream;
use crate::core::DatastreamId;
use crate::core::DependencyDate;
use crate::core::Group;
use crate::core::ProcessKey;
use crate::core::RetrieverConfig;
use crate::core::SubGroup;
use crate::core::SubgroupId;
use crate::core::TransParams;
use crate::core::VarMap;
use crate::core::VarOutput;
use crate::core::Variable;
use crate::interfaces::RetrieverQuery;
use crate::interfaces::SourceError;
use crate::interfaces::TableResult;
use crate::interfaces::TableSource;
use crate::interfaces::columns;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Graph loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The tabular collaborator failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A child row references a parent key that was never created.
    #[error("corrupt {column} reference in {query} result: {key}")]
    CorruptReference {
        /// Query whose result carried the bad reference.
        query: &'static str,
        /// Referencing column.
        column: &'static str,
        /// Key that failed to resolve.
        key: String,
    },
    /// A child container could not be preallocated.
    #[error("allocation failure while loading {query} result")]
    Allocation {
        /// Query being loaded.
        query: &'static str,
    },
    /// A non-null cell failed to parse as its required type.
    #[error("invalid cell in {query} result at row {row}, column {column}: {detail}")]
    InvalidCell {
        /// Query being loaded.
        query: &'static str,
        /// Offending row.
        row: usize,
        /// Offending column.
        column: usize,
        /// Parse failure detail.
        detail: String,
    },
}

// ============================================================================
// SECTION: Load Outcome
// ============================================================================

/// A fully loaded retriever configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRetriever {
    /// The reconstructed configuration graph.
    pub config: RetrieverConfig,
    /// Total rows consumed across all phases. Zero means the catalog holds
    /// no retriever information for the process, which is not an error.
    pub row_count: usize,
}

// ============================================================================
// SECTION: Loader State
// ============================================================================

/// Row-identifier indexes that reconnect rows across phases.
///
/// These exist only while loading; the public model keeps opaque handles for
/// datastreams, subgroups, and coordinate systems and nothing else.
#[derive(Debug, Default)]
struct LoadState {
    /// Group row id to index in the owning group list.
    groups: Vec<(i64, usize)>,
    /// Variable row id to (group index, variable index).
    variables: Vec<(i64, (usize, usize))>,
    /// Coordinate dimension row id to (system index, dimension index).
    dims: Vec<(i64, (usize, usize))>,
}

/// Finds an entry in a row-identifier index.
fn find_indexed<T: Copy>(index: &[(i64, T)], id: i64) -> Option<T> {
    index.iter().find(|(key, _)| *key == id).map(|(_, value)| *value)
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Loads the retriever configuration for a process.
///
/// Runs the five load phases in order, each a pure function of its query
/// result. A zero row count on success means nothing is configured.
///
/// # Errors
///
/// Returns [`LoadError`] when the collaborator fails, a reference does not
/// resolve, a cell fails to parse, or a preallocation fails. The partially
/// built graph is dropped on every error path.
pub fn load_retriever(
    source: &dyn TableSource,
    process: &ProcessKey,
) -> Result<LoadedRetriever, LoadError> {
    let mut config = RetrieverConfig::new(process.clone());
    let mut state = LoadState::default();
    let mut row_count = 0;

    row_count += load_groups_and_subgroups(source, &mut config, &mut state)?;
    row_count += load_datastreams(source, &mut config)?;
    row_count += load_coordinate_systems(source, &mut config, &mut state)?;
    row_count += load_variables(source, &mut config, &mut state)?;
    row_count += load_trans_params(source, &mut config)?;

    Ok(LoadedRetriever {
        config,
        row_count,
    })
}

// ============================================================================
// SECTION: Run-Length Grouping
// ============================================================================

/// Counts the contiguous run of rows starting at `start` whose key cells all
/// equal those of row `start`. Keys are string-compared.
fn run_length(result: &TableResult, start: usize, key_columns: &[usize]) -> usize {
    let mut length = 1;
    for row in (start + 1)..result.row_count() {
        let same = key_columns.iter().all(|&column| result.cell(row, column) == result.cell(start, column));
        if !same {
            break;
        }
        length += 1;
    }
    length
}

/// Reserves exact capacity on a child container, surfacing reservation
/// failure as the loader's allocation error.
fn reserve_exact<T>(
    container: &mut Vec<T>,
    additional: usize,
    query: RetrieverQuery,
) -> Result<(), LoadError> {
    container.try_reserve_exact(additional).map_err(|_| LoadError::Allocation {
        query: query.name(),
    })
}

// ============================================================================
// SECTION: Cell Access
// ============================================================================

/// Returns a required cell, reporting null as an invalid cell.
fn required_cell(
    result: &TableResult,
    query: RetrieverQuery,
    row: usize,
    column: usize,
) -> Result<&str, LoadError> {
    result.cell(row, column).ok_or_else(|| LoadError::InvalidCell {
        query: query.name(),
        row,
        column,
        detail: "required cell is null".to_string(),
    })
}

/// Returns an optional cell, treating null and empty text alike.
fn optional_cell(result: &TableResult, row: usize, column: usize) -> Option<&str> {
    result.cell(row, column).filter(|value| !value.is_empty())
}

/// Returns an optional cell as an owned string.
fn optional_text(result: &TableResult, row: usize, column: usize) -> Option<String> {
    optional_cell(result, row, column).map(str::to_string)
}

/// Parses a required cell as a row identifier.
fn required_id(
    result: &TableResult,
    query: RetrieverQuery,
    row: usize,
    column: usize,
) -> Result<i64, LoadError> {
    let text = required_cell(result, query, row, column)?;
    text.parse().map_err(|_| LoadError::InvalidCell {
        query: query.name(),
        row,
        column,
        detail: format!("not an integer: {text}"),
    })
}

/// Parses an optional cell as a row identifier.
fn optional_id(
    result: &TableResult,
    query: RetrieverQuery,
    row: usize,
    column: usize,
) -> Result<Option<i64>, LoadError> {
    match optional_cell(result, row, column) {
        None => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|_| LoadError::InvalidCell {
            query: query.name(),
            row,
            column,
            detail: format!("not an integer: {text}"),
        }),
    }
}

/// Parses an optional cell as a signed second count, defaulting to zero.
fn optional_seconds(
    result: &TableResult,
    query: RetrieverQuery,
    row: usize,
    column: usize,
) -> Result<i64, LoadError> {
    Ok(optional_id(result, query, row, column)?.unwrap_or(0))
}

/// Parses an optional cell as a boolean flag (nonzero is true).
fn optional_flag(
    result: &TableResult,
    query: RetrieverQuery,
    row: usize,
    column: usize,
) -> Result<bool, LoadError> {
    Ok(optional_id(result, query, row, column)?.is_some_and(|value| value != 0))
}

/// Parses an optional cell as a dependency date.
fn optional_date(
    result: &TableResult,
    query: RetrieverQuery,
    row: usize,
    column: usize,
) -> Result<Option<DependencyDate>, LoadError> {
    match optional_cell(result, row, column) {
        None => Ok(None),
        Some(text) => {
            DependencyDate::parse(text).map(Some).map_err(|err| LoadError::InvalidCell {
                query: query.name(),
                row,
                column,
                detail: err.to_string(),
            })
        }
    }
}

// ============================================================================
// SECTION: Phase 1 - Groups and Subgroups
// ============================================================================

/// Loads datastream groups and subgroups.
///
/// Rows are sorted by group id then subgroup order. Subgroups are shared
/// across groups and deduplicated by id; each group receives non-owning
/// subgroup handles in row order.
fn load_groups_and_subgroups(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
    state: &mut LoadState,
) -> Result<usize, LoadError> {
    use columns::groups_and_subgroups as col;

    let query = RetrieverQuery::GroupsAndSubgroups;
    let result = source.fetch(query, &config.process)?;

    reserve_exact(&mut config.groups, result.row_count(), query)?;
    reserve_exact(&mut config.subgroups, result.row_count(), query)?;

    let mut current_group: Option<(i64, usize)> = None;

    for row in 0..result.row_count() {
        let group_id = required_id(&result, query, row, col::GROUP_ID)?;
        let subgroup_id = SubgroupId::new(required_id(&result, query, row, col::SUBGROUP_ID)?);

        if config.subgroup(subgroup_id).is_none() {
            config.subgroups.push(SubGroup {
                id: subgroup_id,
                name: required_cell(&result, query, row, col::SUBGROUP_NAME)?.to_string(),
                datastreams: Vec::new(),
            });
        }

        let group_index = match current_group {
            Some((id, index)) if id == group_id => index,
            _ => {
                let run = run_length(&result, row, &[col::GROUP_ID]);
                let mut subgroups = Vec::new();
                reserve_exact(&mut subgroups, run, query)?;
                config.groups.push(Group {
                    name: required_cell(&result, query, row, col::GROUP_NAME)?.to_string(),
                    subgroups,
                    variables: Vec::new(),
                });
                let index = config.groups.len() - 1;
                state.groups.push((group_id, index));
                current_group = Some((group_id, index));
                index
            }
        };

        config.groups[group_index].subgroups.push(subgroup_id);
    }

    Ok(result.row_count())
}

// ============================================================================
// SECTION: Phase 2 - Datastreams
// ============================================================================

/// Loads datastreams and attaches them to their subgroups.
///
/// Rows are sorted by subgroup id then priority. A datastream shared by
/// several subgroups is created once and referenced by handle everywhere.
fn load_datastreams(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
) -> Result<usize, LoadError> {
    use columns::datastreams as col;

    let query = RetrieverQuery::Datastreams;
    let result = source.fetch(query, &config.process)?;

    reserve_exact(&mut config.datastreams, result.row_count(), query)?;

    let mut current_subgroup: Option<(SubgroupId, usize)> = None;

    for row in 0..result.row_count() {
        let subgroup_id = SubgroupId::new(required_id(&result, query, row, col::SUBGROUP_ID)?);
        let datastream_id = DatastreamId::new(required_id(&result, query, row, col::DS_ID)?);

        if config.datastream(datastream_id).is_none() {
            config.datastreams.push(DataStream {
                id: datastream_id,
                name: required_cell(&result, query, row, col::NAME)?.to_string(),
                level: required_cell(&result, query, row, col::LEVEL)?.to_string(),
                site: optional_text(&result, row, col::SITE),
                facility: optional_text(&result, row, col::FACILITY),
                dep_site: optional_text(&result, row, col::SITE_DEP),
                dep_facility: optional_text(&result, row, col::FAC_DEP),
                dep_begin_date: optional_date(&result, query, row, col::BEGIN_DATE_DEP)?,
                dep_end_date: optional_date(&result, query, row, col::END_DATE_DEP)?,
            });
        }

        let subgroup_index = match current_subgroup {
            Some((id, index)) if id == subgroup_id => index,
            _ => {
                let index = config
                    .subgroups
                    .iter()
                    .position(|sg| sg.id == subgroup_id)
                    .ok_or_else(|| LoadError::CorruptReference {
                        query: query.name(),
                        column: "subgroup_id",
                        key: subgroup_id.to_string(),
                    })?;
                let run = run_length(&result, row, &[col::SUBGROUP_ID]);
                reserve_exact(&mut config.subgroups[index].datastreams, run, query)?;
                current_subgroup = Some((subgroup_id, index));
                index
            }
        };

        config.subgroups[subgroup_index].datastreams.push(datastream_id);
    }

    Ok(result.row_count())
}

// ============================================================================
// SECTION: Phase 3 - Coordinate Systems
// ============================================================================

/// Loads coordinate systems, then their dimensions.
fn load_coordinate_systems(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
    state: &mut LoadState,
) -> Result<usize, LoadError> {
    use columns::coord_systems as col;

    let query = RetrieverQuery::CoordSystems;
    let result = source.fetch(query, &config.process)?;

    reserve_exact(&mut config.coord_systems, result.row_count(), query)?;

    for row in 0..result.row_count() {
        let id = CoordSystemId::new(required_id(&result, query, row, col::ID)?);
        config.coord_systems.push(CoordSystem {
            id,
            name: required_cell(&result, query, row, col::NAME)?.to_string(),
            dims: Vec::new(),
        });
    }

    let mut row_count = result.row_count();
    row_count += load_coordinate_dims(source, config, state)?;

    Ok(row_count)
}

/// Loads coordinate system dimensions.
///
/// Rows are sorted by coordinate system id then dimension order. A dimension
/// row carrying a subgroup reference pre-creates one empty varmap per
/// datastream of that subgroup; the candidate names are filled by the
/// coordinate variable name sub-load.
fn load_coordinate_dims(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
    state: &mut LoadState,
) -> Result<usize, LoadError> {
    use columns::coord_dims as col;

    let query = RetrieverQuery::CoordDims;
    let result = source.fetch(query, &config.process)?;

    let mut current_system: Option<(CoordSystemId, usize)> = None;
    let mut found_var_map = false;

    for row in 0..result.row_count() {
        let system_id = CoordSystemId::new(required_id(&result, query, row, col::SYSTEM_ID)?);
        let dim_id = required_id(&result, query, row, col::DIM_ID)?;

        let system_index = match current_system {
            Some((id, index)) if id == system_id => index,
            _ => {
                let index = config
                    .coord_systems
                    .iter()
                    .position(|cs| cs.id == system_id)
                    .ok_or_else(|| LoadError::CorruptReference {
                        query: query.name(),
                        column: "coord_system_id",
                        key: system_id.to_string(),
                    })?;
                let run = run_length(&result, row, &[col::SYSTEM_ID]);
                reserve_exact(&mut config.coord_systems[index].dims, run, query)?;
                current_system = Some((system_id, index));
                index
            }
        };

        // An unresolvable subgroup reference leaves the dimension without
        // varmaps; only the var-name sub-load treats unknown keys as fatal.
        let mut varmaps = Vec::new();
        if let Some(subgroup_id) = optional_id(&result, query, row, col::SUBGROUP_ID)? {
            if let Some(subgroup) = config.subgroup(SubgroupId::new(subgroup_id)) {
                reserve_exact(&mut varmaps, subgroup.datastreams.len(), query)?;
                for datastream in &subgroup.datastreams {
                    varmaps.push(VarMap {
                        datastream: *datastream,
                        names: Vec::new(),
                    });
                }
                found_var_map = true;
            }
        }

        let dims = &mut config.coord_systems[system_index].dims;
        dims.push(CoordDim {
            name: required_cell(&result, query, row, col::NAME)?.to_string(),
            data_type: optional_text(&result, row, col::DATA_TYPE),
            units: optional_text(&result, row, col::UNITS),
            start: optional_text(&result, row, col::START),
            interval: optional_text(&result, row, col::INTERVAL),
            length: optional_text(&result, row, col::LENGTH),
            trans_type: optional_text(&result, row, col::TRANS_TYPE),
            trans_range: optional_text(&result, row, col::TRANS_RANGE),
            trans_align: optional_text(&result, row, col::TRANS_ALIGN),
            varmaps,
        });
        state.dims.push((dim_id, (system_index, dims.len() - 1)));
    }

    let mut row_count = result.row_count();
    if found_var_map {
        row_count += load_coordinate_var_names(source, config, state)?;
    }

    Ok(row_count)
}

/// Loads coordinate variable name candidates into the pre-created varmaps.
///
/// Rows are sorted by dimension id, datastream id, then priority.
fn load_coordinate_var_names(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
    state: &LoadState,
) -> Result<usize, LoadError> {
    use columns::coord_var_names as col;

    let query = RetrieverQuery::CoordVarNames;
    let result = source.fetch(query, &config.process)?;

    let mut current_dim: Option<(i64, (usize, usize))> = None;
    let mut current_map: Option<(DatastreamId, usize)> = None;

    for row in 0..result.row_count() {
        let dim_id = required_id(&result, query, row, col::DIM_ID)?;
        let datastream_id = DatastreamId::new(required_id(&result, query, row, col::DS_ID)?);

        let (system_index, dim_index) = match current_dim {
            Some((id, location)) if id == dim_id => location,
            _ => {
                let location = find_indexed(&state.dims, dim_id).ok_or_else(|| {
                    LoadError::CorruptReference {
                        query: query.name(),
                        column: "coord_dim_id",
                        key: dim_id.to_string(),
                    }
                })?;
                current_dim = Some((dim_id, location));
                current_map = None;
                location
            }
        };

        let dim = &mut config.coord_systems[system_index].dims[dim_index];

        let map_index = match current_map {
            Some((id, index)) if id == datastream_id => index,
            _ => {
                let index = dim
                    .varmaps
                    .iter()
                    .position(|vm| vm.datastream == datastream_id)
                    .ok_or_else(|| LoadError::CorruptReference {
                        query: query.name(),
                        column: "datastream_id",
                        key: datastream_id.to_string(),
                    })?;
                current_map = Some((datastream_id, index));
                index
            }
        };

        if dim.varmaps[map_index].names.is_empty() {
            let run = run_length(&result, row, &[col::DIM_ID, col::DS_ID]);
            reserve_exact(&mut dim.varmaps[map_index].names, run, query)?;
        }
        let name = required_cell(&result, query, row, col::NAME)?.to_string();
        dim.varmaps[map_index].names.push(name);
    }

    Ok(result.row_count())
}

// ============================================================================
// SECTION: Phase 4 - Variables
// ============================================================================

/// Loads variables, then their dimension names, input name candidates, and
/// output targets.
///
/// Rows are sorted by group id then variable id. Every variable pre-creates
/// one varmap per datastream across all of its group's subgroups; the name
/// lists are filled by the var-name sub-load.
fn load_variables(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
    state: &mut LoadState,
) -> Result<usize, LoadError> {
    use columns::variables as col;

    let query = RetrieverQuery::Variables;
    let result = source.fetch(query, &config.process)?;

    let mut current_group: Option<(i64, usize)> = None;

    for row in 0..result.row_count() {
        let group_id = required_id(&result, query, row, col::GROUP_ID)?;
        let var_id = required_id(&result, query, row, col::VAR_ID)?;

        let group_index = match current_group {
            Some((id, index)) if id == group_id => index,
            _ => {
                let index = find_indexed(&state.groups, group_id).ok_or_else(|| {
                    LoadError::CorruptReference {
                        query: query.name(),
                        column: "group_id",
                        key: group_id.to_string(),
                    }
                })?;
                let run = run_length(&result, row, &[col::GROUP_ID]);
                reserve_exact(&mut config.groups[index].variables, run, query)?;
                current_group = Some((group_id, index));
                index
            }
        };

        // A coordinate system reference that does not resolve is dropped
        // silently; the variable simply has no coordinate system.
        let coord_system = optional_id(&result, query, row, col::COORD_SYSTEM_ID)?
            .map(CoordSystemId::new)
            .filter(|id| config.coord_system(*id).is_some());

        let subgroup_ids = config.groups[group_index].subgroups.clone();
        let mut varmaps = Vec::new();
        let map_count: usize = subgroup_ids
            .iter()
            .filter_map(|id| config.subgroup(*id))
            .map(|sg| sg.datastreams.len())
            .sum();
        reserve_exact(&mut varmaps, map_count, query)?;
        for subgroup_id in &subgroup_ids {
            if let Some(subgroup) = config.subgroup(*subgroup_id) {
                for datastream in &subgroup.datastreams {
                    varmaps.push(VarMap {
                        datastream: *datastream,
                        names: Vec::new(),
                    });
                }
            }
        }

        let variables = &mut config.groups[group_index].variables;
        variables.push(Variable {
            name: required_cell(&result, query, row, col::NAME)?.to_string(),
            data_type: optional_text(&result, row, col::DATA_TYPE),
            units: optional_text(&result, row, col::UNITS),
            start_offset: optional_seconds(&result, query, row, col::START_OFFSET)?,
            end_offset: optional_seconds(&result, query, row, col::END_OFFSET)?,
            valid_min: optional_text(&result, row, col::VALID_MIN),
            valid_max: optional_text(&result, row, col::VALID_MAX),
            valid_delta: optional_text(&result, row, col::VALID_DELTA),
            required_to_run: optional_flag(&result, query, row, col::REQ_TO_RUN)?,
            retrieve_qc: optional_flag(&result, query, row, col::RETRIEVE_QC)?,
            qc_required_to_run: optional_flag(&result, query, row, col::QC_REQ_TO_RUN)?,
            coord_system,
            dim_names: Vec::new(),
            varmaps,
            outputs: Vec::new(),
        });
        state.variables.push((var_id, (group_index, variables.len() - 1)));
    }

    let mut row_count = result.row_count();
    row_count += load_var_dims(source, config, state)?;
    row_count += load_var_names(source, config, state)?;
    row_count += load_var_outputs(source, config, state)?;

    Ok(row_count)
}

/// Loads variable dimension names.
///
/// Rows are sorted by variable id then dimension order.
fn load_var_dims(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
    state: &LoadState,
) -> Result<usize, LoadError> {
    use columns::var_dims as col;

    let query = RetrieverQuery::VarDims;
    let result = source.fetch(query, &config.process)?;

    let mut current_var: Option<(i64, (usize, usize))> = None;

    for row in 0..result.row_count() {
        let var_id = required_id(&result, query, row, col::VAR_ID)?;

        let (group_index, var_index) = match current_var {
            Some((id, location)) if id == var_id => location,
            _ => {
                let location = find_indexed(&state.variables, var_id).ok_or_else(|| {
                    LoadError::CorruptReference {
                        query: query.name(),
                        column: "var_id",
                        key: var_id.to_string(),
                    }
                })?;
                let run = run_length(&result, row, &[col::VAR_ID]);
                let dim_names =
                    &mut config.groups[location.0].variables[location.1].dim_names;
                reserve_exact(dim_names, run, query)?;
                current_var = Some((var_id, location));
                location
            }
        };

        let name = required_cell(&result, query, row, col::NAME)?.to_string();
        config.groups[group_index].variables[var_index].dim_names.push(name);
    }

    Ok(result.row_count())
}

/// Loads input variable name candidates into the pre-created varmaps.
///
/// Rows are sorted by variable id, datastream id, then priority.
fn load_var_names(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
    state: &LoadState,
) -> Result<usize, LoadError> {
    use columns::var_names as col;

    let query = RetrieverQuery::VarNames;
    let result = source.fetch(query, &config.process)?;

    let mut current_var: Option<(i64, (usize, usize))> = None;
    let mut current_map: Option<(DatastreamId, usize)> = None;

    for row in 0..result.row_count() {
        let var_id = required_id(&result, query, row, col::VAR_ID)?;
        let datastream_id = DatastreamId::new(required_id(&result, query, row, col::DS_ID)?);

        let (group_index, var_index) = match current_var {
            Some((id, location)) if id == var_id => location,
            _ => {
                let location = find_indexed(&state.variables, var_id).ok_or_else(|| {
                    LoadError::CorruptReference {
                        query: query.name(),
                        column: "var_id",
                        key: var_id.to_string(),
                    }
                })?;
                current_var = Some((var_id, location));
                current_map = None;
                location
            }
        };

        let variable = &mut config.groups[group_index].variables[var_index];

        let map_index = match current_map {
            Some((id, index)) if id == datastream_id => index,
            _ => {
                let index = variable
                    .varmaps
                    .iter()
                    .position(|vm| vm.datastream == datastream_id)
                    .ok_or_else(|| LoadError::CorruptReference {
                        query: query.name(),
                        column: "datastream_id",
                        key: datastream_id.to_string(),
                    })?;
                current_map = Some((datastream_id, index));
                index
            }
        };

        if variable.varmaps[map_index].names.is_empty() {
            let run = run_length(&result, row, &[col::VAR_ID, col::DS_ID]);
            reserve_exact(&mut variable.varmaps[map_index].names, run, query)?;
        }
        let name = required_cell(&result, query, row, col::NAME)?.to_string();
        variable.varmaps[map_index].names.push(name);
    }

    Ok(result.row_count())
}

/// Loads variable output targets.
///
/// Rows are sorted by variable id.
fn load_var_outputs(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
    state: &LoadState,
) -> Result<usize, LoadError> {
    use columns::var_outputs as col;

    let query = RetrieverQuery::VarOutputs;
    let result = source.fetch(query, &config.process)?;

    let mut current_var: Option<(i64, (usize, usize))> = None;

    for row in 0..result.row_count() {
        let var_id = required_id(&result, query, row, col::VAR_ID)?;

        let (group_index, var_index) = match current_var {
            Some((id, location)) if id == var_id => location,
            _ => {
                let location = find_indexed(&state.variables, var_id).ok_or_else(|| {
                    LoadError::CorruptReference {
                        query: query.name(),
                        column: "var_id",
                        key: var_id.to_string(),
                    }
                })?;
                let run = run_length(&result, row, &[col::VAR_ID]);
                let outputs = &mut config.groups[location.0].variables[location.1].outputs;
                reserve_exact(outputs, run, query)?;
                current_var = Some((var_id, location));
                location
            }
        };

        config.groups[group_index].variables[var_index].outputs.push(VarOutput {
            ds_name: required_cell(&result, query, row, col::DS_NAME)?.to_string(),
            ds_level: required_cell(&result, query, row, col::DS_LEVEL)?.to_string(),
            var_name: required_cell(&result, query, row, col::VAR_NAME)?.to_string(),
        });
    }

    Ok(result.row_count())
}

// ============================================================================
// SECTION: Phase 5 - Transformation Parameters
// ============================================================================

/// Loads transformation parameters. Flat list, no cross references.
fn load_trans_params(
    source: &dyn TableSource,
    config: &mut RetrieverConfig,
) -> Result<usize, LoadError> {
    use columns::trans_params as col;

    let query = RetrieverQuery::TransParams;
    let result = source.fetch(query, &config.process)?;

    reserve_exact(&mut config.trans_params, result.row_count(), query)?;

    for row in 0..result.row_count() {
        config.trans_params.push(TransParams {
            coord_system: required_cell(&result, query, row, col::COORD_SYSTEM)?.to_string(),
            params: required_cell(&result, query, row, col::PARAMS)?.to_string(),
        });
    }

    Ok(result.row_count())
}
