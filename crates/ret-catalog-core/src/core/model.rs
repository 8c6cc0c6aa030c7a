// crates/ret-catalog-core/src/core/model.rs
// ============================================================================
// Module: Retriever Configuration Model
// Description: Entities owned by a retriever configuration graph.
// Purpose: Define the aggregate root, entity structs, and invariant checks.
// Dependencies: crate::core::{identifiers, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`RetrieverConfig`] describes, for one data-processing process, which
//! input variables it needs, which candidate datastreams may supply each
//! variable in fallback-priority order, how variables map onto shared
//! coordinate systems, and where derived variables are written.
//!
//! Ownership is strict: the aggregate root owns every entity through exactly
//! one list per entity type. All other references are opaque id handles into
//! those lists, so removing an entity means removing it from its owning list
//! and from every id list that mentions it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::CoordSystemId;
use crate::core::identifiers::DatastreamId;
use crate::core::identifiers::ProcessKey;
use crate::core::identifiers::SubgroupId;
use crate::core::time::DependencyDate;

// ============================================================================
// SECTION: Datastreams
// ============================================================================

/// An identified source of time-series data, optionally tied to a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStream {
    /// Handle referencing this datastream from subgroups and varmaps.
    pub id: DatastreamId,
    /// Datastream class name.
    pub name: String,
    /// Datastream class level.
    pub level: String,
    /// Site, set during location specialization when unset.
    pub site: Option<String>,
    /// Facility, set during location specialization when unset.
    pub facility: Option<String>,
    /// Site dependency: must equal the deployment site to stay eligible.
    pub dep_site: Option<String>,
    /// Facility dependency: must equal the deployment facility to stay
    /// eligible.
    pub dep_facility: Option<String>,
    /// Begin date dependency.
    pub dep_begin_date: Option<DependencyDate>,
    /// End date dependency.
    pub dep_end_date: Option<DependencyDate>,
}

// ============================================================================
// SECTION: Groups and Subgroups
// ============================================================================

/// A fallback-priority-ordered list of interchangeable datastreams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGroup {
    /// Handle referencing this subgroup from groups.
    pub id: SubgroupId,
    /// Subgroup name.
    pub name: String,
    /// Datastreams in fallback search order.
    pub datastreams: Vec<DatastreamId>,
}

/// A named collection of variables with their candidate source subgroups.
///
/// Only the first subgroup is consumed by downstream logic; additional
/// subgroups are tolerated but ignored. This is a documented limitation of
/// the catalog, not a defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group name.
    pub name: String,
    /// Subgroups in definition order.
    pub subgroups: Vec<SubgroupId>,
    /// Variables retrieved through this group.
    pub variables: Vec<Variable>,
}

// ============================================================================
// SECTION: Variables
// ============================================================================

/// A (datastream, candidate-name-list) pairing used to resolve one logical
/// variable against one physical source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarMap {
    /// The datastream this map searches.
    pub datastream: DatastreamId,
    /// Candidate variable names, highest priority first.
    pub names: Vec<String>,
}

/// Output target for a retrieved variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarOutput {
    /// Output datastream class name.
    pub ds_name: String,
    /// Output datastream class level.
    pub ds_level: String,
    /// Output variable name.
    pub var_name: String,
}

/// A logical input variable and its retrieval rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Data type name.
    pub data_type: Option<String>,
    /// Units string.
    pub units: Option<String>,
    /// Retrieval window start offset in seconds.
    pub start_offset: i64,
    /// Retrieval window end offset in seconds.
    pub end_offset: i64,
    /// Valid minimum, kept as catalog text.
    pub valid_min: Option<String>,
    /// Valid maximum, kept as catalog text.
    pub valid_max: Option<String>,
    /// Valid delta, kept as catalog text.
    pub valid_delta: Option<String>,
    /// The process cannot run without this variable.
    pub required_to_run: bool,
    /// Companion QC variable should be retrieved.
    pub retrieve_qc: bool,
    /// The process cannot run without the companion QC variable.
    pub qc_required_to_run: bool,
    /// Coordinate system this variable is mapped to.
    pub coord_system: Option<CoordSystemId>,
    /// Dimension names in definition order.
    pub dim_names: Vec<String>,
    /// Candidate sources in fallback search order.
    pub varmaps: Vec<VarMap>,
    /// Output targets.
    pub outputs: Vec<VarOutput>,
}

// ============================================================================
// SECTION: Coordinate Systems
// ============================================================================

/// One dimension of a shared coordinate system.
///
/// Unlike variables, a coordinate dimension may legitimately end up with an
/// empty varmap list after location specialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordDim {
    /// Dimension name.
    pub name: String,
    /// Data type name.
    pub data_type: Option<String>,
    /// Units string.
    pub units: Option<String>,
    /// Start value, kept as catalog text.
    pub start: Option<String>,
    /// Interval, kept as catalog text.
    pub interval: Option<String>,
    /// Length, kept as catalog text.
    pub length: Option<String>,
    /// Transformation type.
    pub trans_type: Option<String>,
    /// Transformation range.
    pub trans_range: Option<String>,
    /// Transformation alignment.
    pub trans_align: Option<String>,
    /// Candidate sources for the coordinate variable itself.
    pub varmaps: Vec<VarMap>,
}

/// Shared axis definitions that variables are aligned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordSystem {
    /// Handle referencing this coordinate system from variables.
    pub id: CoordSystemId,
    /// Coordinate system name.
    pub name: String,
    /// Dimensions in definition order.
    pub dims: Vec<CoordDim>,
}

/// Extended transformation parameters for one coordinate system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransParams {
    /// Coordinate system name.
    pub coord_system: String,
    /// Opaque parameter text.
    pub params: String,
}

// ============================================================================
// SECTION: Aggregate Root
// ============================================================================

/// The retriever configuration graph for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Process this configuration belongs to.
    pub process: ProcessKey,
    /// Owning list of datastreams.
    pub datastreams: Vec<DataStream>,
    /// Owning list of subgroups.
    pub subgroups: Vec<SubGroup>,
    /// Owning list of groups (each owns its variables).
    pub groups: Vec<Group>,
    /// Owning list of coordinate systems (each owns its dimensions).
    pub coord_systems: Vec<CoordSystem>,
    /// Transformation parameters, independent of the graph.
    pub trans_params: Vec<TransParams>,
}

impl RetrieverConfig {
    /// Creates an empty configuration for the process.
    #[must_use]
    pub const fn new(process: ProcessKey) -> Self {
        Self {
            process,
            datastreams: Vec::new(),
            subgroups: Vec::new(),
            groups: Vec::new(),
            coord_systems: Vec::new(),
            trans_params: Vec::new(),
        }
    }

    /// Returns true when no retriever information is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.subgroups.is_empty()
            && self.datastreams.is_empty()
            && self.coord_systems.is_empty()
            && self.trans_params.is_empty()
    }

    /// Resolves a datastream handle.
    #[must_use]
    pub fn datastream(&self, id: DatastreamId) -> Option<&DataStream> {
        self.datastreams.iter().find(|ds| ds.id == id)
    }

    /// Resolves a subgroup handle.
    #[must_use]
    pub fn subgroup(&self, id: SubgroupId) -> Option<&SubGroup> {
        self.subgroups.iter().find(|sg| sg.id == id)
    }

    /// Resolves a coordinate system handle.
    #[must_use]
    pub fn coord_system(&self, id: CoordSystemId) -> Option<&CoordSystem> {
        self.coord_systems.iter().find(|cs| cs.id == id)
    }

    /// Validates the configuration graph invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when a reference fails to resolve or an empty
    /// group or subgroup is left dangling.
    pub fn validate(&self) -> Result<(), ModelError> {
        ensure_subgroup_datastreams_resolve(self)?;
        ensure_group_subgroups_resolve(self)?;
        ensure_varmap_datastreams_resolve(self)?;
        ensure_groups_populated(self)?;
        ensure_subgroups_populated(self)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration graph invariant violations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A varmap references a datastream absent from the owning list.
    #[error("varmap in {context} references unknown datastream: {id}")]
    UnresolvedVarMapDatastream {
        /// Variable or coordinate dimension holding the varmap.
        context: String,
        /// Unresolved datastream handle.
        id: DatastreamId,
    },
    /// A subgroup lists a datastream absent from the owning list.
    #[error("subgroup {subgroup} references unknown datastream: {id}")]
    UnresolvedSubgroupDatastream {
        /// Subgroup name.
        subgroup: String,
        /// Unresolved datastream handle.
        id: DatastreamId,
    },
    /// A group lists a subgroup absent from the owning list.
    #[error("group {group} references unknown subgroup: {id}")]
    UnresolvedGroupSubgroup {
        /// Group name.
        group: String,
        /// Unresolved subgroup handle.
        id: SubgroupId,
    },
    /// A group has no variables or no subgroups.
    #[error("group {0} has no variables or no subgroups")]
    EmptyGroup(String),
    /// A subgroup has no datastreams.
    #[error("subgroup {0} has no datastreams")]
    EmptySubgroup(String),
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures every subgroup datastream handle resolves.
fn ensure_subgroup_datastreams_resolve(config: &RetrieverConfig) -> Result<(), ModelError> {
    for subgroup in &config.subgroups {
        for id in &subgroup.datastreams {
            if config.datastream(*id).is_none() {
                return Err(ModelError::UnresolvedSubgroupDatastream {
                    subgroup: subgroup.name.clone(),
                    id: *id,
                });
            }
        }
    }
    Ok(())
}

/// Ensures every group subgroup handle resolves.
fn ensure_group_subgroups_resolve(config: &RetrieverConfig) -> Result<(), ModelError> {
    for group in &config.groups {
        for id in &group.subgroups {
            if config.subgroup(*id).is_none() {
                return Err(ModelError::UnresolvedGroupSubgroup {
                    group: group.name.clone(),
                    id: *id,
                });
            }
        }
    }
    Ok(())
}

/// Ensures every varmap datastream handle resolves, for variables and
/// coordinate dimensions alike.
fn ensure_varmap_datastreams_resolve(config: &RetrieverConfig) -> Result<(), ModelError> {
    for group in &config.groups {
        for variable in &group.variables {
            for varmap in &variable.varmaps {
                if config.datastream(varmap.datastream).is_none() {
                    return Err(ModelError::UnresolvedVarMapDatastream {
                        context: format!("{}:{}", group.name, variable.name),
                        id: varmap.datastream,
                    });
                }
            }
        }
    }
    for coord_system in &config.coord_systems {
        for dim in &coord_system.dims {
            for varmap in &dim.varmaps {
                if config.datastream(varmap.datastream).is_none() {
                    return Err(ModelError::UnresolvedVarMapDatastream {
                        context: format!("{}:{}", coord_system.name, dim.name),
                        id: varmap.datastream,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Ensures no group is left without variables or subgroups.
fn ensure_groups_populated(config: &RetrieverConfig) -> Result<(), ModelError> {
    for group in &config.groups {
        if group.variables.is_empty() || group.subgroups.is_empty() {
            return Err(ModelError::EmptyGroup(group.name.clone()));
        }
    }
    Ok(())
}

/// Ensures no subgroup is left without datastreams.
fn ensure_subgroups_populated(config: &RetrieverConfig) -> Result<(), ModelError> {
    for subgroup in &config.subgroups {
        if subgroup.datastreams.is_empty() {
            return Err(ModelError::EmptySubgroup(subgroup.name.clone()));
        }
    }
    Ok(())
}
