// crates/ret-catalog-core/src/runtime/location.rs
// ============================================================================
// Module: Location Specialization
// Description: Narrows a retriever configuration to one site and facility.
// Purpose: Disqualify location-dependent datastreams and cascade removals.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! A freshly loaded configuration describes every deployment the process can
//! run at. Specializing it to a concrete site and facility removes every
//! datastream whose site or facility dependency names a different location,
//! then cascades: variables that lose their last candidate source disappear,
//! groups that lose their last variable disappear, subgroups that lose their
//! last datastream disappear together with the groups that only referenced
//! them. The pass always completes; losing a required variable is reported
//! after the graph has been fully specialized, not mid-cascade.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::DatastreamId;
use crate::core::RetrieverConfig;
use crate::core::SubgroupId;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A required variable that lost its last candidate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredVariableLoss {
    /// Group the variable belonged to.
    pub group: String,
    /// Variable name.
    pub variable: String,
}

impl fmt::Display for RequiredVariableLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.variable)
    }
}

/// Location specialization errors.
#[derive(Debug, Error)]
pub enum LocationError {
    /// Site or facility was empty.
    #[error("both site and facility are required to set the retriever location")]
    MissingLocation,
    /// Specialization completed but removed required variables.
    #[error(
        "retriever configuration is not valid for {site}{facility}: \
         {count} required variable(s) lost",
        count = .losses.len()
    )]
    ValidationFailed {
        /// Deployment site.
        site: String,
        /// Deployment facility.
        facility: String,
        /// Every required variable removed by the cascade, in removal order.
        losses: Vec<RequiredVariableLoss>,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Specializes the configuration to one site and facility.
///
/// Removes every datastream whose site or facility dependency names another
/// location, cascades the removals through variables, groups, subgroups, and
/// coordinate dimensions, then fills the site and facility fields of the
/// surviving datastreams that had none. The operation is idempotent: a second
/// call with the same location finds nothing left to disqualify.
///
/// # Errors
///
/// Returns [`LocationError::MissingLocation`] when either argument is empty,
/// without touching the graph. Returns [`LocationError::ValidationFailed`]
/// when the cascade removed one or more required variables; the graph is
/// still left fully specialized in that case so callers can inspect what
/// survived.
pub fn set_location(
    config: &mut RetrieverConfig,
    site: &str,
    facility: &str,
) -> Result<(), LocationError> {
    if site.is_empty() || facility.is_empty() {
        return Err(LocationError::MissingLocation);
    }

    // Deleting one datastream never changes another's eligibility, so the
    // disqualified set is decided up front and cascaded afterwards.
    let disqualified: Vec<DatastreamId> = config
        .datastreams
        .iter()
        .filter(|ds| {
            ds.dep_site.as_deref().is_some_and(|dep| dep != site)
                || ds.dep_facility.as_deref().is_some_and(|dep| dep != facility)
        })
        .map(|ds| ds.id)
        .collect();

    let mut losses = Vec::new();
    for id in disqualified {
        delete_datastream(config, id, &mut losses);
    }

    for ds in &mut config.datastreams {
        if ds.site.is_none() {
            ds.site = Some(site.to_string());
        }
        if ds.facility.is_none() {
            ds.facility = Some(facility.to_string());
        }
    }

    if losses.is_empty() {
        Ok(())
    } else {
        Err(LocationError::ValidationFailed {
            site: site.to_string(),
            facility: facility.to_string(),
            losses,
        })
    }
}

// ============================================================================
// SECTION: Cascade
// ============================================================================

/// Removes one datastream and every reference to it.
///
/// Order matters: variable varmaps first (recording required losses),
/// subgroups next (possibly deleting subgroups and their groups), coordinate
/// dimension varmaps after that, and the owning list last.
fn delete_datastream(
    config: &mut RetrieverConfig,
    id: DatastreamId,
    losses: &mut Vec<RequiredVariableLoss>,
) {
    for group in &mut config.groups {
        let group_name = group.name.clone();
        group.variables.retain_mut(|variable| {
            // A variable already stripped of every source by an earlier
            // deletion is discarded without a required-to-run check.
            if variable.varmaps.is_empty() {
                return false;
            }
            variable.varmaps.retain(|vm| vm.datastream != id);
            if variable.varmaps.is_empty() {
                if variable.required_to_run {
                    losses.push(RequiredVariableLoss {
                        group: group_name.clone(),
                        variable: variable.name.clone(),
                    });
                }
                return false;
            }
            true
        });
    }
    config.groups.retain(|group| !group.variables.is_empty());

    let mut emptied: Vec<SubgroupId> = Vec::new();
    for subgroup in &mut config.subgroups {
        subgroup.datastreams.retain(|ds| *ds != id);
        if subgroup.datastreams.is_empty() {
            emptied.push(subgroup.id);
        }
    }
    for subgroup_id in emptied {
        delete_subgroup(config, subgroup_id);
    }

    for coord_system in &mut config.coord_systems {
        for dim in &mut coord_system.dims {
            dim.varmaps.retain(|vm| vm.datastream != id);
        }
    }

    config.datastreams.retain(|ds| ds.id != id);
}

/// Removes one subgroup and every group reference to it. Groups left with no
/// subgroups are removed too.
fn delete_subgroup(config: &mut RetrieverConfig, id: SubgroupId) {
    config.groups.retain_mut(|group| {
        group.subgroups.retain(|sg| *sg != id);
        !group.subgroups.is_empty()
    });
    config.subgroups.retain(|sg| sg.id != id);
}
