// crates/ret-catalog-core/src/runtime/render.rs
// ============================================================================
// Module: Configuration Report Renderer
// Description: Human-readable dump of a retriever configuration graph.
// Purpose: Render the four report sections for inspection and debugging.
// Dependencies: crate::core, std::fmt
// ============================================================================

//! ## Overview
//! Renders a configuration as a four-section text report: datastream groups,
//! variables, coordinate systems, and extended transformation parameters.
//! Datastream names print with `sss` and `F#` placeholders until location
//! specialization fills the site and facility. Only the first subgroup of a
//! group is consumed downstream, so the report warns when a group carries
//! more than one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write;

use crate::core::DataStream;
use crate::core::RetrieverConfig;
use crate::core::VarMap;

// ============================================================================
// SECTION: Layout
// ============================================================================

/// Section separator line.
const RULE: &str = "------------------------------------------------------------";

// ============================================================================
// SECTION: Public Functions
// ============================================================================

/// Renders the configuration report as a string.
#[must_use]
pub fn render_retriever(config: &RetrieverConfig) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_retriever(&mut out, config);
    out
}

/// Writes the configuration report to a formatter sink.
///
/// # Errors
///
/// Returns [`fmt::Error`] when the sink refuses a write.
pub fn write_retriever(w: &mut impl Write, config: &RetrieverConfig) -> fmt::Result {
    write_groups(w, config)?;
    write_variables(w, config)?;
    write_coord_systems(w, config)?;
    write_trans_params(w, config)?;
    Ok(())
}

// ============================================================================
// SECTION: Datastream Groups
// ============================================================================

/// Writes a datastream name with placeholders for an unset location.
fn write_ds_name(w: &mut impl Write, ds: &DataStream) -> fmt::Result {
    let site = ds.site.as_deref().unwrap_or("sss");
    let facility = ds.facility.as_deref().unwrap_or("F#");
    write!(w, "{site}{}{facility}.{}", ds.name, ds.level)
}

/// Writes one varmap entry as `<datastream>:<name>`.
fn write_varmap_entry(
    w: &mut impl Write,
    config: &RetrieverConfig,
    varmap: &VarMap,
    name: &str,
) -> fmt::Result {
    if let Some(ds) = config.datastream(varmap.datastream) {
        write_ds_name(w, ds)?;
    }
    writeln!(w, ":{name}")
}

/// Writes the datastream groups section.
fn write_groups(w: &mut impl Write, config: &RetrieverConfig) -> fmt::Result {
    writeln!(w, "{RULE}\nRetriever Datastream Groups:\n{RULE}")?;

    if config.groups.is_empty() {
        writeln!(w, "\nNo groups defined")?;
    }

    for group in &config.groups {
        writeln!(w, "\nGroup: {}", group.name)?;

        if group.subgroups.is_empty() {
            writeln!(w, "\nWARNING: No subgroups defined.")?;
            continue;
        }

        if group.subgroups.len() > 1 {
            writeln!(
                w,
                "\nWARNING: Multiple subgroups are not currently supported. Only\n\
                 the first subgroup in the following list will be processed:"
            )?;
            for id in &group.subgroups {
                if let Some(subgroup) = config.subgroup(*id) {
                    writeln!(w, "  - {}", subgroup.name)?;
                }
            }
        }

        let Some(subgroup) = config.subgroup(group.subgroups[0]) else {
            continue;
        };

        for id in &subgroup.datastreams {
            let Some(ds) = config.datastream(*id) else {
                continue;
            };

            write!(w, "\n    ")?;
            write_ds_name(w, ds)?;
            writeln!(w)?;

            let dep_site = ds.dep_site.as_deref().unwrap_or("NULL");
            writeln!(w, "      - dep_site:       {dep_site}")?;

            let dep_facility = ds.dep_facility.as_deref().unwrap_or("NULL");
            writeln!(w, "      - dep_fac:        {dep_facility}")?;

            match ds.dep_begin_date {
                Some(date) => writeln!(w, "      - dep_begin_date: {date}")?,
                None => writeln!(w, "      - dep_begin_date: NULL")?,
            }
            match ds.dep_end_date {
                Some(date) => writeln!(w, "      - dep_end_date:   {date}")?,
                None => writeln!(w, "      - dep_end_date:   NULL")?,
            }
        }
    }

    Ok(())
}

// ============================================================================
// SECTION: Variables
// ============================================================================

/// Writes the variables section.
fn write_variables(w: &mut impl Write, config: &RetrieverConfig) -> fmt::Result {
    writeln!(w, "\n{RULE}\nRetriever Variables:\n{RULE}")?;

    if config.groups.is_empty() {
        writeln!(w, "\nNo variables defined")?;
    }

    for group in &config.groups {
        writeln!(w, "\nGroup: {}", group.name)?;

        for variable in &group.variables {
            write!(w, "\n    {}(", variable.name)?;
            for (index, dim_name) in variable.dim_names.iter().enumerate() {
                if index > 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{dim_name}")?;
            }
            writeln!(w, ")")?;

            if variable.varmaps.is_empty() {
                write!(w, "      - input source:       NULL")?;
            } else if variable.varmaps.len() == 1 && variable.varmaps[0].names.len() == 1 {
                let varmap = &variable.varmaps[0];
                write!(w, "      - input source:       ")?;
                write_varmap_entry(w, config, varmap, &varmap.names[0])?;
            } else {
                writeln!(w, "      - input search order:")?;
                for varmap in &variable.varmaps {
                    for name in &varmap.names {
                        write!(w, "          - ")?;
                        write_varmap_entry(w, config, varmap, name)?;
                    }
                }
            }

            let data_type = variable.data_type.as_deref().unwrap_or("NULL");
            writeln!(w, "      - data_type:          {data_type}")?;

            let units = variable.units.as_deref().unwrap_or("NULL");
            writeln!(w, "      - units:              {units}")?;

            let valid_min = variable.valid_min.as_deref().unwrap_or("NULL");
            writeln!(w, "      - valid_min:          {valid_min}")?;

            let valid_max = variable.valid_max.as_deref().unwrap_or("NULL");
            writeln!(w, "      - valid_max:          {valid_max}")?;

            let valid_delta = variable.valid_delta.as_deref().unwrap_or("NULL");
            writeln!(w, "      - valid_delta:        {valid_delta}")?;

            writeln!(w, "      - start_offset:       {}", variable.start_offset)?;
            writeln!(w, "      - end_offset:         {}", variable.end_offset)?;
            writeln!(w, "      - required_to_run:    {}", i32::from(variable.required_to_run))?;
            writeln!(w, "      - retrieve_qc:        {}", i32::from(variable.retrieve_qc))?;
            writeln!(
                w,
                "      - qc_required_to_run: {}",
                i32::from(variable.qc_required_to_run)
            )?;

            let coord_system = variable
                .coord_system
                .and_then(|id| config.coord_system(id))
                .map_or("NULL", |cs| cs.name.as_str());
            writeln!(w, "      - coordinate_system:  {coord_system}")?;

            if variable.outputs.is_empty() {
                writeln!(w, "      - output target:      NULL")?;
            } else if variable.outputs.len() == 1 {
                let output = &variable.outputs[0];
                writeln!(
                    w,
                    "      - output target:      {}.{}:{}",
                    output.ds_name, output.ds_level, output.var_name
                )?;
            } else {
                writeln!(w, "      - output targets:")?;
                for output in &variable.outputs {
                    writeln!(
                        w,
                        "          - {}.{}:{}",
                        output.ds_name, output.ds_level, output.var_name
                    )?;
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// SECTION: Coordinate Systems
// ============================================================================

/// Writes the coordinate systems section.
fn write_coord_systems(w: &mut impl Write, config: &RetrieverConfig) -> fmt::Result {
    writeln!(w, "\n{RULE}\nRetriever Coordinate Systems:\n{RULE}")?;

    if config.coord_systems.is_empty() {
        writeln!(w, "\nNo coordinate systems defined")?;
    }

    for coord_system in &config.coord_systems {
        writeln!(w, "\nCoordinate System: {}", coord_system.name)?;

        for dim in &coord_system.dims {
            writeln!(w, "\n    {}", dim.name)?;

            let data_type = dim.data_type.as_deref().unwrap_or("NULL");
            writeln!(w, "      - data_type:     {data_type}")?;

            let units = dim.units.as_deref().unwrap_or("NULL");
            writeln!(w, "      - units:         {units}")?;

            let start = dim.start.as_deref().unwrap_or("NULL");
            writeln!(w, "      - start value:   {start}")?;

            let interval = dim.interval.as_deref().unwrap_or("NULL");
            writeln!(w, "      - interval:      {interval}")?;

            let length = dim.length.as_deref().unwrap_or("NULL");
            writeln!(w, "      - length:        {length}")?;

            writeln!(w, "      - transformation parameters:")?;

            let trans_type = dim.trans_type.as_deref().unwrap_or("NULL");
            writeln!(w, "          - type:      {trans_type}")?;

            let trans_range = dim.trans_range.as_deref().unwrap_or("NULL");
            writeln!(w, "          - range:     {trans_range}")?;

            let trans_align = dim.trans_align.as_deref().unwrap_or("NULL");
            writeln!(w, "          - alignment: {trans_align}")?;

            if dim.varmaps.is_empty() {
                writeln!(w, "      - variable map:  NULL")?;
            } else if dim.varmaps.len() == 1 && dim.varmaps[0].names.len() == 1 {
                let varmap = &dim.varmaps[0];
                write!(w, "      - variable map:  ")?;
                write_varmap_entry(w, config, varmap, &varmap.names[0])?;
            } else {
                writeln!(w, "      - variable map search order:")?;
                for varmap in &dim.varmaps {
                    for name in &varmap.names {
                        write!(w, "          - ")?;
                        write_varmap_entry(w, config, varmap, name)?;
                    }
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// SECTION: Transformation Parameters
// ============================================================================

/// Writes the extended transformation parameters section.
fn write_trans_params(w: &mut impl Write, config: &RetrieverConfig) -> fmt::Result {
    writeln!(w, "\n{RULE}\nRetriever Extended Transformation Parameters:\n{RULE}")?;

    if config.trans_params.is_empty() {
        writeln!(w, "\nNo extended transformation parameters defined")?;
    }

    for trans_params in &config.trans_params {
        writeln!(w, "\nCoordinate System: {}", trans_params.coord_system)?;
        writeln!(w, "\n{}", trans_params.params)?;
    }

    Ok(())
}
