// crates/ret-catalog-core/tests/render.rs
// ============================================================================
// Module: Report Renderer Tests
// Description: Validate the four-section configuration report.
// Purpose: Exercise placeholders, warnings, and section fallbacks.
// Dependencies: ret-catalog-core
// ============================================================================

//! Configuration report rendering tests.

use ret_catalog_core::DataStream;
use ret_catalog_core::DatastreamId;
use ret_catalog_core::Group;
use ret_catalog_core::ProcessKey;
use ret_catalog_core::RetrieverConfig;
use ret_catalog_core::SubGroup;
use ret_catalog_core::SubgroupId;
use ret_catalog_core::TransParams;
use ret_catalog_core::VarMap;
use ret_catalog_core::VarOutput;
use ret_catalog_core::Variable;
use ret_catalog_core::render_retriever;
use ret_catalog_core::set_location;

/// Test result alias.
type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Builds a one-group configuration with a single datastream and variable.
fn small_config() -> RetrieverConfig {
    RetrieverConfig {
        process: ProcessKey::new("VAP", "aosccn"),
        datastreams: vec![DataStream {
            id: DatastreamId::new(1),
            name: "aosccn".to_string(),
            level: "b1".to_string(),
            site: None,
            facility: None,
            dep_site: Some("sgp".to_string()),
            dep_facility: None,
            dep_begin_date: None,
            dep_end_date: None,
        }],
        subgroups: vec![SubGroup {
            id: SubgroupId::new(100),
            name: "ccn_b1".to_string(),
            datastreams: vec![DatastreamId::new(1)],
        }],
        groups: vec![Group {
            name: "ccn_data".to_string(),
            subgroups: vec![SubgroupId::new(100)],
            variables: vec![Variable {
                name: "ccn_conc".to_string(),
                data_type: Some("float".to_string()),
                units: Some("1/cm^3".to_string()),
                start_offset: 0,
                end_offset: 0,
                valid_min: None,
                valid_max: None,
                valid_delta: None,
                required_to_run: true,
                retrieve_qc: false,
                qc_required_to_run: false,
                coord_system: None,
                dim_names: vec!["time".to_string()],
                varmaps: vec![VarMap {
                    datastream: DatastreamId::new(1),
                    names: vec!["N_CCN".to_string()],
                }],
                outputs: vec![VarOutput {
                    ds_name: "aosccn".to_string(),
                    ds_level: "c1".to_string(),
                    var_name: "N_CCN".to_string(),
                }],
            }],
        }],
        coord_systems: Vec::new(),
        trans_params: vec![TransParams {
            coord_system: "time_height".to_string(),
            params: "range = 500;".to_string(),
        }],
    }
}

#[test]
fn unspecialized_datastream_names_use_placeholders() {
    let report = render_retriever(&small_config());
    assert!(report.contains("sssaosccnF#.b1"));
    assert!(report.contains("- dep_site:       sgp"));
    assert!(report.contains("- dep_fac:        NULL"));
    assert!(report.contains("- dep_begin_date: NULL"));
}

#[test]
fn specialized_datastream_names_carry_site_and_facility() -> TestResult {
    let mut config = small_config();
    set_location(&mut config, "sgp", "C1")?;
    let report = render_retriever(&config);
    assert!(report.contains("sgpaosccnC1.b1"));
    assert!(!report.contains("sss"));
    Ok(())
}

#[test]
fn all_four_sections_are_present() {
    let report = render_retriever(&small_config());
    assert!(report.contains("Retriever Datastream Groups:"));
    assert!(report.contains("Retriever Variables:"));
    assert!(report.contains("Retriever Coordinate Systems:"));
    assert!(report.contains("Retriever Extended Transformation Parameters:"));
}

#[test]
fn variable_section_lists_source_and_output() {
    let report = render_retriever(&small_config());
    assert!(report.contains("ccn_conc(time)"));
    assert!(report.contains("- input source:       sssaosccnF#.b1:N_CCN"));
    assert!(report.contains("- output target:      aosccn.c1:N_CCN"));
    assert!(report.contains("- required_to_run:    1"));
    assert!(report.contains("- retrieve_qc:        0"));
    assert!(report.contains("- coordinate_system:  NULL"));
}

#[test]
fn multiple_name_candidates_render_as_search_order() {
    let mut config = small_config();
    config.groups[0].variables[0].varmaps[0].names.push("ccn_conc".to_string());
    let report = render_retriever(&config);
    assert!(report.contains("- input search order:"));
    assert!(report.contains("          - sssaosccnF#.b1:N_CCN"));
    assert!(report.contains("          - sssaosccnF#.b1:ccn_conc"));
}

#[test]
fn empty_config_renders_section_fallbacks() {
    let config = RetrieverConfig::new(ProcessKey::new("VAP", "aosccn"));
    let report = render_retriever(&config);
    assert!(report.contains("No groups defined"));
    assert!(report.contains("No variables defined"));
    assert!(report.contains("No coordinate systems defined"));
    assert!(report.contains("No extended transformation parameters defined"));
}

#[test]
fn extra_subgroups_trigger_the_first_subgroup_warning() {
    let mut config = small_config();
    config.subgroups.push(SubGroup {
        id: SubgroupId::new(101),
        name: "ccn_alt_b1".to_string(),
        datastreams: vec![DatastreamId::new(1)],
    });
    config.groups[0].subgroups.push(SubgroupId::new(101));
    let report = render_retriever(&config);
    assert!(report.contains("WARNING: Multiple subgroups are not currently supported."));
    assert!(report.contains("  - ccn_b1"));
    assert!(report.contains("  - ccn_alt_b1"));
}

#[test]
fn trans_params_render_verbatim() {
    let report = render_retriever(&small_config());
    assert!(report.contains("Coordinate System: time_height"));
    assert!(report.contains("range = 500;"));
}
