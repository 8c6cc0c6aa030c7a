// crates/ret-catalog-core/tests/model.rs
// ============================================================================
// Module: Configuration Model Tests
// Description: Validate graph invariant checks and serialization.
// Purpose: Exercise RetrieverConfig validation and its JSON form.
// Dependencies: ret-catalog-core, serde_json
// ============================================================================

//! Configuration model invariant and serialization tests.

use ret_catalog_core::DataStream;
use ret_catalog_core::DatastreamId;
use ret_catalog_core::Group;
use ret_catalog_core::ModelError;
use ret_catalog_core::ProcessKey;
use ret_catalog_core::RetrieverConfig;
use ret_catalog_core::SubGroup;
use ret_catalog_core::SubgroupId;
use ret_catalog_core::VarMap;
use ret_catalog_core::Variable;

/// Test result alias.
type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Builds a minimal valid configuration.
fn valid_config() -> RetrieverConfig {
    RetrieverConfig {
        process: ProcessKey::new("VAP", "aosccn"),
        datastreams: vec![DataStream {
            id: DatastreamId::new(1),
            name: "aosccn".to_string(),
            level: "b1".to_string(),
            site: None,
            facility: None,
            dep_site: None,
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
                data_type: None,
                units: None,
                start_offset: 0,
                end_offset: 0,
                valid_min: None,
                valid_max: None,
                valid_delta: None,
                required_to_run: false,
                retrieve_qc: false,
                qc_required_to_run: false,
                coord_system: None,
                dim_names: Vec::new(),
                varmaps: vec![VarMap {
                    datastream: DatastreamId::new(1),
                    names: vec!["N_CCN".to_string()],
                }],
                outputs: Vec::new(),
            }],
        }],
        coord_systems: Vec::new(),
        trans_params: Vec::new(),
    }
}

#[test]
fn valid_config_passes_validation() -> TestResult {
    valid_config().validate()?;
    Ok(())
}

#[test]
fn unresolved_subgroup_datastream_is_reported() {
    let mut config = valid_config();
    config.subgroups[0].datastreams.push(DatastreamId::new(99));
    assert!(matches!(
        config.validate(),
        Err(ModelError::UnresolvedSubgroupDatastream { .. })
    ));
}

#[test]
fn unresolved_group_subgroup_is_reported() {
    let mut config = valid_config();
    config.groups[0].subgroups.push(SubgroupId::new(999));
    assert!(matches!(config.validate(), Err(ModelError::UnresolvedGroupSubgroup { .. })));
}

#[test]
fn unresolved_varmap_datastream_is_reported() {
    let mut config = valid_config();
    config.groups[0].variables[0].varmaps[0].datastream = DatastreamId::new(99);
    assert!(matches!(
        config.validate(),
        Err(ModelError::UnresolvedVarMapDatastream { .. })
    ));
}

#[test]
fn empty_group_is_reported() {
    let mut config = valid_config();
    config.groups[0].variables.clear();
    assert!(matches!(config.validate(), Err(ModelError::EmptyGroup(_))));
}

#[test]
fn empty_subgroup_is_reported() {
    let mut config = valid_config();
    config.subgroups[0].datastreams.clear();
    assert!(matches!(config.validate(), Err(ModelError::EmptySubgroup(_))));
}

#[test]
fn config_round_trips_through_json() -> TestResult {
    let config = valid_config();
    let json = serde_json::to_string(&config)?;
    let decoded: RetrieverConfig = serde_json::from_str(&json)?;
    assert_eq!(config, decoded);
    Ok(())
}

#[test]
fn entity_handles_serialize_transparently() -> TestResult {
    let json = serde_json::to_string(&DatastreamId::new(7))?;
    assert_eq!(json, "7");
    Ok(())
}
