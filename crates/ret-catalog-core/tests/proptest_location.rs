// crates/ret-catalog-core/tests/proptest_location.rs
// ============================================================================
// Module: Location Specialization Property Tests
// Description: Randomized checks of cascade closure and idempotence.
// Purpose: Ensure specialization never leaves dangling references.
// Dependencies: proptest, ret-catalog-core
// ============================================================================

//! Property tests for location specialization over generated graphs.

use proptest::prelude::*;
use ret_catalog_core::CoordDim;
use ret_catalog_core::CoordSystem;
use ret_catalog_core::CoordSystemId;
use ret_catalog_core::DataStream;
use ret_catalog_core::DatastreamId;
use ret_catalog_core::Group;
use ret_catalog_core::LocationError;
use ret_catalog_core::ProcessKey;
use ret_catalog_core::RetrieverConfig;
use ret_catalog_core::SubGroup;
use ret_catalog_core::SubgroupId;
use ret_catalog_core::VarMap;
use ret_catalog_core::Variable;
use ret_catalog_core::set_location;

/// Deployment sites used by generated dependencies.
const SITES: [&str; 2] = ["sgp", "nsa"];
/// Deployment facilities used by generated dependencies.
const FACILITIES: [&str; 2] = ["C1", "C2"];

/// Specification of one generated datastream: optional indexes into the
/// site and facility dependency tables.
type DsSpec = (Option<usize>, Option<usize>);
/// Specification of one generated variable: required flag plus a bitmask
/// selecting its source datastreams.
type VarSpec = (bool, u8);

/// Builds a coherent configuration from generated specifications.
fn build_config(ds_specs: &[DsSpec], var_specs: &[VarSpec]) -> RetrieverConfig {
    let datastreams: Vec<DataStream> = ds_specs
        .iter()
        .enumerate()
        .map(|(index, (site_dep, fac_dep))| DataStream {
            id: DatastreamId::new(i64::try_from(index).unwrap_or(0) + 1),
            name: format!("ds{index}"),
            level: "b1".to_string(),
            site: None,
            facility: None,
            dep_site: site_dep.map(|i| SITES[i % SITES.len()].to_string()),
            dep_facility: fac_dep.map(|i| FACILITIES[i % FACILITIES.len()].to_string()),
            dep_begin_date: None,
            dep_end_date: None,
        })
        .collect();
    let all_ids: Vec<DatastreamId> = datastreams.iter().map(|ds| ds.id).collect();

    let variables: Vec<Variable> = var_specs
        .iter()
        .enumerate()
        .map(|(index, (required, mask))| {
            let mut sources: Vec<DatastreamId> = all_ids
                .iter()
                .enumerate()
                .filter(|(bit, _)| *mask >> *bit & 1 == 1)
                .map(|(_, id)| *id)
                .collect();
            if sources.is_empty() {
                sources.push(all_ids[0]);
            }
            Variable {
                name: format!("var{index}"),
                data_type: None,
                units: None,
                start_offset: 0,
                end_offset: 0,
                valid_min: None,
                valid_max: None,
                valid_delta: None,
                required_to_run: *required,
                retrieve_qc: false,
                qc_required_to_run: false,
                coord_system: Some(CoordSystemId::new(50)),
                dim_names: Vec::new(),
                varmaps: sources
                    .into_iter()
                    .map(|id| VarMap {
                        datastream: id,
                        names: vec![format!("raw{index}")],
                    })
                    .collect(),
                outputs: Vec::new(),
            }
        })
        .collect();

    RetrieverConfig {
        process: ProcessKey::new("VAP", "generated"),
        subgroups: vec![SubGroup {
            id: SubgroupId::new(100),
            name: "all".to_string(),
            datastreams: all_ids.clone(),
        }],
        groups: vec![Group {
            name: "generated".to_string(),
            subgroups: vec![SubgroupId::new(100)],
            variables,
        }],
        coord_systems: vec![CoordSystem {
            id: CoordSystemId::new(50),
            name: "time_height".to_string(),
            dims: vec![CoordDim {
                name: "height".to_string(),
                data_type: None,
                units: None,
                start: None,
                interval: None,
                length: None,
                trans_type: None,
                trans_range: None,
                trans_align: None,
                varmaps: all_ids
                    .iter()
                    .map(|id| VarMap {
                        datastream: *id,
                        names: vec!["height".to_string()],
                    })
                    .collect(),
            }],
        }],
        datastreams,
        trans_params: Vec::new(),
    }
}

/// Strategy producing coherent configurations of varied shape.
fn config_strategy() -> impl Strategy<Value = RetrieverConfig> {
    let ds_specs = prop::collection::vec(
        (proptest::option::of(0..SITES.len()), proptest::option::of(0..FACILITIES.len())),
        1..6,
    );
    let var_specs = prop::collection::vec((any::<bool>(), 0u8..32), 1..5);
    (ds_specs, var_specs)
        .prop_map(|(ds_specs, var_specs)| build_config(&ds_specs, &var_specs))
}

proptest! {
    #[test]
    fn specialization_preserves_referential_closure(config in config_strategy()) {
        let mut specialized = config;
        let result = set_location(&mut specialized, "nsa", "C1");

        for ds in &specialized.datastreams {
            prop_assert!(ds.dep_site.as_deref().is_none_or(|dep| dep == "nsa"));
            prop_assert!(ds.dep_facility.as_deref().is_none_or(|dep| dep == "C1"));
            prop_assert_eq!(ds.site.as_deref(), Some("nsa"));
            prop_assert_eq!(ds.facility.as_deref(), Some("C1"));
        }

        prop_assert!(specialized.validate().is_ok());

        if let Err(LocationError::ValidationFailed { losses, .. }) = &result {
            prop_assert!(!losses.is_empty());
        }
    }

    #[test]
    fn specialization_is_idempotent(config in config_strategy()) {
        let mut first = config;
        let _ = set_location(&mut first, "nsa", "C1");
        let mut second = first.clone();
        let outcome = set_location(&mut second, "nsa", "C1");
        prop_assert!(outcome.is_ok());
        prop_assert_eq!(first, second);
    }
}
