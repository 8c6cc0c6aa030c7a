// crates/ret-catalog-core/tests/loader.rs
// ============================================================================
// Module: Graph Loader Tests
// Description: Validate reconstruction of the configuration graph from rows.
// Purpose: Exercise the load phases, run grouping, and failure modes.
// Dependencies: ret-catalog-core
// ============================================================================

//! Graph loader behavior tests against in-memory fixtures.

use ret_catalog_core::CoordSystemId;
use ret_catalog_core::DatastreamId;
use ret_catalog_core::LoadError;
use ret_catalog_core::MemoryTableSource;
use ret_catalog_core::ProcessKey;
use ret_catalog_core::RetrieverQuery;
use ret_catalog_core::SubgroupId;
use ret_catalog_core::TableResult;
use ret_catalog_core::load_retriever;

/// Test result alias.
type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Builds one nullable text row from string slices.
fn row(cells: &[Option<&str>]) -> Vec<Option<String>> {
    cells.iter().map(|cell| cell.map(str::to_string)).collect()
}

/// Builds a table result for a query from string-slice rows.
fn table(
    query: RetrieverQuery,
    rows: &[&[Option<&str>]],
) -> Result<TableResult, Box<dyn std::error::Error>> {
    let collected = rows.iter().map(|cells| row(cells)).collect();
    Ok(TableResult::new(query.column_count(), collected)?)
}

/// Builds the full-graph fixture used by most loader tests.
///
/// One group (10) with one subgroup (100) holding two datastreams (1, 2),
/// one coordinate system (50) with one dimension fed by the subgroup, and
/// one variable (1000) mapped onto both datastreams.
fn full_fixture() -> Result<MemoryTableSource, Box<dyn std::error::Error>> {
    let source = MemoryTableSource::new()
        .with_result(
            RetrieverQuery::GroupsAndSubgroups,
            table(
                RetrieverQuery::GroupsAndSubgroups,
                &[&[Some("10"), Some("ccn_data"), Some("100"), Some("1"), Some("ccn_b1")]],
            )?,
        )
        .with_result(
            RetrieverQuery::Datastreams,
            table(
                RetrieverQuery::Datastreams,
                &[
                    &[
                        Some("100"),
                        Some("1"),
                        Some("1"),
                        Some("aosccn"),
                        Some("b1"),
                        None,
                        None,
                        Some("sgp"),
                        None,
                        Some("2016-10-01 00:00:00"),
                        None,
                    ],
                    &[
                        Some("100"),
                        Some("2"),
                        Some("2"),
                        Some("aosccnalt"),
                        Some("b1"),
                        None,
                        None,
                        None,
                        None,
                        None,
                        None,
                    ],
                ],
            )?,
        )
        .with_result(
            RetrieverQuery::CoordSystems,
            table(RetrieverQuery::CoordSystems, &[&[Some("50"), Some("time_height")]])?,
        )
        .with_result(
            RetrieverQuery::CoordDims,
            table(
                RetrieverQuery::CoordDims,
                &[&[
                    Some("50"),
                    Some("1"),
                    Some("500"),
                    Some("height"),
                    Some("float"),
                    Some("m"),
                    Some("0"),
                    Some("10"),
                    Some("100"),
                    None,
                    None,
                    None,
                    Some("100"),
                ]],
            )?,
        )
        .with_result(
            RetrieverQuery::CoordVarNames,
            table(
                RetrieverQuery::CoordVarNames,
                &[
                    &[Some("500"), Some("1"), Some("1"), Some("height")],
                    &[Some("500"), Some("2"), Some("1"), Some("alt")],
                ],
            )?,
        )
        .with_result(
            RetrieverQuery::Variables,
            table(
                RetrieverQuery::Variables,
                &[&[
                    Some("10"),
                    Some("1000"),
                    Some("ccn_conc"),
                    Some("float"),
                    Some("1/cm^3"),
                    Some("-300"),
                    Some("300"),
                    Some("0"),
                    None,
                    None,
                    Some("1"),
                    Some("1"),
                    Some("0"),
                    Some("50"),
                ]],
            )?,
        )
        .with_result(
            RetrieverQuery::VarDims,
            table(
                RetrieverQuery::VarDims,
                &[
                    &[Some("1000"), Some("1"), Some("time")],
                    &[Some("1000"), Some("2"), Some("height")],
                ],
            )?,
        )
        .with_result(
            RetrieverQuery::VarNames,
            table(
                RetrieverQuery::VarNames,
                &[
                    &[Some("1000"), Some("1"), Some("1"), Some("N_CCN")],
                    &[Some("1000"), Some("1"), Some("2"), Some("ccn_conc")],
                    &[Some("1000"), Some("2"), Some("1"), Some("ccn_concentration")],
                ],
            )?,
        )
        .with_result(
            RetrieverQuery::VarOutputs,
            table(
                RetrieverQuery::VarOutputs,
                &[&[Some("1000"), Some("aosccn"), Some("c1"), Some("N_CCN")]],
            )?,
        )
        .with_result(
            RetrieverQuery::TransParams,
            table(
                RetrieverQuery::TransParams,
                &[&[Some("time_height"), Some("range = 500;")]],
            )?,
        );
    Ok(source)
}

/// Returns the fixture process key.
fn process() -> ProcessKey {
    ProcessKey::new("VAP", "aosccn")
}

#[test]
fn full_graph_reconstructs_all_entities() -> TestResult {
    let source = full_fixture()?;
    let loaded = load_retriever(&source, &process())?;
    let config = loaded.config;

    assert_eq!(loaded.row_count, 15);
    assert_eq!(config.groups.len(), 1);
    assert_eq!(config.subgroups.len(), 1);
    assert_eq!(config.datastreams.len(), 2);
    assert_eq!(config.coord_systems.len(), 1);
    assert_eq!(config.trans_params.len(), 1);

    let group = &config.groups[0];
    assert_eq!(group.name, "ccn_data");
    assert_eq!(group.subgroups, vec![SubgroupId::new(100)]);
    assert_eq!(group.variables.len(), 1);

    let variable = &group.variables[0];
    assert_eq!(variable.name, "ccn_conc");
    assert_eq!(variable.start_offset, -300);
    assert_eq!(variable.end_offset, 300);
    assert!(variable.required_to_run);
    assert!(variable.retrieve_qc);
    assert!(!variable.qc_required_to_run);
    assert_eq!(variable.coord_system, Some(CoordSystemId::new(50)));
    assert_eq!(variable.dim_names, vec!["time".to_string(), "height".to_string()]);
    assert_eq!(variable.outputs.len(), 1);
    assert_eq!(variable.outputs[0].var_name, "N_CCN");

    // One varmap per datastream of the group's subgroup, in fallback order.
    assert_eq!(variable.varmaps.len(), 2);
    assert_eq!(variable.varmaps[0].datastream, DatastreamId::new(1));
    assert_eq!(
        variable.varmaps[0].names,
        vec!["N_CCN".to_string(), "ccn_conc".to_string()]
    );
    assert_eq!(variable.varmaps[1].datastream, DatastreamId::new(2));
    assert_eq!(variable.varmaps[1].names, vec!["ccn_concentration".to_string()]);

    let dim = &config.coord_systems[0].dims[0];
    assert_eq!(dim.name, "height");
    assert_eq!(dim.varmaps.len(), 2);
    assert_eq!(dim.varmaps[0].names, vec!["height".to_string()]);
    assert_eq!(dim.varmaps[1].names, vec!["alt".to_string()]);

    config.validate()?;
    Ok(())
}

#[test]
fn datastream_dependencies_parse_from_catalog_text() -> TestResult {
    let source = full_fixture()?;
    let loaded = load_retriever(&source, &process())?;
    let ds = loaded
        .config
        .datastream(DatastreamId::new(1))
        .ok_or("datastream 1 missing")?;
    assert_eq!(ds.dep_site.as_deref(), Some("sgp"));
    assert_eq!(ds.dep_facility, None);
    let begin = ds.dep_begin_date.ok_or("begin date missing")?;
    assert_eq!(begin.to_string(), "2016-10-01 00:00:00");
    assert_eq!(ds.dep_end_date, None);
    Ok(())
}

#[test]
fn empty_source_loads_empty_config() -> TestResult {
    let source = MemoryTableSource::new();
    let loaded = load_retriever(&source, &process())?;
    assert_eq!(loaded.row_count, 0);
    assert!(loaded.config.is_empty());
    Ok(())
}

#[test]
fn shared_subgroup_is_created_once() -> TestResult {
    let source = MemoryTableSource::new().with_result(
        RetrieverQuery::GroupsAndSubgroups,
        table(
            RetrieverQuery::GroupsAndSubgroups,
            &[
                &[Some("10"), Some("first"), Some("100"), Some("1"), Some("shared")],
                &[Some("11"), Some("second"), Some("100"), Some("1"), Some("shared")],
            ],
        )?,
    );
    let loaded = load_retriever(&source, &process())?;
    let config = loaded.config;
    assert_eq!(config.subgroups.len(), 1);
    assert_eq!(config.groups.len(), 2);
    assert_eq!(config.groups[0].subgroups, config.groups[1].subgroups);
    Ok(())
}

#[test]
fn shared_datastream_is_created_once() -> TestResult {
    let source = MemoryTableSource::new()
        .with_result(
            RetrieverQuery::GroupsAndSubgroups,
            table(
                RetrieverQuery::GroupsAndSubgroups,
                &[
                    &[Some("10"), Some("first"), Some("100"), Some("1"), Some("one")],
                    &[Some("10"), Some("first"), Some("101"), Some("2"), Some("two")],
                ],
            )?,
        )
        .with_result(
            RetrieverQuery::Datastreams,
            table(
                RetrieverQuery::Datastreams,
                &[
                    &[
                        Some("100"),
                        Some("1"),
                        Some("7"),
                        Some("met"),
                        Some("b1"),
                        None,
                        None,
                        None,
                        None,
                        None,
                        None,
                    ],
                    &[
                        Some("101"),
                        Some("1"),
                        Some("7"),
                        Some("met"),
                        Some("b1"),
                        None,
                        None,
                        None,
                        None,
                        None,
                        None,
                    ],
                ],
            )?,
        );
    let loaded = load_retriever(&source, &process())?;
    let config = loaded.config;
    assert_eq!(config.datastreams.len(), 1);
    assert_eq!(config.subgroups.len(), 2);
    assert_eq!(config.subgroups[0].datastreams, vec![DatastreamId::new(7)]);
    assert_eq!(config.subgroups[1].datastreams, vec![DatastreamId::new(7)]);
    Ok(())
}

#[test]
fn unknown_subgroup_reference_in_datastreams_is_fatal() -> TestResult {
    let source = MemoryTableSource::new().with_result(
        RetrieverQuery::Datastreams,
        table(
            RetrieverQuery::Datastreams,
            &[&[
                Some("999"),
                Some("1"),
                Some("1"),
                Some("aosccn"),
                Some("b1"),
                None,
                None,
                None,
                None,
                None,
                None,
            ]],
        )?,
    );
    let err = load_retriever(&source, &process()).err().ok_or("load unexpectedly succeeded")?;
    match err {
        LoadError::CorruptReference {
            query,
            column,
            key,
        } => {
            assert_eq!(query, "datastreams");
            assert_eq!(column, "subgroup_id");
            assert_eq!(key, "999");
        }
        other => return Err(format!("unexpected error: {other}").into()),
    }
    Ok(())
}

#[test]
fn unknown_group_reference_in_variables_is_fatal() -> TestResult {
    let source = MemoryTableSource::new().with_result(
        RetrieverQuery::Variables,
        table(
            RetrieverQuery::Variables,
            &[&[
                Some("42"),
                Some("1000"),
                Some("temp"),
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
            ]],
        )?,
    );
    let err = load_retriever(&source, &process()).err().ok_or("load unexpectedly succeeded")?;
    assert!(matches!(
        err,
        LoadError::CorruptReference {
            query: "variables",
            column: "group_id",
            ..
        }
    ));
    Ok(())
}

#[test]
fn non_integer_identifier_reports_row_and_column() -> TestResult {
    let source = MemoryTableSource::new().with_result(
        RetrieverQuery::GroupsAndSubgroups,
        table(
            RetrieverQuery::GroupsAndSubgroups,
            &[&[Some("ten"), Some("ccn_data"), Some("100"), Some("1"), Some("ccn_b1")]],
        )?,
    );
    let err = load_retriever(&source, &process()).err().ok_or("load unexpectedly succeeded")?;
    match err {
        LoadError::InvalidCell {
            query,
            row,
            column,
            ..
        } => {
            assert_eq!(query, "groups_and_subgroups");
            assert_eq!(row, 0);
            assert_eq!(column, 0);
        }
        other => return Err(format!("unexpected error: {other}").into()),
    }
    Ok(())
}

#[test]
fn null_required_cell_is_an_invalid_cell() -> TestResult {
    let source = MemoryTableSource::new().with_result(
        RetrieverQuery::GroupsAndSubgroups,
        table(
            RetrieverQuery::GroupsAndSubgroups,
            &[&[Some("10"), None, Some("100"), Some("1"), Some("ccn_b1")]],
        )?,
    );
    let err = load_retriever(&source, &process()).err().ok_or("load unexpectedly succeeded")?;
    assert!(matches!(err, LoadError::InvalidCell { .. }));
    Ok(())
}

#[test]
fn unresolvable_dim_subgroup_leaves_dimension_without_varmaps() -> TestResult {
    let source = MemoryTableSource::new()
        .with_result(
            RetrieverQuery::CoordSystems,
            table(RetrieverQuery::CoordSystems, &[&[Some("50"), Some("time_height")]])?,
        )
        .with_result(
            RetrieverQuery::CoordDims,
            table(
                RetrieverQuery::CoordDims,
                &[&[
                    Some("50"),
                    Some("1"),
                    Some("500"),
                    Some("height"),
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    Some("999"),
                ]],
            )?,
        );
    let loaded = load_retriever(&source, &process())?;
    let dim = &loaded.config.coord_systems[0].dims[0];
    assert!(dim.varmaps.is_empty());
    Ok(())
}

#[test]
fn unresolvable_variable_coord_system_is_dropped() -> TestResult {
    let source = MemoryTableSource::new()
        .with_result(
            RetrieverQuery::GroupsAndSubgroups,
            table(
                RetrieverQuery::GroupsAndSubgroups,
                &[&[Some("10"), Some("ccn_data"), Some("100"), Some("1"), Some("ccn_b1")]],
            )?,
        )
        .with_result(
            RetrieverQuery::Variables,
            table(
                RetrieverQuery::Variables,
                &[&[
                    Some("10"),
                    Some("1000"),
                    Some("temp"),
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    None,
                    Some("999"),
                ]],
            )?,
        );
    let loaded = load_retriever(&source, &process())?;
    assert_eq!(loaded.config.groups[0].variables[0].coord_system, None);
    Ok(())
}

#[test]
fn empty_optional_cells_read_as_absent() -> TestResult {
    let source = MemoryTableSource::new().with_result(
        RetrieverQuery::Datastreams,
        table(
            RetrieverQuery::Datastreams,
            &[&[
                Some("100"),
                Some("1"),
                Some("1"),
                Some("aosccn"),
                Some("b1"),
                Some(""),
                Some(""),
                Some(""),
                Some(""),
                Some(""),
                Some(""),
            ]],
        )?,
    );
    // The subgroup reference must still resolve, so seed phase one too.
    let source = source.with_result(
        RetrieverQuery::GroupsAndSubgroups,
        table(
            RetrieverQuery::GroupsAndSubgroups,
            &[&[Some("10"), Some("ccn_data"), Some("100"), Some("1"), Some("ccn_b1")]],
        )?,
    );
    let loaded = load_retriever(&source, &process())?;
    let ds = loaded
        .config
        .datastream(DatastreamId::new(1))
        .ok_or("datastream 1 missing")?;
    assert_eq!(ds.site, None);
    assert_eq!(ds.dep_site, None);
    assert_eq!(ds.dep_begin_date, None);
    Ok(())
}

#[test]
fn loading_is_deterministic_for_identical_sources() -> TestResult {
    let source = full_fixture()?;
    let first = load_retriever(&source, &process())?;
    let second = load_retriever(&source, &process())?;
    assert_eq!(first, second);
    Ok(())
}
