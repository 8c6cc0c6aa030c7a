// crates/ret-catalog-store-sqlite/src/source.rs
// ============================================================================
// Module: SQLite Catalog Source
// Description: TableSource implementation backed by a SQLite catalog file.
// Purpose: Serve the retriever queries with their contractual sort orders.
// Dependencies: ret-catalog-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements the [`TableSource`] trait over a `SQLite` catalog
//! database. Each retriever query maps to one SQL statement whose `ORDER BY`
//! clause realizes the sort contract the graph loader depends on. Cells are
//! surfaced as nullable text regardless of their stored column affinity, so
//! the loader sees the same shape every backend produces.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use ret_catalog_core::ProcessKey;
use ret_catalog_core::RetrieverQuery;
use ret_catalog_core::SourceError;
use ret_catalog_core::TableResult;
use ret_catalog_core::TableSource;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::types::Value;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the catalog.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` catalog source.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteSourceConfig {
    /// Path to the `SQLite` catalog file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteSourceConfig {
    /// Creates a configuration with defaults for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` catalog source errors.
#[derive(Debug, Error, Clone)]
pub enum SqliteSourceError {
    /// Source I/O error.
    #[error("sqlite catalog io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite catalog db error: {0}")]
    Db(String),
    /// Invalid source configuration or data.
    #[error("sqlite catalog invalid data: {0}")]
    Invalid(String),
    /// Catalog schema version mismatch.
    #[error("sqlite catalog version mismatch: {0}")]
    VersionMismatch(String),
}

// ============================================================================
// SECTION: Source
// ============================================================================

/// `SQLite`-backed catalog source.
///
/// # Invariants
/// - `SQLite` connection access is serialized through a mutex.
/// - Every query result honors its documented sort contract via `ORDER BY`.
pub struct SqliteCatalogSource {
    /// Shared connection guarded by a mutex.
    connection: Mutex<Connection>,
}

impl SqliteCatalogSource {
    /// Opens the catalog, creating the file and schema when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteSourceError`] when the path is invalid, the database
    /// cannot be opened, or the stored schema version is unsupported.
    pub fn open(config: &SqliteSourceConfig) -> Result<Self, SqliteSourceError> {
        validate_catalog_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Runs one catalog query and collects its rows as nullable text.
    fn run_query(
        &self,
        query: RetrieverQuery,
        process: &ProcessKey,
    ) -> Result<TableResult, SqliteSourceError> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| SqliteSourceError::Db("catalog connection poisoned".to_string()))?;
        let sql = query_sql(query);
        let mut statement =
            connection.prepare_cached(sql).map_err(|err| SqliteSourceError::Db(err.to_string()))?;
        let width = query.column_count();
        let mut rows = statement
            .query(params![process.proc_type, process.proc_name])
            .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
        let mut collected: Vec<Vec<Option<String>>> = Vec::new();
        while let Some(row) = rows.next().map_err(|err| SqliteSourceError::Db(err.to_string()))? {
            let mut cells = Vec::with_capacity(width);
            for column in 0..width {
                let value: Value =
                    row.get(column).map_err(|err| SqliteSourceError::Db(err.to_string()))?;
                cells.push(value_to_text(&value)?);
            }
            collected.push(cells);
        }
        TableResult::new(width, collected).map_err(|err| SqliteSourceError::Invalid(err.to_string()))
    }
}

impl TableSource for SqliteCatalogSource {
    fn fetch(
        &self,
        query: RetrieverQuery,
        process: &ProcessKey,
    ) -> Result<TableResult, SourceError> {
        self.run_query(query, process).map_err(|err| SourceError::Backend {
            query: query.name(),
            message: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Returns the SQL statement for a retriever query.
///
/// Column order matches the loader's column index constants, and the
/// `ORDER BY` clause realizes the query's sort contract.
const fn query_sql(query: RetrieverQuery) -> &'static str {
    match query {
        RetrieverQuery::GroupsAndSubgroups => {
            "SELECT g.group_id, g.group_name, s.subgroup_id, gs.subgroup_order, s.subgroup_name
             FROM ret_ds_groups g
             JOIN ret_group_subgroups gs ON gs.group_id = g.group_id
             JOIN ret_ds_subgroups s ON s.subgroup_id = gs.subgroup_id
             WHERE g.proc_type = ?1 AND g.proc_name = ?2
             ORDER BY g.group_id, gs.subgroup_order"
        }
        RetrieverQuery::Datastreams => {
            "SELECT DISTINCT sd.subgroup_id, sd.priority, d.ds_id, d.ds_class_name,
                    d.ds_class_level, d.site, d.facility, d.site_dependency, d.fac_dependency,
                    d.begin_date_dependency, d.end_date_dependency
             FROM ret_ds_groups g
             JOIN ret_group_subgroups gs ON gs.group_id = g.group_id
             JOIN ret_subgroup_datastreams sd ON sd.subgroup_id = gs.subgroup_id
             JOIN ret_datastreams d ON d.ds_id = sd.ds_id
             WHERE g.proc_type = ?1 AND g.proc_name = ?2
             ORDER BY sd.subgroup_id, sd.priority"
        }
        RetrieverQuery::CoordSystems => {
            "SELECT cs.coord_system_id, cs.coord_system_name
             FROM ret_coord_systems cs
             WHERE cs.proc_type = ?1 AND cs.proc_name = ?2
             ORDER BY cs.coord_system_id"
        }
        RetrieverQuery::CoordDims => {
            "SELECT cd.coord_system_id, cd.dim_order, cd.dim_id, cd.dim_name, cd.data_type,
                    cd.units, cd.start_value, cd.interval, cd.length, cd.trans_type,
                    cd.trans_range, cd.trans_align, cd.subgroup_id
             FROM ret_coord_systems cs
             JOIN ret_coord_dims cd ON cd.coord_system_id = cs.coord_system_id
             WHERE cs.proc_type = ?1 AND cs.proc_name = ?2
             ORDER BY cd.coord_system_id, cd.dim_order"
        }
        RetrieverQuery::CoordVarNames => {
            "SELECT cvn.dim_id, cvn.ds_id, cvn.priority, cvn.var_name
             FROM ret_coord_systems cs
             JOIN ret_coord_dims cd ON cd.coord_system_id = cs.coord_system_id
             JOIN ret_coord_var_names cvn ON cvn.dim_id = cd.dim_id
             WHERE cs.proc_type = ?1 AND cs.proc_name = ?2
             ORDER BY cvn.dim_id, cvn.ds_id, cvn.priority"
        }
        RetrieverQuery::Variables => {
            "SELECT v.group_id, v.var_id, v.var_name, v.data_type, v.units, v.start_offset,
                    v.end_offset, v.valid_min, v.valid_max, v.valid_delta, v.req_to_run,
                    v.retrieve_qc, v.qc_req_to_run, v.coord_system_id
             FROM ret_ds_groups g
             JOIN ret_var_groups v ON v.group_id = g.group_id
             WHERE g.proc_type = ?1 AND g.proc_name = ?2
             ORDER BY v.group_id, v.var_id"
        }
        RetrieverQuery::VarDims => {
            "SELECT vd.var_id, vd.dim_order, vd.dim_name
             FROM ret_ds_groups g
             JOIN ret_var_groups v ON v.group_id = g.group_id
             JOIN ret_var_dims vd ON vd.var_id = v.var_id
             WHERE g.proc_type = ?1 AND g.proc_name = ?2
             ORDER BY vd.var_id, vd.dim_order"
        }
        RetrieverQuery::VarNames => {
            "SELECT vn.var_id, vn.ds_id, vn.priority, vn.var_name
             FROM ret_ds_groups g
             JOIN ret_var_groups v ON v.group_id = g.group_id
             JOIN ret_var_names vn ON vn.var_id = v.var_id
             WHERE g.proc_type = ?1 AND g.proc_name = ?2
             ORDER BY vn.var_id, vn.ds_id, vn.priority"
        }
        RetrieverQuery::VarOutputs => {
            "SELECT vo.var_id, vo.ds_class_name, vo.ds_class_level, vo.var_name
             FROM ret_ds_groups g
             JOIN ret_var_groups v ON v.group_id = g.group_id
             JOIN ret_var_outputs vo ON vo.var_id = v.var_id
             WHERE g.proc_type = ?1 AND g.proc_name = ?2
             ORDER BY vo.var_id"
        }
        RetrieverQuery::TransParams => {
            "SELECT tp.coord_system_name, tp.params
             FROM ret_trans_params tp
             WHERE tp.proc_type = ?1 AND tp.proc_name = ?2
             ORDER BY tp.coord_system_name"
        }
    }
}

/// Converts a `SQLite` value into the nullable text cell shape.
fn value_to_text(value: &Value) -> Result<Option<String>, SqliteSourceError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text.clone())),
        Value::Integer(integer) => Ok(Some(integer.to_string())),
        Value::Real(real) => Ok(Some(real.to_string())),
        Value::Blob(_) => {
            Err(SqliteSourceError::Invalid("catalog cell holds a blob value".to_string()))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the catalog exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteSourceError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteSourceError::Io("catalog path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteSourceError::Io(err.to_string()))
}

/// Validates catalog paths for safety limits.
fn validate_catalog_path(path: &Path) -> Result<(), SqliteSourceError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteSourceError::Invalid("catalog path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteSourceError::Invalid("catalog path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteSourceError::Invalid(
                "catalog path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteSourceError::Invalid(
            "catalog path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens a `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteSourceConfig) -> Result<Connection, SqliteSourceError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies the `SQLite` pragmas configured for the catalog.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteSourceConfig,
) -> Result<(), SqliteSourceError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the catalog schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteSourceError> {
    let tx = connection.transaction().map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS catalog_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM catalog_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO catalog_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
            tx.execute_batch(CREATE_TABLES_SQL)
                .map_err(|err| SqliteSourceError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteSourceError::VersionMismatch(format!(
                "unsupported catalog schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteSourceError::Db(err.to_string()))?;
    Ok(())
}

/// Catalog table definitions.
const CREATE_TABLES_SQL: &str = "CREATE TABLE IF NOT EXISTS ret_ds_groups (
        group_id INTEGER PRIMARY KEY,
        proc_type TEXT NOT NULL,
        proc_name TEXT NOT NULL,
        group_name TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_ret_ds_groups_proc
        ON ret_ds_groups (proc_type, proc_name);
    CREATE TABLE IF NOT EXISTS ret_ds_subgroups (
        subgroup_id INTEGER PRIMARY KEY,
        subgroup_name TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS ret_group_subgroups (
        group_id INTEGER NOT NULL,
        subgroup_id INTEGER NOT NULL,
        subgroup_order INTEGER NOT NULL,
        PRIMARY KEY (group_id, subgroup_id),
        FOREIGN KEY (group_id) REFERENCES ret_ds_groups(group_id) ON DELETE CASCADE,
        FOREIGN KEY (subgroup_id) REFERENCES ret_ds_subgroups(subgroup_id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS ret_datastreams (
        ds_id INTEGER PRIMARY KEY,
        ds_class_name TEXT NOT NULL,
        ds_class_level TEXT NOT NULL,
        site TEXT,
        facility TEXT,
        site_dependency TEXT,
        fac_dependency TEXT,
        begin_date_dependency TEXT,
        end_date_dependency TEXT
    );
    CREATE TABLE IF NOT EXISTS ret_subgroup_datastreams (
        subgroup_id INTEGER NOT NULL,
        ds_id INTEGER NOT NULL,
        priority INTEGER NOT NULL,
        PRIMARY KEY (subgroup_id, ds_id),
        FOREIGN KEY (subgroup_id) REFERENCES ret_ds_subgroups(subgroup_id) ON DELETE CASCADE,
        FOREIGN KEY (ds_id) REFERENCES ret_datastreams(ds_id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS ret_coord_systems (
        coord_system_id INTEGER PRIMARY KEY,
        proc_type TEXT NOT NULL,
        proc_name TEXT NOT NULL,
        coord_system_name TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_ret_coord_systems_proc
        ON ret_coord_systems (proc_type, proc_name);
    CREATE TABLE IF NOT EXISTS ret_coord_dims (
        dim_id INTEGER PRIMARY KEY,
        coord_system_id INTEGER NOT NULL,
        dim_order INTEGER NOT NULL,
        dim_name TEXT NOT NULL,
        data_type TEXT,
        units TEXT,
        start_value TEXT,
        interval TEXT,
        length TEXT,
        trans_type TEXT,
        trans_range TEXT,
        trans_align TEXT,
        subgroup_id INTEGER,
        FOREIGN KEY (coord_system_id)
            REFERENCES ret_coord_systems(coord_system_id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS ret_coord_var_names (
        dim_id INTEGER NOT NULL,
        ds_id INTEGER NOT NULL,
        priority INTEGER NOT NULL,
        var_name TEXT NOT NULL,
        PRIMARY KEY (dim_id, ds_id, priority),
        FOREIGN KEY (dim_id) REFERENCES ret_coord_dims(dim_id) ON DELETE CASCADE,
        FOREIGN KEY (ds_id) REFERENCES ret_datastreams(ds_id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS ret_var_groups (
        var_id INTEGER PRIMARY KEY,
        group_id INTEGER NOT NULL,
        var_name TEXT NOT NULL,
        data_type TEXT,
        units TEXT,
        start_offset INTEGER,
        end_offset INTEGER,
        valid_min TEXT,
        valid_max TEXT,
        valid_delta TEXT,
        req_to_run INTEGER,
        retrieve_qc INTEGER,
        qc_req_to_run INTEGER,
        coord_system_id INTEGER,
        FOREIGN KEY (group_id) REFERENCES ret_ds_groups(group_id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS ret_var_dims (
        var_id INTEGER NOT NULL,
        dim_order INTEGER NOT NULL,
        dim_name TEXT NOT NULL,
        PRIMARY KEY (var_id, dim_order),
        FOREIGN KEY (var_id) REFERENCES ret_var_groups(var_id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS ret_var_names (
        var_id INTEGER NOT NULL,
        ds_id INTEGER NOT NULL,
        priority INTEGER NOT NULL,
        var_name TEXT NOT NULL,
        PRIMARY KEY (var_id, ds_id, priority),
        FOREIGN KEY (var_id) REFERENCES ret_var_groups(var_id) ON DELETE CASCADE,
        FOREIGN KEY (ds_id) REFERENCES ret_datastreams(ds_id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS ret_var_outputs (
        var_id INTEGER NOT NULL,
        ds_class_name TEXT NOT NULL,
        ds_class_level TEXT NOT NULL,
        var_name TEXT NOT NULL,
        FOREIGN KEY (var_id) REFERENCES ret_var_groups(var_id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS ret_trans_params (
        proc_type TEXT NOT NULL,
        proc_name TEXT NOT NULL,
        coord_system_name TEXT NOT NULL,
        params TEXT NOT NULL,
        PRIMARY KEY (proc_type, proc_name, coord_system_name)
    );";
