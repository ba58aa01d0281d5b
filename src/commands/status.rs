use std::fs;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::default_manifest_path;
use crate::model::LoadRunManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let database_file = &args.database_file;
    let manifest_path = default_manifest_path(database_file);

    info!(database = %database_file.display(), "status requested");

    if manifest_path.exists() {
        let raw = fs::read(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: LoadRunManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

        info!(
            run_id = %manifest.run_id,
            status = %manifest.status,
            completed_at = %manifest.completed_at,
            anchor_rank = %manifest.settings.anchor_rank,
            archive_sha256 = %manifest.archive.as_ref().and_then(|entry| entry.sha256.clone()).unwrap_or_default(),
            reparented_taxa = manifest.counts.reparented_taxa,
            unordered_taxa = manifest.counts.unordered_taxa,
            synthesized_ranks = %manifest.counts.synthesized_ranks.join(","),
            "loaded load manifest"
        );
    } else {
        warn!(path = %manifest_path.display(), "load manifest missing");
    }

    if !database_file.exists() {
        warn!(path = %database_file.display(), "database file missing");
        return Ok(());
    }

    let connection = Connection::open_with_flags(
        database_file,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", database_file.display()))?;

    let summary = DatabaseSummary::collect(&connection)?;
    info!(
        path = %database_file.display(),
        schema_version = %summary.schema_version.unwrap_or_default(),
        loaded_at = %summary.loaded_at.unwrap_or_default(),
        nodes = summary.nodes,
        valid_nodes = summary.valid_nodes,
        names = summary.names,
        merged = summary.merged,
        ranks = summary.ranks,
        "database status"
    );

    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DatabaseSummary {
    pub schema_version: Option<String>,
    pub loaded_at: Option<String>,
    pub nodes: i64,
    pub valid_nodes: i64,
    pub names: i64,
    pub merged: i64,
    pub ranks: i64,
}

impl DatabaseSummary {
    pub(crate) fn collect(connection: &Connection) -> Result<Self> {
        Ok(Self {
            schema_version: query_metadata(connection, "db_schema_version")?,
            loaded_at: query_metadata(connection, "db_loaded_at")?,
            nodes: query_count(connection, "SELECT COUNT(*) FROM nodes")?,
            valid_nodes: query_count(connection, "SELECT COUNT(*) FROM nodes WHERE is_valid")?,
            names: query_count(connection, "SELECT COUNT(*) FROM names")?,
            merged: query_count(connection, "SELECT COUNT(*) FROM merged")?,
            ranks: query_count(connection, "SELECT COUNT(*) FROM ranks")?,
        })
    }
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection
        .query_row(sql, [], |row| row.get(0))
        .with_context(|| format!("failed to run {sql}"))?;
    Ok(count)
}

fn query_metadata(connection: &Connection, key: &str) -> Result<Option<String>> {
    let value = connection
        .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("failed to read metadata {key}"))?;
    Ok(value)
}
