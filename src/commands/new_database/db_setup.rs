use super::*;

pub(super) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub(super) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS source (
              id INTEGER PRIMARY KEY,
              name TEXT UNIQUE,
              description TEXT
            );

            CREATE TABLE IF NOT EXISTS ranks (
              rank_order INTEGER PRIMARY KEY,
              rank TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS nodes (
              tax_id TEXT PRIMARY KEY NOT NULL,
              parent_id TEXT,
              rank TEXT,
              embl_code TEXT,
              division_id TEXT,
              source_id INTEGER DEFAULT 1,
              is_valid INTEGER DEFAULT 1,
              FOREIGN KEY(parent_id) REFERENCES nodes(tax_id),
              FOREIGN KEY(rank) REFERENCES ranks(rank),
              FOREIGN KEY(source_id) REFERENCES source(id)
            );

            CREATE TABLE IF NOT EXISTS names (
              id INTEGER PRIMARY KEY,
              tax_id TEXT NOT NULL,
              tax_name TEXT,
              unique_name TEXT,
              name_class TEXT,
              is_primary INTEGER,
              is_classified INTEGER,
              FOREIGN KEY(tax_id) REFERENCES nodes(tax_id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS merged (
              old_tax_id TEXT PRIMARY KEY NOT NULL,
              new_tax_id TEXT,
              FOREIGN KEY(new_tax_id) REFERENCES nodes(tax_id) ON DELETE CASCADE
            );
            ",
        )
        .context("failed to create taxonomy tables")?;

    connection
        .execute_batch(
            "
            CREATE INDEX IF NOT EXISTS ix_nodes_parent_id ON nodes(parent_id);
            CREATE INDEX IF NOT EXISTS ix_nodes_rank ON nodes(rank);
            CREATE INDEX IF NOT EXISTS ix_nodes_is_valid ON nodes(is_valid);
            CREATE INDEX IF NOT EXISTS ix_names_tax_id ON names(tax_id);
            CREATE INDEX IF NOT EXISTS ix_names_tax_name ON names(tax_name);
            CREATE INDEX IF NOT EXISTS ix_names_tax_id_is_primary ON names(tax_id, is_primary);
            CREATE INDEX IF NOT EXISTS ix_merged_new_tax_id ON merged(new_tax_id);
            ",
        )
        .context("failed to create taxonomy indexes")?;

    upsert_metadata(connection, "db_schema_version", DB_SCHEMA_VERSION)?;

    Ok(())
}

pub(super) fn upsert_metadata(connection: &Connection, key: &str, value: &str) -> Result<()> {
    connection
        .execute(
            "INSERT INTO metadata(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )
        .with_context(|| format!("failed to record metadata {key}"))?;
    Ok(())
}
