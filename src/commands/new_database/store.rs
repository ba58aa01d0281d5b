use super::*;

pub(super) fn write_taxonomy(
    connection: &mut Connection,
    loaded: &LoadedTaxonomy,
    source_description: &str,
) -> Result<()> {
    let tx = connection.transaction()?;

    tx.execute(
        "INSERT INTO source(id, name, description) VALUES(?1, ?2, ?3)",
        params![NCBI_SOURCE_ID, NCBI_SOURCE_NAME, source_description],
    )
    .context("failed to insert source")?;

    info!(ranks = loaded.ranks.len(), "inserting ranks");
    {
        let mut statement = tx.prepare("INSERT INTO ranks(rank_order, rank) VALUES(?1, ?2)")?;
        for (rank_order, rank) in loaded.ranks.as_slice().iter().enumerate() {
            statement
                .execute(params![rank_order as i64, rank])
                .with_context(|| format!("failed to insert rank {rank}"))?;
        }
    }

    info!(taxa = loaded.tree.len(), "inserting nodes");
    {
        let mut statement = tx.prepare(
            "
            INSERT INTO nodes(tax_id, parent_id, rank, embl_code, division_id, source_id, is_valid)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )?;
        for position in 0..loaded.tree.len() {
            let taxon = loaded.tree.get(position);
            // root keeps the dump's self reference
            let parent_id = loaded.tree.parent_id(position).unwrap_or(taxon.tax_id.as_str());
            statement
                .execute(params![
                    &taxon.tax_id,
                    parent_id,
                    &taxon.rank,
                    &taxon.embl_code,
                    &taxon.division_id,
                    NCBI_SOURCE_ID,
                    taxon.is_valid
                ])
                .with_context(|| format!("failed to insert node {}", taxon.tax_id))?;
        }
    }

    info!(names = loaded.names.len(), "inserting names");
    {
        let mut statement = tx.prepare(
            "
            INSERT INTO names(tax_id, tax_name, unique_name, name_class, is_primary, is_classified)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )?;
        for name in &loaded.names {
            statement
                .execute(params![
                    &name.tax_id,
                    &name.tax_name,
                    &name.unique_name,
                    &name.name_class,
                    name.is_primary,
                    name.is_classified
                ])
                .with_context(|| format!("failed to insert name for {}", name.tax_id))?;
        }
    }

    info!(merges = loaded.merges.len(), "inserting merged");
    {
        let mut statement = tx.prepare(
            "
            INSERT INTO merged(old_tax_id, new_tax_id) VALUES(?1, ?2)
            ON CONFLICT(old_tax_id) DO UPDATE SET new_tax_id=excluded.new_tax_id
            ",
        )?;
        for merge in &loaded.merges {
            statement
                .execute(params![&merge.old_tax_id, &merge.new_tax_id])
                .with_context(|| format!("failed to insert merge {}", merge.old_tax_id))?;
        }
    }

    upsert_metadata(&tx, "db_loaded_at", &now_utc_string())?;

    tx.commit().context("failed to commit taxonomy load")?;
    Ok(())
}

pub(super) fn write_database(
    database_file: &Path,
    loaded: &LoadedTaxonomy,
    source_description: &str,
) -> Result<()> {
    let staging_path = partial_path(database_file);
    remove_file_if_exists(&staging_path)?;

    let written = (|| -> Result<()> {
        let mut connection = Connection::open(&staging_path)
            .with_context(|| format!("failed to open {}", staging_path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        write_taxonomy(&mut connection, loaded, source_description)?;
        connection
            .close()
            .map_err(|(_, err)| err)
            .with_context(|| format!("failed to close {}", staging_path.display()))
    })();

    if let Err(err) = written {
        if let Err(cleanup) = remove_file_if_exists(&staging_path) {
            warn!(error = %cleanup, path = %staging_path.display(), "failed to remove staging database");
        }
        return Err(err);
    }

    if remove_file_if_exists(database_file)? {
        warn!(path = %database_file.display(), "replaced existing taxonomy database");
    }
    fs::rename(&staging_path, database_file).with_context(|| {
        format!(
            "failed to move {} to {}",
            staging_path.display(),
            database_file.display()
        )
    })?;

    Ok(())
}
