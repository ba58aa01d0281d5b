use super::*;

pub fn run(args: NewDatabaseArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("load-{}", utc_compact_string(started_ts));
    let database_file = args.database_file.clone();

    if database_file.exists() && !args.clobber {
        warn!(
            path = %database_file.display(),
            "taxonomy database already exists; pass --clobber to rebuild"
        );
        return Ok(());
    }

    info!(database = %database_file.display(), run_id = %run_id, "creating taxonomy database");

    let (dump_dir, archive) = match &args.dump_dir {
        Some(dump_dir) => (dump_dir.clone(), None),
        None => {
            let download_dir = args
                .download_dir
                .clone()
                .unwrap_or_else(|| parent_or_current(&database_file));
            let (archive_path, downloaded) =
                fetch_archive(&download_dir, &args.url, args.clobber)?;
            let dump_dir = download_dir.join("taxdump");
            extract_dump(&archive_path, &dump_dir)?;

            let archive = ArchiveEntry {
                path: archive_path.display().to_string(),
                url: Some(args.url.clone()),
                sha256: Some(sha256_file(&archive_path)?),
                downloaded,
            };
            (dump_dir, Some(archive))
        }
    };

    let options = EngineOptions {
        validity: ValiditySettings {
            anchor_rank: args.anchor_rank.clone(),
            invalid_subtrees: args.invalid_subtrees.clone(),
        },
        lookup_batch_size: args.lookup_batch_size,
        classify_names: !args.no_classify,
    };

    let loaded = build_taxonomy(
        open_dump(&dump_dir, NODES_FILE)?,
        open_dump(&dump_dir, NAMES_FILE)?,
        open_dump(&dump_dir, MERGED_FILE)?,
        &options,
    )
    .context("taxonomy load aborted")?;

    let source_description = archive
        .as_ref()
        .and_then(|entry| entry.url.clone())
        .unwrap_or_else(|| dump_dir.display().to_string());
    write_database(&database_file, &loaded, &source_description)?;

    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| default_manifest_path(&database_file));
    let manifest = LoadRunManifest {
        manifest_version: 1,
        run_id,
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        completed_at: now_utc_string(),
        command: render_command(&args),
        archive,
        paths: LoadPaths {
            database_file: database_file.display().to_string(),
            dump_dir: dump_dir.display().to_string(),
        },
        settings: EngineSettings {
            anchor_rank: options.validity.anchor_rank,
            invalid_subtrees: options.validity.invalid_subtrees,
            lookup_batch_size: options.lookup_batch_size,
            classify_names: options.classify_names,
        },
        counts: loaded.counts,
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote load manifest");
    info!(
        taxa = manifest.counts.taxa,
        names = manifest.counts.names,
        valid = manifest.counts.valid_taxa,
        invalid = manifest.counts.invalid_taxa,
        "taxonomy database created"
    );

    Ok(())
}

fn render_command(args: &NewDatabaseArgs) -> String {
    let mut parts = vec![
        "taxdb new-database".to_string(),
        format!("--database-file {}", args.database_file.display()),
    ];
    if let Some(download_dir) = &args.download_dir {
        parts.push(format!("--download-dir {}", download_dir.display()));
    }
    if let Some(dump_dir) = &args.dump_dir {
        parts.push(format!("--dump-dir {}", dump_dir.display()));
    }
    parts.push(format!("--anchor-rank {}", args.anchor_rank));
    for name in &args.invalid_subtrees {
        parts.push(format!("--invalid-subtree {name:?}"));
    }
    parts.push(format!("--lookup-batch-size {}", args.lookup_batch_size));
    if args.no_classify {
        parts.push("--no-classify".to_string());
    }
    if args.clobber {
        parts.push("--clobber".to_string());
    }
    parts.join(" ")
}
