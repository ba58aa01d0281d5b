use std::io::{Cursor, Write};
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;

use super::*;
use crate::commands::status::DatabaseSummary;

fn dmp(fields: &[&str]) -> String {
    format!("{}\t|\n", fields.join("\t|\t"))
}

fn nodes_dump() -> String {
    [
        ["1", "1", "no rank", "", "8"],
        ["131567", "1", "no rank", "", "8"],
        ["2", "131567", "superkingdom", "", "0"],
        ["1224", "2", "phylum", "", "0"],
        ["1236", "1224", "class", "", "0"],
        ["91347", "1236", "order", "", "0"],
        ["543", "91347", "family", "", "0"],
        ["561", "543", "genus", "", "0"],
        ["999", "561", "genus", "", "0"],
        ["562", "561", "species", "EC", "0"],
        ["83333", "562", "no rank", "EC", "0"],
        ["2323", "2", "no rank", "", "0"],
        ["49928", "2323", "no rank", "", "0"],
        ["77133", "49928", "species", "", "0"],
    ]
    .iter()
    .map(|row| dmp(row))
    .collect()
}

fn name_rows() -> Vec<[&'static str; 4]> {
    vec![
        ["1", "root", "", "scientific name"],
        ["1", "all", "", "synonym"],
        ["131567", "cellular organisms", "", "scientific name"],
        ["2", "Bacteria", "Bacteria <bacteria>", "scientific name"],
        ["2", "eubacteria", "", "genbank common name"],
        ["1224", "Proteobacteria", "", "scientific name"],
        ["1236", "Gammaproteobacteria", "", "scientific name"],
        ["91347", "Enterobacterales", "", "scientific name"],
        ["543", "Enterobacteriaceae", "", "scientific name"],
        ["561", "Escherichia", "", "scientific name"],
        ["999", "Escherichiae", "", "scientific name"],
        ["562", "Escherichia coli", "", "scientific name"],
        ["562", "Bacterium coli", "", "synonym"],
        ["83333", "Escherichia coli K-12", "", "scientific name"],
        ["2323", "unclassified Bacteria", "", "scientific name"],
        ["49928", "unclassified Bacteria miscellaneous", "", "scientific name"],
        ["77133", "uncultured bacterium", "", "scientific name"],
    ]
}

fn names_dump(rows: &[[&str; 4]]) -> String {
    rows.iter().map(|row| dmp(row)).collect()
}

fn merged_dump() -> String {
    dmp(&["469598", "562"])
}

fn default_options() -> EngineOptions {
    EngineOptions {
        validity: ValiditySettings::default(),
        lookup_batch_size: 2,
        classify_names: true,
    }
}

fn build_from(nodes: String, names: String, merged: String, options: &EngineOptions) -> Result<LoadedTaxonomy> {
    build_taxonomy(
        DumpRows::new(Cursor::new(nodes), NODES_FILE),
        DumpRows::new(Cursor::new(names), NAMES_FILE),
        DumpRows::new(Cursor::new(merged), MERGED_FILE),
        options,
    )
}

fn fixture_load(options: &EngineOptions) -> LoadedTaxonomy {
    build_from(
        nodes_dump(),
        names_dump(&name_rows()),
        merged_dump(),
        options,
    )
    .expect("fixture should load")
}

fn in_memory_store(loaded: &LoadedTaxonomy) -> Connection {
    let mut connection = Connection::open_in_memory().expect("in-memory db");
    ensure_schema(&connection).expect("schema");
    write_taxonomy(&mut connection, loaded, "test fixture").expect("write");
    connection
}

fn node_validity(connection: &Connection, tax_id: &str) -> bool {
    connection
        .query_row(
            "SELECT is_valid FROM nodes WHERE tax_id = ?1",
            [tax_id],
            |row| row.get(0),
        )
        .expect("node should exist")
}

fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("taxdb-{label}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

#[test]
fn split_dump_line_drops_terminator_and_keeps_empty_fields() {
    assert_eq!(
        split_dump_line("1\t|\tall\t|\t\t|\tsynonym\t|"),
        vec!["1", "all", "", "synonym"]
    );
    assert_eq!(
        split_dump_line("469598\t|\t562\t|"),
        vec!["469598", "562"]
    );
}

#[test]
fn dump_rows_skip_blank_lines_and_track_line_numbers() {
    let text = format!("{}\n{}", dmp(&["12", "562"]), dmp(&["13", "561"]));
    let rows = DumpRows::new(Cursor::new(text), MERGED_FILE)
        .collect::<Result<Vec<DumpRow>>>()
        .expect("rows should parse");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].line, 1);
    assert_eq!(rows[1].line, 3);
    assert_eq!(rows[1].fields, vec!["13", "561"]);
}

#[test]
fn short_rows_report_file_and_line() {
    let text = format!("{}{}", dmp(&["1", "1", "no rank", "", "8"]), dmp(&["2", "1"]));
    let err = DumpRows::new(Cursor::new(text), NODES_FILE)
        .map(|row| -> Result<RawTaxon> { Ok(node_from_row(row?)?) })
        .collect::<Result<Vec<RawTaxon>>>()
        .expect_err("second row is too short");

    match err.downcast_ref::<TaxonomyError>() {
        Some(TaxonomyError::DumpFormat { file, line, .. }) => {
            assert_eq!(*file, NODES_FILE);
            assert_eq!(*line, 2);
        }
        other => panic!("expected dump format error, got {other:?}"),
    }
}

#[test]
fn build_taxonomy_normalizes_ranks_and_propagates_validity() {
    let loaded = fixture_load(&default_options());

    assert_eq!(
        loaded.ranks.as_slice(),
        [
            "below_species",
            "species",
            "genus",
            "family",
            "order",
            "class",
            "phylum",
            "below_below_superkingdom",
            "below_superkingdom",
            "superkingdom",
            "below_root",
            "root",
        ]
    );

    let counts = &loaded.counts;
    assert_eq!(counts.taxa, 14);
    assert_eq!(counts.names, 17);
    assert_eq!(counts.primary_names, 14);
    assert_eq!(counts.merges, 1);
    assert_eq!(counts.reparented_taxa, 1);
    assert_eq!(counts.unordered_taxa, 0);
    assert_eq!(counts.anchored_taxa, 1);
    assert_eq!(counts.overridden_taxa, 3);
    assert_eq!(counts.valid_taxa, 9);
    assert_eq!(counts.invalid_taxa, 5);

    let position = loaded.tree.position_of("999").expect("999");
    assert_eq!(loaded.tree.parent_id(position), Some("543"));
}

#[test]
fn store_writes_normalized_tables() {
    let loaded = fixture_load(&default_options());
    let connection = in_memory_store(&loaded);

    let summary = DatabaseSummary::collect(&connection).expect("summary");
    assert_eq!(summary.nodes, 14);
    assert_eq!(summary.valid_nodes, 9);
    assert_eq!(summary.names, 17);
    assert_eq!(summary.merged, 1);
    assert_eq!(summary.ranks, 12);
    assert_eq!(summary.schema_version.as_deref(), Some(DB_SCHEMA_VERSION));
    assert!(summary.loaded_at.is_some());

    let root_parent: Option<String> = connection
        .query_row("SELECT parent_id FROM nodes WHERE tax_id = '1'", [], |row| {
            row.get(0)
        })
        .expect("root row");
    assert_eq!(root_parent.as_deref(), Some("1"));

    let most_specific: String = connection
        .query_row("SELECT rank FROM ranks WHERE rank_order = 0", [], |row| {
            row.get(0)
        })
        .expect("rank row");
    assert_eq!(most_specific, "below_species");

    let strain_rank: String = connection
        .query_row("SELECT rank FROM nodes WHERE tax_id = '83333'", [], |row| {
            row.get(0)
        })
        .expect("strain row");
    assert_eq!(strain_rank, "below_species");

    assert!(node_validity(&connection, "83333"));
    assert!(node_validity(&connection, "562"));
    assert!(!node_validity(&connection, "2323"));
    assert!(!node_validity(&connection, "77133"));

    let (is_primary, is_classified): (bool, Option<bool>) = connection
        .query_row(
            "SELECT is_primary, is_classified FROM names WHERE tax_name = 'Escherichia coli K-12'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("strain name");
    assert!(is_primary);
    assert_eq!(is_classified, Some(false));

    let bacteria_primary: bool = connection
        .query_row(
            "SELECT is_primary FROM names WHERE unique_name = 'Bacteria <bacteria>'",
            [],
            |row| row.get(0),
        )
        .expect("bacteria name");
    assert!(bacteria_primary);
}

#[test]
fn disabled_classification_leaves_flags_unset() {
    let options = EngineOptions {
        classify_names: false,
        ..default_options()
    };
    let loaded = fixture_load(&options);
    let connection = in_memory_store(&loaded);

    let classified: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM names WHERE is_classified IS NOT NULL",
            [],
            |row| row.get(0),
        )
        .expect("count");
    assert_eq!(classified, 0);

    // only the unclassified Bacteria subtree is invalid
    assert_eq!(loaded.counts.invalid_taxa, 3);
    assert!(node_validity(&connection, "1"));
}

#[test]
fn missing_primary_name_aborts_before_any_write() {
    let rows = name_rows()
        .into_iter()
        .filter(|row| row[0] != "83333")
        .collect::<Vec<_>>();

    let err = build_from(nodes_dump(), names_dump(&rows), merged_dump(), &default_options())
        .expect_err("83333 has no primary name");

    match err.downcast_ref::<TaxonomyError>() {
        Some(TaxonomyError::Integrity { tax_ids, .. }) => assert_eq!(tax_ids, &vec!["83333"]),
        other => panic!("expected integrity error, got {other:?}"),
    }
}

fn with_unlisted_ranks() -> (String, Vec<[&'static str; 4]>) {
    let mut nodes = nodes_dump();
    nodes.push_str(&dmp(&["1783272", "2", "clade", "", "0"]));
    nodes.push_str(&dmp(&["1239", "1783272", "phylum", "", "0"]));
    nodes.push_str(&dmp(&["900", "562", "strain", "", "0"]));
    let mut rows = name_rows();
    rows.push(["1783272", "Terrabacteria group", "", "scientific name"]);
    rows.push(["1239", "Bacillota", "", "scientific name"]);
    rows.push(["900", "Escherichia coli O157", "", "scientific name"]);
    (nodes, rows)
}

#[test]
fn clade_and_strain_ranks_load_without_being_compared() {
    let (nodes, rows) = with_unlisted_ranks();
    let loaded = build_from(nodes, names_dump(&rows), merged_dump(), &default_options())
        .expect("unlisted ranks should not abort the load");

    assert_eq!(loaded.counts.taxa, 17);
    assert_eq!(loaded.counts.unordered_taxa, 3);
    assert_eq!(loaded.counts.ranks, 12);
    assert_eq!(loaded.ranks.position("clade"), None);

    let connection = in_memory_store(&loaded);
    let strain_rank: String = connection
        .query_row("SELECT rank FROM nodes WHERE tax_id = '900'", [], |row| {
            row.get(0)
        })
        .expect("strain row");
    assert_eq!(strain_rank, "strain");
    // inherits from its valid species despite the unclassified-looking name
    assert!(node_validity(&connection, "900"));
}

#[test]
fn misordered_known_ranks_still_abort_next_to_unlisted_ranks() {
    let (mut nodes, mut rows) = with_unlisted_ranks();
    nodes.push_str(&dmp(&["901", "562", "genus", "", "0"]));
    rows.push(["901", "Escherichia fergusonii", "", "scientific name"]);

    let err = build_from(nodes, names_dump(&rows), merged_dump(), &default_options())
        .expect_err("a genus cannot sit below a species");

    assert!(matches!(
        err.downcast_ref::<TaxonomyError>(),
        Some(TaxonomyError::Integrity { tax_ids, .. }) if tax_ids == &vec!["901"]
    ));
}

#[test]
fn write_database_replaces_target_only_after_commit() {
    let dir = scratch_dir("write");
    let database_file = dir.join("ncbi_taxonomy.db");
    let loaded = fixture_load(&default_options());

    write_database(&database_file, &loaded, "test fixture").expect("first write");
    write_database(&database_file, &loaded, "test fixture").expect("rewrite");

    assert!(database_file.exists());
    assert!(!partial_path(&database_file).exists());

    let connection = Connection::open(&database_file).expect("open written db");
    let summary = DatabaseSummary::collect(&connection).expect("summary");
    assert_eq!(summary.nodes, 14);
    drop(connection);

    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn extract_dump_unpacks_needed_members_from_tarball() {
    let dir = scratch_dir("extract");
    let archive_path = dir.join("taxdump.tar.gz");

    let members = [
        ("nodes.dmp", nodes_dump()),
        ("names.dmp", names_dump(&name_rows())),
        ("merged.dmp", merged_dump()),
        ("readme.txt", "not a dump\n".to_string()),
    ];
    let file = File::create(&archive_path).expect("archive file");
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for (name, body) in &members {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, body.as_bytes())
            .expect("append member");
    }
    let mut encoder = builder.into_inner().expect("finish tar");
    encoder.flush().expect("flush");
    encoder.finish().expect("finish gzip");

    let dump_dir = dir.join("taxdump");
    extract_dump(&archive_path, &dump_dir).expect("extract");

    assert!(dump_dir.join(NODES_FILE).exists());
    assert!(dump_dir.join(NAMES_FILE).exists());
    assert!(dump_dir.join(MERGED_FILE).exists());
    assert!(!dump_dir.join("readme.txt").exists());

    let loaded = build_taxonomy(
        open_dump(&dump_dir, NODES_FILE).expect("nodes"),
        open_dump(&dump_dir, NAMES_FILE).expect("names"),
        open_dump(&dump_dir, MERGED_FILE).expect("merged"),
        &default_options(),
    )
    .expect("load from extracted dump");
    assert_eq!(loaded.counts.taxa, 14);

    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn extract_dump_rejects_archives_without_dump_files() {
    let dir = scratch_dir("extract-missing");
    let archive_path = dir.join("taxdump.tar.gz");

    let file = File::create(&archive_path).expect("archive file");
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    let body = nodes_dump();
    let mut header = tar::Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "nodes.dmp", body.as_bytes())
        .expect("append member");
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip");

    let err = extract_dump(&archive_path, &dir.join("taxdump")).expect_err("names missing");
    assert!(err.to_string().contains("names.dmp"));

    fs::remove_dir_all(&dir).expect("cleanup");
}
