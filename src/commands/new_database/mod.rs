use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use flate2::read::GzDecoder;
use rusqlite::{Connection, params};
use tar::Archive;
use tracing::{info, warn};

use crate::cli::NewDatabaseArgs;
use crate::commands::default_manifest_path;
use crate::commands::fetch::fetch_archive;
use crate::model::{ArchiveEntry, EngineSettings, LoadCounts, LoadPaths, LoadRunManifest};
use crate::taxonomy::{
    ChildIndex, FinalizedRanks, Merge, Name, NameClassifier, RawName, RawTaxon, TaxonTree,
    TaxonomyError, ValiditySettings, assert_primary_names, check_rank_integrity, normalize_ranks,
    propagate_validity, unclassified_regex,
};
use crate::util::{
    ensure_directory, now_utc_string, parent_or_current, partial_path, remove_file_if_exists,
    sha256_file, utc_compact_string, write_json_pretty,
};

pub(crate) const DB_SCHEMA_VERSION: &str = "1.0.0";
const NCBI_SOURCE_ID: i64 = 1;
const NCBI_SOURCE_NAME: &str = "ncbi";

mod db_setup;
mod dump;
mod pipeline;
mod run;
mod store;
#[cfg(test)]
mod tests;

pub use run::run;

use db_setup::*;
use dump::*;
use pipeline::*;
use store::*;
