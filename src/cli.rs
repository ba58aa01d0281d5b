use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::taxonomy::{DEFAULT_ANCHOR_RANK, DEFAULT_LOOKUP_BATCH, UNCLASSIFIED_BACTERIA};

pub const DEFAULT_DATA_URL: &str = "https://ftp.ncbi.nlm.nih.gov/pub/taxonomy/taxdump.tar.gz";

#[derive(Parser, Debug)]
#[command(
    name = "taxdb",
    version,
    about = "Build a validated local database from the NCBI taxonomy dump"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Fetch(FetchArgs),
    NewDatabase(NewDatabaseArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[arg(long, default_value = ".")]
    pub download_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_DATA_URL)]
    pub url: String,

    /// Download again even if the archive is already present.
    #[arg(long, default_value_t = false)]
    pub clobber: bool,
}

#[derive(Args, Debug, Clone)]
pub struct NewDatabaseArgs {
    #[arg(long, default_value = "ncbi_taxonomy.db")]
    pub database_file: PathBuf,

    /// Defaults to the directory holding the database file.
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Load from an already extracted dump instead of downloading.
    #[arg(long)]
    pub dump_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_DATA_URL)]
    pub url: String,

    /// Re-download the archive and rebuild an existing database.
    #[arg(long, default_value_t = false)]
    pub clobber: bool,

    #[arg(long, default_value = DEFAULT_ANCHOR_RANK)]
    pub anchor_rank: String,

    #[arg(long = "invalid-subtree", default_values_t = [UNCLASSIFIED_BACTERIA.to_string()])]
    pub invalid_subtrees: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_LOOKUP_BATCH)]
    pub lookup_batch_size: usize,

    /// Leave name classification unset instead of applying the
    /// unclassified-name patterns.
    #[arg(long, default_value_t = false)]
    pub no_classify: bool,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "ncbi_taxonomy.db")]
    pub database_file: PathBuf,
}
