use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub path: String,
    pub url: Option<String>,
    pub sha256: Option<String>,
    pub downloaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadPaths {
    pub database_file: String,
    pub dump_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    pub anchor_rank: String,
    pub invalid_subtrees: Vec<String>,
    pub lookup_batch_size: usize,
    pub classify_names: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadCounts {
    pub taxa: usize,
    pub names: usize,
    pub primary_names: usize,
    pub merges: usize,
    pub ranks: usize,
    pub reparented_taxa: usize,
    pub synthesized_ranks: Vec<String>,
    pub unordered_taxa: usize,
    pub anchored_taxa: usize,
    pub overridden_taxa: usize,
    pub valid_taxa: usize,
    pub invalid_taxa: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: String,
    pub command: String,
    pub archive: Option<ArchiveEntry>,
    pub paths: LoadPaths,
    pub settings: EngineSettings,
    pub counts: LoadCounts,
}
