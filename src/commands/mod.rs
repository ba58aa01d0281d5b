use std::path::{Path, PathBuf};

pub mod fetch;
pub mod new_database;
pub mod status;

pub(crate) fn default_manifest_path(database_file: &Path) -> PathBuf {
    let mut name = database_file.as_os_str().to_owned();
    name.push(".load.json");
    PathBuf::from(name)
}
