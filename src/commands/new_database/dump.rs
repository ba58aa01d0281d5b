use super::*;

pub(super) const NODES_FILE: &str = "nodes.dmp";
pub(super) const NAMES_FILE: &str = "names.dmp";
pub(super) const MERGED_FILE: &str = "merged.dmp";

const DUMP_FILES: [&str; 3] = [NODES_FILE, NAMES_FILE, MERGED_FILE];
const FIELD_SEPARATOR: &str = "\t|\t";
const LINE_TERMINATOR: &str = "\t|";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DumpRow {
    pub file: &'static str,
    pub line: usize,
    pub fields: Vec<String>,
}

impl DumpRow {
    fn take<const N: usize>(self) -> std::result::Result<[String; N], TaxonomyError> {
        if self.fields.len() < N {
            return Err(TaxonomyError::DumpFormat {
                file: self.file,
                line: self.line,
                detail: format!("expected at least {N} fields, found {}", self.fields.len()),
            });
        }

        let mut fields = self.fields.into_iter();
        Ok(std::array::from_fn(|_| fields.next().unwrap_or_default()))
    }
}

pub(super) struct DumpRows<R> {
    reader: R,
    file: &'static str,
    line: usize,
    buffer: String,
}

impl<R: BufRead> DumpRows<R> {
    pub(super) fn new(reader: R, file: &'static str) -> Self {
        Self {
            reader,
            file,
            line: 0,
            buffer: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for DumpRows<R> {
    type Item = Result<DumpRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            self.line += 1;
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = self.buffer.trim_end_matches(['\n', '\r']);
                    if line.is_empty() {
                        continue;
                    }
                    return Some(Ok(DumpRow {
                        file: self.file,
                        line: self.line,
                        fields: split_dump_line(line),
                    }));
                }
                Err(err) => {
                    return Some(Err(err).with_context(|| {
                        format!("failed to read {} line {}", self.file, self.line)
                    }));
                }
            }
        }
    }
}

pub(super) fn split_dump_line(line: &str) -> Vec<String> {
    line.strip_suffix(LINE_TERMINATOR)
        .unwrap_or(line)
        .split(FIELD_SEPARATOR)
        .map(ToOwned::to_owned)
        .collect()
}

pub(super) fn node_from_row(row: DumpRow) -> std::result::Result<RawTaxon, TaxonomyError> {
    let [tax_id, parent_id, rank, embl_code, division_id] = row.take::<5>()?;
    Ok(RawTaxon {
        tax_id,
        parent_id,
        rank,
        embl_code,
        division_id,
    })
}

pub(super) fn name_from_row(row: DumpRow) -> std::result::Result<RawName, TaxonomyError> {
    let [tax_id, tax_name, unique_name, name_class] = row.take::<4>()?;
    Ok(RawName {
        tax_id,
        tax_name,
        unique_name,
        name_class,
    })
}

pub(super) fn merge_from_row(row: DumpRow) -> std::result::Result<Merge, TaxonomyError> {
    let [old_tax_id, new_tax_id] = row.take::<2>()?;
    Ok(Merge {
        old_tax_id,
        new_tax_id,
    })
}

pub(super) fn open_dump(dump_dir: &Path, file: &'static str) -> Result<DumpRows<BufReader<File>>> {
    let path = dump_dir.join(file);
    let handle =
        File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(DumpRows::new(BufReader::new(handle), file))
}

pub(super) fn extract_dump(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    ensure_directory(dest_dir)?;
    info!(
        archive = %archive_path.display(),
        dest = %dest_dir.display(),
        "extracting taxonomy dump"
    );

    let file = File::open(archive_path)
        .with_context(|| format!("failed to open {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
    let mut found = HashSet::new();

    let entries = archive
        .entries()
        .with_context(|| format!("failed to read {}", archive_path.display()))?;
    for entry in entries {
        let mut entry = entry
            .with_context(|| format!("failed to read entry in {}", archive_path.display()))?;
        let member = {
            let path = entry
                .path()
                .with_context(|| format!("invalid member path in {}", archive_path.display()))?;
            path.file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| DUMP_FILES.iter().copied().find(|file| *file == name))
        };
        let Some(member) = member else {
            continue;
        };

        let target = dest_dir.join(member);
        entry
            .unpack(&target)
            .with_context(|| format!("failed to extract {member} to {}", target.display()))?;
        found.insert(member);
    }

    let missing = DUMP_FILES
        .iter()
        .copied()
        .filter(|file| !found.contains(file))
        .collect::<Vec<&str>>();
    if !missing.is_empty() {
        bail!(
            "archive {} is missing {}",
            archive_path.display(),
            missing.join(", ")
        );
    }

    Ok(())
}
