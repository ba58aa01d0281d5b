use tracing::{debug, info};

use super::error::{DanglingReference, Result, TaxonomyError};
use super::tree::TaxonTree;

pub const SCIENTIFIC_NAME: &str = "scientific name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawName {
    pub tax_id: String,
    pub tax_name: String,
    pub unique_name: String,
    pub name_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub tax_id: String,
    pub tax_name: String,
    pub unique_name: String,
    pub name_class: String,
    pub is_primary: bool,
    pub is_classified: Option<bool>,
}

pub fn is_primary_name(tax_name: &str, unique_name: &str, name_class: &str) -> bool {
    if name_class != SCIENTIFIC_NAME {
        return false;
    }
    if unique_name.is_empty() {
        return true;
    }

    let head = unique_name.split('<').next().unwrap_or_default();
    head.trim() == tax_name
}

pub struct NameClassifier<'a> {
    excludes: Option<Box<dyn Fn(&str) -> bool + 'a>>,
}

impl<'a> NameClassifier<'a> {
    pub fn new(excludes: impl Fn(&str) -> bool + 'a) -> Self {
        Self {
            excludes: Some(Box::new(excludes)),
        }
    }

    pub fn without_predicate() -> Self {
        Self { excludes: None }
    }

    pub fn classify(&self, raw: RawName) -> Name {
        let is_primary = is_primary_name(&raw.tax_name, &raw.unique_name, &raw.name_class);
        let is_classified = self
            .excludes
            .as_ref()
            .map(|excludes| !excludes(&raw.tax_name));

        Name {
            tax_id: raw.tax_id,
            tax_name: raw.tax_name,
            unique_name: raw.unique_name,
            name_class: raw.name_class,
            is_primary,
            is_classified,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrimaryNames {
    by_position: Vec<Option<usize>>,
}

impl PrimaryNames {
    pub fn name_index(&self, position: usize) -> Option<usize> {
        self.by_position.get(position).copied().flatten()
    }
}

pub fn assert_primary_names(tree: &TaxonTree, names: &[Name]) -> Result<PrimaryNames> {
    info!("checking primary names");

    let mut by_position = vec![None; tree.len()];
    let mut references = Vec::new();
    let mut extra_primaries = 0_usize;

    for (name_index, name) in names.iter().enumerate() {
        let Some(position) = tree.position_of(&name.tax_id) else {
            references.push(DanglingReference {
                referrer: format!("name {:?}", name.tax_name),
                missing_id: name.tax_id.clone(),
            });
            continue;
        };

        if !name.is_primary {
            continue;
        }
        match by_position[position] {
            None => by_position[position] = Some(name_index),
            Some(_) => extra_primaries += 1,
        }
    }

    if !references.is_empty() {
        return Err(TaxonomyError::UnreachableReference { references });
    }

    let missing = by_position
        .iter()
        .enumerate()
        .filter(|(_, primary)| primary.is_none())
        .map(|(position, _)| tree.get(position).tax_id.clone())
        .collect::<Vec<String>>();
    if !missing.is_empty() {
        for tax_id in &missing {
            debug!(tax_id = %tax_id, "tax_id missing primary name");
        }
        return Err(TaxonomyError::integrity(
            "taxon groups missing primary name",
            missing,
        ));
    }

    if extra_primaries > 0 {
        debug!(extra_primaries, "taxa with more than one primary name keep the first");
    }

    Ok(PrimaryNames { by_position })
}
