use std::collections::HashMap;

use super::error::{DanglingReference, Result, TaxonomyError};
use super::ranks::{ROOT_RANK, normalize_rank_label};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTaxon {
    pub tax_id: String,
    pub parent_id: String,
    pub rank: String,
    pub embl_code: String,
    pub division_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    pub tax_id: String,
    pub parent: Option<usize>,
    pub rank: String,
    pub embl_code: String,
    pub division_id: String,
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub old_tax_id: String,
    pub new_tax_id: String,
}

/// Arena of taxa keyed by position; parent links are arena indices.
///
/// Position 0 always holds the root.
#[derive(Debug, Clone)]
pub struct TaxonTree {
    taxa: Vec<Taxon>,
    index: HashMap<String, usize>,
}

impl TaxonTree {
    pub fn from_raw<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawTaxon>,
    {
        let mut taxa = Vec::new();
        let mut parent_ids = Vec::new();
        let mut index = HashMap::new();
        let mut duplicates = Vec::new();

        for row in rows {
            let is_root = taxa.is_empty();
            let rank = if is_root {
                ROOT_RANK.to_string()
            } else {
                normalize_rank_label(&row.rank)
            };

            if index.insert(row.tax_id.clone(), taxa.len()).is_some() {
                duplicates.push(row.tax_id.clone());
            }
            parent_ids.push(if is_root { None } else { Some(row.parent_id) });
            taxa.push(Taxon {
                tax_id: row.tax_id,
                parent: None,
                rank,
                embl_code: row.embl_code,
                division_id: row.division_id,
                is_valid: true,
            });
        }

        if taxa.is_empty() {
            return Err(TaxonomyError::integrity(
                "nodes dump contains no taxa",
                Vec::new(),
            ));
        }
        if !duplicates.is_empty() {
            return Err(TaxonomyError::integrity(
                "duplicate tax_id in nodes dump",
                duplicates,
            ));
        }

        let mut references = Vec::new();
        for (position, parent_id) in parent_ids.into_iter().enumerate() {
            let Some(parent_id) = parent_id else {
                continue;
            };
            match index.get(&parent_id) {
                Some(&parent) => taxa[position].parent = Some(parent),
                None => references.push(DanglingReference {
                    referrer: taxa[position].tax_id.clone(),
                    missing_id: parent_id,
                }),
            }
        }

        if !references.is_empty() {
            return Err(TaxonomyError::UnreachableReference { references });
        }

        Ok(Self { taxa, index })
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn get(&self, position: usize) -> &Taxon {
        &self.taxa[position]
    }

    pub(crate) fn get_mut(&mut self, position: usize) -> &mut Taxon {
        &mut self.taxa[position]
    }

    pub fn position_of(&self, tax_id: &str) -> Option<usize> {
        self.index.get(tax_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Taxon> {
        self.taxa.iter()
    }

    pub fn parent_of(&self, position: usize) -> Option<&Taxon> {
        self.taxa[position].parent.map(|parent| &self.taxa[parent])
    }

    pub fn parent_id(&self, position: usize) -> Option<&str> {
        self.parent_of(position).map(|parent| parent.tax_id.as_str())
    }

    pub fn parent_rank(&self, position: usize) -> Option<&str> {
        self.parent_of(position).map(|parent| parent.rank.as_str())
    }
}
