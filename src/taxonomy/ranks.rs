use std::collections::{HashMap, HashSet};

use super::error::{Result, TaxonomyError};

pub const ROOT_RANK: &str = "root";
pub const NO_RANK: &str = "no_rank";

pub const CANONICAL_RANKS: [&str; 29] = [
    ROOT_RANK,
    "superkingdom",
    "kingdom",
    "subkingdom",
    "superphylum",
    "phylum",
    "subphylum",
    "superclass",
    "class",
    "subclass",
    "infraclass",
    "superorder",
    "order",
    "suborder",
    "infraorder",
    "parvorder",
    "superfamily",
    "family",
    "subfamily",
    "tribe",
    "subtribe",
    "genus",
    "subgenus",
    "species_group",
    "species_subgroup",
    "species",
    "subspecies",
    "varietas",
    "forma",
];

pub fn normalize_rank_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<&str>>().join("_")
}

pub fn below_rank(rank: &str) -> String {
    format!("below_{rank}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankSequence {
    ranks: Vec<String>,
}

impl RankSequence {
    pub fn initial() -> Self {
        Self {
            ranks: CANONICAL_RANKS.iter().map(|rank| rank.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.ranks.get(position).map(String::as_str)
    }

    pub fn insert_after(&mut self, existing_rank: &str, new_rank: &str) -> Result<()> {
        if self.ranks.iter().any(|rank| rank == new_rank) {
            return Err(TaxonomyError::Config(format!(
                "rank {new_rank} is already part of the sequence"
            )));
        }
        let Some(position) = self.ranks.iter().position(|rank| rank == existing_rank) else {
            return Err(TaxonomyError::Config(format!(
                "cannot insert {new_rank} after unknown rank {existing_rank}"
            )));
        };

        self.ranks.insert(position + 1, new_rank.to_string());
        Ok(())
    }

    pub fn finalize(&self, used_ranks: &HashSet<String>) -> FinalizedRanks {
        let ranks = self
            .ranks
            .iter()
            .rev()
            .filter(|rank| used_ranks.contains(*rank))
            .cloned()
            .collect::<Vec<String>>();
        let positions = ranks
            .iter()
            .enumerate()
            .map(|(position, rank)| (rank.clone(), position))
            .collect();

        FinalizedRanks { ranks, positions }
    }
}

/// Rank order after normalization: index 0 is the most specific rank in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedRanks {
    ranks: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FinalizedRanks {
    pub fn position(&self, rank: &str) -> Option<usize> {
        self.positions.get(rank).copied()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ranks
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }
}
