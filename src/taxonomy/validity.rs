use tracing::{debug, info};

use super::error::{Result, TaxonomyError};
use super::names::{Name, PrimaryNames};
use super::tree::TaxonTree;

pub const DEFAULT_ANCHOR_RANK: &str = "species";
pub const UNCLASSIFIED_BACTERIA: &str = "unclassified Bacteria";
pub const DEFAULT_LOOKUP_BATCH: usize = 250;

pub trait ChildLookup {
    fn max_params(&self) -> usize;

    fn children_of(&self, parents: &[usize]) -> Vec<usize>;
}

pub struct ChildIndex {
    children: Vec<Vec<usize>>,
    max_params: usize,
}

impl ChildIndex {
    pub fn build(tree: &TaxonTree, max_params: usize) -> Self {
        let mut children = vec![Vec::new(); tree.len()];
        for position in 0..tree.len() {
            if let Some(parent) = tree.get(position).parent {
                children[parent].push(position);
            }
        }

        Self {
            children,
            max_params: max_params.max(1),
        }
    }
}

impl ChildLookup for ChildIndex {
    fn max_params(&self) -> usize {
        self.max_params
    }

    fn children_of(&self, parents: &[usize]) -> Vec<usize> {
        parents
            .iter()
            .flat_map(|&parent| self.children[parent].iter().copied())
            .collect()
    }
}

pub fn children_of_frontier<L: ChildLookup + ?Sized>(lookup: &L, frontier: &[usize]) -> Vec<usize> {
    let batch = lookup.max_params().max(1);
    let mut next = Vec::new();
    for chunk in frontier.chunks(batch) {
        next.extend(lookup.children_of(chunk));
    }
    next
}

#[derive(Debug, Clone)]
pub struct ValiditySettings {
    pub anchor_rank: String,
    pub invalid_subtrees: Vec<String>,
}

impl Default for ValiditySettings {
    fn default() -> Self {
        Self {
            anchor_rank: DEFAULT_ANCHOR_RANK.to_string(),
            invalid_subtrees: vec![UNCLASSIFIED_BACTERIA.to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValiditySummary {
    pub anchored_taxa: usize,
    pub overridden_taxa: usize,
    pub valid_taxa: usize,
    pub invalid_taxa: usize,
}

pub fn propagate_validity<L: ChildLookup + ?Sized>(
    tree: &mut TaxonTree,
    names: &[Name],
    primaries: &PrimaryNames,
    lookup: &L,
    settings: &ValiditySettings,
) -> Result<ValiditySummary> {
    info!("marking taxa validity based on primary name");
    seed_from_primary_names(tree, names, primaries)?;

    info!(anchor_rank = %settings.anchor_rank, "updating subtree validity");
    let mut summary = ValiditySummary::default();

    let (invalid_group, valid_group): (Vec<usize>, Vec<usize>) = (0..tree.len())
        .filter(|&position| tree.parent_rank(position) == Some(settings.anchor_rank.as_str()))
        .partition(|&position| !tree.parent_of(position).is_some_and(|parent| parent.is_valid));

    for (group, is_valid) in [(invalid_group, false), (valid_group, true)] {
        if !group.is_empty() {
            summary.anchored_taxa += mark_subtrees(tree, lookup, group, is_valid);
        }
    }

    for subtree_name in &settings.invalid_subtrees {
        let mut matches = names
            .iter()
            .filter(|name| name.is_primary && name.tax_name == *subtree_name)
            .filter_map(|name| tree.position_of(&name.tax_id))
            .collect::<Vec<usize>>();
        matches.sort_unstable();
        matches.dedup();

        if matches.len() > 1 {
            return Err(TaxonomyError::integrity(
                format!("more than one taxon has primary name {subtree_name:?}"),
                matches
                    .iter()
                    .map(|&position| tree.get(position).tax_id.clone())
                    .collect(),
            ));
        }

        let Some(position) = matches.pop() else {
            debug!(name = %subtree_name, "no taxon carries override name");
            continue;
        };
        info!(name = %subtree_name, "marking subtree invalid");
        summary.overridden_taxa += mark_subtrees(tree, lookup, vec![position], false);
    }

    summary.valid_taxa = tree.iter().filter(|taxon| taxon.is_valid).count();
    summary.invalid_taxa = tree.len() - summary.valid_taxa;

    Ok(summary)
}

fn seed_from_primary_names(
    tree: &mut TaxonTree,
    names: &[Name],
    primaries: &PrimaryNames,
) -> Result<()> {
    let mut unnamed = Vec::new();
    for position in 0..tree.len() {
        match primaries.name_index(position) {
            // Unset classification keeps the default of valid.
            Some(index) => {
                tree.get_mut(position).is_valid = names[index].is_classified.unwrap_or(true);
            }
            None => unnamed.push(tree.get(position).tax_id.clone()),
        }
    }

    if unnamed.is_empty() {
        Ok(())
    } else {
        Err(TaxonomyError::integrity(
            "taxon groups missing primary name",
            unnamed,
        ))
    }
}

fn mark_subtrees<L: ChildLookup + ?Sized>(
    tree: &mut TaxonTree,
    lookup: &L,
    roots: Vec<usize>,
    is_valid: bool,
) -> usize {
    let mut frontier = roots;
    let mut marked = 0;

    while !frontier.is_empty() {
        debug!(taxa = frontier.len(), is_valid, "marking subtrees");
        for &position in &frontier {
            tree.get_mut(position).is_valid = is_valid;
        }
        marked += frontier.len();
        frontier = children_of_frontier(lookup, &frontier);
    }

    marked
}
