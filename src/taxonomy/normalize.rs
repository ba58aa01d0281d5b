use std::collections::HashSet;

use tracing::{debug, info};

use super::error::{Result, TaxonomyError};
use super::ranks::{FinalizedRanks, NO_RANK, ROOT_RANK, RankSequence, below_rank};
use super::tree::TaxonTree;

#[derive(Debug, Clone)]
pub struct NormalizedRanks {
    pub ranks: FinalizedRanks,
    pub reparented: usize,
    pub synthesized: Vec<String>,
}

pub fn normalize_ranks(tree: &mut TaxonTree) -> Result<NormalizedRanks> {
    info!("adjusting taxa with same rank as parent");
    let reparented = resolve_same_ranks(tree)?;
    info!(reparented, "same-rank adjustment complete");

    info!("expanding no_rank taxa");
    let (ranks, synthesized) = fill_rank_gaps(tree, RankSequence::initial())?;
    info!(
        synthesized = synthesized.len(),
        ranks = ranks.len(),
        "rank expansion complete"
    );

    Ok(NormalizedRanks {
        ranks,
        reparented,
        synthesized,
    })
}

fn shares_parent_rank(rank: &str, parent_rank: &str) -> bool {
    rank != ROOT_RANK && parent_rank != NO_RANK && rank == parent_rank
}

pub fn resolve_same_ranks(tree: &mut TaxonTree) -> Result<usize> {
    let hop_limit = tree.len();
    let mut moves = Vec::new();
    let mut cycling = Vec::new();

    'taxa: for position in 0..tree.len() {
        let taxon = tree.get(position);
        let Some(original_parent) = taxon.parent else {
            continue;
        };

        let mut parent = original_parent;
        let mut hops = 0;
        while shares_parent_rank(&taxon.rank, &tree.get(parent).rank) {
            let Some(grandparent) = tree.get(parent).parent else {
                break;
            };
            parent = grandparent;
            hops += 1;
            if hops > hop_limit {
                cycling.push(taxon.tax_id.clone());
                continue 'taxa;
            }
        }

        if parent != original_parent {
            moves.push((position, parent));
        }
    }

    if !cycling.is_empty() {
        return Err(TaxonomyError::integrity(
            "parent chain never leaves the taxon's rank",
            cycling,
        ));
    }

    for &(position, parent) in &moves {
        debug!(
            tax_id = %tree.get(position).tax_id,
            new_parent_id = %tree.get(parent).tax_id,
            "re-parenting taxon with same rank as parent"
        );
        tree.get_mut(position).parent = Some(parent);
    }

    Ok(moves.len())
}

pub fn fill_rank_gaps(
    tree: &mut TaxonTree,
    mut sequence: RankSequence,
) -> Result<(FinalizedRanks, Vec<String>)> {
    let mut unranked = (0..tree.len())
        .filter(|&position| tree.get(position).rank == NO_RANK)
        .collect::<Vec<usize>>();
    let mut synthesized = Vec::new();
    let mut cursor = 0;

    while cursor < sequence.len() && !unranked.is_empty() {
        let Some(rank) = sequence.get(cursor).map(ToOwned::to_owned) else {
            break;
        };

        let (matched, remaining): (Vec<usize>, Vec<usize>) = unranked
            .into_iter()
            .partition(|&position| tree.parent_rank(position) == Some(rank.as_str()));
        unranked = remaining;

        if !matched.is_empty() {
            let below = below_rank(&rank);
            debug!(rank = %below, taxa = matched.len(), "synthesizing rank");
            for &position in &matched {
                tree.get_mut(position).rank = below.clone();
            }
            sequence.insert_after(&rank, &below)?;
            synthesized.push(below);
        }

        cursor += 1;
    }

    let used_ranks = tree
        .iter()
        .map(|taxon| taxon.rank.clone())
        .collect::<HashSet<String>>();

    Ok((sequence.finalize(&used_ranks), synthesized))
}
