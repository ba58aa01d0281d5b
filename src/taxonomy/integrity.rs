use tracing::{debug, info, warn};

use super::error::{Result, TaxonomyError};
use super::ranks::FinalizedRanks;
use super::tree::TaxonTree;

// Links where either rank is outside the finalized order (`clade`, `strain`,
// ...) cannot be compared and are skipped. Returns how many were skipped.
pub fn check_rank_integrity(tree: &TaxonTree, ranks: &FinalizedRanks) -> Result<usize> {
    info!("confirming tax tree rank integrity");

    let mut offenders = Vec::new();
    let mut unordered = 0_usize;
    for position in 0..tree.len() {
        let taxon = tree.get(position);
        let Some(parent) = tree.parent_of(position) else {
            continue;
        };

        let (Some(own), Some(parent_position)) =
            (ranks.position(&taxon.rank), ranks.position(&parent.rank))
        else {
            debug!(
                tax_id = %taxon.tax_id,
                rank = %taxon.rank,
                parent_rank = %parent.rank,
                "rank outside canonical order; not compared"
            );
            unordered += 1;
            continue;
        };

        if parent_position <= own {
            debug!(
                tax_id = %taxon.tax_id,
                rank = %taxon.rank,
                parent_id = %parent.tax_id,
                parent_rank = %parent.rank,
                "taxon rank is not below parent rank"
            );
            offenders.push(taxon.tax_id.clone());
        }
    }

    if unordered > 0 {
        warn!(unordered, "taxa with ranks outside the canonical order were not checked");
    }

    if offenders.is_empty() {
        Ok(unordered)
    } else {
        Err(TaxonomyError::integrity(
            "some taxon ranks are not below their parent ranks",
            offenders,
        ))
    }
}
