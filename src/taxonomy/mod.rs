mod error;
mod integrity;
mod names;
mod normalize;
mod ranks;
mod tree;
mod unclassified;
mod validity;

pub use error::TaxonomyError;
pub use integrity::check_rank_integrity;
pub use names::{Name, NameClassifier, RawName, assert_primary_names};
pub use normalize::normalize_ranks;
pub use ranks::FinalizedRanks;
pub use tree::{Merge, RawTaxon, TaxonTree};
pub use unclassified::unclassified_regex;
pub use validity::{
    ChildIndex, DEFAULT_ANCHOR_RANK, DEFAULT_LOOKUP_BATCH, UNCLASSIFIED_BACTERIA,
    ValiditySettings, propagate_validity,
};
