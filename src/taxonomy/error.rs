use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaxonomyError>;

const PREVIEW_LIMIT: usize = 10;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("rank sequence error: {0}")]
    Config(String),

    #[error("{reason}: {} offending tax_id(s) [{}]", .tax_ids.len(), preview(.tax_ids))]
    Integrity {
        reason: String,
        tax_ids: Vec<String>,
    },

    #[error("{} unreachable tax_id reference(s) [{}]", .references.len(), preview(.references))]
    UnreachableReference { references: Vec<DanglingReference> },

    #[error("malformed row in {file} line {line}: {detail}")]
    DumpFormat {
        file: &'static str,
        line: usize,
        detail: String,
    },
}

impl TaxonomyError {
    pub fn integrity(reason: impl Into<String>, tax_ids: Vec<String>) -> Self {
        Self::Integrity {
            reason: reason.into(),
            tax_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub referrer: String,
    pub missing_id: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.referrer, self.missing_id)
    }
}

fn preview<T: fmt::Display>(items: &[T]) -> String {
    let mut rendered = items
        .iter()
        .take(PREVIEW_LIMIT)
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(", ");
    if items.len() > PREVIEW_LIMIT {
        rendered.push_str(&format!(", ... {} more", items.len() - PREVIEW_LIMIT));
    }
    rendered
}
