use std::fmt;

use crate::error::{BackupError, Result};

/// Which tables pg_dump should touch.
///
/// Include and exclude lists are mutually exclusive: mixing them has no
/// well-defined meaning, so the loader refuses the combination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableFilter {
    #[default]
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl TableFilter {
    /// Build a filter from the raw comma-separated include/exclude values.
    ///
    /// A non-empty raw value counts as set for the conflict check even if it
    /// holds no table names (`" , "`).
    pub fn from_lists(include: &str, exclude: &str) -> Result<Self> {
        if !include.is_empty() && !exclude.is_empty() {
            return Err(BackupError::ConflictingTableFilters);
        }

        let include = parse_table_list(include);
        let exclude = parse_table_list(exclude);

        if !include.is_empty() {
            Ok(TableFilter::Include(include))
        } else if !exclude.is_empty() {
            Ok(TableFilter::Exclude(exclude))
        } else {
            Ok(TableFilter::All)
        }
    }

    /// pg_dump selector flag and the tables it applies to
    pub fn selector(&self) -> Option<(&'static str, &[String])> {
        match self {
            TableFilter::All => None,
            TableFilter::Include(tables) => Some(("-t", tables)),
            TableFilter::Exclude(tables) => Some(("-T", tables)),
        }
    }
}

impl fmt::Display for TableFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFilter::All => write!(f, "all tables"),
            TableFilter::Include(tables) => write!(f, "including {}", tables.join(",")),
            TableFilter::Exclude(tables) => write!(f, "excluding {}", tables.join(",")),
        }
    }
}

/// Split a comma-separated table list, trimming entries and dropping blanks.
pub fn parse_table_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
