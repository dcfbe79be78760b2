//! Core types shared by the partition buffer, ranking client and updater

use std::borrow::Borrow;
use std::fmt;

/// Field delimiter for both input parsing and output writing
pub const DELIMITER: char = ';';

/// Header column holding the member identifier (exact, case-sensitive match)
pub const MEMBER_ID_COLUMN: &str = "memberid";

/// Column names appended to the header, in value order
pub const RANKING_COLUMNS: [&str; 3] = [
    "PlayerLevelSingleR",
    "PlayerLevelDoubleR",
    "PlayerLevelMixedR",
];

/// Member identifier, the join key between CSV rows and the ranking service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MemberId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MemberId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Most recent ranking levels of one member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingRecord {
    pub single: i64,
    pub double: i64,
    pub mixed: i64,
}

impl RankingRecord {
    pub fn new(single: i64, double: i64, mixed: i64) -> Self {
        Self {
            single,
            double,
            mixed,
        }
    }

    /// Row suffix carrying the three levels: `;single;double;mixed`
    pub fn row_suffix(&self) -> String {
        format!(
            "{d}{}{d}{}{d}{}",
            self.single,
            self.double,
            self.mixed,
            d = DELIMITER
        )
    }

    /// Row suffix for a member without ranking: three empty fields
    pub fn sentinel_suffix() -> String {
        DELIMITER.to_string().repeat(RANKING_COLUMNS.len())
    }
}

/// Observability record of one flushed partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionStats {
    /// 1-based partition counter
    pub partition: usize,
    /// Data rows written for this partition
    pub rows: usize,
    /// Distinct member ids queried
    pub member_ids: usize,
    /// Member ids the ranking service returned a ranking for
    pub rankings_received: usize,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Data lines consumed (header excluded)
    pub data_lines: usize,
    pub partitions: Vec<PartitionStats>,
}
