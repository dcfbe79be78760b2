//! Partition buffer
//!
//! Ordered multi-map from member id to the raw rows carrying that id.
//! Keys keep first-seen order and rows keep arrival order within a key, so
//! draining a partition reproduces the input order grouped by member.

use crate::types::{MemberId, RankingRecord};
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PartitionBuffer {
    /// Keys in insertion order with their rows
    entries: IndexMap<MemberId, Vec<String>>,
    row_count: usize,
}

impl PartitionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row under its member id, creating the key on first sight
    pub fn add_row(&mut self, member_id: MemberId, row: String) {
        self.entries.entry(member_id).or_default().push(row);
        self.row_count += 1;
    }

    pub fn distinct_key_count(&self) -> usize {
        self.entries.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct member ids in insertion order
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.entries.keys().cloned().collect()
    }

    /// Append the ranking suffix to every buffered row.
    ///
    /// Members absent from `rankings` get the empty sentinel suffix.
    pub fn enrich(&mut self, rankings: &HashMap<MemberId, RankingRecord>) {
        for (member_id, rows) in self.entries.iter_mut() {
            let suffix = rankings
                .get(member_id)
                .map(RankingRecord::row_suffix)
                .unwrap_or_else(RankingRecord::sentinel_suffix);

            let enriched: Vec<String> = rows.iter().map(|row| format!("{row}{suffix}")).collect();
            *rows = enriched;
        }
    }

    /// All rows, key-insertion order then arrival order. Does not clear.
    pub fn drain_in_order(&self) -> impl Iterator<Item = &str> {
        self.entries
            .values()
            .flat_map(|rows| rows.iter().map(String::as_str))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.row_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(rows: &[(&str, &str)]) -> PartitionBuffer {
        let mut buffer = PartitionBuffer::new();
        for (id, row) in rows {
            buffer.add_row(MemberId::from(*id), row.to_string());
        }
        buffer
    }

    #[test]
    fn test_counts_track_keys_and_rows() {
        let buffer = buffer_with(&[("A", "1;A"), ("A", "2;A"), ("B", "3;B")]);
        assert_eq!(buffer.distinct_key_count(), 2);
        assert_eq!(buffer.row_count(), 3);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_drain_groups_by_first_seen_key() {
        let buffer = buffer_with(&[("A", "1;A"), ("B", "2;B"), ("A", "3;A"), ("C", "4;C")]);
        let rows: Vec<&str> = buffer.drain_in_order().collect();
        assert_eq!(rows, vec!["1;A", "3;A", "2;B", "4;C"]);
        assert_eq!(
            buffer.member_ids(),
            vec![MemberId::from("A"), MemberId::from("B"), MemberId::from("C")]
        );
    }

    #[test]
    fn test_drain_does_not_clear() {
        let buffer = buffer_with(&[("A", "1;A")]);
        assert_eq!(buffer.drain_in_order().count(), 1);
        assert_eq!(buffer.drain_in_order().count(), 1);
    }

    #[test]
    fn test_enrich_uses_ranking_or_sentinel() {
        let mut buffer = buffer_with(&[("A", "1;A"), ("B", "2;B"), ("A", "3;A")]);
        let mut rankings = HashMap::new();
        rankings.insert(MemberId::from("A"), RankingRecord::new(5, 7, 3));

        buffer.enrich(&rankings);

        let rows: Vec<&str> = buffer.drain_in_order().collect();
        assert_eq!(rows, vec!["1;A;5;7;3", "3;A;5;7;3", "2;B;;;"]);
        assert_eq!(buffer.row_count(), 3);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut buffer = buffer_with(&[("A", "1;A"), ("B", "2;B")]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.distinct_key_count(), 0);
        assert_eq!(buffer.row_count(), 0);

        buffer.add_row(MemberId::from("B"), "3;B".to_string());
        assert_eq!(buffer.drain_in_order().collect::<Vec<_>>(), vec!["3;B"]);
    }

    #[test]
    fn test_revisited_key_keeps_first_position() {
        let mut buffer = buffer_with(&[("B", "1;B"), ("A", "2;A"), ("B", "3;B"), ("A", "4;A")]);
        assert_eq!(buffer.distinct_key_count(), 2);
        assert_eq!(buffer.member_ids(), vec![MemberId::from("B"), MemberId::from("A")]);

        buffer.enrich(&HashMap::new());
        let rows: Vec<&str> = buffer.drain_in_order().collect();
        assert_eq!(rows, vec!["1;B;;;", "3;B;;;", "2;A;;;", "4;A;;;"]);
    }
}
