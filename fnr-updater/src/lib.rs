//! fnr-updater library - member ranking updater
//!
//! Enriches a `;`-delimited member file with the latest single, double and
//! mixed ranking levels from the ranking service, one batched query per
//! partition of distinct member ids.

pub mod cli;
pub mod partition;
pub mod ranking_client;
pub mod types;
pub mod updater;

pub use partition::PartitionBuffer;
pub use ranking_client::{RankingSource, RemoteRankingClient};
pub use types::{MemberId, PartitionStats, RankingRecord, UpdateSummary};
pub use updater::CsvRankingUpdater;
