//! CSV ranking updater
//!
//! Streams a `;`-delimited member file through a [`PartitionBuffer`]. Every time
//! the buffer holds `batch_size` distinct member ids, the partition is looked up
//! in one query, enriched and written out before any further input is read.
//! The trailing partial partition is flushed at end of input.
//!
//! Output rows keep input order within a partition, grouped by first-seen member.

use crate::partition::PartitionBuffer;
use crate::ranking_client::RankingSource;
use crate::types::{
    MemberId, PartitionStats, UpdateSummary, DELIMITER, MEMBER_ID_COLUMN, RANKING_COLUMNS,
};
use fnr_common::{Error, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info};

pub struct CsvRankingUpdater<S> {
    source: S,
    batch_size: usize,
}

impl<S: RankingSource> CsvRankingUpdater<S> {
    /// `batch_size` is the number of distinct member ids per remote query
    pub fn new(source: S, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        Ok(Self { source, batch_size })
    }

    /// Update `input` into `output`, creating or truncating the output file.
    ///
    /// I/O errors carry the path of the file involved.
    pub async fn run_files(&self, input: &Path, output: &Path) -> Result<UpdateSummary> {
        let input_file = File::open(input)
            .await
            .map_err(|e| Error::file_io(input, e))?;
        let output_file = File::create(output)
            .await
            .map_err(|e| Error::file_io(output, e))?;

        info!(
            input = %input.display(),
            output = %output.display(),
            batch_size = self.batch_size,
            "Updating rankings"
        );

        let mut writer = BufWriter::new(output_file);
        self.process(BufReader::new(input_file), &mut writer, Some(input), Some(output))
            .await
    }

    /// Update from any line source into any sink
    pub async fn run<R, W>(&self, reader: R, writer: &mut W) -> Result<UpdateSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.process(reader, writer, None, None).await
    }

    async fn process<R, W>(
        &self,
        reader: R,
        writer: &mut W,
        input: Option<&Path>,
        output: Option<&Path>,
    ) -> Result<UpdateSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let read_err = |e: std::io::Error| io_error(input, e);
        let mut lines = reader.lines();

        // Header
        let header = lines
            .next_line()
            .await
            .map_err(read_err)?
            .ok_or(Error::EmptyInput)?;
        let member_id_index = member_id_column(&header)?;
        debug!(column = member_id_index, "Located member id column");

        let mut sink = RowSink { writer, output };
        sink.write_line(&augmented_header(&header)).await?;
        sink.flush().await?;

        // Data rows
        let mut buffer = PartitionBuffer::new();
        let mut summary = UpdateSummary::default();

        while let Some(line) = lines.next_line().await.map_err(read_err)? {
            summary.data_lines += 1;
            // Header is line 1
            let member_id = extract_member_id(&line, member_id_index, summary.data_lines + 1)?;
            buffer.add_row(member_id, line);

            if buffer.distinct_key_count() == self.batch_size {
                let stats = self
                    .flush_partition(&mut buffer, &mut sink, summary.partitions.len() + 1)
                    .await?;
                summary.partitions.push(stats);
            }
        }

        // Last incomplete partition
        if !buffer.is_empty() {
            let stats = self
                .flush_partition(&mut buffer, &mut sink, summary.partitions.len() + 1)
                .await?;
            summary.partitions.push(stats);
        }

        info!(
            data_lines = summary.data_lines,
            partitions = summary.partitions.len(),
            "Processed {} data lines",
            summary.data_lines
        );

        Ok(summary)
    }

    async fn flush_partition<W>(
        &self,
        buffer: &mut PartitionBuffer,
        sink: &mut RowSink<'_, W>,
        partition: usize,
    ) -> Result<PartitionStats>
    where
        W: AsyncWrite + Unpin,
    {
        let member_ids = buffer.member_ids();
        info!(
            partition,
            rows = buffer.row_count(),
            member_ids = member_ids.len(),
            "Processing partition"
        );

        let rankings = self.source.lookup(&member_ids).await?;
        info!(
            partition,
            received = rankings.len(),
            "Received {} results for this partition",
            rankings.len()
        );

        buffer.enrich(&rankings);
        for row in buffer.drain_in_order() {
            sink.write_line(row).await?;
        }
        sink.flush().await?;

        let stats = PartitionStats {
            partition,
            rows: buffer.row_count(),
            member_ids: member_ids.len(),
            rankings_received: rankings.len(),
        };
        buffer.clear();

        Ok(stats)
    }
}

/// Output writer that tags I/O errors with the output path when known
struct RowSink<'a, W> {
    writer: &'a mut W,
    output: Option<&'a Path>,
}

impl<W: AsyncWrite + Unpin> RowSink<'_, W> {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| io_error(self.output, e))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| io_error(self.output, e))
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .await
            .map_err(|e| io_error(self.output, e))
    }
}

fn io_error(path: Option<&Path>, source: std::io::Error) -> Error {
    match path {
        Some(path) => Error::file_io(path, source),
        None => Error::Io(source),
    }
}

/// Position of the member id column in the header
pub fn member_id_column(header: &str) -> Result<usize> {
    header
        .split(DELIMITER)
        .position(|column| column == MEMBER_ID_COLUMN)
        .ok_or_else(|| Error::MissingColumn(MEMBER_ID_COLUMN.to_string()))
}

/// Header line with the three ranking columns appended
pub fn augmented_header(header: &str) -> String {
    let mut line = header.to_string();
    for column in RANKING_COLUMNS {
        line.push(DELIMITER);
        line.push_str(column);
    }
    line
}

fn extract_member_id(line: &str, index: usize, line_number: usize) -> Result<MemberId> {
    match line.split(DELIMITER).nth(index) {
        Some("") => Err(Error::EmptyMemberId { line: line_number }),
        Some(id) => Ok(MemberId::from(id)),
        None => Err(Error::MalformedRow {
            line: line_number,
            required: index + 1,
            found: line.split(DELIMITER).count(),
        }),
    }
}
