//! Two-pass index writer.
//!
//! Pass one writes both header tables with zeroed `(offset, count)` slots and
//! remembers where each slot lives. Pass two streams the blocks of every
//! bucket, then seeks back to patch the bucket's slot before carrying on.
//! Nothing but the current bucket is ever buffered.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, WriteBytesExt};
use tracing::{debug, info};

use crate::format::{Buckets, CONTENT_SUBKEY_WIDTH, DETAIL_SUBKEY_WIDTH};
use crate::IndexError;

/// Sizes reported after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
    pub content_buckets: usize,
    pub content_blocks: usize,
    pub detail_buckets: usize,
    pub detail_blocks: usize,
    pub bytes_written: u64,
}

/// Serializes [`Buckets`] into any seekable sink.
pub struct IndexWriter<W: Write + Seek> {
    out: W,
}

impl<W: Write + Seek> IndexWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write the whole index and hand the sink back.
    pub fn write(mut self, buckets: &Buckets) -> Result<(W, WriteSummary), IndexError> {
        let content_slots = self.write_table(
            buckets.content.iter().map(|(k, v)| (k.as_str(), v.len())),
            buckets.content.len(),
            CONTENT_SUBKEY_WIDTH,
        )?;
        let detail_slots = self.write_table(
            buckets.details.iter().map(|(k, v)| (k.as_str(), v.len())),
            buckets.details.len(),
            DETAIL_SUBKEY_WIDTH,
        )?;

        let mut summary = WriteSummary {
            content_buckets: buckets.content.len(),
            detail_buckets: buckets.details.len(),
            ..WriteSummary::default()
        };

        for (slot, records) in content_slots.into_iter().zip(buckets.content.values()) {
            let blocks = records.iter().map(|record| record.encode());
            summary.content_blocks += self.write_bucket(slot, blocks)?;
        }
        for (slot, records) in detail_slots.into_iter().zip(buckets.details.values()) {
            let blocks = records.iter().map(|record| record.encode());
            summary.detail_blocks += self.write_bucket(slot, blocks)?;
        }

        self.out.flush()?;
        summary.bytes_written = self.out.stream_position()?;
        Ok((self.out, summary))
    }

    /// Write `count`, then every subkey followed by an empty slot. Returns the
    /// slot positions in table order.
    fn write_table<'a, I>(
        &mut self,
        entries: I,
        count: usize,
        width: usize,
    ) -> Result<Vec<u64>, IndexError>
    where
        I: Iterator<Item = (&'a str, usize)>,
    {
        self.out.write_u32::<BigEndian>(to_u32(count, "bucket count")?)?;
        let mut slots = Vec::with_capacity(count);
        for (subkey, _) in entries {
            if subkey.len() != width {
                return Err(IndexError::InvalidSubkey {
                    subkey: subkey.to_string(),
                    expected: width,
                });
            }
            self.out.write_all(subkey.as_bytes())?;
            slots.push(self.out.stream_position()?);
            self.out.write_u32::<BigEndian>(0)?;
            self.out.write_u32::<BigEndian>(0)?;
        }
        Ok(slots)
    }

    /// Stream one bucket's blocks and patch its slot. Returns the block count.
    fn write_bucket<I>(&mut self, slot: u64, blocks: I) -> Result<usize, IndexError>
    where
        I: Iterator<Item = String>,
    {
        let start = self.out.stream_position()?;
        let mut count = 0usize;
        for block in blocks {
            self.out
                .write_u32::<BigEndian>(to_u32(block.len(), "block length")?)?;
            self.out.write_all(block.as_bytes())?;
            count += 1;
        }
        let resume = self.out.stream_position()?;

        self.out.seek(SeekFrom::Start(slot))?;
        self.out
            .write_u32::<BigEndian>(to_u32(start, "bucket offset")?)?;
        self.out.write_u32::<BigEndian>(to_u32(count, "block count")?)?;
        self.out.seek(SeekFrom::Start(resume))?;
        Ok(count)
    }
}

fn to_u32<N>(value: N, what: &str) -> Result<u32, IndexError>
where
    N: TryInto<u32> + Copy + std::fmt::Display,
{
    value
        .try_into()
        .map_err(|_| IndexError::TooLarge(format!("{what} {value} does not fit in u32")))
}

/// Write the index to `path`, going through a sibling `.tmp` file that is
/// renamed into place once complete, so readers never see a half-written
/// index.
pub fn write_index_file<P: AsRef<Path>>(
    buckets: &Buckets,
    path: P,
) -> Result<WriteSummary, IndexError> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");

    let tmp = PathBuf::from(tmp);
    let summary = match write_and_rename(buckets, &tmp, path) {
        Ok(summary) => summary,
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!(path = %tmp.display(), error = %cleanup, "index_tmp_cleanup_failed");
            }
            return Err(err);
        }
    };

    info!(
        path = %path.display(),
        content_buckets = summary.content_buckets,
        content_blocks = summary.content_blocks,
        detail_buckets = summary.detail_buckets,
        detail_blocks = summary.detail_blocks,
        bytes = summary.bytes_written,
        "index_written"
    );
    Ok(summary)
}

fn write_and_rename(
    buckets: &Buckets,
    tmp: &Path,
    path: &Path,
) -> Result<WriteSummary, IndexError> {
    let file = File::create(tmp)?;
    let (out, summary) = IndexWriter::new(BufWriter::new(file)).write(buckets)?;
    out.into_inner()
        .map_err(|err| IndexError::from(err.into_error()))?;
    fs::rename(tmp, path)?;
    Ok(summary)
}
