//! Byte sources behind an [`IndexReader`](crate::IndexReader): a file read
//! with positioned reads, or a buffer already in memory.

use crate::IndexError;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Random-access byte source the reader pulls blocks from.
///
/// Implementations must support concurrent positioned reads through `&self`;
/// lookups on different threads share one storage handle.
pub trait IndexStorage: Send + Sync {
    /// Total size in bytes.
    fn len(&self) -> u64;
    /// Fill `buf` from `offset`, failing if the range is not fully available.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), IndexError>;
    /// Whether the storage holds no bytes at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Index file on disk, read with positioned reads.
///
/// On Unix the reads go through `pread`, so no cursor is shared between
/// callers. Elsewhere a lock serializes the seek + read pair.
pub struct FileStorage {
    path: PathBuf,
    file: File,
    len: u64,
    #[cfg(not(unix))]
    cursor: std::sync::Mutex<()>,
}

impl FileStorage {
    /// Open an existing index file.
    ///
    /// # Returns
    /// * `Err(IndexError::MissingIndex)` - nothing exists at `path`
    /// * `Err(IndexError::Io)` - the file exists but cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IndexError::MissingIndex {
                path: path.display().to_string(),
            });
        }
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
            #[cfg(not(unix))]
            cursor: std::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IndexStorage for FileStorage {
    fn len(&self) -> u64 {
        self.len
    }

    #[cfg(unix)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), IndexError> {
        use std::os::unix::fs::FileExt;
        self.file.read_exact_at(buf, offset)?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), IndexError> {
        use std::io::{Read, Seek, SeekFrom};
        let _guard = self
            .cursor
            .lock()
            .map_err(|_| IndexError::Io("poisoned file cursor".into()))?;
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }
}

/// Index held entirely in memory. Handy for tests and for callers that
/// already have the bytes (embedded or fetched).
pub struct InMemoryStorage {
    bytes: Vec<u8>,
}

impl InMemoryStorage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<Vec<u8>> for InMemoryStorage {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl IndexStorage for InMemoryStorage {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), IndexError> {
        let start = usize::try_from(offset)
            .map_err(|_| IndexError::corrupt(format!("offset {offset} out of range")))?;
        let end = start
            .checked_add(buf.len())
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                IndexError::corrupt(format!(
                    "read of {} bytes at {offset} past end of {}-byte index",
                    buf.len(),
                    self.bytes.len()
                ))
            })?;
        buf.copy_from_slice(&self.bytes[start..end]);
        Ok(())
    }
}
