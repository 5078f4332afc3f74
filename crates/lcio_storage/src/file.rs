//! File-based storage backend.

use crate::backend::StorageBackend;
use crate::error::{check_read, check_write, StorageResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// An event file on disk.
///
/// The file length is cached at open and advanced by `append`, so bounds
/// checks never touch the file system. Reads seek, so the handle sits
/// behind a lock even for `&self` access.
///
/// # Durability
///
/// - `flush()` hands written data to the OS
/// - `sync()` waits until data and metadata are on disk
///
/// # Example
///
/// ```no_run
/// use lcio_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("run42.slcio")).unwrap();
/// let aggregate = backend.append(&[0u8; 8]).unwrap();
/// backend.append(b"events").unwrap();
/// backend.write_at(aggregate, &[1u8; 8]).unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    handle: Mutex<Handle>,
}

#[derive(Debug)]
struct Handle {
    file: File,
    len: u64,
}

impl Handle {
    fn read_exact_at(&mut self, offset: u64, buffer: &mut [u8]) -> StorageResult<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buffer)?;
        Ok(())
    }

    fn write_all_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        Ok(())
    }
}

impl FileBackend {
    /// Opens the file for reading, appending and in-place rewrites,
    /// creating it if needed. Existing contents are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Self::from_file(path, file)
    }

    /// Opens an existing file for reading only.
    ///
    /// Writes through this backend fail with the OS permission error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    pub fn open_read_only(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Self::from_file(path, file)
    }

    fn from_file(path: &Path, file: File) -> StorageResult<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            handle: Mutex::new(Handle { file, len }),
        })
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut handle = self.handle.lock();
        check_read(offset, len, handle.len)?;

        let mut buffer = vec![0u8; len];
        if len > 0 {
            handle.read_exact_at(offset, &mut buffer)?;
        }
        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let handle = self.handle.get_mut();
        let offset = handle.len;
        if !data.is_empty() {
            handle.write_all_at(offset, data)?;
            handle.len += data.len() as u64;
        }
        Ok(offset)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
        let handle = self.handle.get_mut();
        check_write(offset, data.len(), handle.len)?;
        if !data.is_empty() {
            handle.write_all_at(offset, data)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.handle.get_mut().file.flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.handle.lock().len)
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.handle.get_mut().file.sync_all()?;
        Ok(())
    }
}
