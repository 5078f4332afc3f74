//! # LCIO Storage
//!
//! Byte-store backends underneath LCIO event files.
//!
//! Backends are **opaque byte stores**: they know nothing about records,
//! blocks or directory entries. The record framing lives in `lcio_sio`
//! and the random-access directory lives in `lcio_access`.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (read, append, overwrite, flush)
//! - Overwrites never change the size of the store
//! - Must be `Send + Sync`
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and scratch files
//! - [`FileBackend`] - For event files on disk
//!
//! ## Example
//!
//! ```rust
//! use lcio_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! backend.write_at(offset, b"HELLO").unwrap();
//! assert_eq!(backend.read_at(offset, 11).unwrap(), b"HELLO world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
