//! # LCIO Testkit
//!
//! Test utilities for the LCIO random-access directory.
//!
//! This crate provides:
//! - Property-based test generators using proptest
//! - Fixtures that write a directory to memory or to a temporary file
//! - Golden bytes for the directory entry record
//!
//! ## Usage
//!
//! ```rust
//! use lcio_testkit::prelude::*;
//!
//! let written = MemoryDirectory::write(&[summary((1, 0), (1, 9), 10)]);
//! let directory = written.open();
//! assert_eq!(directory.entries().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod golden;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::golden::*;
}

pub use fixtures::*;
pub use generators::*;
pub use golden::*;
