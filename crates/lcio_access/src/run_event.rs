//! Run/event keys and the ranges built from them.

use crate::error::{AccessError, AccessResult};
use std::cmp::Ordering;
use std::fmt;

/// A (run, event) key. Ordered by run, then event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunEvent {
    /// Run number.
    pub run: i32,
    /// Event number within the run.
    pub event: i32,
}

impl RunEvent {
    /// Creates a key.
    #[must_use]
    pub const fn new(run: i32, event: i32) -> Self {
        Self { run, event }
    }
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.run, self.event)
    }
}

impl From<(i32, i32)> for RunEvent {
    fn from((run, event): (i32, i32)) -> Self {
        Self::new(run, event)
    }
}

/// Where a key falls relative to a [`KeyRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPosition {
    /// The key is smaller than the range minimum.
    Before,
    /// The key is inside the range, bounds included.
    Within,
    /// The key is larger than the range maximum.
    After,
}

impl KeyPosition {
    /// The conventional three-way signal: -1 before, 0 within, +1 after.
    #[must_use]
    pub const fn as_signal(self) -> i32 {
        match self {
            Self::Before => -1,
            Self::Within => 0,
            Self::After => 1,
        }
    }

    /// The ordering of the *range* relative to the key.
    ///
    /// Suitable for [`slice::binary_search_by`] over ascending,
    /// non-overlapping ranges.
    #[must_use]
    pub const fn range_ordering(self) -> Ordering {
        match self {
            Self::Before => Ordering::Greater,
            Self::Within => Ordering::Equal,
            Self::After => Ordering::Less,
        }
    }
}

/// An inclusive, non-empty range of keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRange {
    min: RunEvent,
    max: RunEvent,
}

impl KeyRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::InvalidRange`] if `min > max`.
    pub fn new(min: RunEvent, max: RunEvent) -> AccessResult<Self> {
        if min > max {
            return Err(AccessError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range holding exactly one key.
    #[must_use]
    pub const fn single(key: RunEvent) -> Self {
        Self { min: key, max: key }
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub const fn min(&self) -> RunEvent {
        self.min
    }

    /// Upper bound (inclusive).
    #[must_use]
    pub const fn max(&self) -> RunEvent {
        self.max
    }

    /// Locates `key` relative to this range.
    #[must_use]
    pub fn locate(&self, key: RunEvent) -> KeyPosition {
        if key < self.min {
            KeyPosition::Before
        } else if key > self.max {
            KeyPosition::After
        } else {
            KeyPosition::Within
        }
    }

    /// Returns true if `key` is inside the range.
    #[must_use]
    pub fn contains(&self, key: RunEvent) -> bool {
        self.locate(key) == KeyPosition::Within
    }

    /// The smallest range containing both ranges.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Extends the range to cover `key`.
    pub fn extend(&mut self, key: RunEvent) {
        *self = self.union(&Self::single(key));
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
