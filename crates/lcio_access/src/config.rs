//! Directory configuration.

/// Configuration for writing and reading a directory chain.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Rewrite the aggregate entry after this many segments (0 = only when
    /// the session finishes).
    pub flush_interval: u32,

    /// Whether `finish` syncs the stream to disk, or only flushes it.
    pub sync_on_finish: bool,

    /// Longest chain a reader will follow before declaring it corrupt.
    pub max_chain_length: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            flush_interval: 1,
            sync_on_finish: true,
            max_chain_length: 1 << 20,
        }
    }
}

impl DirectoryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many segments may pass between aggregate rewrites.
    #[must_use]
    pub const fn flush_interval(mut self, segments: u32) -> Self {
        self.flush_interval = segments;
        self
    }

    /// Sets whether to sync on finish.
    #[must_use]
    pub const fn sync_on_finish(mut self, value: bool) -> Self {
        self.sync_on_finish = value;
        self
    }

    /// Sets the longest chain a reader will follow.
    #[must_use]
    pub const fn max_chain_length(mut self, entries: usize) -> Self {
        self.max_chain_length = entries;
        self
    }
}
