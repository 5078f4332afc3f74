//! The summary a segment's detailed index hands to the directory.

use crate::run_event::{KeyRange, RunEvent};

/// What the directory needs to know about one segment's detailed index.
///
/// The detailed index itself (one entry per event) is written elsewhere;
/// only its summary and its location reach the directory.
pub trait SegmentIndex {
    /// The keys covered by the segment, or `None` if it holds no events.
    ///
    /// Directory entries store no range as `(0, 0)` with zero events, so a
    /// range of exactly `(0, 0)` reported with zero events reads back as
    /// `None`.
    fn range(&self) -> Option<KeyRange>;

    /// Whether the segment's events were written in ascending key order.
    fn is_ordered(&self) -> bool;

    /// Number of events in the segment.
    fn event_count(&self) -> u32;

    /// Number of run headers in the segment.
    fn run_header_count(&self) -> u32;

    /// Absolute offset of the detailed index record.
    fn location(&self) -> u64;
}

/// A plain [`SegmentIndex`] built up event by event.
///
/// # Example
///
/// ```rust
/// use lcio_access::{RunEvent, SegmentIndex, SegmentSummary};
///
/// let mut summary = SegmentSummary::new(4096);
/// summary.add_run_header();
/// summary.add_event(RunEvent::new(7, 1));
/// summary.add_event(RunEvent::new(7, 2));
/// assert_eq!(summary.event_count(), 2);
/// assert!(summary.is_ordered());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSummary {
    /// Keys covered, `None` while no event has been added.
    pub range: Option<KeyRange>,
    /// Whether events arrived in ascending order.
    pub ordered: bool,
    /// Number of events.
    pub event_count: u32,
    /// Number of run headers.
    pub run_header_count: u32,
    /// Absolute offset of the detailed index record.
    pub location: u64,
    last: Option<RunEvent>,
}

impl SegmentSummary {
    /// Starts an empty summary for an index stored at `location`.
    #[must_use]
    pub fn new(location: u64) -> Self {
        Self {
            range: None,
            ordered: true,
            event_count: 0,
            run_header_count: 0,
            location,
            last: None,
        }
    }

    /// Builds a summary from ready-made figures.
    #[must_use]
    pub fn with_range(location: u64, range: KeyRange, event_count: u32) -> Self {
        Self {
            range: Some(range),
            event_count,
            last: Some(range.max()),
            ..Self::new(location)
        }
    }

    /// Records one event.
    ///
    /// An event smaller than its predecessor clears the ordered flag.
    pub fn add_event(&mut self, key: RunEvent) {
        if self.last.is_some_and(|last| key < last) {
            self.ordered = false;
        }
        self.last = Some(key);
        match &mut self.range {
            Some(range) => range.extend(key),
            None => self.range = Some(KeyRange::single(key)),
        }
        self.event_count = self.event_count.saturating_add(1);
    }

    /// Records one run header.
    pub fn add_run_header(&mut self) {
        self.run_header_count = self.run_header_count.saturating_add(1);
    }
}

impl SegmentIndex for SegmentSummary {
    fn range(&self) -> Option<KeyRange> {
        self.range
    }

    fn is_ordered(&self) -> bool {
        self.ordered
    }

    fn event_count(&self) -> u32 {
        self.event_count
    }

    fn run_header_count(&self) -> u32 {
        self.run_header_count
    }

    fn location(&self) -> u64 {
        self.location
    }
}
