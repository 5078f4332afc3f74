//! Property-based test generators using proptest.
//!
//! Keys are drawn from small ranges so that overlapping and touching
//! segments come up often.

use lcio_access::{KeyRange, RunEvent, SegmentSummary};
use proptest::prelude::*;

/// Strategy for keys with small run and event numbers.
pub fn run_event_strategy() -> impl Strategy<Value = RunEvent> {
    (-2..20i32, -2..200i32).prop_map(|(run, event)| RunEvent::new(run, event))
}

/// Strategy for valid ranges (min <= max).
pub fn key_range_strategy() -> impl Strategy<Value = KeyRange> {
    (run_event_strategy(), run_event_strategy()).prop_map(|(a, b)| {
        KeyRange::new(a.min(b), a.max(b)).expect("sorted bounds form a range")
    })
}

/// Strategy for segments that hold events, ordered or not.
pub fn ranged_segment_strategy() -> impl Strategy<Value = SegmentSummary> {
    (
        key_range_strategy(),
        1..10_000u32,
        0..4u32,
        any::<bool>(),
        0..(1u64 << 40),
    )
        .prop_map(|(range, events, run_headers, ordered, location)| {
            let mut segment = SegmentSummary::with_range(location, range, events);
            segment.run_header_count = run_headers;
            segment.ordered = ordered;
            segment
        })
}

/// Strategy for segments with run headers but no events, hence no range.
pub fn run_header_segment_strategy() -> impl Strategy<Value = SegmentSummary> {
    (1..4u32, 0..(1u64 << 40)).prop_map(|(run_headers, location)| {
        let mut segment = SegmentSummary::new(location);
        for _ in 0..run_headers {
            segment.add_run_header();
        }
        segment
    })
}

/// Strategy for arbitrary segment summaries, mostly with events.
pub fn segment_strategy() -> impl Strategy<Value = SegmentSummary> {
    prop_oneof![
        4 => ranged_segment_strategy(),
        1 => run_header_segment_strategy(),
    ]
}

/// Strategy for 1..=`max` ordered, disjoint segments in ascending key order,
/// one run per segment.
pub fn ascending_segments_strategy(max: usize) -> impl Strategy<Value = Vec<SegmentSummary>> {
    prop::collection::vec((1..4i32, 1..50i32), 1..=max).prop_map(|shapes| {
        let mut run = 0;
        shapes
            .into_iter()
            .map(|(gap, events)| {
                run += gap;
                let range = KeyRange::new(RunEvent::new(run, 0), RunEvent::new(run, events - 1))
                    .expect("events >= 1");
                SegmentSummary::with_range(0, range, events as u32)
            })
            .collect()
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
