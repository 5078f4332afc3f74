//! Golden bytes for format verification.
//!
//! Pins the exact on-disk form of a directory entry so that accidental
//! layout changes show up as test failures.

use lcio_access::{KeyRange, RunEvent, SegmentSummary};

/// The summary the golden entry is populated from.
pub fn golden_summary() -> SegmentSummary {
    let range = KeyRange::new(RunEvent::new(1, 2), RunEvent::new(3, 4)).expect("valid range");
    let mut summary = SegmentSummary::with_range(7, range, 6);
    summary.run_header_count = 5;
    summary
}

/// The record written for [`golden_summary`] with no chain links.
#[rustfmt::skip]
pub const GOLDEN_ENTRY_RECORD: [u8; 124] = [
    // record header: header_len 36, marker, options, payload_len 88, name_len 16
    0x00, 0x00, 0x00, 0x24,
    0xAB, 0xAD, 0xCA, 0xFE,
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x58,
    0x00, 0x00, 0x00, 0x10,
    b'L', b'C', b'I', b'O', b'R', b'a', b'n', b'd',
    b'o', b'm', b'A', b'c', b'c', b'e', b's', b's',
    // block header: block_len 88, marker, version 1.0, name_len 16
    0x00, 0x00, 0x00, 0x58,
    0xDE, 0xAD, 0xBE, 0xEF,
    0x00, 0x01, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x10,
    b'L', b'C', b'I', b'O', b'R', b'a', b'n', b'd',
    b'o', b'm', b'A', b'c', b'c', b'e', b's', b's',
    // min (1, 2), max (3, 4)
    0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x02,
    0x00, 0x00, 0x00, 0x03,
    0x00, 0x00, 0x00, 0x04,
    // run headers 5, events 6, ordered
    0x00, 0x00, 0x00, 0x05,
    0x00, 0x00, 0x00, 0x06,
    0x00, 0x00, 0x00, 0x01,
    // pad
    0x00, 0x00, 0x00, 0x00,
    // index location 7, previous 0, next 0
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x07,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];
