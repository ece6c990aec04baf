//! Property-based tests for range resolution.

use proptest::prelude::*;

use super::{ByteRange, RangeError, resolve_range};

/// Strategy producing `(start, end, length)` with `start <= end < length`.
fn valid_window() -> impl Strategy<Value = (u64, u64, u64)> {
    (1u64..10_000_000).prop_flat_map(|length| {
        (0..length).prop_flat_map(move |start| (Just(start), start..length, Just(length)))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A satisfiable closed range resolves to exactly the requested window.
    #[test]
    fn prop_closed_range_round_trips((start, end, length) in valid_window()) {
        let header = format!("bytes={start}-{end}");
        let range = resolve_range(Some(&header), length).unwrap().unwrap();

        prop_assert_eq!(range, ByteRange { start, end });
        prop_assert_eq!(range.byte_count(), end - start + 1);
        prop_assert!(range.end < length);
    }

    /// An omitted end always resolves to the last byte.
    #[test]
    fn prop_open_range_ends_at_last_byte((start, _end, length) in valid_window()) {
        let header = format!("bytes={start}-");
        let range = resolve_range(Some(&header), length).unwrap().unwrap();

        prop_assert_eq!(range.end, length - 1);
        prop_assert_eq!(range.byte_count(), length - start);
    }

    /// A start at or past the end of the object is never served.
    #[test]
    fn prop_start_beyond_length_not_satisfiable(
        length in 0u64..1_000_000,
        overshoot in 0u64..1_000_000,
        tail in proptest::option::of(0u64..2_000_000),
    ) {
        let start = length + overshoot;
        let header = match tail {
            Some(end) => format!("bytes={start}-{end}"),
            None => format!("bytes={start}-"),
        };

        let is_unsatisfiable = matches!(
            resolve_range(Some(&header), length),
            Err(RangeError::NotSatisfiable { .. })
        );
        prop_assert!(is_unsatisfiable);
    }

    /// Resolution is a pure function of its inputs.
    #[test]
    fn prop_resolution_is_idempotent(header in "bytes=[0-9]{0,6}-[0-9]{0,6}", length in 0u64..1_000_000) {
        let first = resolve_range(Some(&header), length);
        let second = resolve_range(Some(&header), length);
        prop_assert_eq!(first, second);
    }

    /// Arbitrary input never panics and never yields an out-of-bounds window.
    #[test]
    fn prop_never_out_of_bounds(header in ".*", length in 0u64..1_000_000) {
        if let Ok(Some(range)) = resolve_range(Some(&header), length) {
            prop_assert!(range.start <= range.end);
            prop_assert!(range.end < length);
        }
    }
}
