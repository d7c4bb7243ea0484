/// Returns distances `start_m, start_m + step_m, ...`, continuing until
/// `end_m` is reached or passed.
///
/// When `end_m - start_m` is not a multiple of `step_m` the final
/// distance lies beyond `end_m`, so the end of the range is always
/// covered. Callers are expected to have validated `end_m > start_m`,
/// `step_m > 0` and that the number of samples is reasonable; see
/// [`sample_count`].
#[allow(clippy::cast_precision_loss)]
pub fn step_distances(start_m: f64, end_m: f64, step_m: f64) -> impl ExactSizeIterator<Item = f64> {
    let span = ((end_m - start_m) / step_m).ceil();
    // Casting saturates: NaN and negative spans give 0, spans too
    // large for `usize` (including infinity) give `usize::MAX`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = span as usize;
    let count = steps.checked_add(1).unwrap_or(usize::MAX);
    (0..count).map(move |i| start_m + i as f64 * step_m)
}

/// Number of distances [`step_distances`] yields for this range, or
/// `None` if it does not fit in a `usize`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn sample_count(start_m: f64, end_m: f64, step_m: f64) -> Option<usize> {
    let span = ((end_m - start_m) / step_m).ceil();
    if !(0.0..usize::MAX as f64).contains(&span) {
        return None;
    }
    let steps = span as usize;
    steps.checked_add(1)
}

#[cfg(test)]
mod tests {
    use super::{sample_count, step_distances};

    #[test]
    fn test_exact_multiple_includes_end() {
        let distances = step_distances(10_000.0, 50_000.0, 500.0).collect::<Vec<_>>();
        assert_eq!(distances.len(), 81);
        assert_eq!(distances.first(), Some(&10_000.0));
        assert_eq!(distances.last(), Some(&50_000.0));
    }

    #[test]
    fn test_partial_step_overshoots_end() {
        let distances = step_distances(0.0, 10.0, 3.0).collect::<Vec<_>>();
        assert_eq!(distances, vec![0.0, 3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_step_longer_than_range() {
        let distances = step_distances(100.0, 150.0, 1_000.0).collect::<Vec<_>>();
        assert_eq!(distances, vec![100.0, 1_100.0]);
    }

    #[test]
    fn test_len() {
        assert_eq!(step_distances(0.0, 1_000.0, 90.0).len(), 13);
    }

    #[test]
    fn test_huge_spans_do_not_overflow() {
        assert_eq!(step_distances(0.0, 1e20, 1.0).len(), usize::MAX);
        assert_eq!(step_distances(0.0, 1e300, 1e-300).len(), usize::MAX);
    }

    #[test]
    fn test_sample_count() {
        assert_eq!(sample_count(10_000.0, 50_000.0, 500.0), Some(81));
        assert_eq!(sample_count(0.0, 10.0, 3.0), Some(5));
        assert_eq!(sample_count(0.0, 1e20, 1.0), None);
        assert_eq!(sample_count(0.0, 1e300, 1e-300), None);
        assert_eq!(sample_count(0.0, 1.0, f64::NAN), None);
    }
}
