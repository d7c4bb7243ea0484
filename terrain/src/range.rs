//! Trimmed elevation range (ΔH).
//!
//! The range is taken over the central 80% of valid samples: the
//! lowest and highest 10% are dropped first, so isolated outliers
//! (decode glitches, spikes) don't dominate it.

use crate::{constants::MIN_VALID_SAMPLES, ElevationSample};

/// Range statistic over the trimmed elevations of a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeStat {
    /// Samples that had an elevation.
    pub valid_count: usize,

    /// Samples left after trimming. Always `valid_count - 2 * trim`.
    pub filtered_count: usize,

    /// Samples dropped from each end.
    pub trim: usize,

    pub min_m: f64,

    pub max_m: f64,

    /// `max_m - min_m`.
    pub delta_h_m: f64,

    /// Trimmed elevations, ascending.
    pub filtered: Box<[f64]>,
}

/// Result of [`compute_range`].
#[derive(Debug, Clone, PartialEq)]
pub enum RangeOutcome {
    Computed(RangeStat),

    /// Too few valid samples to say anything.
    InsufficientData { valid_count: usize },
}

impl RangeOutcome {
    pub fn stat(&self) -> Option<&RangeStat> {
        match self {
            Self::Computed(stat) => Some(stat),
            Self::InsufficientData { .. } => None,
        }
    }

    pub fn delta_h_m(&self) -> Option<f64> {
        self.stat().map(|stat| stat.delta_h_m)
    }

    pub fn valid_count(&self) -> usize {
        match self {
            Self::Computed(stat) => stat.valid_count,
            Self::InsufficientData { valid_count } => *valid_count,
        }
    }
}

/// Computes the trimmed range of `samples`' elevations.
pub fn compute_range(samples: &[ElevationSample]) -> RangeOutcome {
    trimmed_range(samples.iter().map(|sample| sample.elevation_m))
}

/// Computes the trimmed range over `elevations`, skipping `None`s.
pub fn trimmed_range<I>(elevations: I) -> RangeOutcome
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut valid: Vec<f64> = elevations
        .into_iter()
        .flatten()
        .filter(|elevation| elevation.is_finite())
        .collect();
    let valid_count = valid.len();

    if valid_count < MIN_VALID_SAMPLES {
        return RangeOutcome::InsufficientData { valid_count };
    }

    valid.sort_unstable_by(f64::total_cmp);

    // floor(n · 10%) from each end.
    let trim = valid_count / 10;
    let filtered = &valid[trim..valid_count - trim];

    let (Some(&min_m), Some(&max_m)) = (filtered.first(), filtered.last()) else {
        return RangeOutcome::InsufficientData { valid_count };
    };

    RangeOutcome::Computed(RangeStat {
        valid_count,
        filtered_count: filtered.len(),
        trim,
        min_m,
        max_m,
        delta_h_m: max_m - min_m,
        filtered: filtered.into(),
    })
}
