//! Dynamic distance bucketing
//!
//! Commute distances are binned into fixed-width half-open ranges anchored at
//! the floor of the smallest observed value. Boundaries depend on the filtered
//! subset, so they are recomputed for every filter state.

use crate::config::MAX_DISTANCE_FROM_HOME;
use crate::types::DistanceBucket;

/// Bucketer producing width-`w` ranges over observed values
#[derive(Debug, Clone, Copy)]
pub struct DistanceBucketer {
    width: u32,
}

impl DistanceBucketer {
    /// Create a bucketer; a zero width is treated as 1
    pub fn new(width: u32) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Compute buckets covering `[floor(min), max]` of the given values.
    ///
    /// Boundaries start at `floor(min)` and step by the width until one is
    /// strictly greater than `max`. Values whose magnitude exceeds
    /// [`MAX_DISTANCE_FROM_HOME`] are ignored, which bounds the bucket count.
    /// Returns `None` when no usable values remain, so callers can report
    /// "no data" instead of charting a fake bucket.
    pub fn buckets<I>(&self, values: I) -> Option<Vec<DistanceBucket>>
    where
        I: IntoIterator<Item = f64>,
    {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite() && v.abs() <= MAX_DISTANCE_FROM_HOME)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let width = i64::from(self.width);
        let mut lower = min.floor() as i64;
        let mut buckets = Vec::new();
        loop {
            let upper = lower.checked_add(width)?;
            buckets.push(DistanceBucket {
                lower,
                upper,
                label: format!("{}–{}", lower, upper - 1),
            });
            if upper as f64 > max {
                break;
            }
            lower = upper;
        }

        Some(buckets)
    }

    /// Index of the bucket containing `value`, if any
    pub fn assign(&self, buckets: &[DistanceBucket], value: f64) -> Option<usize> {
        let first = buckets.first()?;
        if !value.is_finite() || value < first.lower as f64 {
            return None;
        }
        let idx = ((value - first.lower as f64) / f64::from(self.width)).floor() as usize;
        buckets.get(idx).filter(|b| b.contains(value)).map(|_| idx)
    }
}
