//! Time axis for uniformly sampled series — index ↔ time mapping and
//! origin shifting.
//!
//! Purpose
//! -------
//! Provide a small, validated container mapping 0-based sample indices to
//! times on a uniform grid: `time_at(i) = start_offset + i * dt`. Higher
//! layers use it to resolve absolute times to sample indices, derive window
//! axes for extracted subsets, and re-zero the time origin.
//!
//! Invariants & assumptions
//! ------------------------
//! - `dt` is finite and strictly positive; `start_offset` is finite.
//! - `n_samples` may be zero; an empty axis has `end_time() == start_offset`
//!   by convention and rejects every `nearest_index` query.
//! - `shift_start` is a bare mutation primitive. It deliberately knows
//!   nothing about events: `DataSeries::shift_time` is the only caller that
//!   may move the origin of an axis that has an event registry attached,
//!   and it shifts both in one step.
//!
//! Conventions
//! -----------
//! - Times are `f64` seconds relative to an implicit recording frame; the
//!   optional `start_datetime` anchors `start_offset == 0.0` of the
//!   original recording in civil time and is carried through derived axes
//!   unchanged.
//! - Out-of-range policy follows the half-sample rule: a query time is
//!   accepted while it lies within `dt / 2` of the covered interval, so
//!   rounding never silently fabricates an index far off the grid.
use chrono::{DateTime, Utc};
use ndarray::Array1;

use crate::series::errors::{SeriesError, SeriesResult};

/// TimeAxis — uniform sample grid with a shiftable origin.
///
/// Purpose
/// -------
/// Map sample indices to times for one series: `time_at(i) = start_offset +
/// i * dt`. The axis is the single source of truth for a series' sample
/// count and spacing; the owning container enforces that the sample array
/// agrees with it.
///
/// Fields
/// ------
/// - `dt`: `f64`
///   Spacing between consecutive samples. Finite and strictly positive.
/// - `n_samples`: `usize`
///   Number of samples the axis covers. May be zero.
/// - `start_offset`: `f64`
///   Time of sample 0 in the series' reference frame. Finite.
/// - `start_datetime`: `Option<DateTime<Utc>>`
///   Optional civil-time anchor of the original recording's time zero.
///   Metadata only; no arithmetic here depends on it.
///
/// Invariants
/// ----------
/// - `dt.is_finite() && dt > 0.0`.
/// - `start_offset.is_finite()`.
///
/// Notes
/// -----
/// - Copying is cheap relative to the sample arrays it describes; derived
///   views always get their own axis via [`TimeAxis::subset_axis`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    dt: f64,
    n_samples: usize,
    start_offset: f64,
    start_datetime: Option<DateTime<Utc>>,
}

impl TimeAxis {
    /// Construct an axis starting at offset `0.0`.
    ///
    /// # Errors
    /// - [`SeriesError::InvalidSampleSpacing`] if `dt` is non-finite or ≤ 0.
    pub fn new(dt: f64, n_samples: usize) -> SeriesResult<Self> {
        Self::with_start(dt, n_samples, 0.0)
    }

    /// Construct an axis with an explicit start offset.
    ///
    /// # Errors
    /// - [`SeriesError::InvalidSampleSpacing`] if `dt` is non-finite or ≤ 0,
    ///   or if `start_offset` is non-finite.
    pub fn with_start(dt: f64, n_samples: usize, start_offset: f64) -> SeriesResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SeriesError::InvalidSampleSpacing { dt });
        }
        if !start_offset.is_finite() {
            return Err(SeriesError::InvalidSampleSpacing { dt: start_offset });
        }
        Ok(TimeAxis { dt, n_samples, start_offset, start_datetime: None })
    }

    /// Attach a civil-time anchor for the original recording's time zero.
    pub fn with_datetime(mut self, start_datetime: DateTime<Utc>) -> Self {
        self.start_datetime = Some(start_datetime);
        self
    }

    /// Spacing between consecutive samples.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of samples the axis covers.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Time of sample 0 in the series' reference frame.
    pub fn start_offset(&self) -> f64 {
        self.start_offset
    }

    /// Optional civil-time anchor of the original recording.
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        self.start_datetime
    }

    /// Time of the last sample; equals `start_offset` for an empty axis.
    pub fn end_time(&self) -> f64 {
        if self.n_samples == 0 {
            self.start_offset
        } else {
            self.start_offset + (self.n_samples - 1) as f64 * self.dt
        }
    }

    /// Time of the sample at `index`. Does not bounds-check; callers index
    /// with values previously resolved through [`TimeAxis::nearest_index`]
    /// or known-valid sample positions.
    pub fn time_at(&self, index: usize) -> f64 {
        self.start_offset + index as f64 * self.dt
    }

    /// Materialize the full time vector. Intended for plotting-style
    /// consumers that need `(samples, times)` pairs.
    pub fn times(&self) -> Array1<f64> {
        Array1::from_iter((0..self.n_samples).map(|i| self.time_at(i)))
    }

    /// Resolve the sample index closest to `t`, together with the signed
    /// time error `t - time_at(index)`.
    ///
    /// # Errors
    /// - [`SeriesError::OutOfRange`] if `t` lies outside
    ///   `[start_offset, end_time]` by more than `dt / 2`, or if the axis is
    ///   empty. Clamp-versus-reject at the boundary is a caller policy; the
    ///   axis itself always rejects.
    pub fn nearest_index(&self, t: f64) -> SeriesResult<(usize, f64)> {
        let start = self.start_offset;
        let end = self.end_time();
        if self.n_samples == 0 || !t.is_finite() {
            return Err(SeriesError::OutOfRange { t, start, end });
        }
        let half = self.dt / 2.0;
        if t < start - half || t > end + half {
            return Err(SeriesError::OutOfRange { t, start, end });
        }
        let raw = ((t - start) / self.dt).round();
        let index = if raw < 0.0 {
            0
        } else {
            (raw as usize).min(self.n_samples - 1)
        };
        Ok((index, t - self.time_at(index)))
    }

    /// Shift the origin in place: `start_offset += delta`.
    ///
    /// Mutation primitive for higher layers that manage their own copying
    /// and their own event bookkeeping; see the module docs for the pairing
    /// rule with `EventRegistry::shift_all`.
    pub fn shift_start(&mut self, delta: f64) {
        self.start_offset += delta;
    }

    /// Derive a new axis covering `n_samples` samples starting at
    /// `first_sample`.
    ///
    /// When `first_sample_time` is `None` the subset keeps absolute
    /// alignment with the parent (`start_offset = time_at(first_sample)`);
    /// when it is `Some(t)` the subset is re-anchored so that its first
    /// sample sits at `t` (used to zero a subset's time).
    ///
    /// # Errors
    /// - [`SeriesError::InvalidRange`] if the window does not fit inside the
    ///   parent axis.
    pub fn subset_axis(
        &self, first_sample: usize, n_samples: usize, first_sample_time: Option<f64>,
    ) -> SeriesResult<TimeAxis> {
        if first_sample + n_samples > self.n_samples {
            return Err(SeriesError::InvalidRange {
                start: first_sample,
                stop: first_sample + n_samples,
            });
        }
        let start_offset = first_sample_time.unwrap_or_else(|| self.time_at(first_sample));
        Ok(TimeAxis {
            dt: self.dt,
            n_samples,
            start_offset,
            start_datetime: self.start_datetime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::errors::SeriesError;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction validation (`dt` positivity/finiteness).
    // - Index ↔ time arithmetic: `end_time`, `time_at`, `nearest_index`
    //   including the half-sample acceptance band and signed errors.
    // - Origin shifting and subset-axis derivation (aligned and re-zeroed).
    //
    // They intentionally DO NOT cover:
    // - The axis/event atomic-shift pairing; that lives in the data
    //   container's tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `with_start` accepts a valid configuration and that the
    // derived end time follows `start + (n - 1) * dt`.
    fn with_start_accepts_valid_axis() {
        let axis = TimeAxis::with_start(0.01, 1000, 2.0).expect("valid axis");
        assert_eq!(axis.dt(), 0.01);
        assert_eq!(axis.n_samples(), 1000);
        assert!((axis.end_time() - (2.0 + 999.0 * 0.01)).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ensure non-positive and non-finite spacings are rejected.
    fn new_rejects_bad_spacing() {
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = TimeAxis::new(dt, 10).unwrap_err();
            match err {
                SeriesError::InvalidSampleSpacing { .. } => {}
                other => panic!("expected InvalidSampleSpacing, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify nearest-index resolution on-grid, off-grid (signed error), and
    // inside the half-sample band beyond each end.
    fn nearest_index_resolves_and_reports_error() {
        let axis = TimeAxis::new(0.1, 11).expect("valid axis"); // covers [0.0, 1.0]

        let (idx, err) = axis.nearest_index(0.5).expect("on-grid");
        assert_eq!(idx, 5);
        assert!(err.abs() < 1e-12);

        let (idx, err) = axis.nearest_index(0.52).expect("off-grid");
        assert_eq!(idx, 5);
        assert!((err - 0.02).abs() < 1e-12);

        // Within dt/2 past the last sample: clamps to the last index.
        let (idx, err) = axis.nearest_index(1.04).expect("inside band");
        assert_eq!(idx, 10);
        assert!((err - 0.04).abs() < 1e-12);

        // Within dt/2 before the first sample: clamps to index 0.
        let (idx, _) = axis.nearest_index(-0.04).expect("inside band");
        assert_eq!(idx, 0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure queries beyond the half-sample band are rejected, and that an
    // empty axis rejects everything.
    fn nearest_index_rejects_out_of_range() {
        let axis = TimeAxis::new(0.1, 11).expect("valid axis");
        match axis.nearest_index(1.2).unwrap_err() {
            SeriesError::OutOfRange { t, .. } => assert_eq!(t, 1.2),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
        assert!(axis.nearest_index(-0.2).is_err());

        let empty = TimeAxis::new(0.1, 0).expect("valid axis");
        assert!(empty.nearest_index(0.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Verify `shift_start` moves the origin and nothing else.
    fn shift_start_moves_origin_only() {
        let mut axis = TimeAxis::new(0.5, 4).expect("valid axis");
        axis.shift_start(-1.0);
        assert_eq!(axis.start_offset(), -1.0);
        assert_eq!(axis.dt(), 0.5);
        assert_eq!(axis.n_samples(), 4);
        assert!((axis.end_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify subset derivation: absolute alignment by default, explicit
    // re-anchoring when a first-sample time is supplied, and rejection of
    // windows that overrun the parent.
    fn subset_axis_aligned_and_rezeroed() {
        let axis = TimeAxis::new(0.1, 100).expect("valid axis");

        let aligned = axis.subset_axis(20, 30, None).expect("window fits");
        assert!((aligned.start_offset() - 2.0).abs() < 1e-12);
        assert_eq!(aligned.n_samples(), 30);

        let zeroed = axis.subset_axis(20, 30, Some(0.0)).expect("window fits");
        assert_eq!(zeroed.start_offset(), 0.0);
        assert_eq!(zeroed.dt(), axis.dt());

        match axis.subset_axis(90, 20, None).unwrap_err() {
            SeriesError::InvalidRange { .. } => {}
            other => panic!("expected InvalidRange, got {other:?}"),
        }
    }
}
