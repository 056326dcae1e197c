//! Numeric transforms on [`DataSeries`] — decimation, filtering, unit
//! conversion, elementwise math, and event-relative windowing.
//!
//! Purpose
//! -------
//! Implement the value-producing operations of the container. Every
//! transform obeys the copy-versus-mutate duality: a pure method returning
//! a new series and an `_in_place` twin mutating the receiver, with the
//! pure variant implemented as clone-then-delegate so both paths share one
//! body. Each successful transform appends one history entry.
//!
//! Invariants & assumptions
//! ------------------------
//! - Transforms never move the time origin except through
//!   `DataSeries::shift_time`; decimation re-labels the axis (new spacing,
//!   bin-center start) but leaves the reference frame and the event times
//!   untouched.
//! - Failed transforms leave the receiver unmodified: every `_in_place`
//!   body validates before it writes.
//!
//! Conventions
//! -----------
//! - Per-channel/per-repetition operations iterate lanes along axis 0; the
//!   reduction or recursion itself is straight-line array arithmetic.
use ndarray::{s, Array3, Axis};

use crate::series::core::data::DataSeries;
use crate::series::core::options::{AlignOptions, DecimateApproach, FilterCoeffs};
use crate::series::core::time_axis::TimeAxis;
use crate::series::core::units::UnitTable;
use crate::series::errors::{SeriesError, SeriesResult};

impl DataSeries {
    // ---- Decimation ----

    /// New series decimated into fixed-width bins. Pure twin of
    /// [`DataSeries::decimate_in_place`].
    pub fn decimate(
        &self, bin_width: f64, approach: DecimateApproach,
    ) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.decimate_in_place(bin_width, approach)?;
        Ok(out)
    }

    /// Decimate in place.
    ///
    /// Samples are partitioned into non-overlapping bins of `bin_width`
    /// rounded to a whole number of source samples; a trailing partial bin
    /// is dropped. Each bin is reduced with `approach`. The new axis has
    /// `dt = bin_samples * dt_old` and its start is shifted by half the new
    /// dt so bin values sit at bin centers.
    ///
    /// # Errors
    /// - [`SeriesError::InvalidBinWidth`] if `bin_width` is non-finite,
    ///   non-positive, rounds to zero samples, or exceeds the series.
    pub fn decimate_in_place(
        &mut self, bin_width: f64, approach: DecimateApproach,
    ) -> SeriesResult<()> {
        let dt = self.time().dt();
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(SeriesError::InvalidBinWidth { bin_width, dt });
        }
        let bin_samples = (bin_width / dt).round() as usize;
        if bin_samples == 0 || bin_samples > self.n_samples() {
            return Err(SeriesError::InvalidBinWidth { bin_width, dt });
        }

        let n_bins = self.n_samples() / bin_samples;
        let (n_ch, n_reps) = (self.n_channels(), self.n_reps());
        let mut binned = Array3::zeros((n_bins, n_ch, n_reps));
        for b in 0..n_bins {
            let lo = b * bin_samples;
            let hi = lo + bin_samples;
            for c in 0..n_ch {
                for r in 0..n_reps {
                    let bin = self.samples().slice(s![lo..hi, c, r]);
                    binned[[b, c, r]] = approach.reduce(bin);
                }
            }
        }

        let new_dt = bin_samples as f64 * dt;
        let start = self.time().start_offset() + new_dt / 2.0;
        let mut axis = TimeAxis::with_start(new_dt, n_bins, start)?;
        if let Some(anchor) = self.time().start_datetime() {
            axis = axis.with_datetime(anchor);
        }
        self.replace_samples_and_axis(binned, axis);
        self.push_history(&format!(
            "decimate(bin_width={bin_width}, approach={})",
            approach.label()
        ))
    }

    // ---- Filtering ----

    /// New filtered series. Pure twin of [`DataSeries::filter_in_place`].
    pub fn filter(&self, coeffs: &FilterCoeffs) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.filter_in_place(coeffs)?;
        Ok(out)
    }

    /// Apply the normalized difference equation
    /// `y[n] = Σ b[k] x[n-k] − Σ_{k≥1} a[k] y[n-k]` causally along the time
    /// axis, independently per channel and repetition.
    pub fn filter_in_place(&mut self, coeffs: &FilterCoeffs) -> SeriesResult<()> {
        let (n, n_ch, n_reps) = (self.n_samples(), self.n_channels(), self.n_reps());
        let (b, a) = (coeffs.b(), coeffs.a());
        let mut filtered = Array3::zeros((n, n_ch, n_reps));
        for c in 0..n_ch {
            for r in 0..n_reps {
                for i in 0..n {
                    let mut y = 0.0;
                    for (k, &bk) in b.iter().enumerate() {
                        if i >= k {
                            y += bk * self.samples()[[i - k, c, r]];
                        }
                    }
                    for (k, &ak) in a.iter().enumerate().skip(1) {
                        if i >= k {
                            y -= ak * filtered[[i - k, c, r]];
                        }
                    }
                    filtered[[i, c, r]] = y;
                }
            }
        }
        self.replace_samples(filtered);
        self.push_history(&format!("filter(nb={}, na={})", b.len(), a.len()))
    }

    // ---- Baseline / units ----

    /// New series with per-channel, per-repetition means removed. Pure twin
    /// of [`DataSeries::mean_subtract_in_place`].
    pub fn mean_subtract(&self) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.mean_subtract_in_place()?;
        Ok(out)
    }

    /// Remove each (channel, repetition) lane's mean over time, in place.
    /// An empty series is a no-op apart from the history entry.
    pub fn mean_subtract_in_place(&mut self) -> SeriesResult<()> {
        if self.n_samples() > 0 {
            let means = self.samples().mean_axis(Axis(0)).expect("non-empty time axis");
            let mut samples = self.samples().clone();
            for c in 0..self.n_channels() {
                for r in 0..self.n_reps() {
                    let m = means[[c, r]];
                    samples.slice_mut(s![.., c, r]).mapv_inplace(|v| v - m);
                }
            }
            self.replace_samples(samples);
        }
        self.push_history("mean_subtract()")
    }

    /// New series converted to `target` units. Pure twin of
    /// [`DataSeries::change_units_in_place`].
    pub fn change_units(&self, target: &str, table: &UnitTable) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.change_units_in_place(target, table)?;
        Ok(out)
    }

    /// Convert the series to `target` units in place by the table's
    /// multiplicative factor.
    ///
    /// # Errors
    /// - [`SeriesError::IncompatibleUnits`] if the table has no rule from
    ///   the current unit to `target`.
    pub fn change_units_in_place(&mut self, target: &str, table: &UnitTable) -> SeriesResult<()> {
        let from = self.units().to_string();
        let factor = table.factor(&from, target)?;
        let mut samples = self.samples().clone();
        samples.mapv_inplace(|v| v * factor);
        self.replace_samples(samples);
        self.set_units(target);
        self.push_history(&format!("change_units(from={from}, to={target})"))
    }

    // ---- Elementwise math ----

    /// New series with `value` added to every sample.
    pub fn add(&self, value: f64) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.add_in_place(value)?;
        Ok(out)
    }

    /// Add `value` to every sample in place.
    pub fn add_in_place(&mut self, value: f64) -> SeriesResult<()> {
        self.map_samples(|v| v + value);
        self.push_history(&format!("add(value={value})"))
    }

    /// New series with `value` subtracted from every sample.
    pub fn subtract(&self, value: f64) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.subtract_in_place(value)?;
        Ok(out)
    }

    /// Subtract `value` from every sample in place.
    pub fn subtract_in_place(&mut self, value: f64) -> SeriesResult<()> {
        self.map_samples(|v| v - value);
        self.push_history(&format!("subtract(value={value})"))
    }

    /// New series of absolute values.
    pub fn abs(&self) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.abs_in_place()?;
        Ok(out)
    }

    /// Replace every sample with its absolute value, in place.
    pub fn abs_in_place(&mut self) -> SeriesResult<()> {
        self.map_samples(f64::abs);
        self.push_history("abs()")
    }

    /// New series with every sample raised to `exponent`.
    pub fn power(&self, exponent: f64) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.power_in_place(exponent)?;
        Ok(out)
    }

    /// Raise every sample to `exponent` in place.
    pub fn power_in_place(&mut self, exponent: f64) -> SeriesResult<()> {
        self.map_samples(|v| v.powf(exponent));
        self.push_history(&format!("power(exponent={exponent})"))
    }

    // ---- Event-relative windowing ----

    /// Extract a fixed-width window around each occurrence time, stacking
    /// the windows along the repetition axis.
    ///
    /// The window `[t + window.0, t + window.1]` is resolved to sample
    /// indices once, from the first occurrence; every later occurrence
    /// reuses that sample count so all repetitions line up. The output axis
    /// is event-relative: its start is the first window's offset from its
    /// occurrence. Events are not carried over (their absolute times have
    /// no single meaning across stacked repetitions); history is carried
    /// and extended.
    ///
    /// # Errors
    /// - [`SeriesError::UnsupportedShape`] if the source has more than one
    ///   repetition.
    /// - [`SeriesError::NoEventTimes`] if `event_times` is empty.
    /// - [`SeriesError::InvalidWindow`] if the window is inverted or
    ///   non-finite.
    /// - [`SeriesError::OutOfRange`] if any occurrence's window leaves the
    ///   axis.
    pub fn aligned_to_event(
        &self, event_times: &[f64], window: (f64, f64), options: &AlignOptions,
    ) -> SeriesResult<DataSeries> {
        if self.n_reps() != 1 {
            return Err(SeriesError::UnsupportedShape { n_reps: self.n_reps() });
        }
        let (lo, hi) = window;
        if !lo.is_finite() || !hi.is_finite() {
            return Err(SeriesError::InvalidWindow {
                lo,
                hi,
                reason: "window bounds must be finite",
            });
        }
        if lo >= hi {
            return Err(SeriesError::InvalidWindow {
                lo,
                hi,
                reason: "window start must precede window end",
            });
        }
        let first = *event_times.first().ok_or(SeriesError::NoEventTimes)?;

        // Window length in samples is fixed by the first occurrence.
        let (first_start, _) = self.time().nearest_index(first + lo)?;
        let (first_stop, _) = self.time().nearest_index(first + hi)?;
        if first_stop < first_start {
            return Err(SeriesError::InvalidWindow {
                lo,
                hi,
                reason: "window spans no samples",
            });
        }
        let win_len = first_stop - first_start + 1;

        let n_ch = self.n_channels();
        let mut stacked = Array3::zeros((win_len, n_ch, event_times.len()));
        for (rep, &t) in event_times.iter().enumerate() {
            let (start, _) = self.time().nearest_index(t + lo)?;
            if start + win_len > self.n_samples() {
                return Err(SeriesError::OutOfRange {
                    t: t + hi,
                    start: self.time().start_offset(),
                    end: self.time().end_time(),
                });
            }
            stacked
                .slice_mut(s![.., .., rep])
                .assign(&self.samples().slice(s![start..start + win_len, .., 0]));
        }

        // Event-relative axis: exact grid offset of the first window from
        // its occurrence time.
        let start_offset = self.time().time_at(first_start) - first;
        let mut axis = TimeAxis::with_start(self.time().dt(), win_len, start_offset)?;
        if let Some(anchor) = self.time().start_datetime() {
            axis = axis.with_datetime(anchor);
        }

        let label = options.base_name.as_deref().unwrap_or("event");
        let mut out = DataSeries::new(stacked, axis)?.with_units(self.units());
        for entry in self.history() {
            out.push_history(entry)?;
        }
        out.push_history(&format!(
            "aligned_to_event(name={label}, n={}, window=[{lo}, {hi}])",
            event_times.len()
        ))?;
        Ok(out)
    }
}
