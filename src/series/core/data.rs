//! The data container — samples bound to a time axis and event registry.
//!
//! Purpose
//! -------
//! Bind a 3-D sample array `[n_samples, n_channels, n_reps]` to an owned
//! [`TimeAxis`] and [`EventRegistry`], together with a unit label and an
//! append-only history log. This is the central value type of the crate:
//! every transform and every subset extraction produces or mutates one of
//! these.
//!
//! Key behaviors
//! -------------
//! - Enforce the shape invariant `samples.shape()[0] == time.n_samples()`
//!   at every construction site.
//! - Provide the copy-versus-mutate duality by construction: each transform
//!   exists as a pure method returning a new series and an explicit
//!   `_in_place` twin mutating the receiver. The pure variant clones and
//!   delegates, so both paths share one body.
//! - Own the atomic time-shift: [`DataSeries::shift_time`] is the only code
//!   that moves the axis origin and the event times, and it always moves
//!   both.
//! - Validate history entries at insertion; malformed entries are rejected,
//!   never deferred.
//!
//! Invariants & assumptions
//! ------------------------
//! - `samples.shape()[0] == time.n_samples()` at all times.
//! - A cloned series shares no mutable state with its source: `Array3`
//!   owns its buffer and clones deeply, and the axis, registry, unit
//!   string, and history are all plain owned values.
//! - Sample values are not validated for finiteness; NaN propagation is
//!   the caller's concern, matching how numeric arrays flow through the
//!   rest of the stack.
//!
//! Conventions
//! -----------
//! - Axis 0 is time, axis 1 is channels, axis 2 is repetitions.
//! - History entries are single-line human-readable strings naming the
//!   operation and its arguments.
//!
//! Downstream usage
//! ----------------
//! - The subset/alignment engine (`series::subset`) extracts spans through
//!   [`DataSeries::extract_span`] and re-zeroes through the same atomic
//!   shift path as every other caller.
//! - Plotting-style consumers read `(samples, times)` pairs via
//!   [`DataSeries::raw_data_and_time`] without touching internals.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction validation, deep-copy independence,
//!   the atomic shift pairing, zeroing round-trips, history validation,
//!   and span extraction bounds.
use ndarray::{s, Array1, Array3, ArrayView3};

use crate::series::core::events::EventRegistry;
use crate::series::core::options::DuplicatePolicy;
use crate::series::core::time_axis::TimeAxis;
use crate::series::errors::{SeriesError, SeriesResult};

/// DataSeries — a multi-dimensional sample array bound to its time axis,
/// event registry, unit label, and history log.
///
/// Purpose
/// -------
/// Represent one series: `[n_samples, n_channels, n_reps]` samples plus the
/// metadata needed to interpret them. The container owns all of its parts;
/// copying a series copies everything.
///
/// Fields
/// ------
/// - `samples`: `Array3<f64>`
///   Sample values; axis 0 must agree with the time axis.
/// - `time`: [`TimeAxis`]
///   Index ↔ time mapping, exclusively owned.
/// - `events`: [`EventRegistry`]
///   Named occurrence lists, exclusively owned, always shifted together
///   with the axis.
/// - `units`: `String`
///   Current unit label, converted through a `UnitTable`.
/// - `history`: `Vec<String>`
///   Ordered operation log; entries validated at insertion.
///
/// Invariants
/// ----------
/// - `samples.shape()[0] == time.n_samples()`.
/// - Event times and the axis origin live in the same reference frame and
///   only move together through [`DataSeries::shift_time`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataSeries {
    samples: Array3<f64>,
    time: TimeAxis,
    events: EventRegistry,
    units: String,
    history: Vec<String>,
}

impl DataSeries {
    /// Bind a sample array to an explicit time axis.
    ///
    /// # Errors
    /// - [`SeriesError::SampleCountMismatch`] if axis 0 of `samples`
    ///   disagrees with `time.n_samples()`.
    pub fn new(samples: Array3<f64>, time: TimeAxis) -> SeriesResult<Self> {
        if samples.shape()[0] != time.n_samples() {
            return Err(SeriesError::SampleCountMismatch {
                axis: time.n_samples(),
                samples: samples.shape()[0],
            });
        }
        Ok(DataSeries {
            samples,
            time,
            events: EventRegistry::new(),
            units: String::new(),
            history: Vec::new(),
        })
    }

    /// Bind a sample array to a fresh axis with spacing `dt` starting at
    /// offset `0.0`.
    ///
    /// # Errors
    /// - [`SeriesError::InvalidSampleSpacing`] if `dt` is non-finite or ≤ 0.
    pub fn from_dt(samples: Array3<f64>, dt: f64) -> SeriesResult<Self> {
        let time = TimeAxis::new(dt, samples.shape()[0])?;
        Self::new(samples, time)
    }

    /// Builder-style unit label.
    pub fn with_units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    /// Builder-style event registration (append policy).
    ///
    /// # Errors
    /// - [`SeriesError::NonFiniteEventTime`] for NaN/±inf occurrence times.
    pub fn with_event(mut self, name: &str, times: &[f64]) -> SeriesResult<Self> {
        self.events.add(name, times, DuplicatePolicy::Append)?;
        Ok(self)
    }

    /// Builder-style seed history entry.
    ///
    /// # Errors
    /// - [`SeriesError::MalformedHistoryEntry`] for empty or multi-line
    ///   entries.
    pub fn with_history(mut self, entry: &str) -> SeriesResult<Self> {
        self.push_history(entry)?;
        Ok(self)
    }

    // ---- Accessors ----

    /// Sample array `[n_samples, n_channels, n_reps]`.
    pub fn samples(&self) -> &Array3<f64> {
        &self.samples
    }

    /// The owned time axis.
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// The owned event registry.
    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Register an event on this series.
    ///
    /// # Errors
    /// - [`SeriesError::NonFiniteEventTime`] for NaN/±inf times.
    /// - [`SeriesError::DuplicateEvent`] under [`DuplicatePolicy::Reject`].
    pub fn add_event(
        &mut self, name: &str, times: &[f64], policy: DuplicatePolicy,
    ) -> SeriesResult<()> {
        self.events.add(name, times, policy)
    }

    /// Current unit label.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Operation history, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Number of samples along the time axis.
    pub fn n_samples(&self) -> usize {
        self.samples.shape()[0]
    }

    /// Number of channels.
    pub fn n_channels(&self) -> usize {
        self.samples.shape()[1]
    }

    /// Number of repetitions.
    pub fn n_reps(&self) -> usize {
        self.samples.shape()[2]
    }

    /// `(samples, times)` pair for plotting-style consumers.
    pub fn raw_data_and_time(&self) -> (ArrayView3<'_, f64>, Array1<f64>) {
        (self.samples.view(), self.time.times())
    }

    // ---- History ----

    /// Append a history entry, validating it at insertion.
    ///
    /// # Errors
    /// - [`SeriesError::MalformedHistoryEntry`] if the entry is empty or
    ///   contains control characters (history is a log of single-line,
    ///   human-readable operation descriptions).
    pub fn push_history(&mut self, entry: &str) -> SeriesResult<()> {
        if entry.trim().is_empty() {
            return Err(SeriesError::MalformedHistoryEntry {
                reason: "entry must be non-empty",
            });
        }
        if entry.chars().any(|c| c.is_control()) {
            return Err(SeriesError::MalformedHistoryEntry {
                reason: "entry must be a single line without control characters",
            });
        }
        self.history.push(entry.to_string());
        Ok(())
    }

    // ---- Time shifting / zeroing ----

    /// Shift the series' time origin by `delta`.
    ///
    /// The axis origin and every event occurrence move together in one
    /// step; this is the only code path through which either may move, so
    /// event and axis state cannot desynchronize.
    pub fn shift_time(&mut self, delta: f64) {
        self.time.shift_start(delta);
        self.events.shift_all(delta);
    }

    /// New series whose time origin is zeroed at `t` (the sample frame is
    /// shifted by `-t`). Pure twin of [`DataSeries::zero_time_at_in_place`].
    pub fn zero_time_at(&self, t: f64) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.zero_time_at_in_place(t)?;
        Ok(out)
    }

    /// Zero the time origin at `t` in place.
    ///
    /// # Errors
    /// - [`SeriesError::OutOfRange`] if `t` is non-finite.
    pub fn zero_time_at_in_place(&mut self, t: f64) -> SeriesResult<()> {
        if !t.is_finite() {
            return Err(SeriesError::OutOfRange {
                t,
                start: self.time.start_offset(),
                end: self.time.end_time(),
            });
        }
        self.shift_time(-t);
        self.push_history(&format!("zero_time_at(t={t})"))
    }

    /// New series zeroed at the single occurrence of the named event. Pure
    /// twin of [`DataSeries::zero_time_by_event_in_place`].
    pub fn zero_time_by_event(&self, name: &str) -> SeriesResult<DataSeries> {
        let mut out = self.clone();
        out.zero_time_by_event_in_place(name)?;
        Ok(out)
    }

    /// Zero the time origin at the single occurrence of the named event,
    /// in place.
    ///
    /// # Errors
    /// - [`SeriesError::UnknownEvent`] if the event is absent.
    /// - [`SeriesError::AmbiguousEvent`] if it does not have exactly one
    ///   occurrence.
    pub fn zero_time_by_event_in_place(&mut self, name: &str) -> SeriesResult<()> {
        let t = self.events.single_occurrence(name)?;
        self.shift_time(-t);
        self.push_history(&format!("zero_time_by_event(name={name}, t={t})"))
    }

    // ---- Crate-internal mutation helpers for transforms ----

    /// Swap in a new sample array of the same length along axis 0.
    pub(crate) fn replace_samples(&mut self, samples: Array3<f64>) {
        debug_assert_eq!(samples.shape()[0], self.time.n_samples());
        self.samples = samples;
    }

    /// Swap in a new sample array together with its matching axis.
    pub(crate) fn replace_samples_and_axis(&mut self, samples: Array3<f64>, time: TimeAxis) {
        debug_assert_eq!(samples.shape()[0], time.n_samples());
        self.samples = samples;
        self.time = time;
    }

    /// Replace the unit label without touching sample values.
    pub(crate) fn set_units(&mut self, units: &str) {
        self.units = units.to_string();
    }

    /// Apply a scalar function to every sample in place.
    pub(crate) fn map_samples(&mut self, f: impl Fn(f64) -> f64) {
        self.samples.mapv_inplace(f);
    }

    // ---- Span extraction ----

    /// Extract the inclusive sample window `[start, stop]` as a new series.
    ///
    /// The derived axis keeps absolute alignment with the parent; events
    /// and history are carried over and a history entry records the window.
    /// Used by the subset engine; callers pass spans already resolved and
    /// clamped by it.
    ///
    /// # Errors
    /// - [`SeriesError::InvalidRange`] if `stop < start` or the window
    ///   overruns the series.
    pub fn extract_span(&self, start: usize, stop: usize) -> SeriesResult<DataSeries> {
        if stop < start || stop >= self.n_samples() {
            return Err(SeriesError::InvalidRange { start, stop });
        }
        let n = stop - start + 1;
        let samples = self.samples.slice(s![start..=stop, .., ..]).to_owned();
        let time = self.time.subset_axis(start, n, None)?;
        let mut out = DataSeries {
            samples,
            time,
            events: self.events.clone(),
            units: self.units.clone(),
            history: self.history.clone(),
        };
        out.push_history(&format!("extract_span(start={start}, stop={stop})"))?;
        Ok(out)
    }
}
