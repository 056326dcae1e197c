//! Errors for event-aligned series containers (axis validation, event
//! lookup, subset resolution, unit conversion, and batch aggregation).
//!
//! This module defines a single crate-wide error type, [`SeriesError`], used
//! across the core containers and the subset/alignment engine. It implements
//! `Display`/`Error` and carries structured payloads so callers can match on
//! the exact violation.
//!
//! ## Conventions
//! - **Indices are 0-based** and sample spans are inclusive on both ends.
//! - All errors are raised synchronously at the call that detects the
//!   violation; none are transient and none are retried internally.
//! - Batch operations fail fast: the first invalid series aborts the whole
//!   batch with the offending series' position in the payload, and no
//!   partial application of a transform is observable afterwards.

/// Crate-wide result alias for operations that may produce [`SeriesError`].
pub type SeriesResult<T> = Result<T, SeriesError>;

/// Unified error type for series containers and the subset/alignment engine.
///
/// Covers time-axis validation, event-registry lookups, subset/span
/// resolution, window extraction, unit conversion, history logging, and
/// batch-level aggregation decisions. Implements `Display`/`Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    // ---- Time axis ----
    /// A query time lies outside the axis by more than half a sample width.
    OutOfRange { t: f64, start: f64, end: f64 },

    /// Sample spacing must be finite and strictly positive.
    InvalidSampleSpacing { dt: f64 },

    /// Sample array length disagrees with the time axis.
    SampleCountMismatch { axis: usize, samples: usize },

    // ---- Event registry ----
    /// No event with the given name is registered.
    UnknownEvent { name: String },

    /// An event with the given name already exists and the registry policy
    /// forbids appending to it.
    DuplicateEvent { name: String },

    /// An event was required to have exactly one occurrence.
    AmbiguousEvent { name: String, count: usize },

    /// Event occurrence times must be finite.
    NonFiniteEventTime { name: String, value: f64 },

    /// An occurrence index points past the event's occurrence list.
    OccurrenceOutOfRange { name: String, index: usize, count: usize },

    // ---- Subset / span resolution ----
    /// A resolved stop sample precedes the resolved start sample.
    InvalidRange { start: usize, stop: usize },

    /// Start and stop references resolved to different occurrence counts.
    MismatchedOccurrences { start_count: usize, stop_count: usize },

    /// A per-series time list does not match the batch length.
    MismatchedTimes { expected: usize, actual: usize },

    // ---- Window extraction ----
    /// Event-relative windowing requires a single-repetition source.
    UnsupportedShape { n_reps: usize },

    /// A time window is empty, inverted, or non-finite.
    InvalidWindow { lo: f64, hi: f64, reason: &'static str },

    /// No event occurrence times were supplied for window extraction.
    NoEventTimes,

    // ---- Decimation ----
    /// Bin width must round to at least one source sample and at most the
    /// series length.
    InvalidBinWidth { bin_width: f64, dt: f64 },

    // ---- Filtering ----
    /// Filter coefficients failed validation.
    InvalidFilterCoeffs { reason: &'static str },

    // ---- Units ----
    /// No conversion rule exists between the two units.
    IncompatibleUnits { from: String, to: String },

    /// Series in a batch carry different current units.
    MixedUnits { expected: String, found: String },

    // ---- Batch aggregation ----
    /// A series resolved to multiple spans and the caller did not request
    /// un-collapsed output.
    AmbiguousAggregation { series_index: usize, spans: usize },

    /// Span splitting requires exactly one span per series.
    NotSplitEligible { series_index: usize, spans: usize },

    /// Split configuration is invalid (zero parts, bad percentages, or
    /// sub-spans that would be empty).
    InvalidSplit { reason: &'static str },

    /// A batch operation was invoked on an empty batch.
    EmptyBatch,

    // ---- History / records ----
    /// A history entry was rejected at the point of insertion.
    MalformedHistoryEntry { reason: &'static str },

    /// A serialized record's declared shape disagrees with its sample count.
    RecordShapeMismatch { declared: usize, actual: usize },
}

impl std::error::Error for SeriesError {}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Time axis ----
            SeriesError::OutOfRange { t, start, end } => {
                write!(f, "Time {t} lies outside the axis range [{start}, {end}] by more than half a sample width")
            }
            SeriesError::InvalidSampleSpacing { dt } => {
                write!(f, "Sample spacing must be finite and > 0, got {dt}")
            }
            SeriesError::SampleCountMismatch { axis, samples } => {
                write!(f, "Time axis covers {axis} samples but the sample array has {samples}")
            }
            // ---- Event registry ----
            SeriesError::UnknownEvent { name } => {
                write!(f, "Unknown event: '{name}'")
            }
            SeriesError::DuplicateEvent { name } => {
                write!(f, "Event '{name}' already exists and the registry policy rejects duplicates")
            }
            SeriesError::AmbiguousEvent { name, count } => {
                write!(f, "Event '{name}' must have exactly one occurrence, found {count}")
            }
            SeriesError::NonFiniteEventTime { name, value } => {
                write!(f, "Event '{name}' carries a non-finite occurrence time: {value}")
            }
            SeriesError::OccurrenceOutOfRange { name, index, count } => {
                write!(f, "Occurrence index {index} is out of range for event '{name}' with {count} occurrences")
            }
            // ---- Subset / span resolution ----
            SeriesError::InvalidRange { start, stop } => {
                write!(f, "Resolved stop sample {stop} precedes start sample {start}")
            }
            SeriesError::MismatchedOccurrences { start_count, stop_count } => {
                write!(f, "Start reference resolved to {start_count} occurrences but stop reference resolved to {stop_count}")
            }
            SeriesError::MismatchedTimes { expected, actual } => {
                write!(f, "Expected {expected} reference times (one per series), got {actual}")
            }
            // ---- Window extraction ----
            SeriesError::UnsupportedShape { n_reps } => {
                write!(f, "Event-relative windowing requires a single-repetition source, got {n_reps} repetitions")
            }
            SeriesError::InvalidWindow { lo, hi, reason } => {
                write!(f, "Invalid time window [{lo}, {hi}]: {reason}")
            }
            SeriesError::NoEventTimes => {
                write!(f, "At least one event occurrence time is required for window extraction")
            }
            // ---- Decimation ----
            SeriesError::InvalidBinWidth { bin_width, dt } => {
                write!(f, "Bin width {bin_width} is invalid for sample spacing {dt}: it must round to at least one sample and fit inside the series")
            }
            // ---- Filtering ----
            SeriesError::InvalidFilterCoeffs { reason } => {
                write!(f, "Invalid filter coefficients: {reason}")
            }
            // ---- Units ----
            SeriesError::IncompatibleUnits { from, to } => {
                write!(f, "No conversion is defined from '{from}' to '{to}'")
            }
            SeriesError::MixedUnits { expected, found } => {
                write!(f, "All series in a batch must share one unit before converting: expected '{expected}', found '{found}'")
            }
            // ---- Batch aggregation ----
            SeriesError::AmbiguousAggregation { series_index, spans } => {
                write!(f, "Series {series_index} resolved to {spans} spans; request un-collapsed output to extract multiple spans per series")
            }
            SeriesError::NotSplitEligible { series_index, spans } => {
                write!(f, "Span splitting requires exactly one span per series; series {series_index} resolved to {spans}")
            }
            SeriesError::InvalidSplit { reason } => {
                write!(f, "Invalid split configuration: {reason}")
            }
            SeriesError::EmptyBatch => {
                write!(f, "Batch operations require at least one series")
            }
            // ---- History / records ----
            SeriesError::MalformedHistoryEntry { reason } => {
                write!(f, "Rejected history entry: {reason}")
            }
            SeriesError::RecordShapeMismatch { declared, actual } => {
                write!(f, "Record declares {declared} samples but carries {actual}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Display formatting for a representative subset of variants, so error
    //   messages keep carrying their structured payloads.
    //
    // They intentionally DO NOT cover:
    // - The conditions under which each variant is raised; those are tested
    //   next to the code that raises them.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that payload fields appear in the rendered message for the
    // variants callers are most likely to log verbatim.
    fn display_includes_payload_fields() {
        let out_of_range = SeriesError::OutOfRange { t: 12.5, start: 0.0, end: 10.0 };
        assert!(out_of_range.to_string().contains("12.5"));
        assert!(out_of_range.to_string().contains("[0, 10]"));

        let unknown = SeriesError::UnknownEvent { name: "stim".to_string() };
        assert!(unknown.to_string().contains("stim"));

        let mixed = SeriesError::MixedUnits {
            expected: "mV".to_string(),
            found: "uV".to_string(),
        };
        assert!(mixed.to_string().contains("mV"));
        assert!(mixed.to_string().contains("uV"));
    }

    #[test]
    // Purpose
    // -------
    // Verify that `SeriesError` satisfies the `std::error::Error` contract so
    // it can be boxed and propagated through generic error plumbing.
    fn implements_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(SeriesError::EmptyBatch);
        assert!(!err.to_string().is_empty());
    }
}
