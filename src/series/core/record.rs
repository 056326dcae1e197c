//! Plain-record serialization boundary for [`DataSeries`].
//!
//! Purpose
//! -------
//! Define the flat, serde-friendly interchange shape used for persistence
//! and interop: samples as a declared shape plus a row-major value vector,
//! the axis parameters, events as name/times pairs, the unit label, and the
//! history log. [`DataSeries::export`] and [`DataSeries::from_record`]
//! round-trip every field exactly.
//!
//! Invariants & assumptions
//! ------------------------
//! - `shape` multiplies out to `samples.len()`; mismatches are rejected at
//!   import with [`SeriesError::RecordShapeMismatch`] before any allocation
//!   is interpreted.
//! - Imported records pass through the same validation as ordinary
//!   construction: axis spacing, event finiteness, and history entries are
//!   re-checked rather than trusted.
//!
//! Conventions
//! -----------
//! - Sample order is row-major over `[n_samples, n_channels, n_reps]`,
//!   matching `ndarray`'s logical iteration order.
//! - `start_datetime` serializes through chrono's serde support (RFC 3339
//!   in JSON).
use chrono::{DateTime, Utc};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::series::core::data::DataSeries;
use crate::series::core::options::DuplicatePolicy;
use crate::series::core::time_axis::TimeAxis;
use crate::series::errors::{SeriesError, SeriesResult};

/// One event's name and occurrence times in a serialized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub times: Vec<f64>,
}

/// Flat interchange form of a [`DataSeries`].
///
/// Fields mirror the container one-to-one; see the module docs for the
/// sample ordering and validation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    /// `[n_samples, n_channels, n_reps]`.
    pub shape: [usize; 3],
    /// Sample values in row-major order over `shape`.
    pub samples: Vec<f64>,
    pub dt: f64,
    pub start_offset: f64,
    pub start_datetime: Option<DateTime<Utc>>,
    pub events: Vec<EventRecord>,
    pub units: String,
    pub history: Vec<String>,
}

impl DataSeries {
    /// Export the series as a plain nested record.
    pub fn export(&self) -> SeriesRecord {
        let shape = [self.n_samples(), self.n_channels(), self.n_reps()];
        SeriesRecord {
            shape,
            samples: self.samples().iter().copied().collect(),
            dt: self.time().dt(),
            start_offset: self.time().start_offset(),
            start_datetime: self.time().start_datetime(),
            events: self
                .events()
                .iter()
                .map(|e| EventRecord { name: e.name().to_string(), times: e.times().to_vec() })
                .collect(),
            units: self.units().to_string(),
            history: self.history().to_vec(),
        }
    }

    /// Rebuild a series from a plain record, re-validating every field.
    ///
    /// # Errors
    /// - [`SeriesError::RecordShapeMismatch`] if the declared shape does not
    ///   match the sample count.
    /// - [`SeriesError::InvalidSampleSpacing`] for a bad `dt` or
    ///   `start_offset`.
    /// - [`SeriesError::NonFiniteEventTime`] /
    ///   [`SeriesError::MalformedHistoryEntry`] if event or history state
    ///   fails the usual insertion checks.
    pub fn from_record(record: SeriesRecord) -> SeriesResult<DataSeries> {
        let declared: usize = record.shape.iter().product();
        if declared != record.samples.len() {
            return Err(SeriesError::RecordShapeMismatch {
                declared,
                actual: record.samples.len(),
            });
        }
        let [n, n_ch, n_reps] = record.shape;
        let samples = Array3::from_shape_vec((n, n_ch, n_reps), record.samples)
            .map_err(|_| SeriesError::RecordShapeMismatch { declared, actual: declared })?;

        let mut axis = TimeAxis::with_start(record.dt, n, record.start_offset)?;
        if let Some(anchor) = record.start_datetime {
            axis = axis.with_datetime(anchor);
        }

        let mut series = DataSeries::new(samples, axis)?.with_units(&record.units);
        for event in &record.events {
            series.add_event(&event.name, &event.times, DuplicatePolicy::Append)?;
        }
        for entry in &record.history {
            series.push_history(entry)?;
        }
        Ok(series)
    }
}
