//! Per-series span resolution — turning subset boundaries into sample
//! ranges.
//!
//! Purpose
//! -------
//! Resolve a `(start, stop)` pair of [`SubsetBound`] references against one
//! series into a list of inclusive sample [`Span`]s, applying the
//! documented clamp-and-continue policy for stop references that overrun
//! the series and the element-wise pairing rule for multi-occurrence
//! references.
//!
//! Key behaviors
//! -------------
//! - Start references resolve strictly: a start outside the axis is an
//!   error, never a clamp.
//! - Stop references clamp to the last sample when they overrun the end,
//!   with a `log::warn!` naming the series and the clamped value; runs
//!   before the start of the axis still fail.
//! - When both references resolve to lists, they pair element-wise and
//!   must have equal lengths; a singleton on either side broadcasts
//!   against the other.
//!
//! Invariants & assumptions
//! ------------------------
//! - Returned spans satisfy `start <= stop < n_samples`; callers may slice
//!   without re-checking.
//! - Resolution never mutates the series; extraction happens later, so a
//!   batch can fail fast during resolution with no partial application.
use log::warn;

use crate::series::core::data::DataSeries;
use crate::series::core::options::{OccurrenceSelect, SplitSpec, SubsetBound};
use crate::series::errors::{SeriesError, SeriesResult};

/// An inclusive `(start, stop)` sample range within one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub stop: usize,
}

impl Span {
    /// Number of samples the span covers.
    pub fn len(&self) -> usize {
        self.stop - self.start + 1
    }

    /// Whether the range is inverted. Spans built by the resolver never
    /// are; this exists for hand-constructed values.
    pub fn is_empty(&self) -> bool {
        self.stop < self.start
    }

    /// Divide the span into contiguous sub-spans per `spec`.
    ///
    /// Equal parts place boundaries at `k * len / n`; percentage parts
    /// place them at the rounded cumulative weights. Sub-spans tile the
    /// span exactly: the first starts at `self.start`, the last ends at
    /// `self.stop`, and there are no gaps.
    ///
    /// # Errors
    /// - [`SeriesError::InvalidSplit`] if the spec itself is invalid, asks
    ///   for more parts than there are samples, or any sub-span would be
    ///   empty after rounding.
    pub fn split(&self, spec: &SplitSpec) -> SeriesResult<Vec<Span>> {
        spec.validate()?;
        let len = self.len();
        let n_parts = spec.n_parts();
        if n_parts > len {
            return Err(SeriesError::InvalidSplit {
                reason: "more parts than samples in the span",
            });
        }

        let mut offsets = Vec::with_capacity(n_parts + 1);
        match spec {
            SplitSpec::Parts(n) => {
                for k in 0..=*n {
                    offsets.push(k * len / n);
                }
            }
            SplitSpec::Percentages(ps) => {
                offsets.push(0);
                let mut cumulative = 0.0;
                for p in ps {
                    cumulative += p;
                    offsets.push(((cumulative * len as f64).round() as usize).min(len));
                }
                // Rounding must not shrink the final boundary.
                *offsets.last_mut().expect("at least two offsets") = len;
            }
        }
        if offsets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SeriesError::InvalidSplit {
                reason: "a sub-span would be empty after rounding",
            });
        }

        Ok(offsets
            .windows(2)
            .map(|w| Span { start: self.start + w[0], stop: self.start + w[1] - 1 })
            .collect())
    }
}

/// A resolved span plus the time of its first sample in the series' frame,
/// kept for start-aligned re-zeroing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSpan {
    pub span: Span,
    pub start_time: f64,
}

/// Resolve a start reference into one sample index per selected occurrence.
fn resolve_start_indices(series: &DataSeries, bound: &SubsetBound) -> SeriesResult<Vec<usize>> {
    match bound {
        SubsetBound::Sample(i) => {
            if *i >= series.n_samples() {
                return Err(SeriesError::OutOfRange {
                    t: series.time().time_at(*i),
                    start: series.time().start_offset(),
                    end: series.time().end_time(),
                });
            }
            Ok(vec![*i])
        }
        SubsetBound::Time(t) => Ok(vec![series.time().nearest_index(*t)?.0]),
        SubsetBound::Event { name, occurrence } => {
            occurrence_times(series, name, occurrence)?
                .iter()
                .map(|&t| Ok(series.time().nearest_index(t)?.0))
                .collect()
        }
    }
}

/// Resolve a stop reference, clamping overruns to the last sample.
fn resolve_stop_indices(
    series: &DataSeries, bound: &SubsetBound, series_index: usize,
) -> SeriesResult<Vec<usize>> {
    let last = match series.n_samples() {
        0 => {
            return Err(SeriesError::OutOfRange {
                t: series.time().start_offset(),
                start: series.time().start_offset(),
                end: series.time().end_time(),
            });
        }
        n => n - 1,
    };
    match bound {
        SubsetBound::Sample(i) => {
            if *i > last {
                warn!(
                    "series {series_index}: stop sample {i} clamped to last sample {last}"
                );
                Ok(vec![last])
            } else {
                Ok(vec![*i])
            }
        }
        SubsetBound::Time(t) => Ok(vec![resolve_stop_time(series, *t, series_index, last)?]),
        SubsetBound::Event { name, occurrence } => {
            occurrence_times(series, name, occurrence)?
                .iter()
                .map(|&t| resolve_stop_time(series, t, series_index, last))
                .collect()
        }
    }
}

fn resolve_stop_time(
    series: &DataSeries, t: f64, series_index: usize, last: usize,
) -> SeriesResult<usize> {
    let end = series.time().end_time();
    if t.is_finite() && t > end + series.time().dt() / 2.0 {
        warn!("series {series_index}: stop time {t} clamped to series end {end}");
        return Ok(last);
    }
    Ok(series.time().nearest_index(t)?.0)
}

/// Occurrence times selected by an event reference.
fn occurrence_times(
    series: &DataSeries, name: &str, occurrence: &OccurrenceSelect,
) -> SeriesResult<Vec<f64>> {
    let event = series.events().get(name)?;
    match occurrence {
        OccurrenceSelect::All => Ok(event.times().to_vec()),
        OccurrenceSelect::Index(k) => {
            event.times().get(*k).map(|&t| vec![t]).ok_or_else(|| {
                SeriesError::OccurrenceOutOfRange {
                    name: name.to_string(),
                    index: *k,
                    count: event.count(),
                }
            })
        }
    }
}

/// Resolve a `(start, stop)` boundary pair against one series.
///
/// Start and stop index lists pair element-wise; a singleton broadcasts
/// against a longer list, and any other length mismatch is an error.
///
/// # Errors
/// - [`SeriesError::MismatchedOccurrences`] for incompatible list lengths.
/// - [`SeriesError::InvalidRange`] if any paired stop precedes its start.
/// - Plus every resolution error of the individual bounds.
pub(crate) fn resolve_spans(
    series: &DataSeries, start: &SubsetBound, stop: &SubsetBound, series_index: usize,
) -> SeriesResult<Vec<ResolvedSpan>> {
    let starts = resolve_start_indices(series, start)?;
    let stops = resolve_stop_indices(series, stop, series_index)?;

    // An event registered with zero occurrences resolves to nothing; there
    // is no span to extract.
    if starts.is_empty() || stops.is_empty() {
        return Err(SeriesError::MismatchedOccurrences {
            start_count: starts.len(),
            stop_count: stops.len(),
        });
    }

    let pairs: Vec<(usize, usize)> = if starts.len() == stops.len() {
        starts.iter().copied().zip(stops.iter().copied()).collect()
    } else if starts.len() == 1 {
        stops.iter().map(|&s| (starts[0], s)).collect()
    } else if stops.len() == 1 {
        starts.iter().map(|&s| (s, stops[0])).collect()
    } else {
        return Err(SeriesError::MismatchedOccurrences {
            start_count: starts.len(),
            stop_count: stops.len(),
        });
    };

    pairs
        .into_iter()
        .map(|(start, stop)| {
            if stop < start {
                return Err(SeriesError::InvalidRange { start, stop });
            }
            Ok(ResolvedSpan {
                span: Span { start, stop },
                start_time: series.time().time_at(start),
            })
        })
        .collect()
}
