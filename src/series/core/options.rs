//! Operation configuration — explicit records replacing dynamic named
//! options.
//!
//! Purpose
//! -------
//! Collect the configuration types consumed by series transforms and the
//! subset/alignment engine in one place. Every operation takes a concrete
//! record enumerating its recognized knobs and defaults; there is no
//! stringly-typed option parsing, and unknown configuration cannot be
//! expressed at all.
//!
//! Key behaviors
//! -------------
//! - Subset boundaries are [`SubsetBound`] values: a named event occurrence,
//!   a literal time, or a literal sample index. What used to be a
//!   "times are samples" flag is the [`SubsetBound::Sample`] variant.
//! - [`SubsetOptions`] carries the aggregation and alignment knobs for
//!   batch extraction; [`SplitSpec`] configures optional span splitting and
//!   validates itself before any extraction begins.
//! - [`DecimateApproach`] names the per-bin reduction. The enum is
//!   `#[non_exhaustive]`: future reductions implement the same per-bin
//!   aggregation contract by adding a variant and an arm in `reduce`.
//! - [`FilterCoeffs`] holds a validated, `a[0]`-normalized difference
//!   equation.
//!
//! Invariants & assumptions
//! ------------------------
//! - These types describe intent; enforcement against a concrete series
//!   (occurrence counts, span ordering, sample bounds) happens in the
//!   subset engine and the transforms, not here.
//! - `SplitSpec::validate` and `FilterCoeffs::new` are the only
//!   self-validating members; everything else is a plain data carrier.
use ndarray::ArrayView1;

use crate::series::errors::{SeriesError, SeriesResult};

/// Policy applied when registering an event name that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Merge the new occurrences into the existing event.
    Append,
    /// Fail with `DuplicateEvent`.
    Reject,
}

/// Which occurrences of a named event a subset boundary refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceSelect {
    /// The k-th occurrence (0-based).
    Index(usize),
    /// Every occurrence; start/stop lists are paired element-wise.
    All,
}

/// One boundary of a subset extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum SubsetBound {
    /// A named event plus an occurrence selector.
    Event { name: String, occurrence: OccurrenceSelect },
    /// A literal time in the series' reference frame.
    Time(f64),
    /// A literal 0-based sample index.
    Sample(usize),
}

impl SubsetBound {
    /// Convenience constructor for the k-th occurrence of a named event.
    pub fn event(name: &str, occurrence: usize) -> Self {
        SubsetBound::Event {
            name: name.to_string(),
            occurrence: OccurrenceSelect::Index(occurrence),
        }
    }

    /// Convenience constructor for every occurrence of a named event.
    pub fn every(name: &str) -> Self {
        SubsetBound::Event { name: name.to_string(), occurrence: OccurrenceSelect::All }
    }
}

/// How to divide each resolved single span before extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitSpec {
    /// Split into `n` equal (±1 sample) contiguous parts.
    Parts(usize),
    /// Split into parts weighted by percentages that must be positive and
    /// sum to 1 within `1e-9`.
    Percentages(Vec<f64>),
}

impl SplitSpec {
    /// Validate the configuration independent of any concrete span.
    ///
    /// # Errors
    /// - [`SeriesError::InvalidSplit`] for zero parts, an empty percentage
    ///   list, non-positive or non-finite percentages, or percentages that
    ///   do not sum to 1.
    pub fn validate(&self) -> SeriesResult<()> {
        match self {
            SplitSpec::Parts(0) => {
                Err(SeriesError::InvalidSplit { reason: "part count must be at least 1" })
            }
            SplitSpec::Parts(_) => Ok(()),
            SplitSpec::Percentages(ps) => {
                if ps.is_empty() {
                    return Err(SeriesError::InvalidSplit {
                        reason: "percentage list must be non-empty",
                    });
                }
                if ps.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                    return Err(SeriesError::InvalidSplit {
                        reason: "percentages must be finite and strictly positive",
                    });
                }
                let sum: f64 = ps.iter().sum();
                if (sum - 1.0).abs() > 1e-9 {
                    return Err(SeriesError::InvalidSplit {
                        reason: "percentages must sum to 1",
                    });
                }
                Ok(())
            }
        }
    }

    /// Number of parts this specification produces.
    pub fn n_parts(&self) -> usize {
        match self {
            SplitSpec::Parts(n) => *n,
            SplitSpec::Percentages(ps) => ps.len(),
        }
    }
}

/// Aggregation and alignment knobs for batch subset extraction.
///
/// Defaults: collapse to one series per input series, keep absolute time
/// alignment, no splitting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubsetOptions {
    /// Re-zero each extracted series at its resolved start time.
    pub align_time_to_start: bool,
    /// Permit more than one span per series and return per-series output
    /// instead of failing with `AmbiguousAggregation`.
    pub allow_multiple_spans: bool,
    /// Optional division of each single span into sub-spans.
    pub split: Option<SplitSpec>,
}

/// Reference used when zeroing a batch's time origin.
#[derive(Debug, Clone, PartialEq)]
pub enum ZeroReference {
    /// A named event that must have exactly one occurrence per series.
    Event(String),
    /// One externally supplied time per series, in batch order.
    Times(Vec<f64>),
}

/// Per-bin reduction used by decimation.
///
/// Additional reductions implement the same contract: given one bin of
/// samples, produce one value.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimateApproach {
    /// Mean of absolute values within the bin.
    MeanAbsolute,
}

impl DecimateApproach {
    /// Reduce one bin of samples to a single value.
    pub fn reduce(&self, bin: ArrayView1<'_, f64>) -> f64 {
        match self {
            DecimateApproach::MeanAbsolute => {
                let n = bin.len();
                if n == 0 {
                    0.0
                } else {
                    bin.iter().map(|v| v.abs()).sum::<f64>() / n as f64
                }
            }
        }
    }

    /// Short label used in history entries.
    pub fn label(&self) -> &'static str {
        match self {
            DecimateApproach::MeanAbsolute => "mean_absolute",
        }
    }
}

/// Labeling knobs for event-relative window extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignOptions {
    /// Optional label recorded in the history entry instead of the generic
    /// operation name (typically the source event's name).
    pub base_name: Option<String>,
}

/// Validated, normalized difference-equation coefficients:
/// `a[0] * y[n] = Σ b[k] x[n-k] − Σ a[k] y[n-k]`, stored with `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoeffs {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterCoeffs {
    /// Construct and normalize coefficients.
    ///
    /// # Errors
    /// - [`SeriesError::InvalidFilterCoeffs`] if `b` is empty, `a` is empty,
    ///   `a[0]` is zero, or any coefficient is non-finite.
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> SeriesResult<Self> {
        if b.is_empty() {
            return Err(SeriesError::InvalidFilterCoeffs {
                reason: "numerator b must have at least one coefficient",
            });
        }
        if a.is_empty() {
            return Err(SeriesError::InvalidFilterCoeffs {
                reason: "denominator a must have at least one coefficient",
            });
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(SeriesError::InvalidFilterCoeffs {
                reason: "coefficients must be finite",
            });
        }
        let a0 = a[0];
        if a0 == 0.0 {
            return Err(SeriesError::InvalidFilterCoeffs { reason: "a[0] must be non-zero" });
        }
        Ok(FilterCoeffs {
            b: b.into_iter().map(|c| c / a0).collect(),
            a: a.into_iter().map(|c| c / a0).collect(),
        })
    }

    /// A moving-average (FIR) filter of length `len` with unit gain.
    pub fn moving_average(len: usize) -> SeriesResult<Self> {
        if len == 0 {
            return Err(SeriesError::InvalidFilterCoeffs {
                reason: "moving-average length must be at least 1",
            });
        }
        Self::new(vec![1.0 / len as f64; len], vec![1.0])
    }

    /// Normalized numerator coefficients.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Normalized denominator coefficients (`a[0] == 1`).
    pub fn a(&self) -> &[f64] {
        &self.a
    }
}
