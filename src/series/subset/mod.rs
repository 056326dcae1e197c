//! subset — span resolution and batch orchestration.
//!
//! Purpose
//! -------
//! Turn subset boundary references into sample spans per series
//! ([`resolve`]) and run extraction, zeroing, and unit conversion over
//! ordered batches with fail-fast validation and the
//! collapse-versus-per-series aggregation rules ([`batch`]).
//!
//! Conventions
//! -----------
//! - Spans are inclusive `(start, stop)` sample pairs, 0-based.
//! - Resolution is strict for start references and clamp-and-continue
//!   (with a logged warning) for stop references that overrun the series.
pub mod batch;
pub mod resolve;

pub use batch::{
    change_units, changed_units, get_subset, zero_time_by_event, zeroed_time_by_event,
    SubsetOutcome,
};
pub use resolve::Span;
