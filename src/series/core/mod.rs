//! core — containers, configuration, and transforms for event-aligned
//! series.
//!
//! Purpose
//! -------
//! Collect the building blocks of the crate: the uniform time axis, the
//! event registry, the data container binding samples to both, operation
//! configuration records, the unit-conversion table, numeric transforms,
//! and the plain-record serialization boundary. The subset/alignment
//! engine builds on top of these primitives.
//!
//! Key behaviors
//! -------------
//! - Define the leaf containers ([`TimeAxis`], [`Event`],
//!   [`EventRegistry`]) and the central [`DataSeries`] value type with its
//!   copy-versus-mutate transform pairs.
//! - Represent operation configuration as explicit records
//!   ([`SubsetBound`], [`SubsetOptions`], [`SplitSpec`],
//!   [`DecimateApproach`], [`FilterCoeffs`], [`DuplicatePolicy`],
//!   [`ZeroReference`], [`AlignOptions`]) rather than dynamic named
//!   options.
//! - Convert units through a pluggable [`UnitTable`] and round-trip the
//!   whole container through [`SeriesRecord`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `DataSeries` keeps its sample array and axis in agreement, and its
//!   axis origin and event times only ever move together.
//! - Every transform that returns a value produces an independent deep
//!   copy; in-place twins mutate the receiver and nothing else.
//! - This module avoids I/O; error conditions are reported via
//!   `SeriesResult`, and logging is limited to the documented
//!   clamp-and-continue warnings in the subset layer.
pub mod data;
pub mod events;
pub mod options;
pub mod record;
pub mod time_axis;
pub mod transforms;
pub mod units;

pub use data::DataSeries;
pub use events::{Event, EventRegistry};
pub use options::{
    AlignOptions, DecimateApproach, DuplicatePolicy, FilterCoeffs, OccurrenceSelect,
    SplitSpec, SubsetBound, SubsetOptions, ZeroReference,
};
pub use record::{EventRecord, SeriesRecord};
pub use time_axis::TimeAxis;
pub use units::UnitTable;
