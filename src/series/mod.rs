//! series — event-aligned time-series containers and their subset engine.
//!
//! Purpose
//! -------
//! Public surface of the crate: the [`core`] containers and transforms,
//! the [`subset`] resolution/orchestration layer, and the shared error
//! type. Most callers construct a [`core::DataSeries`], register events,
//! and then either transform it directly or run batch subset extraction
//! through [`subset`].
//!
//! Downstream usage
//! ----------------
//! - Import the common types through [`prelude`] for application code, or
//!   reach into the submodules for the full surface.
//! - Rendering and persistence layers consume
//!   `DataSeries::raw_data_and_time` and the `SeriesRecord` boundary; the
//!   containers themselves do no I/O.
pub mod core;
pub mod errors;
pub mod subset;

/// One-stop imports for typical callers.
pub mod prelude {
    pub use crate::series::core::{
        AlignOptions, DataSeries, DecimateApproach, DuplicatePolicy, Event, EventRegistry,
        FilterCoeffs, OccurrenceSelect, SeriesRecord, SplitSpec, SubsetBound, SubsetOptions,
        TimeAxis, UnitTable, ZeroReference,
    };
    pub use crate::series::errors::{SeriesError, SeriesResult};
    pub use crate::series::subset::{
        change_units, changed_units, get_subset, zero_time_by_event, zeroed_time_by_event,
        Span, SubsetOutcome,
    };
}
