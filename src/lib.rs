//! rust_eventseries — event-aligned time-series containers.
//!
//! Purpose
//! -------
//! Bind multi-dimensional sample arrays to an owned time axis and event
//! registry, and provide the operations scientific plotting and analysis
//! code keeps reimplementing ad hoc: event-relative subset extraction,
//! time-origin zeroing, fixed-width decimation, causal filtering, unit
//! conversion, and elementwise math, all with an explicit
//! copy-versus-mutate duality and an append-only history log.
//!
//! Key behaviors
//! -------------
//! - One value type, `DataSeries`, owns its samples
//!   (`[n_samples, n_channels, n_reps]`), time axis, events, unit label,
//!   and history; cloning it shares no mutable state.
//! - Every transform exists as a pure method returning a new series and an
//!   explicit `_in_place` twin; callers choose, the library never infers.
//! - The subset engine (`series::subset`) resolves event/time/sample
//!   boundaries per series across ordered batches, enforces the
//!   collapse-versus-per-series aggregation rules, and optionally splits
//!   spans into parts before extraction.
//!
//! Invariants & assumptions
//! ------------------------
//! - A series' axis origin and its event times live in one reference frame
//!   and only ever move together, through a single atomic shift path.
//! - Batch operations validate across the whole batch before applying
//!   anything; a failure can never leave a batch partially transformed.
//! - All operations are synchronous and deterministic; per-series work is
//!   independent, so results do not depend on processing order.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; sample spans are inclusive on both ends; axis 0
//!   is time, axis 1 channels, axis 2 repetitions.
//! - Errors are reported through `SeriesResult` with structured payloads;
//!   the only logging is a `warn!` on the documented clamp-and-continue
//!   stop-boundary truncation and `debug!` on batch decisions.
//!
//! Downstream usage
//! ----------------
//! - Import `series::prelude::*` for the common surface.
//! - Persistence and interop go through the flat `SeriesRecord` boundary
//!   (`export` / `from_record`), which round-trips every field exactly.
//!
//! Testing notes
//! -------------
//! - Each module carries unit tests for its own invariants; the
//!   end-to-end extraction/alignment/serialization pipeline is covered by
//!   the integration tests under `tests/`.

pub mod series;

pub use series::core::{DataSeries, SeriesRecord, TimeAxis};
pub use series::errors::{SeriesError, SeriesResult};
