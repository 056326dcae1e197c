//! Named, repeatable time-stamped markers attached to one series.
//!
//! Purpose
//! -------
//! Track events (stimulus onsets, annotations, trial boundaries) as an
//! explicit name → occurrence-list mapping owned by exactly one series. The
//! registry replaces dynamic field access with presence-checked lookups:
//! every read goes through [`EventRegistry::get`] and misses surface as
//! typed errors rather than silently materializing empty state.
//!
//! Invariants & assumptions
//! ------------------------
//! - Occurrence times are finite and kept sorted ascending within each
//!   event; an event may carry zero, one, or many occurrences.
//! - The registry is exclusively owned by one `DataSeries` and deep-copied
//!   whenever its owner is copied (plain `Clone` does this; there is no
//!   shared interior state).
//! - `shift_all` must only ever run as the second half of the atomic pair
//!   with `TimeAxis::shift_start`; `DataSeries::shift_time` is the sole
//!   call site for both, so event times and the axis origin cannot drift
//!   apart.
//!
//! Conventions
//! -----------
//! - Occurrence times are absolute in the owning series' reference frame
//!   (the same frame as `TimeAxis::start_offset`), not sample indices.
//! - Iteration order over events is deterministic (sorted by name).
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::series::core::options::DuplicatePolicy;
use crate::series::errors::{SeriesError, SeriesResult};

/// One named marker with zero or more time-stamped occurrences.
///
/// Fields
/// ------
/// - `name`: unique within the owning registry.
/// - `times`: occurrence times, finite, sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    times: Vec<f64>,
}

impl Event {
    /// Event name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Occurrence times, sorted ascending.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of occurrences.
    pub fn count(&self) -> usize {
        self.times.len()
    }
}

/// Name → [`Event`] mapping with explicit presence checks.
///
/// Purpose
/// -------
/// Own the event state for one series: registration with a configurable
/// duplicate policy, presence-checked lookup, and whole-registry time
/// shifting used when the owning series' time origin moves.
///
/// Invariants
/// ----------
/// - Every stored occurrence time is finite.
/// - Each event's `times` are sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRegistry {
    events: BTreeMap<String, Event>,
}

impl EventRegistry {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register occurrences for `name`.
    ///
    /// With [`DuplicatePolicy::Append`] an existing event gains the new
    /// occurrences (the merged list is re-sorted); with
    /// [`DuplicatePolicy::Reject`] a second registration under the same
    /// name fails.
    ///
    /// # Errors
    /// - [`SeriesError::NonFiniteEventTime`] if any supplied time is NaN or
    ///   infinite. The registry is left unchanged.
    /// - [`SeriesError::DuplicateEvent`] under the `Reject` policy when the
    ///   name is already present.
    pub fn add(
        &mut self, name: &str, times: &[f64], policy: DuplicatePolicy,
    ) -> SeriesResult<()> {
        for &t in times {
            if !t.is_finite() {
                return Err(SeriesError::NonFiniteEventTime {
                    name: name.to_string(),
                    value: t,
                });
            }
        }
        match self.events.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                if policy == DuplicatePolicy::Reject {
                    return Err(SeriesError::DuplicateEvent { name: name.to_string() });
                }
                let event = entry.get_mut();
                event.times.extend_from_slice(times);
                event.times.sort_by(|a, b| a.total_cmp(b));
            }
            Entry::Vacant(entry) => {
                let mut sorted = times.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                entry.insert(Event { name: name.to_string(), times: sorted });
            }
        }
        Ok(())
    }

    /// Look up an event by name.
    ///
    /// # Errors
    /// - [`SeriesError::UnknownEvent`] if no event with that name exists.
    pub fn get(&self, name: &str) -> SeriesResult<&Event> {
        self.events
            .get(name)
            .ok_or_else(|| SeriesError::UnknownEvent { name: name.to_string() })
    }

    /// Whether an event with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    /// Resolve the single occurrence of `name`.
    ///
    /// # Errors
    /// - [`SeriesError::UnknownEvent`] if the event is absent.
    /// - [`SeriesError::AmbiguousEvent`] if it has zero or multiple
    ///   occurrences.
    pub fn single_occurrence(&self, name: &str) -> SeriesResult<f64> {
        let event = self.get(name)?;
        match event.times.as_slice() {
            [t] => Ok(*t),
            other => Err(SeriesError::AmbiguousEvent {
                name: name.to_string(),
                count: other.len(),
            }),
        }
    }

    /// Shift every occurrence of every event by `delta`.
    ///
    /// Second half of the atomic pair with `TimeAxis::shift_start`; only
    /// `DataSeries::shift_time` may call either.
    pub(crate) fn shift_all(&mut self, delta: f64) {
        for event in self.events.values_mut() {
            for t in &mut event.times {
                *t += delta;
            }
        }
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the registry holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate events in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }
}
