//! Unit metadata and the pluggable conversion table.
//!
//! - [`UnitTable`] maps `(from, to)` unit-name pairs to multiplicative
//!   factors; registering a rule also registers its inverse.
//!
//! Notes
//! -----
//! - The default table ships a deliberately small voltage family (V, mV,
//!   uV). It is a starting point, not a unit system; callers extend it via
//!   [`UnitTable::register`].
//! - Identity conversions (`from == to`) always succeed with factor 1.
use std::collections::BTreeMap;

use crate::series::errors::{SeriesError, SeriesResult};

/// Multiplicative unit-conversion rules keyed by `(from, to)` name pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTable {
    factors: BTreeMap<(String, String), f64>,
}

impl UnitTable {
    /// An empty table with no rules beyond identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table: V ↔ mV ↔ uV.
    pub fn standard() -> Self {
        let mut table = Self::default();
        table.register("V", "mV", 1e3);
        table.register("V", "uV", 1e6);
        table.register("mV", "uV", 1e3);
        table
    }

    /// Register `value_in_to = value_in_from * factor` and its inverse.
    /// Non-finite or zero factors are ignored; such a rule could never
    /// round-trip.
    pub fn register(&mut self, from: &str, to: &str, factor: f64) {
        if !factor.is_finite() || factor == 0.0 {
            return;
        }
        self.factors.insert((from.to_string(), to.to_string()), factor);
        self.factors.insert((to.to_string(), from.to_string()), 1.0 / factor);
    }

    /// Look up the multiplicative factor from one unit to another.
    ///
    /// # Errors
    /// - [`SeriesError::IncompatibleUnits`] if no rule connects the pair.
    pub fn factor(&self, from: &str, to: &str) -> SeriesResult<f64> {
        if from == to {
            return Ok(1.0);
        }
        self.factors
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .ok_or_else(|| SeriesError::IncompatibleUnits {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Convert a single value between units.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> SeriesResult<f64> {
        Ok(value * self.factor(from, to)?)
    }
}
