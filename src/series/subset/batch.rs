//! Batch orchestration — subset extraction, zeroing, and unit conversion
//! over an ordered batch of series.
//!
//! Purpose
//! -------
//! Run the per-series primitives over a whole batch while enforcing the
//! batch-wide invariants: fail-fast validation (the first invalid series
//! aborts before anything is applied), the collapse-versus-per-series
//! aggregation decision, optional span splitting, and the shared-unit rule
//! for conversions.
//!
//! Key behaviors
//! -------------
//! - Every operation resolves and validates across the entire batch first,
//!   then applies; a mid-batch failure can therefore never leave a batch
//!   partially transformed.
//! - Aggregation: with the default options every series must resolve to a
//!   single span and the result collapses to one series per input; a
//!   series with multiple spans fails with `AmbiguousAggregation` unless
//!   the caller opted into per-series output.
//! - Splitting divides each single span into sub-spans before extraction
//!   and is refused when any series resolved to more than one span.
//!
//! Invariants & assumptions
//! ------------------------
//! - Series are processed independently (each has its own axis and
//!   registry); results do not depend on processing order, so a future
//!   implementation may parallelize per-series work without observable
//!   change.
use log::debug;

use crate::series::core::data::DataSeries;
use crate::series::core::options::{SubsetBound, SubsetOptions, ZeroReference};
use crate::series::core::units::UnitTable;
use crate::series::errors::{SeriesError, SeriesResult};
use crate::series::subset::resolve::{resolve_spans, ResolvedSpan};

/// Result shape of a batch subset extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum SubsetOutcome {
    /// One extracted series per input series; every series resolved to a
    /// single span.
    Collapsed(Vec<DataSeries>),
    /// One list of extracted series per input series, in span order.
    /// Returned whenever the caller opted into multiple spans.
    PerSeries(Vec<Vec<DataSeries>>),
}

/// Extract a subset from every series in the batch.
///
/// Boundaries resolve per series against that series' own axis and
/// registry. See the module docs for the aggregation and splitting rules.
///
/// # Errors
/// - [`SeriesError::EmptyBatch`] for an empty batch.
/// - [`SeriesError::AmbiguousAggregation`] if a series resolves to multiple
///   spans without `allow_multiple_spans`.
/// - [`SeriesError::NotSplitEligible`] if splitting was requested and a
///   series resolved to multiple spans.
/// - Plus every per-series resolution and extraction error, raised before
///   any output is built.
pub fn get_subset(
    batch: &[DataSeries], start: &SubsetBound, stop: &SubsetBound, options: &SubsetOptions,
) -> SeriesResult<SubsetOutcome> {
    if batch.is_empty() {
        return Err(SeriesError::EmptyBatch);
    }
    if let Some(spec) = &options.split {
        spec.validate()?;
    }

    // Phase 1: resolve everything; no extraction happens until the whole
    // batch has resolved cleanly.
    let mut resolved: Vec<Vec<ResolvedSpan>> = Vec::with_capacity(batch.len());
    for (index, series) in batch.iter().enumerate() {
        let spans = resolve_spans(series, start, stop, index)?;
        if spans.len() > 1 {
            if options.split.is_some() {
                return Err(SeriesError::NotSplitEligible {
                    series_index: index,
                    spans: spans.len(),
                });
            }
            if !options.allow_multiple_spans {
                return Err(SeriesError::AmbiguousAggregation {
                    series_index: index,
                    spans: spans.len(),
                });
            }
        }
        resolved.push(spans);
    }

    // Optional split of each (single) span into sub-spans. Sub-span start
    // times come from the series' own axis; the parent's resolved start
    // time only covers part 0.
    if let Some(spec) = &options.split {
        for (series, spans) in batch.iter().zip(resolved.iter_mut()) {
            let only = spans[0];
            *spans = only
                .span
                .split(spec)?
                .into_iter()
                .map(|span| ResolvedSpan {
                    span,
                    start_time: series.time().time_at(span.start),
                })
                .collect();
        }
    }

    debug!(
        "get_subset: batch of {} resolved ({} spans in series 0)",
        batch.len(),
        resolved[0].len()
    );

    // Phase 2: extraction. Resolution has already validated every span.
    let mut per_series: Vec<Vec<DataSeries>> = Vec::with_capacity(batch.len());
    for (series, spans) in batch.iter().zip(&resolved) {
        let mut extracted = Vec::with_capacity(spans.len());
        for rs in spans {
            let mut sub = series.extract_span(rs.span.start, rs.span.stop)?;
            if options.align_time_to_start {
                sub.zero_time_at_in_place(rs.start_time)?;
            }
            extracted.push(sub);
        }
        per_series.push(extracted);
    }

    // Splitting keeps per-series output because each input produced
    // several series even though it resolved to one span.
    if options.allow_multiple_spans || options.split.is_some() {
        Ok(SubsetOutcome::PerSeries(per_series))
    } else {
        Ok(SubsetOutcome::Collapsed(
            per_series.into_iter().map(|mut v| v.remove(0)).collect(),
        ))
    }
}

/// Zero every series' time origin against a shared reference, in place.
///
/// With [`ZeroReference::Event`] the named event must have exactly one
/// occurrence in every series; with [`ZeroReference::Times`] the caller
/// supplies one time per series in batch order. All references are resolved
/// before any series is touched.
///
/// # Errors
/// - [`SeriesError::EmptyBatch`] for an empty batch.
/// - [`SeriesError::MismatchedTimes`] if a supplied time list does not
///   match the batch length.
/// - [`SeriesError::UnknownEvent`] / [`SeriesError::AmbiguousEvent`] from
///   per-series event resolution, raised before any mutation.
pub fn zero_time_by_event(
    batch: &mut [DataSeries], reference: &ZeroReference,
) -> SeriesResult<()> {
    if batch.is_empty() {
        return Err(SeriesError::EmptyBatch);
    }

    // Phase 1: resolve one zeroing time per series.
    let times: Vec<f64> = match reference {
        ZeroReference::Event(name) => batch
            .iter()
            .map(|series| series.events().single_occurrence(name))
            .collect::<SeriesResult<_>>()?,
        ZeroReference::Times(times) => {
            if times.len() != batch.len() {
                return Err(SeriesError::MismatchedTimes {
                    expected: batch.len(),
                    actual: times.len(),
                });
            }
            for (series, &t) in batch.iter().zip(times) {
                if !t.is_finite() {
                    return Err(SeriesError::OutOfRange {
                        t,
                        start: series.time().start_offset(),
                        end: series.time().end_time(),
                    });
                }
            }
            times.clone()
        }
    };

    // Phase 2: apply. Entries are well-formed, so history insertion cannot
    // fail here.
    for (series, &t) in batch.iter_mut().zip(&times) {
        match reference {
            ZeroReference::Event(name) => series.zero_time_by_event_in_place(name)?,
            ZeroReference::Times(_) => series.zero_time_at_in_place(t)?,
        }
    }
    Ok(())
}

/// Pure twin of [`zero_time_by_event`]: returns a zeroed copy of the batch.
pub fn zeroed_time_by_event(
    batch: &[DataSeries], reference: &ZeroReference,
) -> SeriesResult<Vec<DataSeries>> {
    let mut out = batch.to_vec();
    zero_time_by_event(&mut out, reference)?;
    Ok(out)
}

/// Convert every series in the batch to `target` units, in place.
///
/// All series must share one current unit, and the conversion must exist,
/// before anything is scaled.
///
/// # Errors
/// - [`SeriesError::EmptyBatch`] for an empty batch.
/// - [`SeriesError::MixedUnits`] if the batch carries differing units.
/// - [`SeriesError::IncompatibleUnits`] if the table has no rule.
pub fn change_units(
    batch: &mut [DataSeries], target: &str, table: &UnitTable,
) -> SeriesResult<()> {
    let first = match batch.first() {
        Some(series) => series.units().to_string(),
        None => return Err(SeriesError::EmptyBatch),
    };
    for series in batch.iter() {
        if series.units() != first {
            return Err(SeriesError::MixedUnits {
                expected: first,
                found: series.units().to_string(),
            });
        }
    }
    // Validate the rule once before mutating anything.
    table.factor(&first, target)?;

    for series in batch.iter_mut() {
        series.change_units_in_place(target, table)?;
    }
    Ok(())
}

/// Pure twin of [`change_units`]: returns a converted copy of the batch.
pub fn changed_units(
    batch: &[DataSeries], target: &str, table: &UnitTable,
) -> SeriesResult<Vec<DataSeries>> {
    let mut out = batch.to_vec();
    change_units(&mut out, target, table)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::core::options::{SplitSpec, SubsetBound};
    use ndarray::Array3;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Collapsed extraction over a homogeneous batch, with and without
    //   start alignment.
    // - The aggregation decision: multiple spans fail by default and come
    //   back per-series when requested.
    // - Span splitting eligibility and output shape.
    // - Batch zeroing (event and supplied-times forms) and batch unit
    //   conversion with the shared-unit rule, both fail-fast.
    //
    // They intentionally DO NOT cover:
    // - Per-span index arithmetic; the resolver's tests own that.
    // -------------------------------------------------------------------------

    fn make_series(stim: f64, bursts: &[f64]) -> DataSeries {
        // 100 samples at 10 Hz covering [0.0, 9.9].
        let samples = Array3::from_shape_fn((100, 1, 1), |(i, _, _)| i as f64);
        DataSeries::from_dt(samples, 0.1)
            .expect("valid series")
            .with_units("V")
            .with_event("stim", &[stim])
            .expect("event")
            .with_event("bursts", bursts)
            .expect("event")
    }

    fn make_batch() -> Vec<DataSeries> {
        vec![
            make_series(1.0, &[2.0]),
            make_series(2.0, &[3.0]),
            make_series(3.0, &[4.0]),
        ]
    }

    #[test]
    // Purpose
    // -------
    // A batch where every series resolves to one span collapses to one
    // series per input, each sliced on its own axis.
    fn get_subset_collapses_single_spans() {
        let batch = make_batch();
        let outcome = get_subset(
            &batch,
            &SubsetBound::event("stim", 0),
            &SubsetBound::Sample(99),
            &SubsetOptions::default(),
        )
        .expect("single span per series");

        let collapsed = match outcome {
            SubsetOutcome::Collapsed(series) => series,
            other => panic!("expected Collapsed, got {other:?}"),
        };
        assert_eq!(collapsed.len(), 3);
        // Per-series resolution: the stim event sits at a different sample
        // in each series.
        assert_eq!(collapsed[0].n_samples(), 90);
        assert_eq!(collapsed[1].n_samples(), 80);
        assert_eq!(collapsed[2].n_samples(), 70);
        assert!((collapsed[0].time().start_offset() - 1.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // With start alignment each extracted series is re-zeroed at its
    // resolved start, and its events shift into the new frame.
    fn get_subset_aligns_to_start() {
        let batch = make_batch();
        let options = SubsetOptions { align_time_to_start: true, ..Default::default() };
        let outcome = get_subset(
            &batch,
            &SubsetBound::event("stim", 0),
            &SubsetBound::Sample(99),
            &options,
        )
        .expect("single span per series");

        let collapsed = match outcome {
            SubsetOutcome::Collapsed(series) => series,
            other => panic!("expected Collapsed, got {other:?}"),
        };
        for sub in &collapsed {
            assert!(sub.time().start_offset().abs() < 1e-12);
            // The zeroing event now sits at time 0 in every series.
            assert!(
                sub.events().get("stim").expect("present").times()[0].abs() < 1e-12
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // A series resolving to two spans fails with `AmbiguousAggregation` by
    // default and comes back per-series when multiple spans are allowed.
    fn get_subset_ambiguity_and_per_series_output() {
        let mut batch = make_batch();
        // Give series 1 a second burst so `every("bursts")` resolves to two
        // spans there.
        batch[1]
            .add_event(
                "bursts",
                &[7.0],
                crate::series::core::options::DuplicatePolicy::Append,
            )
            .expect("event");

        let err = get_subset(
            &batch,
            &SubsetBound::every("bursts"),
            &SubsetBound::Sample(99),
            &SubsetOptions::default(),
        )
        .unwrap_err();
        match err {
            SeriesError::AmbiguousAggregation { series_index, spans } => {
                assert_eq!(series_index, 1);
                assert_eq!(spans, 2);
            }
            other => panic!("expected AmbiguousAggregation, got {other:?}"),
        }

        let options = SubsetOptions { allow_multiple_spans: true, ..Default::default() };
        let outcome = get_subset(
            &batch,
            &SubsetBound::every("bursts"),
            &SubsetBound::Sample(99),
            &options,
        )
        .expect("per-series output");
        match outcome {
            SubsetOutcome::PerSeries(lists) => {
                assert_eq!(lists.len(), 3);
                assert_eq!(lists[0].len(), 1);
                assert_eq!(lists[1].len(), 2);
                assert_eq!(lists[2].len(), 1);
            }
            other => panic!("expected PerSeries, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Splitting divides each single span into parts, keeps per-series
    // output shape, and refuses series with multiple spans.
    fn get_subset_split_parts() {
        let batch = vec![make_series(1.0, &[2.0])];
        let options = SubsetOptions {
            split: Some(SplitSpec::Parts(2)),
            ..Default::default()
        };
        let outcome = get_subset(
            &batch,
            &SubsetBound::Sample(0),
            &SubsetBound::Sample(99),
            &options,
        )
        .expect("splits");

        match outcome {
            SubsetOutcome::PerSeries(lists) => {
                assert_eq!(lists[0].len(), 2);
                assert_eq!(lists[0][0].n_samples(), 50);
                assert_eq!(lists[0][1].n_samples(), 50);
                assert!((lists[0][1].time().start_offset() - 5.0).abs() < 1e-12);
            }
            other => panic!("expected PerSeries, got {other:?}"),
        }

        let mut two_span = make_series(1.0, &[2.0, 7.0]);
        two_span.push_history("fixture").expect("entry");
        let err = get_subset(
            &[two_span],
            &SubsetBound::every("bursts"),
            &SubsetBound::Sample(99),
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, SeriesError::NotSplitEligible { spans: 2, .. }));
    }

    #[test]
    // Purpose
    // -------
    // Batch zeroing resolves every reference before mutating: a series with
    // an ambiguous event aborts the whole batch untouched.
    fn zero_time_by_event_is_fail_fast() {
        let mut batch = make_batch();
        batch[2]
            .add_event(
                "stim",
                &[5.0],
                crate::series::core::options::DuplicatePolicy::Append,
            )
            .expect("event");

        let err =
            zero_time_by_event(&mut batch, &ZeroReference::Event("stim".to_string()))
                .unwrap_err();
        assert!(matches!(err, SeriesError::AmbiguousEvent { count: 2, .. }));
        // Nothing moved.
        for series in &batch {
            assert_eq!(series.time().start_offset(), 0.0);
        }

        // Supplied-times form: wrong length is rejected, right length
        // shifts each series by its own time.
        let err = zero_time_by_event(&mut batch, &ZeroReference::Times(vec![1.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            SeriesError::MismatchedTimes { expected: 3, actual: 1 }
        ));

        zero_time_by_event(&mut batch, &ZeroReference::Times(vec![1.0, 2.0, 3.0]))
            .expect("lengths match");
        assert!((batch[0].time().start_offset() + 1.0).abs() < 1e-12);
        assert!((batch[2].time().start_offset() + 3.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Batch unit conversion enforces the shared-unit rule before scaling
    // anything and applies the same factor to every series.
    fn change_units_requires_shared_unit() {
        let mut batch = make_batch();
        let table = UnitTable::standard();

        batch[1].set_units("mV");
        let err = change_units(&mut batch, "uV", &table).unwrap_err();
        match err {
            SeriesError::MixedUnits { expected, found } => {
                assert_eq!(expected, "V");
                assert_eq!(found, "mV");
            }
            other => panic!("expected MixedUnits, got {other:?}"),
        }
        // Fail-fast: no series was scaled.
        assert_eq!(batch[0].samples()[[1, 0, 0]], 1.0);

        batch[1].set_units("V");
        let converted = changed_units(&batch, "mV", &table).expect("rule exists");
        assert_eq!(converted[0].units(), "mV");
        assert!((converted[0].samples()[[1, 0, 0]] - 1000.0).abs() < 1e-9);
        // Pure twin left the input untouched.
        assert_eq!(batch[0].units(), "V");
    }
}
