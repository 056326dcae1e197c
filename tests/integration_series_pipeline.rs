//! Integration tests for event-aligned series extraction and interchange.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from constructed series with
//!   registered events, through batch subset extraction and start
//!   alignment, to decimation and the plain-record serialization boundary.
//! - Exercise realistic multi-series batches rather than toy edge cases
//!   only.
//!
//! Coverage
//! --------
//! - `series::core`:
//!   - `DataSeries` construction with events, units, and history.
//!   - Zeroing round-trips across the atomic axis/event shift.
//!   - Decimation and event-relative windowing on realistic shapes.
//! - `series::subset`:
//!   - Batch `get_subset` with per-series event resolution, start
//!     alignment, the ambiguity rule, and span splitting.
//! - `series::core::record`:
//!   - `export` / `from_record` round-trips through `serde_json`.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of individual boundary resolutions and
//!   numeric reductions — these are covered by unit tests.
//! - Rendering/plotting consumers of `raw_data_and_time` — out of scope
//!   for this crate.
use ndarray::Array3;
use rust_eventseries::series::prelude::*;

/// A 10 s single-channel series at `rate` Hz whose sample values equal
/// their index, with a `stim` event at `stim_time`.
fn indexed_series(rate: f64, stim_time: f64) -> DataSeries {
    let n = (10.0 * rate) as usize;
    let samples = Array3::from_shape_fn((n, 1, 1), |(i, _, _)| i as f64);
    DataSeries::from_dt(samples, 1.0 / rate)
        .expect("valid series")
        .with_units("V")
        .with_event("stim", &[stim_time])
        .expect("finite event time")
        .with_history("synthesized fixture")
        .expect("valid entry")
}

#[test]
// Purpose
// -------
// Extract a start-aligned subset per series and verify that re-querying
// the shared event on each subset yields a consistently shifted
// occurrence: the shift equals the subset's new start minus its old start.
fn subset_then_event_requery_is_consistent() {
    let batch = vec![
        indexed_series(100.0, 1.0),
        indexed_series(100.0, 2.5),
        indexed_series(100.0, 4.0),
    ];
    let options = SubsetOptions { align_time_to_start: true, ..Default::default() };

    let outcome = get_subset(
        &batch,
        &SubsetBound::event("stim", 0),
        &SubsetBound::Sample(usize::MAX), // clamps to each series' end
        &options,
    )
    .expect("one span per series");
    let collapsed = match outcome {
        SubsetOutcome::Collapsed(series) => series,
        other => panic!("expected Collapsed, got {other:?}"),
    };

    for (sub, original) in collapsed.iter().zip(&batch) {
        let old_occurrence = original.events().get("stim").expect("present").times()[0];
        let new_occurrence = sub.events().get("stim").expect("present").times()[0];
        let shift = sub.time().start_offset() - old_occurrence;
        assert!((new_occurrence - (old_occurrence + shift)).abs() < 1e-9);
        // Start-aligned: the event that defined the start sits at zero.
        assert!(new_occurrence.abs() < 1e-9);
        // Sample values confirm the slice really started at the event.
        assert_eq!(sub.samples()[[0, 0, 0]], (old_occurrence * 100.0).round());
    }
}

#[test]
// Purpose
// -------
// A batch where one series resolves to two spans fails with
// `AmbiguousAggregation` unless the caller opts into per-series output.
fn batch_ambiguity_requires_explicit_opt_in() {
    let mut batch = vec![
        indexed_series(100.0, 1.0),
        indexed_series(100.0, 2.0),
        indexed_series(100.0, 3.0),
    ];
    batch[1]
        .add_event("stim", &[7.0], DuplicatePolicy::Append)
        .expect("finite event time");

    let err = get_subset(
        &batch,
        &SubsetBound::every("stim"),
        &SubsetBound::Sample(999),
        &SubsetOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SeriesError::AmbiguousAggregation { series_index: 1, spans: 2 }
    ));

    let opted_in = SubsetOptions { allow_multiple_spans: true, ..Default::default() };
    let outcome = get_subset(
        &batch,
        &SubsetBound::every("stim"),
        &SubsetBound::Sample(999),
        &opted_in,
    )
    .expect("per-series output");
    match outcome {
        SubsetOutcome::PerSeries(lists) => {
            assert_eq!(lists.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 2, 1]);
        }
        other => panic!("expected PerSeries, got {other:?}"),
    }
}

#[test]
// Purpose
// -------
// Run a realistic processing chain — zero on the stimulus, window around
// follow-up events, decimate — and verify shapes and timing at each step.
fn zeroing_windowing_decimation_chain() {
    let series = indexed_series(100.0, 2.0);

    // Zero at the stimulus; round-trip restores the original origin.
    let zeroed = series.zero_time_by_event("stim").expect("single occurrence");
    assert!((zeroed.time().start_offset() + 2.0).abs() < 1e-12);
    let mut restored = zeroed.clone();
    restored.shift_time(2.0);
    assert!(
        (restored.time().start_offset() - series.time().start_offset()).abs() < 1e-12
    );

    // Windows of [-0.5, 0.5] around two occurrences in the zeroed frame.
    let aligned = zeroed
        .aligned_to_event(
            &[1.0, 3.0],
            (-0.5, 0.5),
            &AlignOptions { base_name: Some("probe".to_string()) },
        )
        .expect("windows fit");
    assert_eq!(aligned.n_reps(), 2);
    assert_eq!(aligned.n_samples(), 101);
    assert!((aligned.time().start_offset() + 0.5).abs() < 1e-9);
    assert!(aligned
        .history()
        .last()
        .expect("entry")
        .contains("aligned_to_event(name=probe"));

    // Decimate the original series: 10 s at 100 Hz with 1 s bins → 10 bins
    // at bin centers, bin 0 = mean(|samples[0..100]|) = mean(0..=99).
    let decimated = series
        .decimate(1.0, DecimateApproach::MeanAbsolute)
        .expect("valid bin width");
    assert_eq!(decimated.n_samples(), 10);
    assert!((decimated.time().dt() - 1.0).abs() < 1e-12);
    assert!((decimated.time().start_offset() - 0.5).abs() < 1e-12);
    assert!((decimated.samples()[[0, 0, 0]] - 49.5).abs() < 1e-9);
    // Events survive decimation in the same frame.
    assert_eq!(decimated.events().get("stim").expect("present").times(), &[2.0]);
}

#[test]
// Purpose
// -------
// Export a transformed series to a plain record, round-trip it through
// JSON, and verify deep equality of the rebuilt series.
fn export_round_trips_through_json() {
    let batch = vec![indexed_series(50.0, 1.0), indexed_series(50.0, 2.0)];
    let converted = changed_units(&batch, "mV", &UnitTable::standard()).expect("rule exists");

    for series in &converted {
        let record = series.export();
        let json = serde_json::to_string(&record).expect("serializable");
        let parsed: SeriesRecord = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(parsed, record);

        let rebuilt = DataSeries::from_record(parsed).expect("record is valid");
        assert_eq!(&rebuilt, series);
        assert_eq!(rebuilt.units(), "mV");
        assert!(rebuilt
            .history()
            .iter()
            .any(|entry| entry.contains("change_units(from=V, to=mV)")));
    }
}

#[test]
// Purpose
// -------
// Split a resolved span into percentage-weighted parts across a batch and
// verify the parts tile each series' span exactly.
fn percentage_split_tiles_each_series() {
    let batch = vec![indexed_series(100.0, 1.0), indexed_series(100.0, 1.0)];
    let options = SubsetOptions {
        split: Some(SplitSpec::Percentages(vec![0.2, 0.3, 0.5])),
        align_time_to_start: false,
        allow_multiple_spans: false,
    };

    let outcome = get_subset(
        &batch,
        &SubsetBound::Sample(0),
        &SubsetBound::Sample(999),
        &options,
    )
    .expect("splits");
    let lists = match outcome {
        SubsetOutcome::PerSeries(lists) => lists,
        other => panic!("expected PerSeries, got {other:?}"),
    };

    for parts in &lists {
        assert_eq!(parts.len(), 3);
        let lens: Vec<usize> = parts.iter().map(DataSeries::n_samples).collect();
        assert_eq!(lens, vec![200, 300, 500]);
        // Contiguity: each part starts where the previous ended.
        assert_eq!(parts[1].samples()[[0, 0, 0]], 200.0);
        assert_eq!(parts[2].samples()[[0, 0, 0]], 500.0);
    }
}
