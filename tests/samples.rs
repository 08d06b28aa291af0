use livescope::{Sample, SampleBuffer, SeriesCollection, SeriesRef};

#[test]
fn non_finite_values_are_dropped() {
    let mut buf = SampleBuffer::new();
    buf.append(Sample::new(0.0, 1.0));
    buf.append(Sample::new(1.0, f64::NAN));
    buf.append(Sample::new(2.0, f64::INFINITY));
    buf.append(Sample::new(3.0, f64::NEG_INFINITY));
    buf.append(Sample::new(4.0, 2.0));
    assert_eq!(buf.len(), 2, "only finite values should be retained");
    assert!(
        buf.snapshot().iter().all(|s| s.value.is_finite()),
        "snapshot must never contain a non-finite value"
    );
}

#[test]
fn trim_before_enforces_cutoff() {
    let mut buf = SampleBuffer::new();
    for i in 0..10 {
        buf.append(Sample::new(i as f64, i as f64));
    }
    buf.trim_before(4.0);
    assert!(
        buf.snapshot().iter().all(|s| s.timestamp >= 4.0),
        "all retained samples must be at or after the cutoff"
    );
    assert_eq!(buf.len(), 6);
    assert_eq!(buf.oldest_timestamp(), Some(4.0));
}

#[test]
fn stats_track_appends_and_trims() {
    let mut buf = SampleBuffer::new();
    for (t, v) in [(0.0, 2.0), (1.0, -4.0), (2.0, 6.0), (3.0, 0.0)] {
        buf.append(Sample::new(t, v));
    }
    let stats = buf.stats();
    assert_eq!(stats.min, -4.0);
    assert_eq!(stats.max, 6.0);
    assert_eq!(stats.count, 4);
    assert!((stats.mean() - 1.0).abs() < 1e-12);

    // Dropping the first two samples must rebuild the aggregates.
    buf.trim_before(2.0);
    let stats = buf.stats();
    assert_eq!(stats.min, 0.0);
    assert_eq!(stats.max, 6.0);
    assert_eq!(stats.count, 2);
    assert!((stats.mean() - 3.0).abs() < 1e-12);
}

#[test]
fn trim_without_removal_keeps_stats() {
    let mut buf = SampleBuffer::new();
    buf.append(Sample::new(5.0, 1.0));
    buf.append(Sample::new(6.0, 3.0));
    buf.trim_before(1.0);
    assert_eq!(buf.len(), 2);
    assert_eq!(buf.stats().count, 2);
}

#[test]
fn percentile_over_recent_history() {
    let mut buf = SampleBuffer::new();
    for i in 1..=100 {
        buf.append(Sample::new(i as f64, i as f64));
    }
    assert_eq!(buf.percentile(0.0), Some(1.0));
    assert_eq!(buf.percentile(100.0), Some(100.0));
    assert_eq!(buf.percentile_95(), Some(95.0));
    assert_eq!(SampleBuffer::new().percentile_95(), None);
}

#[test]
fn percentile_history_is_capped() {
    let mut buf = SampleBuffer::new();
    // Well past the cap; the low early values must age out of the history.
    for i in 0..5000 {
        buf.append(Sample::new(i as f64, i as f64));
    }
    let p0 = buf.percentile(0.0).unwrap();
    assert!(
        p0 >= (5000 - 2048) as f64,
        "oldest history values should have been evicted, got {}",
        p0
    );
}

#[test]
fn collection_creates_series_on_first_append() {
    let mut series = SeriesCollection::new();
    let a = SeriesRef::new("a");
    let b = SeriesRef::new("b");
    series.append(&a, Sample::new(1.0, 0.5));
    series.append(&b, Sample::new(2.0, 1.5));
    series.append(&a, Sample::new(3.0, 2.5));
    assert_eq!(series.series_order(), &[a.clone(), b.clone()][..]);
    assert_eq!(series.get(&a).map(|buf| buf.len()), Some(2));
    assert_eq!(series.extents(), Some((1.0, 3.0)));
    assert_eq!(series.latest_timestamp(), Some(3.0));
}

#[test]
fn collection_extents_empty_when_no_data() {
    let series = SeriesCollection::new();
    assert_eq!(series.extents(), None);
}

#[test]
fn trim_all_applies_to_every_series() {
    let mut series = SeriesCollection::new();
    let a = SeriesRef::new("a");
    let b = SeriesRef::new("b");
    for i in 0..5 {
        series.append(&a, Sample::new(i as f64, 0.0));
        series.append(&b, Sample::new(i as f64 + 0.5, 0.0));
    }
    series.trim_all(2.0);
    assert_eq!(series.extents(), Some((2.0, 4.5)));
}
