use crate::common::record;
use trigger_rate_monitor::processor::Aggregator;
use trigger_rate_monitor::types::{DecisionRecord, NUM_CLASSES, NUM_INPUTS, ORBIT_LENGTH};

fn aggregator(reference_input: usize) -> Aggregator {
    Aggregator::new(reference_input, 2.0).expect("valid aggregator")
}

#[test]
fn test_empty_masks_only_move_overflow_bins() {
    let mut agg = aggregator(7);
    let records: Vec<DecisionRecord> = (0..5).map(|bc| DecisionRecord::new(3, bc)).collect();

    agg.on_record_batch(&records, 4);

    let histograms = agg.histograms();
    for bit in 0..NUM_INPUTS {
        assert_eq!(histograms.inputs().numerator(&bit), Some(0.0), "input {}", bit);
        assert_eq!(histograms.input_ratios().get(bit), 0.0);
    }
    for bit in 0..NUM_CLASSES {
        assert_eq!(histograms.classes().get(bit), 0.0, "class {}", bit);
        assert_eq!(histograms.class_ratios().get(bit), 0.0);
    }
    assert_eq!(histograms.inputs().numerator(&NUM_INPUTS), Some(1.0));
    assert_eq!(histograms.classes().get(NUM_CLASSES), 1.0);
    assert_eq!(histograms.reference_bc().total(), 0.0);
    assert_eq!(agg.state().records_seen, 5);
}

#[test]
fn test_empty_batch_still_counts_time_frame() {
    let mut agg = aggregator(7);
    agg.on_record_batch(&[], 4);
    agg.on_record_batch(&[], 4);

    assert_eq!(agg.histograms().inputs().numerator(&NUM_INPUTS), Some(2.0));
    assert_eq!(agg.histograms().classes().get(NUM_CLASSES), 2.0);
    assert_eq!(agg.state().processed_time_frames, 2);
    assert!((agg.histograms().inputs().denominator() - 16.0).abs() < 1e-12);
}

#[test]
fn test_reference_input_fills_bunch_crossing() {
    let mut agg = aggregator(7);
    agg.on_record_batch(&[record(42, &[7], &[])], 1);

    let reference_bc = agg.histograms().reference_bc();
    assert_eq!(reference_bc.len(), ORBIT_LENGTH);
    assert_eq!(reference_bc.get(42), 1.0);
    assert_eq!(reference_bc.total(), 1.0);
}

#[test]
fn test_other_inputs_do_not_touch_reference_bunch_crossing() {
    let mut agg = aggregator(7);
    agg.on_record_batch(&[record(42, &[0, 6, 8, 47], &[])], 1);

    assert_eq!(agg.histograms().reference_bc().total(), 0.0);
    assert_eq!(agg.histograms().inputs().numerator(&6), Some(1.0));
    assert_eq!(agg.histograms().inputs().numerator(&47), Some(1.0));
}

#[test]
fn test_every_set_bit_is_counted_once_per_record() {
    let mut agg = aggregator(0);
    let records = vec![
        record(1, &[0, 1, 2], &[0, 63]),
        record(2, &[2], &[63]),
        record(3, &[], &[10]),
    ];
    agg.on_record_batch(&records, 1);

    let histograms = agg.histograms();
    assert_eq!(histograms.inputs().numerator(&2), Some(2.0));
    assert_eq!(histograms.input_ratios().get(2), 2.0);
    assert_eq!(histograms.input_ratios().get(1), 1.0);
    assert_eq!(histograms.classes().get(63), 2.0);
    assert_eq!(histograms.class_ratios().get(63), 2.0);
    assert_eq!(histograms.classes().get(10), 1.0);
    assert_eq!(histograms.reference_bc().get(1), 1.0);
    // Overflow moves once for the batch, not per record
    assert_eq!(histograms.classes().get(NUM_CLASSES), 1.0);
}

#[test]
fn test_out_of_orbit_bunch_crossing_still_counts_bits() {
    let mut agg = aggregator(7);
    let records = vec![
        record(ORBIT_LENGTH as u16, &[7], &[1]),
        record(u16::MAX, &[7], &[1]),
        record(5, &[7], &[1]),
    ];
    agg.on_record_batch(&records, 1);

    let histograms = agg.histograms();
    assert_eq!(agg.state().bc_out_of_range, 2);
    assert_eq!(histograms.inputs().numerator(&7), Some(3.0));
    assert_eq!(histograms.input_ratios().get(7), 3.0);
    assert_eq!(histograms.classes().get(1), 3.0);
    assert_eq!(histograms.class_ratios().get(1), 3.0);
    assert_eq!(histograms.reference_bc().get(5), 1.0);
    assert_eq!(histograms.reference_bc().out_of_range(), 2.0);
    assert_eq!(histograms.reference_bc().total(), 1.0);
}

#[test]
fn test_out_of_orbit_non_reference_hit_is_kept() {
    let mut agg = aggregator(7);
    agg.on_record_batch(&[record(4000, &[3], &[5])], 4);

    let histograms = agg.histograms();
    assert_eq!(histograms.inputs().numerator(&3), Some(1.0));
    assert_eq!(histograms.classes().get(5), 1.0);
    assert_eq!(histograms.inputs().numerator(&NUM_INPUTS), Some(1.0));
    assert_eq!(histograms.reference_bc().out_of_range(), 0.0);
    assert_eq!(agg.state().bc_out_of_range, 1);
}
