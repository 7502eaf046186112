use crate::common::{record, settings, stub_task, Batch, RecordingPublisher, SequenceGeometry, StubDecoder};
use trigger_rate_monitor::processor::{MonitorTask, RateMonitorTask, TaskState};
use trigger_rate_monitor::types::{Activity, InputsConfiguration, LuminosityInfo, NUM_CLASSES, NUM_INPUTS};

#[test]
fn test_second_activity_start_clears_everything() {
    let mut task = stub_task(settings("MVIR", 1.0), 4);
    task.initialize().unwrap();
    assert_eq!(task.reference_input(), Some(7));

    task.start_of_activity(&Activity::new(1, "first")).unwrap();
    task.start_of_cycle().unwrap();
    task.monitor_data(&Batch::of(vec![record(42, &[3, 7], &[5])]))
        .unwrap();
    task.end_of_cycle().unwrap();

    let histograms = task.histograms().unwrap();
    assert_eq!(histograms.reference_bc().get(42), 1.0);
    assert_eq!(histograms.inputs().numerator(&NUM_INPUTS), Some(1.0));

    task.start_of_activity(&Activity::new(2, "second")).unwrap();

    let histograms = task.histograms().unwrap();
    assert!(histograms.inputs().numerators().iter().all(|&n| n == 0.0));
    assert_eq!(histograms.inputs().denominator(), 0.0);
    assert!(histograms.inputs().ratios().iter().all(|&r| r == 0.0));
    assert_eq!(histograms.classes().get(NUM_CLASSES), 0.0);
    assert_eq!(histograms.classes().total(), 0.0);
    assert_eq!(histograms.reference_bc().total(), 0.0);
    assert_eq!(histograms.input_ratios().total(), 0.0);
    assert_eq!(histograms.class_ratios().total(), 0.0);

    let state = task.aggregation_state().unwrap();
    assert_eq!(state.processed_time_frames, 0);
    assert_eq!(state.live_time_ms, 0.0);
    assert_eq!(task.cycles_completed(), 0);
    assert_eq!(task.state(), TaskState::Active);
}

#[test]
fn test_reset_clears_histograms_but_not_counters() {
    let mut task = stub_task(settings("MTVX", 1.0), 2);
    task.initialize().unwrap();
    task.start_of_activity(&Activity::new(1, "run")).unwrap();
    task.monitor_data(&Batch::of(vec![record(3, &[2], &[1])]))
        .unwrap();

    task.reset().unwrap();

    let histograms = task.histograms().unwrap();
    assert_eq!(histograms.inputs().numerator(&2), Some(0.0));
    assert_eq!(histograms.reference_bc().total(), 0.0);
    assert_eq!(histograms.classes().total(), 0.0);
    assert_eq!(task.aggregation_state().unwrap().processed_time_frames, 1);
}

#[test]
fn test_cycles_accumulate_until_activity_restarts() {
    let mut task = stub_task(settings("MTVX", 1.0), 1);
    task.initialize().unwrap();
    task.start_of_activity(&Activity::new(7, "run")).unwrap();

    for _ in 0..3 {
        task.start_of_cycle().unwrap();
        task.monitor_data(&Batch::of(vec![record(1, &[0], &[])]))
            .unwrap();
        task.end_of_cycle().unwrap();
        task.publish_cycle().unwrap();
    }

    let publisher = task.publisher();
    assert_eq!(publisher.cycles.len(), 3);
    assert_eq!(publisher.cycles[2].cycle, 3);
    assert_eq!(publisher.cycles[2].processed_time_frames, 3);
    assert_eq!(publisher.cycles[2].activity_id, 7);
    assert_eq!(task.histograms().unwrap().inputs().ratio(&0), Some(1.0));
}

#[test]
fn test_monitor_data_asks_geometry_every_batch() {
    let mut task = RateMonitorTask::new(
        settings("MTVX", 0.5),
        StubDecoder::default(),
        SequenceGeometry::new(vec![2, 6, 4]),
        RecordingPublisher::default(),
        Box::new(InputsConfiguration::default()),
    );
    task.initialize().unwrap();
    task.start_of_activity(&Activity::new(1, "run")).unwrap();
    for _ in 0..3 {
        task.monitor_data(&Batch::default()).unwrap();
    }

    let state = task.aggregation_state().unwrap();
    assert_eq!(state.live_time_ms, 6.0);
    assert_eq!(state.orbits_per_time_frame, 4);
}

#[test]
fn test_initialize_enables_decoder_outputs_and_registers_histograms() {
    let mut task = stub_task(settings("MTVX", 1.0), 1);
    task.initialize().unwrap();

    assert!(task.decoder().digits);
    assert!(task.decoder().lumi);

    let names: Vec<&str> = task
        .publisher()
        .registered
        .iter()
        .map(|descriptor| descriptor.name)
        .collect();
    assert_eq!(names.len(), 5);
    for expected in ["inputs", "classes", "bcReference", "inputRatio", "classRatio"] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
}

#[test]
fn test_luminosity_is_handed_back() {
    let mut task = stub_task(settings("MTVX", 1.0), 1);
    task.initialize().unwrap();
    task.start_of_activity(&Activity::new(1, "run")).unwrap();

    let lumi = LuminosityInfo {
        orbit: 10,
        counts: 99,
        input_index: 2,
    };
    let batch = Batch {
        records: vec![record(1, &[2], &[])],
        luminosity: vec![lumi],
    };
    task.monitor_data(&batch).unwrap();

    assert_eq!(task.last_luminosity(), &[lumi]);
}

#[test]
fn test_end_of_activity_marks_task_ended() {
    let mut task = stub_task(settings("MTVX", 1.0), 1);
    task.initialize().unwrap();
    let activity = Activity::new(3, "run");
    task.start_of_activity(&activity).unwrap();
    task.monitor_data(&Batch::default()).unwrap();
    task.end_of_activity(&activity).unwrap();

    assert_eq!(task.state(), TaskState::Ended);
    assert_eq!(task.aggregation_state().unwrap().processed_time_frames, 1);
}
