use {
    pose::{Keypoint, Landmark, Pose, PoseSequence},
    std::time::Duration,
};

fn marker(x: f32) -> Pose {
    Pose::from_keypoints([Keypoint::new(Landmark::Nose, x, 0.0, 1.0)])
}

fn marker_x(pose: &Pose) -> Option<f32> {
    pose.get(Landmark::Nose).map(|k| k.position.x)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn test_push_keeps_offsets_monotonic() {
    let mut sequence = PoseSequence::new();
    sequence.push(ms(100), marker(1.0));
    sequence.push(ms(50), marker(2.0));
    assert_eq!(sequence.frames()[1].offset, ms(100));
    assert_eq!(sequence.len(), 2);
}

#[test]
fn test_resample_identity_at_nominal_rate() {
    let sequence = PoseSequence::from_poses((0..5).map(|i| marker(i as f32)), 30.0);
    let resampled = sequence.resample(30.0, 5);
    for i in 0..5 {
        assert_eq!(marker_x(resampled.get(i).unwrap()), Some(i as f32));
    }
}

#[test]
fn test_resample_stretches_slow_estimates() {
    // one pose every 150 ms, six nominal frames
    let mut sequence = PoseSequence::new();
    for i in 0..2 {
        sequence.push(ms(i * 150), marker(i as f32));
    }
    let resampled = sequence.resample(30.0, 6);
    assert_eq!(resampled.len(), 6);
    assert_eq!(marker_x(resampled.get(0).unwrap()), Some(0.0)); // 0 ms
    assert_eq!(marker_x(resampled.get(1).unwrap()), Some(0.0)); // 33 ms
    assert!(resampled.get(2).unwrap().is_empty()); // 67 ms, nearest is 67 ms away
    assert!(resampled.get(3).unwrap().is_empty()); // 100 ms, nearest is 50 ms away
    assert_eq!(marker_x(resampled.get(4).unwrap()), Some(1.0)); // 133 ms
    assert_eq!(marker_x(resampled.get(5).unwrap()), Some(1.0)); // 167 ms
}

#[test]
fn test_resample_tie_picks_earlier() {
    let mut sequence = PoseSequence::new();
    sequence.push(ms(0), marker(0.0));
    sequence.push(Duration::from_secs_f64(2.0 / 30.0), marker(2.0));
    let resampled = sequence.resample(30.0, 2);
    assert_eq!(marker_x(resampled.get(1).unwrap()), Some(0.0));
}

#[test]
fn test_resample_pads_past_the_end() {
    let sequence = PoseSequence::from_poses([marker(0.0)], 30.0);
    let resampled = sequence.resample(30.0, 4);
    assert_eq!(marker_x(resampled.get(1).unwrap()), Some(0.0));
    assert!(resampled.get(2).unwrap().is_empty());
    assert!(resampled.get(3).unwrap().is_empty());
}

#[test]
fn test_resample_empty_sequence() {
    let resampled = PoseSequence::new().resample(30.0, 3);
    assert_eq!(resampled.len(), 3);
    assert!(resampled.frames().iter().all(|f| f.pose.is_empty()));
}
