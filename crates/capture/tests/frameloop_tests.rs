use {
    base::Vec2,
    capture::{CaptureError, FrameCompositor, FrameLoop},
    image::{Image, PixelFormat},
    motion::{PresenceConfig, PresenceEvent, PresenceMonitor},
    pose::{Keypoint, Landmark, Pose, PoseError, PoseEstimator, PoseModel},
    std::{collections::VecDeque, time::Instant},
    video::VideoFrame,
};

enum Step {
    Detect(Pose),
    Fail,
    Panic,
}

struct ScriptedModel(VecDeque<Step>);

impl PoseModel for ScriptedModel {
    fn infer(&mut self, _image: &Image) -> Result<Option<Pose>, PoseError> {
        match self.0.pop_front() {
            Some(Step::Detect(pose)) => Ok(Some(pose)),
            Some(Step::Fail) => Err(PoseError::Estimation("timeout".to_string())),
            Some(Step::Panic) => panic!("model crashed"),
            None => Ok(None),
        }
    }
}

fn frame_loop(steps: impl IntoIterator<Item = Step>) -> FrameLoop {
    FrameLoop::new(
        PoseEstimator::new(ScriptedModel(steps.into_iter().collect())),
        FrameCompositor::new(Vec2::new(64, 48)),
    )
}

fn camera_frame(sequence: u64) -> VideoFrame {
    VideoFrame {
        image: Image::filled(Vec2::new(640, 480), [30, 30, 30]),
        captured_at: Instant::now(),
        sequence,
    }
}

fn standing() -> Pose {
    Pose::from_keypoints(Landmark::BODY.iter().enumerate().map(|(i, &landmark)| {
        Keypoint::new(landmark, 200.0 + 20.0 * i as f32, 100.0 + 25.0 * i as f32, 0.9)
    }))
}

#[tokio::test]
async fn test_tick_estimates_and_composites() {
    let mut frames = frame_loop([Step::Detect(standing())]);
    let tick = frames.tick(camera_frame(0)).await.unwrap();
    assert_eq!(tick.pose, Some(standing()));
    assert_eq!(tick.surface.size, Vec2::new(64, 48));
    assert_eq!(tick.surface.format, PixelFormat::Rgb8);
    assert_eq!(frames.compositor().current().unwrap(), tick.surface);
    assert_eq!(frames.ticks(), 1);
    assert!(tick.event.is_none());
}

#[tokio::test]
async fn test_failed_estimate_is_absorbed() {
    let mut frames = frame_loop([Step::Fail, Step::Detect(standing())]);
    let tick = frames.tick(camera_frame(0)).await.unwrap();
    assert!(tick.pose.is_none());
    let tick = frames.tick(camera_frame(1)).await.unwrap();
    assert!(tick.pose.is_some());
    assert_eq!(frames.estimator().failures(), 1);
}

#[tokio::test]
async fn test_lost_model_is_an_error() {
    let mut frames = frame_loop([Step::Panic]);
    assert!(matches!(
        frames.tick(camera_frame(0)).await,
        Err(CaptureError::Pose(PoseError::Unavailable))
    ));
}

#[tokio::test]
async fn test_presence_events_flow_through() {
    let mut frames = frame_loop([Step::Detect(standing()), Step::Detect(standing())])
        .with_presence(PresenceMonitor::new("Raise your arm.", PresenceConfig::default()));

    let tick = frames.tick(camera_frame(0)).await.unwrap();
    assert_eq!(
        tick.event,
        Some(PresenceEvent::SpeakPrompt("Raise your arm.".to_string()))
    );
    let tick = frames.tick(camera_frame(1)).await.unwrap();
    assert_eq!(tick.event, None);
    assert!(frames.presence_mut().unwrap().in_frame());
}
