use {
    base::Vec2,
    image::Image,
    pose::{Keypoint, Landmark, Pose, PoseError, PoseEstimator, PoseModel},
    std::collections::VecDeque,
};

enum Step {
    Detect(Pose),
    Nothing,
    Fail,
    Panic,
}

struct ScriptedModel {
    steps: VecDeque<Step>,
    seen: Vec<Vec2<usize>>,
}

impl ScriptedModel {
    fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            seen: Vec::new(),
        }
    }
}

impl PoseModel for ScriptedModel {
    fn infer(&mut self, image: &Image) -> Result<Option<Pose>, PoseError> {
        self.seen.push(image.size);
        match self.steps.pop_front() {
            Some(Step::Detect(pose)) => Ok(Some(pose)),
            Some(Step::Nothing) | None => Ok(None),
            Some(Step::Fail) => Err(PoseError::Estimation("model hiccup".to_string())),
            Some(Step::Panic) => panic!("model crashed"),
        }
    }
}

fn frame() -> Image {
    Image::filled(Vec2::new(4, 4), [0, 0, 0])
}

fn wrist_pose() -> Pose {
    Pose::from_keypoints([Keypoint::new(Landmark::LeftWrist, 3.0, 4.0, 0.9)])
}

#[tokio::test]
async fn test_detects_pose() {
    let mut estimator = PoseEstimator::new(ScriptedModel::new([Step::Detect(wrist_pose())]));
    let pose = estimator.estimate(frame()).await.unwrap().unwrap();
    assert_eq!(pose, wrist_pose());
    assert_eq!(estimator.estimates(), 1);
}

#[tokio::test]
async fn test_no_body_is_none() {
    let mut estimator = PoseEstimator::new(ScriptedModel::new([
        Step::Nothing,
        Step::Detect(Pose::empty()),
    ]));
    assert!(estimator.estimate(frame()).await.unwrap().is_none());
    // an empty pose is reported the same way
    assert!(estimator.estimate(frame()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failure_does_not_stop_next_estimate() {
    let mut estimator = PoseEstimator::new(ScriptedModel::new([
        Step::Fail,
        Step::Detect(wrist_pose()),
    ]));
    assert!(matches!(
        estimator.estimate(frame()).await,
        Err(PoseError::Estimation(_))
    ));
    assert_eq!(estimator.failures(), 1);
    assert!(estimator.estimate(frame()).await.unwrap().is_some());
    assert!(estimator.is_available());
}

#[tokio::test]
async fn test_panicking_model_becomes_unavailable() {
    let mut estimator = PoseEstimator::new(ScriptedModel::new([Step::Panic]));
    assert!(matches!(
        estimator.estimate(frame()).await,
        Err(PoseError::Unavailable)
    ));
    assert!(!estimator.is_available());
    assert!(matches!(
        estimator.estimate(frame()).await,
        Err(PoseError::Unavailable)
    ));
}

#[tokio::test]
async fn test_cancelled_estimate_recovers_model() {
    let mut estimator = PoseEstimator::new(ScriptedModel::new([
        Step::Detect(wrist_pose()),
        Step::Nothing,
    ]));
    {
        // poll once so the work is handed to the blocking pool, then drop the future
        let future = estimator.estimate(frame());
        let _ = tokio::time::timeout(std::time::Duration::ZERO, future).await;
    }
    // the stale result is discarded; this call gets the second step
    assert!(estimator.estimate(frame()).await.unwrap().is_none());
    assert!(estimator.is_available());
}
