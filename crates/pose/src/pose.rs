use {crate::*, base::Vec2};

/// One detected landmark, in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub landmark: Landmark,
    pub position: Vec2<f32>,
    /// Detection score in `[0, 1]`. Positions are only trustworthy above a threshold.
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(landmark: Landmark, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            landmark,
            position: Vec2::new(x, y),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// All keypoints detected at one instant, at most one per landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    keypoints: [Option<Keypoint>; LANDMARK_COUNT],
}

impl Default for Pose {
    fn default() -> Self {
        Self::empty()
    }
}

impl Pose {
    /// A pose with no landmarks, used for frames where nothing was detected.
    pub fn empty() -> Self {
        Self {
            keypoints: [None; LANDMARK_COUNT],
        }
    }

    /// Build a pose from keypoints. A repeated landmark replaces the earlier one.
    pub fn from_keypoints(keypoints: impl IntoIterator<Item = Keypoint>) -> Self {
        let mut pose = Self::empty();
        for keypoint in keypoints {
            pose.keypoints[keypoint.landmark.index()] = Some(keypoint);
        }
        pose
    }

    pub fn get(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.keypoints[landmark.index()].as_ref()
    }

    /// The keypoint for `landmark` if its confidence is strictly above `threshold`.
    pub fn confident(&self, landmark: Landmark, threshold: f32) -> Option<&Keypoint> {
        self.get(landmark).filter(|k| k.confidence > threshold)
    }

    /// Keypoints in landmark order.
    pub fn keypoints(&self) -> impl Iterator<Item = &Keypoint> {
        self.keypoints.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.keypoints().count()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.iter().all(Option::is_none)
    }

    /// Same pose with every position shifted by `offset`.
    pub fn translated(&self, offset: Vec2<f32>) -> Self {
        Self::from_keypoints(self.keypoints().map(|k| Keypoint {
            position: k.position + offset,
            ..*k
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_landmark_replaces() {
        let pose = Pose::from_keypoints([
            Keypoint::new(Landmark::LeftElbow, 1.0, 1.0, 0.3),
            Keypoint::new(Landmark::LeftElbow, 2.0, 2.0, 0.9),
        ]);
        assert_eq!(pose.len(), 1);
        assert_eq!(pose.get(Landmark::LeftElbow).unwrap().position, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_confident_is_strict() {
        let pose = Pose::from_keypoints([Keypoint::new(Landmark::Nose, 0.0, 0.0, 0.5)]);
        assert!(pose.confident(Landmark::Nose, 0.5).is_none());
        assert!(pose.confident(Landmark::Nose, 0.49).is_some());
        assert!(pose.confident(Landmark::LeftEye, 0.0).is_none());
    }

    #[test]
    fn test_keypoints_in_landmark_order() {
        let pose = Pose::from_keypoints([
            Keypoint::new(Landmark::RightAnkle, 0.0, 0.0, 1.0),
            Keypoint::new(Landmark::Nose, 0.0, 0.0, 1.0),
        ]);
        let order: Vec<_> = pose.keypoints().map(|k| k.landmark).collect();
        assert_eq!(order, vec![Landmark::Nose, Landmark::RightAnkle]);
    }
}
