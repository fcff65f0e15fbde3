use {crate::*, std::time::Duration};

/// A pose stamped with its offset from the start of the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    pub offset: Duration,
    pub pose: Pose,
}

/// Append-only poses in capture order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseSequence {
    frames: Vec<PoseFrame>,
}

impl PoseSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poses taken exactly one nominal frame apart, starting at zero.
    pub fn from_poses(poses: impl IntoIterator<Item = Pose>, frame_rate: f64) -> Self {
        let frames = poses
            .into_iter()
            .enumerate()
            .map(|(i, pose)| PoseFrame {
                offset: Duration::from_secs_f64(i as f64 / frame_rate),
                pose,
            })
            .collect();
        Self { frames }
    }

    /// Append a pose. Offsets never go backwards; an earlier one is bumped to the last offset.
    pub fn push(&mut self, offset: Duration, pose: Pose) {
        let offset = match self.frames.last() {
            Some(last) if offset < last.offset => last.offset,
            _ => offset,
        };
        self.frames.push(PoseFrame { offset, pose });
    }

    pub fn get(&self, index: usize) -> Option<&Pose> {
        self.frames.get(index).map(|frame| &frame.pose)
    }

    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Map the sequence onto `total_frames` nominal frames at `frame_rate`.
    ///
    /// Nominal frame `i` sits at `i / frame_rate` seconds and takes the pose whose
    /// offset is nearest, if that pose is at most one frame interval away. Ties go
    /// to the earlier pose. Frames with no pose close enough get an empty pose.
    pub fn resample(&self, frame_rate: f64, total_frames: usize) -> PoseSequence {
        let interval = 1.0 / frame_rate;
        let offsets: Vec<f64> = self.frames.iter().map(|f| f.offset.as_secs_f64()).collect();

        let frames = (0..total_frames)
            .map(|i| {
                let t = i as f64 / frame_rate;
                let after = offsets.partition_point(|&offset| offset < t);
                let before = after.checked_sub(1);
                let nearest = match (before, offsets.get(after)) {
                    (Some(b), Some(&a_offset)) => {
                        if t - offsets[b] <= a_offset - t {
                            Some(b)
                        } else {
                            Some(after)
                        }
                    }
                    (Some(b), None) => Some(b),
                    (None, Some(_)) => Some(after),
                    (None, None) => None,
                };
                let pose = nearest
                    .filter(|&n| (offsets[n] - t).abs() <= interval + f64::EPSILON)
                    .map(|n| self.frames[n].pose.clone())
                    .unwrap_or_default();
                PoseFrame {
                    offset: Duration::from_secs_f64(t),
                    pose,
                }
            })
            .collect();
        PoseSequence { frames }
    }
}
