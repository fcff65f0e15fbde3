use {
    crate::*,
    pose::{Pose, PoseSequence},
    serde::{Deserialize, Serialize},
};

/// Inclusive frame range of a clip, `start_frame <= end_frame < total_frames`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRange {
    pub(crate) start_frame: usize,
    pub(crate) end_frame: usize,
    pub(crate) total_frames: usize,
}

impl FrameRange {
    pub fn new(start_frame: usize, end_frame: usize, total_frames: usize) -> Result<Self, TrimError> {
        if start_frame > end_frame || end_frame >= total_frames {
            return Err(TrimError::InvalidRange {
                start_frame,
                end_frame,
                total_frames,
            });
        }
        Ok(Self {
            start_frame,
            end_frame,
            total_frames,
        })
    }

    pub fn start_frame(&self) -> usize {
        self.start_frame
    }

    pub fn end_frame(&self) -> usize {
        self.end_frame
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Number of frames in the range, both ends included.
    pub fn len(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn frames(&self) -> std::ops::RangeInclusive<usize> {
        self.start_frame..=self.end_frame
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResult {
    pub spec: MeasurementSpec,
    /// One entry per frame of the range; `None` where a landmark was missing.
    pub per_frame_values: Vec<Option<f64>>,
    /// Mean of the non-null values, `None` if there are none.
    pub average: Option<f64>,
    pub within_threshold: bool,
    /// False for measurement kinds that cannot be computed (velocity).
    pub supported: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentOutcome {
    pub results: Vec<MeasurementResult>,
    /// AND of every `within_threshold`; true when there are no measurements.
    pub overall_success: bool,
}

/// Value of `measurement` in one pose, or `None` if a required landmark is absent.
///
/// Positions are used whatever their confidence: the estimator already dropped
/// the keypoints it did not detect.
pub fn evaluate(measurement: &Measurement, pose: &Pose) -> Option<f64> {
    let position = |landmark| pose.get(landmark).map(|k| k.position.to_f64());
    match *measurement {
        Measurement::Angle { a, vertex, b } => {
            Some(angle_degrees(position(a)?, position(vertex)?, position(b)?))
        }
        Measurement::Distance { from, to } => Some(distance(position(from)?, position(to)?)),
        Measurement::Velocity { .. } => None,
    }
}

fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Score one measurement over the frames of `range`. Frames past the end of
/// `sequence` count as missing.
pub fn score_measurement(
    sequence: &PoseSequence,
    range: &FrameRange,
    spec: &MeasurementSpec,
) -> MeasurementResult {
    let per_frame_values: Vec<Option<f64>> = range
        .frames()
        .map(|frame| {
            sequence
                .get(frame)
                .and_then(|pose| evaluate(spec.measurement(), pose))
        })
        .collect();
    let average = mean(&per_frame_values);
    MeasurementResult {
        spec: spec.clone(),
        within_threshold: average.is_some_and(|average| spec.accepts(average)),
        supported: spec.kind() != MeasurementKind::Velocity,
        per_frame_values,
        average,
    }
}

/// Score every measurement of `spec` over `range` of `sequence`.
pub fn score(
    sequence: &PoseSequence,
    range: &FrameRange,
    spec: &MotionAnalysisSpec,
) -> AssessmentOutcome {
    let results: Vec<MeasurementResult> = spec
        .measurements
        .iter()
        .map(|measurement| score_measurement(sequence, range, measurement))
        .collect();
    let overall_success = results.iter().all(|result| result.within_threshold);
    AssessmentOutcome {
        results,
        overall_success,
    }
}
