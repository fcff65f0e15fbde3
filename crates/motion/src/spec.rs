use {
    pose::Landmark,
    serde::{Deserialize, Serialize},
    std::fmt,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SpecError {
    UnknownKind(String),
    UnknownLandmark(String),
    PointCount {
        kind: MeasurementKind,
        expected: usize,
        got: usize,
    },
    InvertedThresholds {
        low: f64,
        high: f64,
    },
    NonFiniteThreshold,
    /// The document is not a measurement spec at all.
    Malformed(String),
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::UnknownKind(kind) => write!(f, "unknown measurement kind \"{kind}\""),
            SpecError::UnknownLandmark(name) => write!(f, "unknown landmark \"{name}\""),
            SpecError::PointCount {
                kind,
                expected,
                got,
            } => write!(f, "{kind} measurement needs {expected} points, got {got}"),
            SpecError::InvertedThresholds { low, high } => {
                write!(f, "threshold low {low} is above high {high}")
            }
            SpecError::NonFiniteThreshold => write!(f, "thresholds must be finite numbers"),
            SpecError::Malformed(msg) => write!(f, "malformed motion analysis: {msg}"),
        }
    }
}

impl std::error::Error for SpecError {}

impl From<serde_json::Error> for SpecError {
    fn from(err: serde_json::Error) -> Self {
        SpecError::Malformed(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Angle,
    Distance,
    Velocity,
}

impl MeasurementKind {
    pub fn name(self) -> &'static str {
        match self {
            MeasurementKind::Angle => "angle",
            MeasurementKind::Distance => "distance",
            MeasurementKind::Velocity => "velocity",
        }
    }

    pub fn point_count(self) -> usize {
        match self {
            MeasurementKind::Angle => 3,
            MeasurementKind::Distance | MeasurementKind::Velocity => 2,
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A geometric quantity computed from the landmarks of one pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Angle at `vertex` from the ray towards `a` to the ray towards `b`.
    Angle {
        a: Landmark,
        vertex: Landmark,
        b: Landmark,
    },
    Distance {
        from: Landmark,
        to: Landmark,
    },
    /// Declared by generators but not computable from single poses.
    Velocity {
        from: Landmark,
        to: Landmark,
    },
}

impl Measurement {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            Measurement::Angle { .. } => MeasurementKind::Angle,
            Measurement::Distance { .. } => MeasurementKind::Distance,
            Measurement::Velocity { .. } => MeasurementKind::Velocity,
        }
    }

    pub fn points(&self) -> Vec<Landmark> {
        match *self {
            Measurement::Angle { a, vertex, b } => vec![a, vertex, b],
            Measurement::Distance { from, to } | Measurement::Velocity { from, to } => {
                vec![from, to]
            }
        }
    }
}

/// One measurement with its acceptance band `[threshold_low, threshold_high]`.
///
/// Only constructible through validation, so a value of this type always has
/// known landmarks, the right point count and ordered finite thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeasurementSpec", into = "RawMeasurementSpec")]
pub struct MeasurementSpec {
    measurement: Measurement,
    threshold_low: f64,
    threshold_high: f64,
}

impl MeasurementSpec {
    pub fn new(
        measurement: Measurement,
        threshold_low: f64,
        threshold_high: f64,
    ) -> Result<Self, SpecError> {
        if !threshold_low.is_finite() || !threshold_high.is_finite() {
            return Err(SpecError::NonFiniteThreshold);
        }
        if threshold_low > threshold_high {
            return Err(SpecError::InvertedThresholds {
                low: threshold_low,
                high: threshold_high,
            });
        }
        Ok(Self {
            measurement,
            threshold_low,
            threshold_high,
        })
    }

    pub fn angle(
        a: Landmark,
        vertex: Landmark,
        b: Landmark,
        low: f64,
        high: f64,
    ) -> Result<Self, SpecError> {
        Self::new(Measurement::Angle { a, vertex, b }, low, high)
    }

    pub fn distance(from: Landmark, to: Landmark, low: f64, high: f64) -> Result<Self, SpecError> {
        Self::new(Measurement::Distance { from, to }, low, high)
    }

    pub fn velocity(from: Landmark, to: Landmark, low: f64, high: f64) -> Result<Self, SpecError> {
        Self::new(Measurement::Velocity { from, to }, low, high)
    }

    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    pub fn kind(&self) -> MeasurementKind {
        self.measurement.kind()
    }

    pub fn threshold_low(&self) -> f64 {
        self.threshold_low
    }

    pub fn threshold_high(&self) -> f64 {
        self.threshold_high
    }

    /// Whether `value` lies inside the inclusive acceptance band.
    pub fn accepts(&self, value: f64) -> bool {
        self.threshold_low <= value && value <= self.threshold_high
    }
}

/// Wire form of a `MeasurementSpec`, as produced by the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeasurementSpec {
    #[serde(alias = "type")]
    pub kind: String,
    pub points: Vec<String>,
    pub threshold_low: f64,
    pub threshold_high: f64,
}

fn parse_landmark(name: &str) -> Result<Landmark, SpecError> {
    name.trim()
        .parse()
        .map_err(|_| SpecError::UnknownLandmark(name.to_string()))
}

impl TryFrom<RawMeasurementSpec> for MeasurementSpec {
    type Error = SpecError;

    fn try_from(raw: RawMeasurementSpec) -> Result<Self, SpecError> {
        let kind = match raw.kind.trim().to_ascii_lowercase().as_str() {
            "angle" => MeasurementKind::Angle,
            "distance" => MeasurementKind::Distance,
            "velocity" => MeasurementKind::Velocity,
            _ => return Err(SpecError::UnknownKind(raw.kind)),
        };
        if raw.points.len() != kind.point_count() {
            return Err(SpecError::PointCount {
                kind,
                expected: kind.point_count(),
                got: raw.points.len(),
            });
        }
        let points = raw
            .points
            .iter()
            .map(|name| parse_landmark(name))
            .collect::<Result<Vec<_>, _>>()?;
        let measurement = match kind {
            MeasurementKind::Angle => Measurement::Angle {
                a: points[0],
                vertex: points[1],
                b: points[2],
            },
            MeasurementKind::Distance => Measurement::Distance {
                from: points[0],
                to: points[1],
            },
            MeasurementKind::Velocity => Measurement::Velocity {
                from: points[0],
                to: points[1],
            },
        };
        MeasurementSpec::new(measurement, raw.threshold_low, raw.threshold_high)
    }
}

impl From<MeasurementSpec> for RawMeasurementSpec {
    fn from(spec: MeasurementSpec) -> Self {
        Self {
            kind: spec.kind().name().to_string(),
            points: spec
                .measurement
                .points()
                .into_iter()
                .map(|landmark| landmark.name().to_string())
                .collect(),
            threshold_low: spec.threshold_low,
            threshold_high: spec.threshold_high,
        }
    }
}

/// What to ask the subject to do, and how to measure it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionAnalysisSpec {
    /// Spoken instruction for the movement.
    pub description: String,
    #[serde(default)]
    pub measurements: Vec<MeasurementSpec>,
}

impl MotionAnalysisSpec {
    pub fn new(description: impl Into<String>, measurements: Vec<MeasurementSpec>) -> Self {
        Self {
            description: description.into(),
            measurements,
        }
    }

    /// Validate an untrusted JSON value. Any bad measurement rejects the whole spec.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SpecError> {
        let raw: RawMotionAnalysisSpec = serde_json::from_value(value)?;
        let measurements = raw
            .measurements
            .into_iter()
            .map(MeasurementSpec::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            description: raw.description,
            measurements,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Self::from_value(serde_json::from_str(json)?)
    }
}

#[derive(Deserialize)]
struct RawMotionAnalysisSpec {
    description: String,
    #[serde(default)]
    measurements: Vec<RawMeasurementSpec>,
}
