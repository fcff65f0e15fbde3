use {
    crate::*,
    capture::{ClipHandle, Recording, RecordingSession, SurfaceStream},
    motion::{
        AssessmentOutcome, FrameRange, FrameRangeSelector, MotionAnalysisSpec, PresenceConfig,
        PresenceMonitor, RetryPolicy, score,
    },
    pose::Pose,
    serde_json::Value,
    std::{sync::Arc, time::Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NotStarted,
    AwaitingCapture,
    Recording,
    Trimming,
    Scoring,
    Done,
}

/// One assessment attempt, from the initial assessment to the diagnosis.
///
/// Every step checks the current stage and fails with `PreconditionNotMet`
/// instead of skipping ahead. Resource and data failures leave the stage as it
/// was so the caller can retry or give up.
pub struct Orchestrator {
    stage: Stage,
    session: RecordingSession,
    diagnosis: Arc<dyn DiagnosisService>,
    retry_policy: RetryPolicy,
    questionnaire: Value,
    initial: Option<InitialAssessment>,
    recording: Option<Recording>,
    selector: Option<FrameRangeSelector>,
    range: Option<FrameRange>,
    outcome: Option<AssessmentOutcome>,
}

impl Orchestrator {
    pub fn new(session: RecordingSession, diagnosis: Arc<dyn DiagnosisService>) -> Self {
        Self {
            stage: Stage::NotStarted,
            session,
            diagnosis,
            retry_policy: RetryPolicy::default(),
            questionnaire: Value::Null,
            initial: None,
            recording: None,
            selector: None,
            range: None,
            outcome: None,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn require(&self, stage: Stage, action: &'static str) -> Result<(), AssessError> {
        if self.stage != stage {
            return Err(AssessError::PreconditionNotMet {
                stage: self.stage,
                action,
            });
        }
        Ok(())
    }

    fn advance(&mut self, stage: Stage) {
        log::info!("assessment: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Take over the intake's result. `questionnaire` is passed on to the diagnosis.
    pub fn begin(&mut self, initial: InitialAssessment, questionnaire: Value) -> Result<(), AssessError> {
        self.require(Stage::NotStarted, "begin")?;
        self.initial = Some(initial);
        self.questionnaire = questionnaire;
        self.advance(Stage::AwaitingCapture);
        Ok(())
    }

    pub fn motion_spec(&self) -> Option<&MotionAnalysisSpec> {
        self.initial.as_ref().map(|initial| &initial.motion)
    }

    /// Presence monitor that speaks this assessment's movement instruction.
    pub fn presence_monitor(&self, config: PresenceConfig) -> Result<PresenceMonitor, AssessError> {
        let spec = self.motion_spec().ok_or(AssessError::PreconditionNotMet {
            stage: self.stage,
            action: "monitor presence",
        })?;
        Ok(PresenceMonitor::new(spec.description.clone(), config))
    }

    pub fn start_recording(&mut self, stream: SurfaceStream) -> Result<(), AssessError> {
        self.require(Stage::AwaitingCapture, "start recording")?;
        self.session.start(stream)?;
        self.advance(Stage::Recording);
        Ok(())
    }

    /// Record the pose estimated for a frame, `None` when nobody was detected.
    pub fn record_pose(&mut self, captured_at: Instant, pose: Option<Pose>) -> Result<(), AssessError> {
        self.require(Stage::Recording, "record a pose")?;
        self.session.record_pose(captured_at, pose.unwrap_or_default())?;
        Ok(())
    }

    /// Stop recording and prepare trimming. If the clip duration cannot be
    /// resolved the stage is Trimming without a selector; see `retry_trim`.
    pub async fn stop_recording(&mut self) -> Result<&ClipHandle, AssessError> {
        self.require(Stage::Recording, "stop recording")?;
        let recording = self.session.stop().await?;
        self.recording = Some(recording);
        self.advance(Stage::Trimming);
        self.load_selector().await?;
        self.clip()
            .ok_or_else(|| AssessError::Resource("recording vanished".to_string()))
    }

    async fn load_selector(&mut self) -> Result<(), AssessError> {
        let Some(recording) = &self.recording else {
            return Err(AssessError::Resource("no recording".to_string()));
        };
        let mut clip = recording.clip.clone();
        let frame_rate = clip.frame_rate();
        match FrameRangeSelector::load_at(&mut clip, self.retry_policy, frame_rate).await {
            Ok(selector) => {
                self.selector = Some(selector);
                Ok(())
            }
            Err(error) => {
                log::warn!("assessment: cannot trim: {}", error);
                Err(error.into())
            }
        }
    }

    /// Try to resolve the clip duration again after a `DataUnavailable`.
    pub async fn retry_trim(&mut self) -> Result<(), AssessError> {
        self.require(Stage::Trimming, "retry trimming")?;
        if self.selector.is_some() {
            return Ok(());
        }
        self.load_selector().await
    }

    pub fn clip(&self) -> Option<&ClipHandle> {
        self.recording.as_ref().map(|recording| &recording.clip)
    }

    pub fn selector_mut(&mut self) -> Result<&mut FrameRangeSelector, AssessError> {
        let stage = self.stage;
        match (stage, self.selector.as_mut()) {
            (Stage::Trimming, Some(selector)) => Ok(selector),
            _ => Err(AssessError::PreconditionNotMet {
                stage,
                action: "adjust the frame range",
            }),
        }
    }

    /// Fix the selected range and move on to scoring.
    pub fn confirm_range(&mut self) -> Result<FrameRange, AssessError> {
        self.require(Stage::Trimming, "confirm the frame range")?;
        let selector = self.selector.take().ok_or(AssessError::PreconditionNotMet {
            stage: self.stage,
            action: "confirm the frame range",
        })?;
        let range = selector.confirm();
        self.range = Some(range);
        self.advance(Stage::Scoring);
        Ok(range)
    }

    /// Score the recorded poses over the confirmed range.
    ///
    /// Poses are first mapped onto the clip's frames at the clip's frame rate,
    /// so frame indices of the range and of the pose sequence agree.
    pub fn score(&mut self) -> Result<&AssessmentOutcome, AssessError> {
        self.require(Stage::Scoring, "score")?;
        let (Some(range), Some(recording), Some(initial)) =
            (self.range, self.recording.as_ref(), self.initial.as_ref())
        else {
            return Err(AssessError::PreconditionNotMet {
                stage: self.stage,
                action: "score",
            });
        };
        let poses = recording
            .poses
            .resample(recording.clip.frame_rate(), range.total_frames());
        let outcome = score(&poses, &range, &initial.motion);
        log::info!(
            "assessment: {} of {} measurements within threshold, success: {}",
            outcome.results.iter().filter(|r| r.within_threshold).count(),
            outcome.results.len(),
            outcome.overall_success
        );
        self.advance(Stage::Done);
        Ok(self.outcome.insert(outcome))
    }

    pub fn outcome(&self) -> Option<&AssessmentOutcome> {
        self.outcome.as_ref()
    }

    /// Ask the diagnosis service about the finished assessment. May be retried.
    pub async fn diagnose(&self) -> Result<Diagnosis, AssessError> {
        self.require(Stage::Done, "request a diagnosis")?;
        let (Some(outcome), Some(initial)) = (self.outcome.as_ref(), self.initial.as_ref()) else {
            return Err(AssessError::PreconditionNotMet {
                stage: self.stage,
                action: "request a diagnosis",
            });
        };
        let request = DiagnosisRequest {
            questionnaire_results: self.questionnaire.clone(),
            initial_assessment: initial.assessment.clone(),
            motion_assessment_results: outcome.clone(),
        };
        let diagnosis = self.diagnosis.diagnose(request).await?;
        log::info!("assessment: diagnosis \"{}\"", diagnosis.condition);
        Ok(diagnosis)
    }

    /// Score, then wait for the diagnosis.
    pub async fn finish(&mut self) -> Result<(AssessmentOutcome, Diagnosis), AssessError> {
        let outcome = self.score()?.clone();
        let diagnosis = self.diagnose().await?;
        Ok((outcome, diagnosis))
    }
}
