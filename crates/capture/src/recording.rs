use {
    crate::*,
    image::{Image, encode_jpeg},
    pose::{Pose, PoseSequence},
    std::{
        sync::Arc,
        time::{Duration, Instant},
    },
    tokio::{
        sync::oneshot,
        task::JoinHandle,
        time::MissedTickBehavior,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordingConfig {
    pub frame_rate: f64,
    pub jpeg_quality: u8,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            frame_rate: motion::NOMINAL_FRAME_RATE,
            jpeg_quality: 80,
        }
    }
}

impl RecordingConfig {
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
    Flushing,
    Complete,
}

/// What a finished session hands over.
#[derive(Debug, Clone)]
pub struct Recording {
    pub clip: ClipHandle,
    /// Every pose recorded while the session was recording, stamped with its
    /// offset from the start of the recording.
    pub poses: PoseSequence,
}

struct WorkerOutput {
    clip: Clip,
    duplicated: usize,
}

fn encode(image: &Image, quality: u8) -> Result<Arc<Vec<u8>>, RecordingError> {
    encode_jpeg(image, quality)
        .map(Arc::new)
        .map_err(|error| RecordingError::Worker(error.to_string()))
}

// samples the stream once per frame period until told to stop
async fn run_worker(
    mut stream: SurfaceStream,
    config: RecordingConfig,
    mut stop: oneshot::Receiver<()>,
) -> Result<WorkerOutput, RecordingError> {
    let size = stream.size();
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / config.frame_rate));
    // a late worker catches up by repeating the last frame
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let mut frames: Vec<Arc<Vec<u8>>> = Vec::new();
    let mut duplicated = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }
        let (surface, fresh) = stream.latest();
        let frame = match (surface, frames.last()) {
            (Some(surface), last) if fresh || last.is_none() => encode(&surface, config.jpeg_quality)?,
            (_, Some(last)) => {
                duplicated += 1;
                Arc::clone(last)
            }
            // nothing composited yet
            (_, None) => encode(&Image::filled(size, [0, 0, 0]), config.jpeg_quality)?,
        };
        frames.push(frame);
    }
    Ok(WorkerOutput {
        clip: Clip::new(frames, config.frame_rate, size),
        duplicated,
    })
}

/// Records the compositor output into a clip at a fixed rate, independent of
/// how many frames the tick loop manages to estimate.
///
/// `Idle -> Recording -> Flushing -> Complete`. A session is used once.
/// Dropping a session that is still recording stops the worker and releases the
/// surface stream.
pub struct RecordingSession {
    config: RecordingConfig,
    state: RecordingState,
    started_at: Option<Instant>,
    poses: PoseSequence,
    stop: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<Result<WorkerOutput, RecordingError>>>,
}

impl RecordingSession {
    pub fn new(config: RecordingConfig) -> Self {
        Self {
            config,
            state: RecordingState::Idle,
            started_at: None,
            poses: PoseSequence::new(),
            stop: None,
            worker: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Number of poses recorded so far.
    pub fn pose_count(&self) -> usize {
        self.poses.len()
    }

    /// Start sampling `stream`. Must be called from within a tokio runtime.
    pub fn start(&mut self, stream: SurfaceStream) -> Result<(), RecordingError> {
        if self.state != RecordingState::Idle {
            return Err(RecordingError::AlreadyStarted);
        }
        let frame_rate = self.config.frame_rate;
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            log::warn!("recording: refusing to start at {} fps", frame_rate);
            return Err(RecordingError::InvalidFrameRate(frame_rate));
        }
        let (stop_tx, stop_rx) = oneshot::channel();
        self.worker = Some(tokio::spawn(run_worker(stream, self.config.clone(), stop_rx)));
        self.stop = Some(stop_tx);
        self.started_at = Some(Instant::now());
        self.state = RecordingState::Recording;
        log::info!("recording: started at {} fps", self.config.frame_rate);
        Ok(())
    }

    /// Append the pose estimated for a frame captured at `captured_at`.
    /// Poses without a detection should be passed as `Pose::empty()`.
    pub fn record_pose(&mut self, captured_at: Instant, pose: Pose) -> Result<(), RecordingError> {
        let (RecordingState::Recording, Some(started_at)) = (self.state, self.started_at) else {
            return Err(RecordingError::NotRecording);
        };
        self.poses
            .push(captured_at.saturating_duration_since(started_at), pose);
        Ok(())
    }

    /// Stop sampling, wait for the worker to flush and return the clip and poses.
    pub async fn stop(&mut self) -> Result<Recording, RecordingError> {
        if self.state != RecordingState::Recording {
            log::warn!("recording: stop requested while {:?}", self.state);
            return Err(RecordingError::NotRecording);
        }
        self.state = RecordingState::Flushing;
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let joined = match self.worker.take() {
            Some(worker) => worker.await,
            None => Ok(Err(RecordingError::Worker("no worker".to_string()))),
        };
        self.state = RecordingState::Complete;
        let output = match joined {
            Ok(result) => result?,
            Err(error) => return Err(RecordingError::Worker(error.to_string())),
        };

        let poses = std::mem::take(&mut self.poses);
        let clip = ClipHandle::from(output.clip);
        log::info!(
            "recording: stopped with {} frames ({} repeated), {:.2}s, {} poses",
            clip.frame_count(),
            output.duplicated,
            clip.duration_secs(),
            poses.len()
        );
        Ok(Recording { clip, poses })
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            log::debug!("recording: dropped while {:?}, aborting worker", self.state);
            worker.abort();
        }
    }
}
