use {
    crate::*,
    std::{
        fmt,
        time::{Duration, Instant},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum TrimError {
    /// The clip duration could not be resolved before the timeout.
    DurationUnavailable { waited: Duration },
    /// The clip is shorter than one frame.
    EmptyClip,
    InvalidRange {
        start_frame: usize,
        end_frame: usize,
        total_frames: usize,
    },
}

impl fmt::Display for TrimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimError::DurationUnavailable { waited } => {
                write!(f, "clip duration unavailable after {:?}", waited)
            }
            TrimError::EmptyClip => write!(f, "clip has no frames"),
            TrimError::InvalidRange {
                start_frame,
                end_frame,
                total_frames,
            } => write!(
                f,
                "invalid frame range {start_frame}..={end_frame} of {total_frames}"
            ),
        }
    }
}

impl std::error::Error for TrimError {}

/// Something that knows, or will eventually know, how long a clip is.
pub trait DurationProbe {
    /// Duration in seconds. `None` or a non-finite value means "not known yet".
    fn duration_secs(&mut self) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrimStatus {
    Loading { attempts: u32 },
    Ready { duration_secs: f64 },
    Failed(TrimError),
}

/// Polls a `DurationProbe` with exponential backoff until it reports a finite
/// duration or the policy's timeout passes. Time is passed in explicitly.
#[derive(Debug, Clone)]
pub struct DurationResolver {
    policy: RetryPolicy,
    started: Option<Instant>,
    next_attempt: Option<Instant>,
    backoff: Duration,
    status: TrimStatus,
}

impl DurationResolver {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            started: None,
            next_attempt: None,
            backoff: policy.initial_backoff,
            status: TrimStatus::Loading { attempts: 0 },
        }
    }

    pub fn status(&self) -> &TrimStatus {
        &self.status
    }

    /// When the next probe is due, `None` once resolved or failed.
    pub fn next_attempt(&self) -> Option<Instant> {
        match self.status {
            TrimStatus::Loading { .. } => self.next_attempt,
            _ => None,
        }
    }

    /// Probe if an attempt is due at `now` and return the resulting status.
    pub fn poll(&mut self, probe: &mut dyn DurationProbe, now: Instant) -> &TrimStatus {
        let TrimStatus::Loading { attempts } = self.status else {
            return &self.status;
        };
        if self.next_attempt.is_some_and(|due| now < due) {
            return &self.status;
        }
        let started = *self.started.get_or_insert(now);

        if let Some(duration_secs) = probe.duration_secs().filter(|d| d.is_finite() && *d >= 0.0) {
            self.status = TrimStatus::Ready { duration_secs };
            return &self.status;
        }

        let attempts = attempts + 1;
        let waited = now.saturating_duration_since(started);
        if waited >= self.policy.timeout {
            log::warn!(
                "trim: clip duration still unknown after {:?} ({} attempts)",
                waited,
                attempts
            );
            self.status = TrimStatus::Failed(TrimError::DurationUnavailable { waited });
            return &self.status;
        }

        let delay = self.backoff.min(self.policy.timeout - waited);
        log::debug!("trim: duration unknown, retry {} in {:?}", attempts, delay);
        self.next_attempt = Some(now + delay);
        self.backoff = (self.backoff * 2).min(self.policy.max_backoff);
        self.status = TrimStatus::Loading { attempts };
        &self.status
    }
}

/// Resolve the clip duration, sleeping between attempts.
pub async fn resolve_duration(
    probe: &mut dyn DurationProbe,
    policy: RetryPolicy,
) -> Result<f64, TrimError> {
    let mut resolver = DurationResolver::new(policy);
    loop {
        let now = tokio::time::Instant::now().into_std();
        match resolver.poll(probe, now) {
            TrimStatus::Ready { duration_secs } => return Ok(*duration_secs),
            TrimStatus::Failed(error) => return Err(error.clone()),
            TrimStatus::Loading { .. } => {}
        }
        if let Some(due) = resolver.next_attempt() {
            tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await;
        }
    }
}

/// Start and end handles over the frames of a recorded clip.
///
/// Both handles stay inside `[0, total_frames - 1]` with `start <= end`. Moving
/// one handle into the other clamps the moving handle; the other never moves.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRangeSelector {
    total_frames: usize,
    duration_secs: f64,
    frame_rate: f64,
    start_frame: usize,
    end_frame: usize,
}

impl FrameRangeSelector {
    /// Select over `total_frames` frames at the nominal frame rate, initially all of them.
    pub fn new(total_frames: usize) -> Result<Self, TrimError> {
        Self::with_frame_rate(total_frames, NOMINAL_FRAME_RATE)
    }

    pub fn with_frame_rate(total_frames: usize, frame_rate: f64) -> Result<Self, TrimError> {
        if total_frames == 0 {
            return Err(TrimError::EmptyClip);
        }
        Ok(Self {
            total_frames,
            duration_secs: total_frames as f64 / frame_rate,
            frame_rate,
            start_frame: 0,
            end_frame: total_frames - 1,
        })
    }

    /// Select over a clip of `duration_secs`, `floor(duration * 30)` frames.
    pub fn from_duration(duration_secs: f64) -> Result<Self, TrimError> {
        Self::from_duration_at(duration_secs, NOMINAL_FRAME_RATE)
    }

    /// Select over a clip of `duration_secs` recorded at `frame_rate`,
    /// `floor(duration * frame_rate)` frames.
    pub fn from_duration_at(duration_secs: f64, frame_rate: f64) -> Result<Self, TrimError> {
        // the epsilon keeps durations computed as frames / rate from losing a frame
        let total_frames = (duration_secs * frame_rate + 1e-6).floor() as usize;
        let mut selector = Self::with_frame_rate(total_frames, frame_rate)?;
        selector.duration_secs = duration_secs;
        Ok(selector)
    }

    /// Resolve the duration through `probe` (see `resolve_duration`) and select over it.
    pub async fn load(probe: &mut dyn DurationProbe, policy: RetryPolicy) -> Result<Self, TrimError> {
        Self::load_at(probe, policy, NOMINAL_FRAME_RATE).await
    }

    /// Like `load`, for a clip recorded at `frame_rate`.
    pub async fn load_at(
        probe: &mut dyn DurationProbe,
        policy: RetryPolicy,
        frame_rate: f64,
    ) -> Result<Self, TrimError> {
        let duration_secs = resolve_duration(probe, policy).await?;
        let selector = Self::from_duration_at(duration_secs, frame_rate)?;
        log::info!(
            "trim: clip is {:.2}s, {} frames at {} fps",
            duration_secs,
            selector.total_frames,
            frame_rate
        );
        Ok(selector)
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn start_frame(&self) -> usize {
        self.start_frame
    }

    pub fn end_frame(&self) -> usize {
        self.end_frame
    }

    fn frame_at(&self, secs: f64) -> usize {
        // saturating: negative and NaN become 0
        (secs * self.frame_rate).floor() as usize
    }

    /// Move the start handle, clamped into `[0, end - 1]`. Returns the new start.
    pub fn set_start(&mut self, frame: usize) -> usize {
        self.start_frame = frame.min(self.end_frame.saturating_sub(1));
        self.start_frame
    }

    /// Move the end handle, clamped into `[start + 1, total - 1]`. Returns the new end.
    pub fn set_end(&mut self, frame: usize) -> usize {
        let last = self.total_frames - 1;
        self.end_frame = frame.max(self.start_frame + 1).min(last);
        self.end_frame
    }

    pub fn set_start_time(&mut self, secs: f64) -> usize {
        self.set_start(self.frame_at(secs))
    }

    pub fn set_end_time(&mut self, secs: f64) -> usize {
        self.set_end(self.frame_at(secs))
    }

    /// Move the start handle to a fraction (`0.0..=1.0`) of the clip duration.
    pub fn set_start_fraction(&mut self, fraction: f64) -> usize {
        self.set_start_time(fraction.clamp(0.0, 1.0) * self.duration_secs)
    }

    pub fn set_end_fraction(&mut self, fraction: f64) -> usize {
        self.set_end_time(fraction.clamp(0.0, 1.0) * self.duration_secs)
    }

    /// Playback position of `frame`.
    pub fn seek(&self, frame: usize) -> Duration {
        Duration::from_secs_f64(frame as f64 / self.frame_rate)
    }

    pub fn range(&self) -> FrameRange {
        FrameRange {
            start_frame: self.start_frame,
            end_frame: self.end_frame,
            total_frames: self.total_frames,
        }
    }

    /// Finish trimming.
    pub fn confirm(self) -> FrameRange {
        log::info!(
            "trim: confirmed frames {}..={} of {}",
            self.start_frame,
            self.end_frame,
            self.total_frames
        );
        self.range()
    }
}
