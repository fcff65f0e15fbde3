use {
    base::Vec2,
    pose::{Landmark, Pose},
    std::time::{Duration, Instant},
};

pub const REMINDER_BEFORE_RECORDING: &str =
    "Please start recording, then position your full body within the frame.";
pub const REMINDER_WHILE_RECORDING: &str = "Please position your full body within the frame.";

#[derive(Debug, Clone, PartialEq)]
pub struct PresenceConfig {
    /// Keypoints must score strictly above this.
    pub confidence: f32,
    /// Keypoints must lie in `[inset, 1 - inset]` of each frame dimension.
    pub inset: f32,
    /// Minimum time between two spoken events while out of frame.
    pub reminder_interval: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            confidence: 0.5,
            inset: 0.05,
            reminder_interval: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    /// The subject just came fully into frame; speak the movement instruction.
    SpeakPrompt(String),
    /// The subject is still not fully in frame.
    Reminder(String),
}

impl PresenceEvent {
    pub fn text(&self) -> &str {
        match self {
            PresenceEvent::SpeakPrompt(text) | PresenceEvent::Reminder(text) => text,
        }
    }
}

/// Whether every body landmark of `pose` is confidently inside the inset band of `bounds`.
pub fn is_in_frame(pose: &Pose, bounds: Vec2<f32>, config: &PresenceConfig) -> bool {
    let low = bounds * config.inset;
    let high = bounds * (1.0 - config.inset);
    Landmark::BODY.iter().all(|&landmark| {
        pose.confident(landmark, config.confidence)
            .is_some_and(|k| {
                let p = k.position;
                p.x >= low.x && p.x <= high.x && p.y >= low.y && p.y <= high.y
            })
    })
}

/// Edge-triggered in-frame tracking with rate-limited spoken reminders.
#[derive(Debug, Clone)]
pub struct PresenceMonitor {
    config: PresenceConfig,
    instruction: String,
    in_frame: bool,
    recording: bool,
    last_spoken: Option<Instant>,
}

impl PresenceMonitor {
    pub fn new(instruction: impl Into<String>, config: PresenceConfig) -> Self {
        Self {
            config,
            instruction: instruction.into(),
            in_frame: false,
            recording: false,
            last_spoken: None,
        }
    }

    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// Reminders change wording once recording has started.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub fn update(&mut self, pose: Option<&Pose>, bounds: Vec2<f32>, now: Instant) -> Option<PresenceEvent> {
        let in_frame = pose.is_some_and(|pose| is_in_frame(pose, bounds, &self.config));

        if in_frame {
            if self.in_frame {
                return None;
            }
            log::info!("presence: subject entered the frame");
            self.in_frame = true;
            self.last_spoken = Some(now);
            return Some(PresenceEvent::SpeakPrompt(self.instruction.clone()));
        }

        if self.in_frame {
            log::info!("presence: subject left the frame");
            self.in_frame = false;
        }
        let due = self.last_spoken.is_none_or(|spoken| {
            now.saturating_duration_since(spoken) >= self.config.reminder_interval
        });
        if !due {
            return None;
        }
        self.last_spoken = Some(now);
        let text = if self.recording {
            REMINDER_WHILE_RECORDING
        } else {
            REMINDER_BEFORE_RECORDING
        };
        Some(PresenceEvent::Reminder(text.to_string()))
    }
}
