use {
    crate::*,
    std::sync::{Arc, Mutex},
    tokio::task::JoinHandle,
};

/// Fire-and-forget speech. Failures are logged and never reach the caller.
#[derive(Clone)]
pub struct Speaker {
    synth: Arc<dyn SpeechSynth>,
    player: Arc<Mutex<Box<dyn AudioPlayer>>>,
}

impl Speaker {
    pub fn new(synth: impl SpeechSynth + 'static, player: impl AudioPlayer + 'static) -> Self {
        Self {
            synth: Arc::new(synth),
            player: Arc::new(Mutex::new(Box::new(player))),
        }
    }

    /// Synthesize and play `text` in the background. Must be called from
    /// within a tokio runtime. The handle may be ignored.
    pub fn say(&self, text: impl Into<String>) -> JoinHandle<()> {
        let text = text.into();
        let synth = Arc::clone(&self.synth);
        let player = Arc::clone(&self.player);
        tokio::spawn(async move {
            log::info!("speak: \"{}\"", text);
            let sample = match synth.synthesize(text).await {
                Ok(sample) => sample,
                Err(error) => {
                    log::warn!("speak: synthesis failed: {}", error);
                    return;
                }
            };
            let mut player = player.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(error) = player.play(sample) {
                log::warn!("speak: {}", SpeechError::Playback(error));
            }
        })
    }

    /// Stop the current utterance.
    pub fn silence(&self) {
        self.player.lock().unwrap_or_else(|e| e.into_inner()).stop();
    }
}
