use {
    crate::*,
    audio::{AudioError, AudioOut, AudioSample},
    std::{future::Future, pin::Pin},
};

pub type SynthFuture = Pin<Box<dyn Future<Output = Result<AudioSample, SpeechError>> + Send>>;

/// Text to audio.
pub trait SpeechSynth: Send + Sync {
    fn synthesize(&self, text: String) -> SynthFuture;
}

/// Somewhere to send synthesized audio.
pub trait AudioPlayer: Send {
    /// Queue `sample` for playback without waiting for it to finish.
    fn play(&mut self, sample: AudioSample) -> Result<(), AudioError>;
    /// Stop whatever is playing.
    fn stop(&mut self);
}

impl AudioPlayer for AudioOut {
    fn play(&mut self, sample: AudioSample) -> Result<(), AudioError> {
        AudioOut::play(self, sample).map(|_| ())
    }

    fn stop(&mut self) {
        self.cancel();
    }
}
