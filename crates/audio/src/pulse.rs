use {
    crate::*,
    libpulse_binding::{
        sample::{Format, Spec},
        stream::Direction,
    },
    libpulse_simple_binding::Simple,
};

/// PulseAudio playback through the simple API.
pub struct PulseOut {
    pulse: Option<Simple>,
}

impl PulseOut {
    pub fn new() -> Self {
        Self { pulse: None }
    }
}

impl Default for PulseOut {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutDevice for PulseOut {
    fn open(&mut self, config: &AudioOutConfig) -> Result<(), AudioError> {
        let spec = Spec {
            format: Format::S16NE,
            channels: 1,
            rate: config.sample_rate as u32,
        };
        let pulse = Simple::new(
            None,
            "shoulder-assess",
            Direction::Playback,
            config.device_name.as_deref(),
            "spoken-instructions",
            &spec,
            None,
            None,
        )
        .map_err(|error| AudioError::Device(ToString::to_string(&error)))?;
        self.pulse = Some(pulse);
        Ok(())
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        let pulse = self
            .pulse
            .as_ref()
            .ok_or_else(|| AudioError::Device("not open".to_string()))?;
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        pulse
            .write(&bytes)
            .map_err(|error| AudioError::Device(ToString::to_string(&error)))
    }

    fn drain(&mut self) -> Result<(), AudioError> {
        match &self.pulse {
            Some(pulse) => pulse
                .drain()
                .map_err(|error| AudioError::Device(ToString::to_string(&error))),
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        self.pulse.take();
    }
}
