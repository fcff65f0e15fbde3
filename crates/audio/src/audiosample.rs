use {base::Tensor, std::time::Duration};

/// Mono 16-bit PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSample {
    pub data: Tensor<i16>,
    pub sample_rate: usize,
}

impl AudioSample {
    pub fn new(samples: Vec<i16>, sample_rate: usize) -> Self {
        Self {
            data: Tensor {
                shape: vec![samples.len()],
                data: samples,
            },
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.data.data
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.data.data.len() as f64 / self.sample_rate as f64)
    }
}

// average interleaved channels into one
pub(crate) fn downmix(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| (frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32) as i16)
        .collect()
}
