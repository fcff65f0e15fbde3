use {
    crate::*,
    audio::{AudioSample, decode_mpeg, decode_wav},
    reqwest::header::CONTENT_TYPE,
    serde::Serialize,
};

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
}

/// Decode a text-to-audio payload. The content type decides; without one, a
/// RIFF header means WAV and anything else is taken as MPEG audio.
pub fn decode_speech(content_type: Option<&str>, bytes: &[u8]) -> Result<AudioSample, SpeechError> {
    let mime = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());
    let is_wav = match mime.as_deref() {
        Some("audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave") => true,
        Some("audio/mpeg" | "audio/mp3") => false,
        _ => bytes.starts_with(b"RIFF"),
    };
    if is_wav {
        decode_wav(bytes).map_err(SpeechError::Decode)
    } else {
        decode_mpeg(bytes).map_err(SpeechError::Decode)
    }
}

/// Client for the text-to-audio service: `POST {base_url}/api/tts` with `{"text": ...}`.
#[derive(Debug, Clone)]
pub struct HttpSpeechSynth {
    client: reqwest::Client,
    url: String,
}

impl HttpSpeechSynth {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/api/tts", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn request(&self, text: &str) -> Result<AudioSample, SpeechError> {
        let response = self
            .client
            .post(&self.url)
            .json(&TtsRequest { text })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Status(status.as_u16()));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        let sample = decode_speech(content_type.as_deref(), &bytes)?;
        log::debug!(
            "speak: {} bytes of {} -> {:?} of audio",
            bytes.len(),
            content_type.as_deref().unwrap_or("unknown"),
            sample.duration()
        );
        Ok(sample)
    }
}

impl SpeechSynth for HttpSpeechSynth {
    fn synthesize(&self, text: String) -> SynthFuture {
        let synth = self.clone();
        Box::pin(async move { synth.request(&text).await })
    }
}
