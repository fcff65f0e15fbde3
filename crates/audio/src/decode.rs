use {
    crate::*,
    std::io::Cursor,
    symphonia::core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
        formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
};

/// Decode a RIFF/WAVE file with 16-bit integer samples, downmixed to mono.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioSample, AudioError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(AudioError::Decode(format!(
            "unsupported WAV sample format: {:?} {} bits",
            spec.sample_format, spec.bits_per_sample
        )));
    }
    let interleaved = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
    Ok(AudioSample::new(
        downmix(&interleaved, spec.channels as usize),
        spec.sample_rate as usize,
    ))
}

/// Decode an MPEG audio stream (MP3) into mono PCM.
pub fn decode_mpeg(bytes: &[u8]) -> Result<AudioSample, AudioError> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let mut hint = Hint::new();
    hint.mime_type("audio/mpeg");
    let probed = symphonia::default::get_probe().format(
        &hint,
        source,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::Decode("no audio track".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0) as usize;
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(error))
                if error.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(error) => return Err(error.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // a corrupt frame is skipped, the rest of the stream is still usable
            Err(SymphoniaError::DecodeError(message)) => {
                log::debug!("skipping undecodable MPEG frame: {}", message);
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        let spec = *decoded.spec();
        sample_rate = spec.rate as usize;
        let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend(downmix(buffer.samples(), spec.channels.count()));
    }

    if sample_rate == 0 {
        return Err(AudioError::Decode("unknown sample rate".to_string()));
    }
    Ok(AudioSample::new(samples, sample_rate))
}
