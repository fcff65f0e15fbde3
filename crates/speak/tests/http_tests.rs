use {
    speak::{HttpSpeechSynth, SpeechError, decode_speech},
    std::io::Cursor,
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    },
};

fn wav_bytes(samples: &[i16]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 24000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

/// Serve one HTTP request with `status`, `content_type` and `body`; hand back the request text.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (request_tx, request_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text
                    .lines()
                    .find_map(|line| {
                        let lower = line.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if request.len() >= end + 4 + length || n == 0 {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.ok();
        let _ = request_tx.send(String::from_utf8_lossy(&request).to_string());
    });
    (base_url, request_rx)
}

#[tokio::test]
async fn test_posts_text_and_decodes_wav() {
    let (base_url, request) = serve_once("200 OK", "audio/wav", wav_bytes(&[1, -2, 3, -4])).await;
    let synth = HttpSpeechSynth::new(&format!("{base_url}/"));
    assert!(synth.url().ends_with("/api/tts"));

    let sample = synth.request("Lift your arm").await.unwrap();
    assert_eq!(sample.samples(), &[1, -2, 3, -4]);
    assert_eq!(sample.sample_rate, 24000);

    let request = request.await.unwrap();
    assert!(request.starts_with("POST /api/tts HTTP/1.1"));
    assert!(request.contains(r#"{"text":"Lift your arm"}"#));
}

#[tokio::test]
async fn test_error_status() {
    let (base_url, _request) = serve_once("503 Service Unavailable", "text/plain", b"busy".to_vec()).await;
    let synth = HttpSpeechSynth::new(&base_url);
    assert!(matches!(
        synth.request("hello").await,
        Err(SpeechError::Status(503))
    ));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let synth = HttpSpeechSynth::new(&base_url);
    assert!(matches!(synth.request("hello").await, Err(SpeechError::Http(_))));
}

#[test]
fn test_decode_sniffs_riff_without_content_type() {
    let sample = decode_speech(None, &wav_bytes(&[7, 8])).unwrap();
    assert_eq!(sample.samples(), &[7, 8]);
    let sample = decode_speech(Some("audio/x-wav; codecs=1"), &wav_bytes(&[9])).unwrap();
    assert_eq!(sample.samples(), &[9]);
}

#[test]
fn test_decode_garbage_mpeg_fails() {
    assert!(matches!(
        decode_speech(Some("audio/mpeg"), b"definitely not audio"),
        Err(SpeechError::Decode(_))
    ));
}
