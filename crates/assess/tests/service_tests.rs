use {
    assess::{
        Diagnosis, DiagnosisRequest, DiagnosisService, GenerationService, HttpServices, Message,
        QuestionRequest, ServiceError,
    },
    motion::AssessmentOutcome,
    serde_json::{Value, json},
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    },
};

/// Serve one HTTP request with `status` and a JSON `body`; hand back the raw request.
async fn serve_once(status: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
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
                        line.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(body.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = request_tx.send(String::from_utf8_lossy(&request).to_string());
    });
    (base_url, request_rx)
}

fn request_body(request: &str) -> Value {
    let (_, body) = request.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}

fn question_request() -> QuestionRequest {
    QuestionRequest {
        current_question: "Describe your shoulder pain:".to_string(),
        latest_answer: "Dull ache at night".to_string(),
        conversation_history: vec![Message::assistant("Hello"), Message::user("Hi")],
    }
}

#[tokio::test]
async fn test_generate_question() {
    let (url, request) = serve_once(
        "200 OK",
        json!({ "nextQuestion": "Which side hurts?" }).to_string(),
    )
    .await;
    let services = HttpServices::new(&url);
    assert!(!services.base_url().ends_with('/'));
    let response = services.next_question(question_request()).await.unwrap();
    assert_eq!(response.next_question.as_deref(), Some("Which side hurts?"));
    assert!(!response.ready);

    let request = request.await.unwrap();
    assert!(request.starts_with("POST /api/generate-question "));
    let body = request_body(&request);
    assert_eq!(body["latestAnswer"], "Dull ache at night");
    assert_eq!(body["conversationHistory"][1], json!({ "role": "user", "content": "Hi" }));
}

#[tokio::test]
async fn test_generate_diagnosis() {
    let (url, request) = serve_once(
        "200 OK",
        json!({
            "condition": "Rotator cuff tendinopathy",
            "reasoning": "Painful arc between 60 and 120 degrees.",
            "exercises": ["Isometric external rotation"],
            "protocols": [],
            "suggestions": ["Avoid overhead lifting"],
            "nextSteps": ["Physiotherapy review in two weeks"]
        })
        .to_string(),
    )
    .await;
    let outcome = AssessmentOutcome {
        results: Vec::new(),
        overall_success: true,
    };
    let diagnosis = HttpServices::new(&url)
        .diagnose(DiagnosisRequest {
            questionnaire_results: json!([]),
            initial_assessment: json!({ "diagnosis": "strain" }),
            motion_assessment_results: outcome,
        })
        .await
        .unwrap();
    assert_eq!(diagnosis.condition, "Rotator cuff tendinopathy");
    assert_eq!(diagnosis.next_steps, vec!["Physiotherapy review in two weeks"]);
    let text = diagnosis.to_string();
    assert!(text.contains("Rotator cuff tendinopathy"));
    assert!(text.contains("Isometric external rotation"));

    let request = request.await.unwrap();
    assert!(request.starts_with("POST /api/generate-diagnosis "));
    assert_eq!(request_body(&request)["motionAssessmentResults"]["overallSuccess"], true);
}

#[tokio::test]
async fn test_error_status() {
    let (url, _request) = serve_once("500 Internal Server Error", "{}".to_string()).await;
    let result = HttpServices::new(&url).next_question(question_request()).await;
    assert_eq!(result, Err(ServiceError::Status(500)));
}

#[tokio::test]
async fn test_undecodable_body() {
    let (url, _request) = serve_once("200 OK", "<html>oops</html>".to_string()).await;
    let result = HttpServices::new(&url).next_question(question_request()).await;
    assert!(matches!(result, Err(ServiceError::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_service() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let result: Result<Diagnosis, _> = HttpServices::new(&url)
        .diagnose(DiagnosisRequest {
            questionnaire_results: Value::Null,
            initial_assessment: Value::Null,
            motion_assessment_results: AssessmentOutcome {
                results: Vec::new(),
                overall_success: false,
            },
        })
        .await;
    assert!(matches!(result, Err(ServiceError::Http(_))));
}
