use {
    crate::*,
    motion::AssessmentOutcome,
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::Value,
    std::{fmt, future::Future, pin::Pin},
};

pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub current_question: String,
    pub latest_answer: String,
    pub conversation_history: Vec<Message>,
}

/// The generation service's answer as sent. See `Intake` for how it is checked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionResponse {
    pub next_question: Option<String>,
    pub assessment: Option<Value>,
    pub motion_analysis: Option<Value>,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    pub questionnaire_results: Value,
    pub initial_assessment: Value,
    pub motion_assessment_results: AssessmentOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Diagnosis {
    pub condition: String,
    pub reasoning: String,
    pub exercises: Vec<String>,
    pub protocols: Vec<String>,
    pub suggestions: Vec<String>,
    pub next_steps: Vec<String>,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Condition: {}", self.condition)?;
        writeln!(f, "\n{}", self.reasoning)?;
        let lists = [
            ("Exercises", &self.exercises),
            ("Protocols", &self.protocols),
            ("Suggestions", &self.suggestions),
            ("Next steps", &self.next_steps),
        ];
        for (title, items) in lists {
            if items.is_empty() {
                continue;
            }
            writeln!(f, "\n{}:", title)?;
            for item in items {
                writeln!(f, "  - {}", item)?;
            }
        }
        Ok(())
    }
}

/// Question and assessment generation.
pub trait GenerationService: Send + Sync {
    fn next_question(&self, request: QuestionRequest) -> ServiceFuture<QuestionResponse>;
}

/// Diagnosis generation.
pub trait DiagnosisService: Send + Sync {
    fn diagnose(&self, request: DiagnosisRequest) -> ServiceFuture<Diagnosis>;
}

/// Both services over HTTP, as JSON `POST`s below one base URL.
#[derive(Debug, Clone)]
pub struct HttpServices {
    client: reqwest::Client,
    base_url: String,
}

impl HttpServices {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<B, T>(&self, path: &'static str, body: &B) -> ServiceFuture<T>
    where
        B: Serialize,
        T: DeserializeOwned + 'static,
    {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.post(&url).json(body);
        Box::pin(async move {
            log::debug!("service: POST {}", url);
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                log::warn!("service: {} returned {}", url, status);
                return Err(ServiceError::Status(status.as_u16()));
            }
            let bytes = response.bytes().await?;
            serde_json::from_slice(&bytes).map_err(|error| ServiceError::Decode(error.to_string()))
        })
    }
}

impl GenerationService for HttpServices {
    fn next_question(&self, request: QuestionRequest) -> ServiceFuture<QuestionResponse> {
        self.post("/api/generate-question", &request)
    }
}

impl DiagnosisService for HttpServices {
    fn diagnose(&self, request: DiagnosisRequest) -> ServiceFuture<Diagnosis> {
        self.post("/api/generate-diagnosis", &request)
    }
}
