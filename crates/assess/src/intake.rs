use {
    crate::*,
    motion::MotionAnalysisSpec,
    serde_json::{Map, Value},
};

pub const FIRST_QUESTION: &str = "Describe your shoulder pain:";

// older generation services put the whole assessment in `nextQuestion` after this
const LEGACY_PREFIX: &str = "MOTION_ASSESSMENT:";
const LEGACY_MOTION_SECTION: &str = "Motion Analysis";

/// What the intake produced once the service declared itself ready.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialAssessment {
    pub assessment: Value,
    pub motion: MotionAnalysisSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeStep {
    Question(String),
    Ready(InitialAssessment),
}

/// Split a legacy `"1. Title: text 2. Title: text"` assessment into
/// `{ title: text }`. The `Motion Analysis` section becomes the instruction of a
/// spec without measurements.
pub fn parse_legacy_assessment(text: &str) -> InitialAssessment {
    let mut sections = Map::new();
    for section in split_numbered(text) {
        let (title, content) = match section.split_once(':') {
            Some((title, content)) => (title.trim(), content.trim()),
            None => (section.trim(), ""),
        };
        if title.is_empty() && content.is_empty() {
            continue;
        }
        sections.insert(title.to_string(), Value::String(content.to_string()));
    }
    let description = sections
        .get(LEGACY_MOTION_SECTION)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| text.trim().to_string());
    InitialAssessment {
        assessment: Value::Object(sections),
        motion: MotionAnalysisSpec::new(description, Vec::new()),
    }
}

// pieces between "<digits>." markers
fn split_numbered(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b'.' {
                pieces.push(&text[start..i]);
                start = j + 1;
                i = j + 1;
                continue;
            }
            i = j;
        } else {
            i += 1;
        }
    }
    pieces.push(&text[start..]);
    pieces.into_iter().filter(|piece| !piece.trim().is_empty()).collect()
}

/// Check a generation response against the contract and turn it into the next step.
pub fn interpret_response(response: QuestionResponse) -> Result<IntakeStep, AssessError> {
    if response.ready {
        if response.next_question.is_some() {
            return Err(ServiceError::Contract("ready response carries a next question".to_string()).into());
        }
        let assessment = response
            .assessment
            .filter(|value| !value.is_null())
            .ok_or_else(|| ServiceError::Contract("ready response without assessment".to_string()))?;
        let motion = response
            .motion_analysis
            .filter(|value| !value.is_null())
            .ok_or_else(|| ServiceError::Contract("ready response without motionAnalysis".to_string()))?;
        let motion = MotionAnalysisSpec::from_value(motion)?;
        return Ok(IntakeStep::Ready(InitialAssessment { assessment, motion }));
    }

    let question = response
        .next_question
        .ok_or_else(|| ServiceError::Contract("response has neither question nor assessment".to_string()))?;
    match question.trim_start().strip_prefix(LEGACY_PREFIX) {
        Some(text) => Ok(IntakeStep::Ready(parse_legacy_assessment(text))),
        None => Ok(IntakeStep::Question(question)),
    }
}

/// The question-and-answer conversation before motion capture.
#[derive(Debug, Clone, PartialEq)]
pub struct Intake {
    current_question: String,
    history: Vec<Message>,
    result: Option<InitialAssessment>,
}

impl Default for Intake {
    fn default() -> Self {
        Self::new()
    }
}

impl Intake {
    pub fn new() -> Self {
        Self {
            current_question: FIRST_QUESTION.to_string(),
            history: Vec::new(),
            result: None,
        }
    }

    pub fn current_question(&self) -> &str {
        &self.current_question
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn result(&self) -> Option<&InitialAssessment> {
        self.result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// The conversation as sent to the diagnosis service.
    pub fn questionnaire_results(&self) -> Value {
        serde_json::to_value(&self.history).unwrap_or(Value::Null)
    }

    /// Answer the current question. On any error nothing changes, so the same
    /// answer can be submitted again.
    pub async fn answer(
        &mut self,
        service: &dyn GenerationService,
        answer: &str,
    ) -> Result<IntakeStep, AssessError> {
        if self.result.is_some() {
            return Err(AssessError::PreconditionNotMet {
                stage: Stage::NotStarted,
                action: "answer a finished intake",
            });
        }
        let request = QuestionRequest {
            current_question: self.current_question.clone(),
            latest_answer: answer.to_string(),
            conversation_history: self.history.clone(),
        };
        let step = interpret_response(service.next_question(request).await?)?;

        self.history.push(Message::assistant(self.current_question.clone()));
        self.history.push(Message::user(answer));
        match &step {
            IntakeStep::Question(question) => {
                log::debug!("intake: next question after {} answers", self.history.len() / 2);
                self.current_question = question.clone();
            }
            IntakeStep::Ready(result) => {
                log::info!(
                    "intake: assessment ready with {} measurements",
                    result.motion.measurements.len()
                );
                self.result = Some(result.clone());
            }
        }
        Ok(step)
    }
}
