//! Dialogue generation.
//!
//! Sends the fixed lesson prompt through the session's client handle and
//! tidies the returned text. One call per trigger: no retry, no caching.

use tracing::{info, warn, Instrument};

use crate::config::DEFAULT_MODEL;
use crate::error::Error;
use crate::gemini::{GenerateRequest, GenerationConfig};
use crate::session::SessionState;
use crate::text;

/// Sampling temperature; high enough that every click yields a new dialogue.
pub const TEMPERATURE: f64 = 0.8;

/// Instructions sent on every call. The model fills in the dialogue and notes.
pub const PROMPT_TEMPLATE: &str = "
    다음 형식에 맞춰 영화나 드라마에서 나올 법한 자연스러운 일상 영어 대화문(A, B 두 인물의 2-3 문장)을 랜덤하게 생성하고, 이 문장들의 문맥 및 핵심 표현에 대한 해설을 자세히 한국어로 제공해 줘.

    ---
    🎬 대화:
    A: [대화 내용]
    B: [대화 내용]

    📝 해설:
    **문맥**: [한국어 설명]
    **핵심 표현**: [핵심 영어 표현] - [한국어 뜻과 용법]
    ---
    ";

/// A generated dialogue, already dedented and stripped. Markdown.
///
/// Models often echo the `---` lines framing the prompt's layout; rules at
/// the very start or end are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    markdown: String,
}

impl Lesson {
    pub fn from_raw(raw: &str) -> Self {
        Self {
            markdown: text::strip_outer_rules(&text::tidy(raw)),
        }
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }
}

/// Result of one generation trigger.
#[derive(Debug)]
pub enum GenerationOutcome {
    Generated(Lesson),
    /// No client handle in the session; the service was not called.
    NotConfigured,
    Failed { error: Error },
}

#[derive(Debug, Clone)]
pub struct DialogueGenerator {
    model: String,
    temperature: f64,
}

impl Default for DialogueGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl DialogueGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: TEMPERATURE,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The request sent on every trigger.
    pub fn request(&self) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: PROMPT_TEMPLATE.to_string(),
            config: GenerationConfig {
                temperature: Some(self.temperature),
            },
        }
    }

    /// Generates one lesson with the handle stored in `session`.
    pub async fn generate(&self, session: &SessionState) -> GenerationOutcome {
        let Some(client) = session.client() else {
            warn!("generation triggered without a configured client");
            return GenerationOutcome::NotConfigured;
        };

        let request = self.request();
        let span = tracing::info_span!("generate_dialogue", model = %self.model);
        match client.generate(&request).instrument(span).await {
            Ok(response) => {
                let lesson = Lesson::from_raw(&response.text);
                info!(chars = lesson.markdown().chars().count(), "lesson generated");
                GenerationOutcome::Generated(lesson)
            }
            Err(error) => {
                warn!(kind = %error.kind(), error = %error, "lesson generation failed");
                GenerationOutcome::Failed { error }
            }
        }
    }
}
