//! Event handling.
//!
//! The web layer turns each request into an [`AppEvent`]; [`App::handle`]
//! runs the credential and generation steps against the caller's session and
//! returns a [`Page`] describing what to show. Nothing here knows about HTTP.

use crate::credential::{CredentialManager, CredentialOutcome};
use crate::dialogue::{DialogueGenerator, GenerationOutcome, Lesson};
use crate::session::SessionState;

pub const PAGE_TITLE: &str = "일일 영어 공부 앱 (Gemini API)";
pub const HEADING: &str = "🎬 일일 생활 영어 학습 앱";
pub const LESSON_HEADING: &str = "✨ 오늘의 학습 문장";
pub const INPUT_LABEL: &str = "🔑 Gemini API Key를 입력하세요:";
pub const BUTTON_LABEL: &str = "새로운 일일 영어 문장 받기";
pub const SPINNER_TEXT: &str = "새로운 생활 영어 문장을 생성하는 중입니다...";

const MSG_SECRET_LOADED: &str = "API 키가 서버 Secrets에서 로드되었습니다.";
const MSG_CONFIGURED: &str = "API 클라이언트 설정 완료! 이제 '새 문장 받기'를 눌러보세요.";
const MSG_KEY_ERROR: &str = "⚠️ API 키 설정 오류가 발생했습니다. 키를 다시 확인해 주세요.";
const MSG_CONFIGURE_FIRST: &str = "먼저 API Key를 입력하여 클라이언트를 설정해 주세요.";
const MSG_CALL_FAILED: &str = "❌ Gemini API 호출 중 오류가 발생했습니다";
const MSG_CALL_HINT: &str = "API 키가 올바른지, 사용량이 초과되지 않았는지 확인해 주세요.";
const MSG_KEY_REJECTED_HINT: &str = "서버가 API 키를 거부했습니다. 키가 유효하고 Gemini API 권한이 있는지 확인해 주세요.";

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    PageLoaded,
    /// New value of the masked key field.
    CredentialChanged(String),
    GenerateTriggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A one-line message shown above the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// View model for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Whether the masked key field is offered.
    pub show_key_input: bool,
    /// Whether the session currently holds a client handle.
    pub configured: bool,
    pub notices: Vec<Notice>,
    pub lesson: Option<Lesson>,
}

impl Page {
    pub fn show_generate_button(&self) -> bool {
        self.configured
    }

    /// First notice at `level`, if any.
    pub fn notice(&self, level: NoticeLevel) -> Option<&Notice> {
        self.notices.iter().find(|n| n.level == level)
    }
}

#[derive(Debug)]
pub struct App {
    credentials: CredentialManager,
    generator: DialogueGenerator,
}

impl App {
    pub fn new(credentials: CredentialManager, generator: DialogueGenerator) -> Self {
        Self {
            credentials,
            generator,
        }
    }

    pub fn generator(&self) -> &DialogueGenerator {
        &self.generator
    }

    /// Runs one event against `session`.
    ///
    /// Secret-store credentials are re-evaluated on every event; typed
    /// credentials only when the field changes. Generation runs only for
    /// [`AppEvent::GenerateTriggered`].
    pub async fn handle(&self, session: &mut SessionState, event: AppEvent) -> Page {
        let mut notices = Vec::new();

        let outcome = if self.credentials.uses_secret_store() {
            Some(self.credentials.resolve(session, None))
        } else if let AppEvent::CredentialChanged(ref typed) = event {
            Some(self.credentials.resolve(session, Some(typed.as_str())))
        } else {
            None
        };

        if let Some(outcome) = outcome {
            if let Some(notice) = self.credential_notice(&outcome) {
                notices.push(notice);
            }
        }

        let mut lesson = None;
        if event == AppEvent::GenerateTriggered {
            match self.generator.generate(session).await {
                GenerationOutcome::Generated(l) => lesson = Some(l),
                GenerationOutcome::NotConfigured => {
                    notices.push(Notice::new(NoticeLevel::Warning, MSG_CONFIGURE_FIRST));
                }
                GenerationOutcome::Failed { error } => {
                    notices.push(Notice::new(
                        NoticeLevel::Error,
                        format!("{}: {}", MSG_CALL_FAILED, error),
                    ));
                    notices.push(Notice::new(NoticeLevel::Info, MSG_CALL_HINT));
                    if error.kind().is_credential_problem() {
                        notices.push(Notice::new(NoticeLevel::Warning, MSG_KEY_REJECTED_HINT));
                    }
                }
            }
        }

        Page {
            show_key_input: !self.credentials.uses_secret_store(),
            configured: session.is_configured(),
            notices,
            lesson,
        }
    }

    fn credential_notice(&self, outcome: &CredentialOutcome) -> Option<Notice> {
        match outcome {
            CredentialOutcome::Failed { .. } => Some(Notice::new(NoticeLevel::Error, MSG_KEY_ERROR)),
            // An empty secret entry still reports where the key is managed.
            _ if self.credentials.uses_secret_store() => {
                Some(Notice::new(NoticeLevel::Info, MSG_SECRET_LOADED))
            }
            CredentialOutcome::Configured { .. } => {
                Some(Notice::new(NoticeLevel::Success, MSG_CONFIGURED))
            }
            CredentialOutcome::NotConfigured => None,
        }
    }
}
