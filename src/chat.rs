//! Chat session state
//!
//! Holds the ordered, in-memory conversation and enforces one message in
//! flight at a time. Nothing here is persisted.

use crate::api::CultureApi;
use crate::preferences::UserContext;
use serde::Serialize;

/// First message of every session
pub const WELCOME_MESSAGE: &str =
    "안녕하세요! 스마트문화예술 챗봇입니다. 어떤 문화 활동에 관심이 있으신가요?";

/// Usage guide shown once per device, after the welcome message
pub const ONBOARDING_MESSAGE: &str = "### 💡 사용 안내
- 사용자 설정(`/set`, `/prefs`)에서 성별, 연령대, 자녀 유무, 이동 수단을 설정하면 더 정확한 추천을 받을 수 있습니다.
- 질문에 지역 이름을 포함하면 해당 지역의 혼잡도와 문화 행사를 함께 알려드립니다.
- 예시: \"강남역 주변 문화 행사 추천해줘\", \"홍대 지역 전시회 알려줘\"";

/// Assistant reply appended when a send fails
pub const SEND_FAILED_MESSAGE: &str = "죄송합니다, 오류가 발생했습니다. 다시 시도해 주세요.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

/// What a call to [`ChatSession::submit`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing appended, nothing sent
    Ignored,
    /// Another message is still in flight
    Busy,
    /// The answer was appended
    Answered,
    /// The request failed and the fallback reply was appended
    Failed,
}

/// One conversation
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    state: SessionState,
    shown: usize,
}

impl ChatSession {
    /// Start a session with the welcome message, plus the onboarding guide
    /// on a first visit (which consumes the first-visit flag)
    pub fn start(context: &mut UserContext) -> Self {
        let mut messages = vec![ChatMessage::assistant(WELCOME_MESSAGE)];
        if context.is_first_visit() {
            tracing::debug!("First visit, showing onboarding guide");
            messages.push(ChatMessage::assistant(ONBOARDING_MESSAGE));
            context.mark_onboarded();
        }

        Self {
            messages,
            state: SessionState::Idle,
            shown: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Send one message and append the reply
    ///
    /// The message is kept and sent as typed. The preference snapshot is
    /// taken once, when the request is issued.
    pub async fn submit(
        &mut self,
        api: &dyn CultureApi,
        context: &UserContext,
        input: &str,
    ) -> SubmitOutcome {
        if input.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }
        if self.state == SessionState::Sending {
            return SubmitOutcome::Busy;
        }

        self.messages.push(ChatMessage::user(input));
        self.state = SessionState::Sending;

        let preferences = context.snapshot();
        let outcome = match api.send_chat_message(input, &preferences).await {
            Ok(answer) => {
                self.messages.push(ChatMessage::assistant(answer));
                SubmitOutcome::Answered
            }
            Err(e) => {
                tracing::error!("Chat request failed: {:#}", e);
                self.messages
                    .push(ChatMessage::assistant(SEND_FAILED_MESSAGE));
                SubmitOutcome::Failed
            }
        };

        self.state = SessionState::Idle;
        outcome
    }

    /// Messages appended since the previous call
    pub fn drain_unseen(&mut self) -> &[ChatMessage] {
        let start = self.shown.min(self.messages.len());
        self.shown = self.messages.len();
        &self.messages[start..]
    }
}

/// Multi-line input assembled from continuation lines
///
/// A line ending in `\` continues the message on the next line.
#[derive(Debug)]
pub struct InputBuffer {
    lines: Vec<String>,
    max_visible_lines: usize,
}

impl InputBuffer {
    pub fn new(max_visible_lines: usize) -> Self {
        Self {
            lines: Vec::new(),
            max_visible_lines: max_visible_lines.max(1),
        }
    }

    /// Add one physical line; returns the full message once it is complete
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        match line.strip_suffix('\\') {
            Some(partial) => {
                self.lines.push(partial.to_string());
                None
            }
            None => {
                self.lines.push(line.to_string());
                Some(std::mem::take(&mut self.lines).join("\n"))
            }
        }
    }

    pub fn is_continuing(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Prompt for the next physical line
    ///
    /// Shows the line count while the input fits the visible height, then a
    /// scroll marker.
    pub fn prompt(&self, base: &str) -> String {
        if self.lines.is_empty() {
            return base.to_string();
        }
        let next = self.lines.len() + 1;
        if next <= self.max_visible_lines {
            format!("{:>2}| ", next)
        } else {
            " ↕| ".to_string()
        }
    }
}
