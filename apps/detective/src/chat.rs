//! # Chat Session
//!
//! Conversation with the case assistant.
//!
//! The user message is shown before the backend answers and taken back if
//! the request fails. Hints draw from a per-case budget that the backend
//! reports after every hint.

use crate::api::{ApiError, ChatRequest, Citation, DetectiveClient, HintRequest};
use chrono::{DateTime, Utc};
use detective_core::RequestTracker;
use detective_core::primitives::INITIAL_HINTS;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage key of the persisted chat transcript.
pub const CHAT_STATE_KEY: &str = "office-detective-chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            citations,
            timestamp: Utc::now(),
        }
    }
}

/// Persistable part of a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatTranscript {
    pub case_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub conversation_id: Option<String>,
    pub hints_remaining: u32,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self {
            case_id: None,
            messages: Vec::new(),
            conversation_id: None,
            hints_remaining: INITIAL_HINTS,
        }
    }
}

impl ChatTranscript {
    #[must_use]
    pub fn for_case(case_id: impl Into<String>) -> Self {
        Self {
            case_id: Some(case_id.into()),
            ..Self::default()
        }
    }
}

/// Chat with the assistant about one case.
#[derive(Debug)]
pub struct ChatSession {
    client: DetectiveClient,
    case_id: String,
    transcript: ChatTranscript,
    tracker: RequestTracker<ApiError>,
}

impl ChatSession {
    #[must_use]
    pub fn new(client: DetectiveClient, case_id: impl Into<String>) -> Self {
        let case_id = case_id.into();
        Self {
            client,
            transcript: ChatTranscript::for_case(case_id.clone()),
            case_id,
            tracker: RequestTracker::new(),
        }
    }

    /// Resume a transcript. A transcript of another case is dropped.
    #[must_use]
    pub fn resume(client: DetectiveClient, case_id: impl Into<String>, transcript: ChatTranscript) -> Self {
        let mut session = Self::new(client, case_id);
        if transcript.case_id.as_deref() == Some(session.case_id.as_str()) {
            session.transcript = transcript;
        }
        session
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript.messages
    }

    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        self.transcript.conversation_id.as_deref()
    }

    #[must_use]
    pub fn hints_remaining(&self) -> u32 {
        self.transcript.hints_remaining
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.tracker.is_loading()
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.tracker.error()
    }

    pub fn take_error(&mut self) -> Option<ApiError> {
        self.tracker.take_error()
    }

    #[must_use]
    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    /// Send a message and wait for the reply.
    ///
    /// Blank text, or a request already in flight, is ignored. On failure the
    /// user message is removed again and the error recorded.
    pub async fn send_message(&mut self, text: &str) -> Option<&ChatMessage> {
        let content = text.trim();
        if content.is_empty() || self.tracker.is_loading() {
            return None;
        }

        let user_message = ChatMessage::new(ChatRole::User, content, Vec::new());
        let user_id = user_message.id;
        self.transcript.messages.push(user_message);

        let request = ChatRequest {
            message: content.to_string(),
            conversation_id: self.transcript.conversation_id.clone(),
        };
        let ticket = self.tracker.begin();
        let result = self.client.chat(&self.case_id, &request).await;

        let Some(response) = self.tracker.complete(ticket, result) else {
            self.transcript.messages.retain(|m| m.id != user_id);
            return None;
        };

        self.transcript.conversation_id = Some(response.conversation_id);
        self.transcript.messages.push(ChatMessage::new(
            ChatRole::Assistant,
            response.message,
            response.citations,
        ));
        self.transcript.messages.last()
    }

    /// Ask for a hint. Returns the hint text.
    pub async fn request_hint(&mut self, context: Option<String>) -> Option<String> {
        if self.transcript.hints_remaining == 0 {
            let ticket = self.tracker.begin();
            return self
                .tracker
                .complete::<String>(ticket, Err(ApiError::NoHintsRemaining));
        }

        let request = HintRequest {
            context: context.filter(|c| !c.trim().is_empty()),
        };
        let ticket = self.tracker.begin();
        let result = self.client.hint(&self.case_id, &request).await;
        let response = self.tracker.complete(ticket, result)?;

        self.transcript.hints_remaining = response.hints_remaining;
        self.transcript.messages.push(ChatMessage::new(
            ChatRole::Assistant,
            format!("Hint: {}", response.hint),
            Vec::new(),
        ));
        Some(response.hint)
    }

    /// Drop the conversation; the hint budget is kept.
    pub fn clear(&mut self) {
        self.tracker.invalidate();
        self.tracker.clear_error();
        self.transcript.messages.clear();
        self.transcript.conversation_id = None;
    }
}
