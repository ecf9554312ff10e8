//! Chat assistant transcript and reply sectioning.

use std::sync::LazyLock;

use bovicare_client::ChatReply;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

pub const GREETING: &str = "Olá! Sou o assistente virtual do BoviCare. Como posso ajudá-lo hoje com questões sobre seu rebanho?";
pub const EMPTY_REPLY: &str = "Não consegui gerar uma resposta no momento.";
pub const FAILED_REPLY: &str = "Não consegui obter uma resposta. Tente novamente em instantes.";

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*Resumo:\*\*|\*\*Resposta Detalhada:\*\*").expect("section regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<serde_json::Value>,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            sources: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::new(Sender::Assistant, GREETING)],
        }
    }
}

impl ChatTranscript {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, text: &str) -> &ChatMessage {
        self.push(ChatMessage::new(Sender::User, text))
    }

    /// Append the assistant's answer; a failed call appends the apology instead.
    pub fn push_reply<E: std::fmt::Display>(&mut self, reply: Result<ChatReply, E>) -> &ChatMessage {
        let msg = match reply {
            Ok(r) => {
                let text = r.reply.filter(|s| !s.trim().is_empty());
                ChatMessage {
                    sources: r.sources,
                    ..ChatMessage::new(Sender::Assistant, text.as_deref().unwrap_or(EMPTY_REPLY))
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat assistant unavailable");
                ChatMessage::new(Sender::Assistant, FAILED_REPLY)
            }
        };
        self.push(msg)
    }

    fn push(&mut self, msg: ChatMessage) -> &ChatMessage {
        self.messages.push(msg);
        &self.messages[self.messages.len() - 1]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Detailed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplySection {
    pub kind: Option<SectionKind>,
    /// Marker text without asterisks and colon, as written in the reply.
    pub title: Option<String>,
    pub content: String,
}

fn titled(marker: &str, content: &str) -> ReplySection {
    let title = marker.replace("**", "").replace(':', "").trim().to_string();
    let kind = if title.eq_ignore_ascii_case("resumo") {
        SectionKind::Summary
    } else {
        SectionKind::Detailed
    };
    ReplySection {
        kind: Some(kind),
        title: Some(title),
        content: content.trim().to_string(),
    }
}

fn untitled(content: &str) -> Option<ReplySection> {
    let content = content.trim();
    (!content.is_empty()).then(|| ReplySection {
        kind: None,
        title: None,
        content: content.to_string(),
    })
}

/// Split an assistant reply on its `**Resumo:**` / `**Resposta Detalhada:**`
/// markers. Text before the first marker is kept as an untitled section when
/// not blank.
pub fn split_reply_sections(text: &str) -> Vec<ReplySection> {
    let mut sections = Vec::new();
    let mut current: Option<&str> = None;
    let mut last = 0;
    for m in SECTION_RE.find_iter(text) {
        let chunk = &text[last..m.start()];
        match current {
            Some(marker) => sections.push(titled(marker, chunk)),
            None => sections.extend(untitled(chunk)),
        }
        current = Some(m.as_str());
        last = m.end();
    }
    let tail = &text[last..];
    match current {
        Some(marker) => sections.push(titled(marker, tail)),
        None => sections.extend(untitled(tail)),
    }
    sections
}
