//! Chat transcript as rendered by the widget.

use crate::client::ChatBackend;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message { role: Role, text: String },
    /// Placeholder shown while an answer is pending.
    Typing,
}

#[derive(Debug, Default, Clone)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push(Entry::Message {
            role,
            text: text.into(),
        });
    }

    pub fn start_typing(&mut self) {
        self.entries.push(Entry::Typing);
    }

    pub fn stop_typing(&mut self) {
        self.entries.retain(|entry| *entry != Entry::Typing);
    }

    pub fn is_typing(&self) -> bool {
        self.entries.contains(&Entry::Typing)
    }

    /// The most recent bot message, if any.
    pub fn last_reply(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|entry| match entry {
            Entry::Message {
                role: Role::Bot,
                text,
            } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// One conversation: a backend plus the transcript it writes into.
pub struct ChatSession<B> {
    backend: B,
    transcript: Transcript,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Sends `input` and records the exchange. Blank input is ignored and
    /// returns `false`. Failures are written inline as `Error: <message>`.
    pub async fn submit(&mut self, input: &str, cancel: &CancellationToken) -> bool {
        let text = input.trim();
        if text.is_empty() {
            return false;
        }

        self.transcript.push(Role::User, text);
        self.transcript.start_typing();

        let outcome = self.backend.ask(text, cancel).await;

        self.transcript.stop_typing();
        match outcome {
            Ok(answer) => self.transcript.push(Role::Bot, answer),
            Err(err) => self.transcript.push(Role::Bot, format!("Error: {err}")),
        }

        true
    }
}

#[cfg(test)]
#[path = "transcript_test.rs"]
mod transcript_test;
