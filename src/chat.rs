//! Chat-turn log for the conversational path.

use serde::{Deserialize, Serialize};

/// Number of recent turns fed back into the chat prompt.
pub const DEFAULT_HISTORY_WINDOW: usize = 3;

/// One exchange between the user and the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
}

impl ChatTurn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

/// Append-only history of a session. Only the tail is ever read back into
/// prompts; the full log is kept for the session's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Format the last `n` turns as a `Human:` / `AI:` transcript.
    pub fn transcript(&self, n: usize) -> String {
        self.recent(n)
            .iter()
            .map(|turn| format!("Human: {}\nAI: {}\n\n", turn.user, turn.assistant))
            .collect()
    }
}
