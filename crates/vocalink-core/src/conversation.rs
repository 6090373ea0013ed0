//! Conversation turns and the bounded history shared with the completion service.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of turns retained in a [`ConversationHistory`].
pub const MAX_HISTORY_TURNS: usize = 10;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation. Fields are private so a turn cannot be
/// edited once it has been appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered, capped turn history.
///
/// Every append pushes to the back and then evicts from the front while the
/// length exceeds the cap, so a history sitting exactly at the cap is left
/// untouched until the next append.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl ConversationHistory {
    /// Creates an empty history capped at [`MAX_HISTORY_TURNS`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_TURNS)
    }

    /// Creates an empty history with a custom cap (at least one turn).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append_user_turn(&mut self, content: impl Into<String>) {
        self.append(ConversationTurn::user(content));
    }

    pub fn append_assistant_turn(&mut self, content: impl Into<String>) {
        self.append(ConversationTurn::assistant(content));
    }

    fn append(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Returns the turns in insertion order.
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_tracks_min_of_appends_and_cap() {
        let mut history = ConversationHistory::new();
        for i in 0..(MAX_HISTORY_TURNS + 7) {
            history.append_user_turn(format!("turn {i}"));
            assert_eq!(history.len(), (i + 1).min(MAX_HISTORY_TURNS));
        }
    }

    #[test]
    fn test_retains_most_recent_turns_in_order() {
        let mut history = ConversationHistory::new();
        let total = MAX_HISTORY_TURNS + 4;
        for i in 0..total {
            if i % 2 == 0 {
                history.append_user_turn(format!("turn {i}"));
            } else {
                history.append_assistant_turn(format!("turn {i}"));
            }
        }

        let contents: Vec<String> = history.iter().map(|t| t.content().to_string()).collect();
        let expected: Vec<String> = (total - MAX_HISTORY_TURNS..total)
            .map(|i| format!("turn {i}"))
            .collect();
        assert_eq!(contents, expected);
        assert_eq!(history.snapshot()[0].role(), Role::User);
    }

    #[test]
    fn test_no_eviction_when_exactly_at_cap() {
        let mut history = ConversationHistory::new();
        for i in 0..MAX_HISTORY_TURNS {
            history.append_user_turn(format!("turn {i}"));
        }
        assert_eq!(history.len(), MAX_HISTORY_TURNS);
        assert_eq!(history.snapshot()[0].content(), "turn 0");

        history.append_assistant_turn("one more");
        assert_eq!(history.len(), MAX_HISTORY_TURNS);
        assert_eq!(history.snapshot()[0].content(), "turn 1");
        assert_eq!(history.snapshot()[MAX_HISTORY_TURNS - 1].content(), "one more");
    }

    #[test]
    fn test_custom_capacity_is_at_least_one() {
        let mut history = ConversationHistory::with_capacity(0);
        history.append_user_turn("a");
        history.append_user_turn("b");
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.snapshot(), vec![ConversationTurn::user("b")]);
    }

    #[test]
    fn test_turn_wire_format() {
        let json = serde_json::to_value(ConversationTurn::assistant("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hello"}));
    }
}
