use std::collections::VecDeque;

use crate::llm_client::ChatMessage;

/// Ten messages, i.e. five question/answer exchanges.
pub const HISTORY_CAPACITY: usize = 10;

/// Fixed-capacity message log; appending past capacity evicts the oldest message.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        if self.capacity == 0 {
            return;
        }
        while self.messages.len() >= self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Appends the question and its answer as one exchange.
    pub fn record_exchange(&mut self, question: &str, answer: &str) {
        self.push(ChatMessage::user(question));
        self.push(ChatMessage::assistant(answer));
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Oldest first.
    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
