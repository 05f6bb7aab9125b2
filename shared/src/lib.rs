//! Wire protocol and trivia content shared by the server and the client.
//!
//! Every record on the wire is a JSON object discriminated by its
//! `message_type` key. Framing lives in [`codec`], question generation in
//! [`questions`] and canonical answer computation in [`answers`].

use serde::{Deserialize, Serialize};

pub mod answers;
pub mod codec;
pub mod questions;

pub use codec::{decode_message, encode_message, write_message, MessageReader, ProtocolError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "message_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    Hi {
        username: String,
    },
    Bye,
    Answer {
        #[serde(default)]
        answer: String,
    },

    Ready {
        info: String,
    },
    Question {
        question_type: String,
        short_question: String,
        trivia_question: String,
        time_limit: u64,
    },
    Result {
        correct: bool,
        feedback: String,
    },
    Leaderboard {
        state: String,
    },
    Finished {
        final_standings: String,
    },
}

impl Message {
    /// Wire name of the message, as carried in `message_type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Hi { .. } => "HI",
            Message::Bye => "BYE",
            Message::Answer { .. } => "ANSWER",
            Message::Ready { .. } => "READY",
            Message::Question { .. } => "QUESTION",
            Message::Result { .. } => "RESULT",
            Message::Leaderboard { .. } => "LEADERBOARD",
            Message::Finished { .. } => "FINISHED",
        }
    }

    /// True for messages the server sends to clients.
    pub fn is_client_bound(&self) -> bool {
        !matches!(
            self,
            Message::Hi { .. } | Message::Bye | Message::Answer { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_hi_uses_message_type_tag() {
        let message = Message::Hi {
            username: "alice".to_string(),
        };
        let value: Value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"message_type": "HI", "username": "alice"}));
    }

    #[test]
    fn test_bye_has_no_fields() {
        let value: Value = serde_json::to_value(Message::Bye).unwrap();
        assert_eq!(value, json!({"message_type": "BYE"}));
    }

    #[test]
    fn test_question_field_names() {
        let message = Message::Question {
            question_type: "Mathematics".to_string(),
            short_question: "1 + 2".to_string(),
            trivia_question: "Question 1 (Mathematics):\nWhat is 1 + 2?".to_string(),
            time_limit: 10,
        };
        let value: Value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["message_type"], "QUESTION");
        assert_eq!(value["question_type"], "Mathematics");
        assert_eq!(value["short_question"], "1 + 2");
        assert_eq!(value["time_limit"], 10);
    }

    #[test]
    fn test_answer_without_field_is_empty() {
        let message: Message = serde_json::from_value(json!({"message_type": "ANSWER"})).unwrap();
        assert_eq!(
            message,
            Message::Answer {
                answer: String::new()
            }
        );
    }

    #[test]
    fn test_missing_message_type_is_rejected() {
        let result: Result<Message, _> = serde_json::from_value(json!({"username": "alice"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_and_direction() {
        assert_eq!(Message::Bye.kind(), "BYE");
        assert!(!Message::Bye.is_client_bound());
        let result = Message::Result {
            correct: true,
            feedback: "ok".to_string(),
        };
        assert_eq!(result.kind(), "RESULT");
        assert!(result.is_client_bound());
    }
}
