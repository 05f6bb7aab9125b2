//! Question rounds: question payload, answer ledger and completion policy
//!
//! A [`Round`] is a plain value. Scoring and completion are free functions
//! over the round, the roster and the current time so each can be exercised
//! on its own.

use crate::config::ServerConfig;
use crate::session::Session;
use log::info;
use shared::Message;
use std::collections::BTreeMap;
use tokio::time::Instant;

/// Produces question content for a question-type tag.
pub trait QuestionSource: Send {
    fn short_question(&mut self, question_type: &str) -> String;
    fn correct_answer(&mut self, question_type: &str, short_question: &str) -> String;
}

/// Randomly generated questions answered by the shared answer computation
#[derive(Debug, Default, Clone, Copy)]
pub struct GeneratedQuestions;

impl QuestionSource for GeneratedQuestions {
    fn short_question(&mut self, question_type: &str) -> String {
        shared::questions::short_question(question_type)
    }

    fn correct_answer(&mut self, question_type: &str, short_question: &str) -> String {
        shared::answers::correct_answer(question_type, short_question)
    }
}

#[derive(Debug, Clone)]
pub struct Round {
    /// 1-based position in the configured question sequence
    pub round_number: usize,
    pub question_type: String,
    pub short_question: String,
    pub trivia_question: String,
    pub correct_answer: String,
    pub time_limit: u64,
    pub started_at: Instant,
    pub deadline: Instant,
    /// One slot per session active at round start; `None` until answered
    ledger: BTreeMap<String, Option<String>>,
}

impl Round {
    #[cfg(test)]
    pub fn is_member(&self, username: &str) -> bool {
        self.ledger.contains_key(username)
    }

    #[cfg(test)]
    pub fn answer_of(&self, username: &str) -> Option<&str> {
        self.ledger.get(username).and_then(|a| a.as_deref())
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.ledger.keys().map(String::as_str)
    }

    /// Exact, case-sensitive comparison with the canonical answer
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    pub fn answered_count(&self) -> usize {
        self.ledger.values().filter(|a| a.is_some()).count()
    }

    pub fn question_message(&self) -> Message {
        Message::Question {
            question_type: self.question_type.clone(),
            short_question: self.short_question.clone(),
            trivia_question: self.trivia_question.clone(),
            time_limit: self.time_limit,
        }
    }
}

/// Builds round `round_number` from the configured question sequence.
///
/// The answer ledger is a snapshot of `members`; players who join later are
/// not part of this round.
pub fn start_round<'a>(
    config: &ServerConfig,
    questions: &mut dyn QuestionSource,
    round_number: usize,
    members: impl IntoIterator<Item = &'a str>,
    now: Instant,
) -> Round {
    let question_type = config.question_types[round_number - 1].clone();
    let short_question = questions.short_question(&question_type);
    let trivia_question =
        config.render_trivia_question(round_number, &question_type, &short_question);
    let correct_answer = questions.correct_answer(&question_type, &short_question);
    let ledger: BTreeMap<String, Option<String>> =
        members.into_iter().map(|u| (u.to_string(), None)).collect();

    info!(
        "Round {} generated: type={} members={} time_limit={}s",
        round_number,
        question_type,
        ledger.len(),
        config.question_seconds
    );

    Round {
        round_number,
        question_type,
        short_question,
        trivia_question,
        correct_answer,
        time_limit: config.question_seconds,
        started_at: now,
        deadline: now + config.question_duration(),
        ledger,
    }
}

/// Records `answer` for `session` and awards a point if it is correct.
///
/// Returns false without touching anything when the answer is empty, the
/// session was not active at round start, or it already answered this round.
pub fn record_answer(round: &mut Round, session: &mut Session, answer: &str) -> bool {
    if answer.is_empty() {
        return false;
    }
    let correct = round.is_correct(answer);
    match round.ledger.get_mut(&session.username) {
        Some(slot) if slot.is_none() => {
            *slot = Some(answer.to_string());
            if correct {
                session.points += 1;
            }
            true
        }
        _ => false,
    }
}

/// A round is complete once every member that is still active has answered,
/// or once its deadline has passed.
///
/// Members that disconnected are not waited for, so a disconnect can
/// complete the round early.
pub fn is_complete<'a>(
    round: &Round,
    active: impl IntoIterator<Item = &'a str>,
    now: Instant,
) -> bool {
    if now >= round.deadline {
        return true;
    }
    active
        .into_iter()
        .filter_map(|username| round.ledger.get(username))
        .all(Option::is_some)
}

#[cfg(test)]
pub(crate) struct FixedQuestions;

#[cfg(test)]
impl QuestionSource for FixedQuestions {
    fn short_question(&mut self, question_type: &str) -> String {
        match question_type {
            "Mathematics" => "1 + 5 - 2 + 7 - 8".to_string(),
            "Roman Numerals" => "XIV".to_string(),
            _ => String::new(),
        }
    }

    fn correct_answer(&mut self, question_type: &str, short_question: &str) -> String {
        shared::answers::correct_answer(question_type, short_question)
    }
}
