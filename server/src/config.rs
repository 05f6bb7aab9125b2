//! Server configuration loaded from a JSON file
//!
//! The configuration carries the game parameters (player count, question
//! sequence, timings) and every user-facing text template. Templates use
//! simple placeholder substitution:
//! - `ready_info`: `{players}`, `{question_interval_seconds}`
//! - answer feedback: `{answer}`, `{correct_answer}`
//! - question formats and winner lines: `{}`

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Upper bound for `question_seconds` and `question_interval_seconds`
pub const MAX_WAIT_SECONDS: u64 = 24 * 60 * 60;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind; the port alone is normally configured
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Number of players required before the game starts
    pub players: usize,
    /// Ordered question types, one round each
    pub question_types: Vec<String>,
    /// Display template per question type
    pub question_formats: HashMap<String, String>,
    pub question_seconds: u64,
    pub question_interval_seconds: f64,
    pub ready_info: String,
    pub question_word: String,
    #[serde(alias = "correct_answer")]
    pub correct_answer_template: String,
    #[serde(alias = "incorrect_answer")]
    pub incorrect_answer_template: String,
    pub points_noun_singular: String,
    pub points_noun_plural: String,
    pub final_standings_heading: String,
    #[serde(alias = "one_winner")]
    pub one_winner_template: String,
    #[serde(alias = "multiple_winners")]
    pub multiple_winners_template: String,
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 {
            return Err(ConfigError::Invalid("players must be at least 1".into()));
        }
        if self.question_types.is_empty() {
            return Err(ConfigError::Invalid("question_types must not be empty".into()));
        }
        if let Some(missing) = self
            .question_types
            .iter()
            .find(|qtype| !self.question_formats.contains_key(*qtype))
        {
            return Err(ConfigError::Invalid(format!(
                "no question format for question type {:?}",
                missing
            )));
        }
        if self.question_seconds > MAX_WAIT_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "question_seconds must be at most {}",
                MAX_WAIT_SECONDS
            )));
        }
        if !(0.0..=MAX_WAIT_SECONDS as f64).contains(&self.question_interval_seconds) {
            return Err(ConfigError::Invalid(format!(
                "question_interval_seconds must be between 0 and {}",
                MAX_WAIT_SECONDS
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn question_duration(&self) -> Duration {
        Duration::from_secs(self.question_seconds)
    }

    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs_f64(self.question_interval_seconds)
    }

    pub fn round_count(&self) -> usize {
        self.question_types.len()
    }

    pub fn render_ready_info(&self) -> String {
        self.ready_info
            .replace("{players}", &self.players.to_string())
            .replace(
                "{question_interval_seconds}",
                &self.question_interval_seconds.to_string(),
            )
    }

    /// Full display text, e.g. `Question 2 (Roman Numerals):\nWhat is XIV?`
    pub fn render_trivia_question(
        &self,
        round_number: usize,
        question_type: &str,
        short_question: &str,
    ) -> String {
        let question = self
            .question_formats
            .get(question_type)
            .map(|format| format.replace("{}", short_question))
            .unwrap_or_else(|| short_question.to_string());
        format!(
            "{} {} ({}):\n{}",
            self.question_word, round_number, question_type, question
        )
    }

    pub fn render_feedback(&self, correct: bool, answer: &str, correct_answer: &str) -> String {
        let template = if correct {
            &self.correct_answer_template
        } else {
            &self.incorrect_answer_template
        };
        template
            .replace("{correct_answer}", correct_answer)
            .replace("{answer}", answer)
    }

    pub fn points_noun(&self, points: u32) -> &str {
        if points == 1 {
            &self.points_noun_singular
        } else {
            &self.points_noun_plural
        }
    }

    pub fn render_winners(&self, winners: &[&str]) -> String {
        match winners {
            [winner] => self.one_winner_template.replace("{}", winner),
            _ => self.multiple_winners_template.replace("{}", &winners.join(", ")),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config(players: usize, question_types: &[&str]) -> ServerConfig {
    let formats: HashMap<String, String> = question_types
        .iter()
        .map(|qtype| (qtype.to_string(), "What is {}?".to_string()))
        .collect();
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        players,
        question_types: question_types.iter().map(|s| s.to_string()).collect(),
        question_formats: formats,
        question_seconds: 10,
        question_interval_seconds: 2.0,
        ready_info: "Game starting for {players} players in {question_interval_seconds} seconds."
            .to_string(),
        question_word: "Question".to_string(),
        correct_answer_template: "Woohoo! {answer} is correct!".to_string(),
        incorrect_answer_template: "Sorry, {answer} is wrong. The answer was {correct_answer}."
            .to_string(),
        points_noun_singular: "point".to_string(),
        points_noun_plural: "points".to_string(),
        final_standings_heading: "Final standings:".to_string(),
        one_winner_template: "Winner: {}".to_string(),
        multiple_winners_template: "Winners: {}".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "port": 12000,
        "players": 2,
        "question_types": ["Mathematics", "Roman Numerals"],
        "question_formats": {
            "Mathematics": "What is {}?",
            "Roman Numerals": "What is {} in decimal?"
        },
        "question_seconds": 30,
        "question_interval_seconds": 2.5,
        "ready_info": "Game starting for {players} players in {question_interval_seconds} seconds.",
        "question_word": "Question",
        "correct_answer": "Woohoo! {answer} is correct!",
        "incorrect_answer": "Maybe next time :( {answer} is not {correct_answer}",
        "points_noun_singular": "point",
        "points_noun_plural": "points",
        "final_standings_heading": "Final standings:",
        "one_winner": "The winner is: {}",
        "multiple_winners": "The winners are: {}"
    }"#;

    #[test]
    fn test_load_sample_with_legacy_keys() {
        let config = ServerConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.port, 12000);
        assert_eq!(config.players, 2);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.bind_address(), "0.0.0.0:12000");
        assert_eq!(config.round_count(), 2);
        assert_eq!(config.question_duration(), Duration::from_secs(30));
        assert_eq!(config.interval_duration(), Duration::from_millis(2500));
        assert_eq!(config.one_winner_template, "The winner is: {}");
    }

    #[test]
    fn test_template_key_names_accepted() {
        let renamed = SAMPLE
            .replace("\"correct_answer\"", "\"correct_answer_template\"")
            .replace("\"one_winner\"", "\"one_winner_template\"");
        let config = ServerConfig::from_json(&renamed).unwrap();
        assert_eq!(config.correct_answer_template, "Woohoo! {answer} is correct!");
        assert_eq!(config.one_winner_template, "The winner is: {}");
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let broken = SAMPLE.replace("\"players\": 2,", "");
        assert!(matches!(
            ServerConfig::from_json(&broken),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = test_config(2, &["Mathematics"]);
        assert!(config.validate().is_ok());

        config.players = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = test_config(2, &["Mathematics"]);
        config.question_types.push("Roman Numerals".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = test_config(2, &[]);
        assert!(config.validate().is_err());

        let mut config = test_config(2, &["Mathematics"]);
        config.question_interval_seconds = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timing_bounds() {
        let mut config = test_config(1, &["Mathematics"]);
        config.question_seconds = MAX_WAIT_SECONDS;
        config.question_interval_seconds = MAX_WAIT_SECONDS as f64;
        assert!(config.validate().is_ok());

        config.question_seconds = u64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = test_config(1, &["Mathematics"]);
        for interval in [1e300, f64::INFINITY, f64::NAN] {
            config.question_interval_seconds = interval;
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }

        let json = SAMPLE.replace("\"question_seconds\": 30", "\"question_seconds\": 18446744073709551615");
        assert!(matches!(
            ServerConfig::from_json(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ServerConfig::load(Path::new("/nonexistent/trivia-config.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_render_ready_info() {
        let config = ServerConfig::from_json(SAMPLE).unwrap();
        assert_eq!(
            config.render_ready_info(),
            "Game starting for 2 players in 2.5 seconds."
        );

        let whole = test_config(3, &["Mathematics"]);
        assert_eq!(
            whole.render_ready_info(),
            "Game starting for 3 players in 2 seconds."
        );
    }

    #[test]
    fn test_render_trivia_question() {
        let config = ServerConfig::from_json(SAMPLE).unwrap();
        assert_eq!(
            config.render_trivia_question(2, "Roman Numerals", "XIV"),
            "Question 2 (Roman Numerals):\nWhat is XIV in decimal?"
        );
    }

    #[test]
    fn test_render_feedback() {
        let config = ServerConfig::from_json(SAMPLE).unwrap();
        assert_eq!(
            config.render_feedback(true, "3", "3"),
            "Woohoo! 3 is correct!"
        );
        assert_eq!(
            config.render_feedback(false, "03", "3"),
            "Maybe next time :( 03 is not 3"
        );
    }

    #[test]
    fn test_points_noun_and_winners() {
        let config = test_config(2, &["Mathematics"]);
        assert_eq!(config.points_noun(1), "point");
        assert_eq!(config.points_noun(0), "points");
        assert_eq!(config.points_noun(2), "points");
        assert_eq!(config.render_winners(&["alice"]), "Winner: alice");
        assert_eq!(
            config.render_winners(&["alice", "bob"]),
            "Winners: alice, bob"
        );
    }
}
