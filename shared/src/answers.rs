//! Canonical answer computation for generated short questions

use crate::questions::QuestionType;
use log::warn;
use std::net::Ipv4Addr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("unrecognised question type {0:?}")]
    UnknownQuestionType(String),

    #[error("invalid arithmetic expression {0:?}")]
    InvalidExpression(String),

    #[error("invalid roman numeral {0:?}")]
    InvalidNumeral(String),

    #[error("invalid subnet {0:?}")]
    InvalidSubnet(String),
}

/// Canonical answer, or an empty string when the question cannot be answered.
///
/// Failures are logged rather than propagated so that a bad question never
/// aborts a running game.
pub fn correct_answer(question_type: &str, short_question: &str) -> String {
    compute_answer(question_type, short_question).unwrap_or_else(|e| {
        warn!("Could not compute answer: {}", e);
        String::new()
    })
}

pub fn compute_answer(question_type: &str, short_question: &str) -> Result<String, AnswerError> {
    match QuestionType::parse(question_type) {
        Some(QuestionType::Mathematics) => evaluate_expression(short_question).map(|v| v.to_string()),
        Some(QuestionType::RomanNumerals) => from_roman(short_question).map(|v| v.to_string()),
        Some(QuestionType::UsableAddresses) => {
            let (network, broadcast) = network_and_broadcast(short_question)?;
            let usable = i64::from(u32::from(broadcast)) - i64::from(u32::from(network)) + 1 - 2;
            Ok(usable.to_string())
        }
        Some(QuestionType::NetworkBroadcast) => {
            let (network, broadcast) = network_and_broadcast(short_question)?;
            Ok(format!("{} and {}", network, broadcast))
        }
        None => Err(AnswerError::UnknownQuestionType(question_type.to_string())),
    }
}

/// Evaluates a chain of integer additions and subtractions, e.g. `1 + 5 - 2`.
fn evaluate_expression(expression: &str) -> Result<i64, AnswerError> {
    let invalid = || AnswerError::InvalidExpression(expression.to_string());

    let mut total: i64 = 0;
    let mut sign: i64 = 1;
    let mut operand = String::new();

    for c in expression.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '+' | '-' => {
                let value: i64 = operand.parse().map_err(|_| invalid())?;
                total += sign * value;
                sign = if c == '+' { 1 } else { -1 };
                operand.clear();
            }
            '0'..='9' => operand.push(c),
            _ => return Err(invalid()),
        }
    }

    let value: i64 = operand.parse().map_err(|_| invalid())?;
    Ok(total + sign * value)
}

fn roman_value(symbol: char) -> Option<u32> {
    match symbol {
        'M' => Some(1000),
        'D' => Some(500),
        'C' => Some(100),
        'L' => Some(50),
        'X' => Some(10),
        'V' => Some(5),
        'I' => Some(1),
        _ => None,
    }
}

fn from_roman(numeral: &str) -> Result<u32, AnswerError> {
    let values = numeral
        .trim()
        .to_uppercase()
        .chars()
        .map(roman_value)
        .collect::<Option<Vec<u32>>>()
        .filter(|values| !values.is_empty())
        .ok_or_else(|| AnswerError::InvalidNumeral(numeral.to_string()))?;

    let mut total = 0;
    let mut i = 0;
    while i < values.len() {
        // A smaller symbol before a larger one forms a subtractive pair
        match values.get(i + 1) {
            Some(&next) if values[i] < next => {
                total += next - values[i];
                i += 2;
            }
            _ => {
                total += values[i];
                i += 1;
            }
        }
    }
    Ok(total)
}

fn network_and_broadcast(subnet: &str) -> Result<(Ipv4Addr, Ipv4Addr), AnswerError> {
    let invalid = || AnswerError::InvalidSubnet(subnet.to_string());

    let (address, prefix) = subnet.trim().split_once('/').ok_or_else(invalid)?;
    let address: Ipv4Addr = address.parse().map_err(|_| invalid())?;
    let prefix: u32 = prefix.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }

    let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
    let network = u32::from(address) & mask;
    let broadcast = network | !mask;
    Ok((Ipv4Addr::from(network), Ipv4Addr::from(broadcast)))
}
