//! Short-question generation for every supported question type

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use std::net::Ipv4Addr;

const OPERAND_RANGE: std::ops::RangeInclusive<u32> = 1..=1000;
const OPERAND_COUNT: std::ops::RangeInclusive<usize> = 2..=5;
const ROMAN_RANGE: std::ops::RangeInclusive<u32> = 1..=3999;
const PREFIX_RANGE: std::ops::RangeInclusive<u8> = 1..=30;

const ROMAN_SYMBOLS: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    Mathematics,
    RomanNumerals,
    UsableAddresses,
    NetworkBroadcast,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Mathematics,
        QuestionType::RomanNumerals,
        QuestionType::UsableAddresses,
        QuestionType::NetworkBroadcast,
    ];

    /// Matches the configured question-type tag exactly.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mathematics => "Mathematics",
            QuestionType::RomanNumerals => "Roman Numerals",
            QuestionType::UsableAddresses => "Usable IP Addresses of a Subnet",
            QuestionType::NetworkBroadcast => "Network and Broadcast Address of a Subnet",
        }
    }
}

/// Generates a short question using the thread-local RNG.
///
/// Unknown question types produce an empty string so a misconfigured round
/// still runs instead of aborting the game.
pub fn short_question(question_type: &str) -> String {
    generate_short_question(&mut rand::thread_rng(), question_type)
}

pub fn generate_short_question<R: Rng + ?Sized>(rng: &mut R, question_type: &str) -> String {
    match QuestionType::parse(question_type) {
        Some(QuestionType::Mathematics) => mathematics_question(rng),
        Some(QuestionType::RomanNumerals) => to_roman(rng.gen_range(ROMAN_RANGE)),
        Some(QuestionType::UsableAddresses) | Some(QuestionType::NetworkBroadcast) => {
            subnet_question(rng)
        }
        None => {
            warn!("Unrecognised question type: {:?}", question_type);
            String::new()
        }
    }
}

fn mathematics_question<R: Rng + ?Sized>(rng: &mut R) -> String {
    let operands = rng.gen_range(OPERAND_COUNT);
    let mut question = rng.gen_range(OPERAND_RANGE).to_string();
    for _ in 1..operands {
        let operator = ["+", "-"].choose(rng).copied().unwrap_or("+");
        question.push_str(&format!(" {} {}", operator, rng.gen_range(OPERAND_RANGE)));
    }
    question
}

fn subnet_question<R: Rng + ?Sized>(rng: &mut R) -> String {
    let address = Ipv4Addr::from(rng.gen::<u32>());
    format!("{}/{}", address, rng.gen_range(PREFIX_RANGE))
}

/// Canonical Roman numeral for `n`; zero renders as an empty string.
pub fn to_roman(mut n: u32) -> String {
    let mut out = String::new();
    for (value, symbol) in ROMAN_SYMBOLS {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}
