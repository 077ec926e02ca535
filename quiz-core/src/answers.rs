//! Answer extractors that work on page text alone
//!
//! Each extractor tries its specific pattern first and degrades to the
//! shared fallback: the first number on the page, then the sentinel.

use crate::heuristics::{
    find_alnum_token, find_numbers, find_secret_label, first_number, format_number,
    mentions_words, number_literals,
};
use crate::SENTINEL_ANSWER;

pub fn literal_default() -> String {
    SENTINEL_ANSWER.to_string()
}

/// First number on the page, else the sentinel
pub fn fallback_answer(text: &str) -> String {
    first_number(text).unwrap_or_else(literal_default)
}

pub fn secret_extraction(text: &str) -> String {
    find_secret_label(text)
        .or_else(|| find_alnum_token(text))
        .or_else(|| first_number(text))
        .unwrap_or_else(literal_default)
}

pub fn arithmetic_aggregation(text: &str) -> String {
    let numbers = find_numbers(text);
    if numbers.is_empty() {
        return fallback_answer(text);
    }
    format_number(numbers.iter().sum())
}

pub fn counting(text: &str, lower: &str) -> String {
    if mentions_words(lower) {
        text.split_whitespace().count().to_string()
    } else {
        number_literals(text).len().to_string()
    }
}
