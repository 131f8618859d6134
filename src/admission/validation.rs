// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Structural checks on the hint request body

pub const VALID_TOPICS: &[&str] = &[
    "food", "sports", "movies", "animals", "places", "music", "general", "actions", "objects",
];

pub const VALID_DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];

pub const MIN_WORD_LEN: usize = 2;
pub const MAX_WORD_LEN: usize = 50;

/// Returns the message of the first violated rule, or `None` when the input
/// is acceptable. Word length is counted in characters.
pub fn validate_input(word: Option<&str>, topic: Option<&str>, difficulty: &str) -> Option<String> {
    let word = match word {
        Some(w) if !w.is_empty() => w,
        _ => return Some("Word is required".to_string()),
    };

    let len = word.chars().count();
    if !(MIN_WORD_LEN..=MAX_WORD_LEN).contains(&len) {
        return Some(format!(
            "Word must be between {}-{} characters",
            MIN_WORD_LEN, MAX_WORD_LEN
        ));
    }

    let topic_ok = topic
        .map(|t| VALID_TOPICS.contains(&t.to_lowercase().as_str()))
        .unwrap_or(false);
    if !topic_ok {
        return Some(format!(
            "Invalid topic. Must be one of: {}",
            VALID_TOPICS.join(", ")
        ));
    }

    if !VALID_DIFFICULTIES.contains(&difficulty.to_lowercase().as_str()) {
        return Some("Invalid difficulty. Must be: easy, medium, or hard".to_string());
    }

    None
}
