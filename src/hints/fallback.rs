// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic hints used when the provider can't deliver
//!
//! Pure function of (word, topic): never fails, never touches the network.

use super::types::HintSet;

/// Four hints built from the word and topic alone, hardest first
pub fn generate_fallback_hints(word: &str, topic: &str) -> HintSet {
    let len = word.chars().count();
    let first_letter: String = word
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();

    HintSet::new([
        format!("Something related to {} that people often encounter", topic),
        format!("A {} word with {} letters", topic, len),
        format!("Starts with \"{}\", {} letters long", first_letter, len),
        masked_pattern(word),
    ])
}

/// First and last characters revealed (uppercased), every interior character
/// replaced by `_`, all separated by single spaces
pub fn masked_pattern(word: &str) -> String {
    let len = word.chars().count();
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 || i + 1 == len {
                c.to_uppercase().collect::<String>()
            } else {
                "_".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
