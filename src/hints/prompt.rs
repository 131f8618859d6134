// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt construction and response parsing

use regex::Regex;
use std::sync::OnceLock;

use super::types::HINT_COUNT;

pub const SYSTEM_PROMPT: &str = "You are a creative game hint generator. Generate progressive hints that help players guess words without revealing them directly. Always respond with exactly 4 numbered hints.";

/// Hints this short are treated as noise
const MIN_HINT_CHARS: usize = 5;

fn language_instruction(language: &str) -> &'static str {
    match language {
        "ta" => "Generate hints in Tamil (தமிழ்) language.",
        _ => "Generate hints in English.",
    }
}

/// User prompt asking for four difficulty-tiered hints
pub fn build_prompt(word: &str, topic: &str, _difficulty: &str, language: &str) -> String {
    format!(
        r#"Generate exactly 4 hints for the word "{word}" from category "{topic}".
{lang}

DIFFICULTY LEVELS:
1. HARD: Indirect but relatable (what it's used for, where found) - MAX 10 WORDS
2. MODERATE: Clear category, main characteristics - MAX 10 WORDS
3. EASY: First letter + length + specific details - MAX 10 WORDS
4. VERY EASY: Partial letters (e.g. "P_ZZ_") + obvious clue - MAX 10 WORDS

RULES:
- Never use the word "{word}"
- Each hint under 10 words
- Number each hint (1. 2. 3. 4.)
- Make it relatable and fun

Now generate 4 hints for "{word}":"#,
        word = word,
        topic = topic,
        lang = language_instruction(language),
    )
}

fn numbered_line() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d+)[.):\-]\s*(.+)$").ok())
        .as_ref()
}

/// Collects up to four numbered hints ("1. text", "2) text", "3: text",
/// "4- text") from a free-text response
pub fn parse_hints(content: &str) -> Vec<String> {
    let Some(pattern) = numbered_line() else {
        return Vec::new();
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            pattern
                .captures(line)
                .and_then(|caps| caps.get(2))
                .map(|m| m.as_str().trim().to_string())
        })
        .filter(|hint| hint.chars().count() > MIN_HINT_CHARS)
        .take(HINT_COUNT)
        .collect()
}
