//! Prompt parsing
//!
//! A deliberately naive heuristic:
//! - `"<n> song(s)"` anywhere in the prompt (case-insensitive) sets the count
//! - the first single- or double-quoted substring is the seed
//! - otherwise the seed is the last five whitespace-separated words
//!
//! ```
//! use dj_pipeline::prompt::parse;
//!
//! let parsed = parse("generate me a playlist of 20 songs like 'Blinding Lights'");
//! assert_eq!(parsed.seed, "Blinding Lights");
//! assert_eq!(parsed.count, 20);
//! ```

use dj_core::DEFAULT_TRACK_COUNT;
use once_cell::sync::Lazy;
use regex::Regex;

/// Number of trailing words used as the seed when nothing is quoted
const SEED_WORDS: usize = 5;

#[allow(clippy::expect_used)]
static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s+songs?").expect("valid count pattern"));

#[allow(clippy::expect_used)]
static QUOTED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'([^']+)'|"([^"]+)""#).expect("valid quote pattern"));

#[allow(clippy::expect_used)]
static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w\s]").expect("valid word pattern"));

/// Seed and count derived from a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPrompt {
    pub seed: String,
    pub count: u32,
}

/// Parse a prompt. Never fails; unparseable input yields the default count.
pub fn parse(prompt: &str) -> ParsedPrompt {
    let count = COUNT_PATTERN
        .captures(prompt)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(DEFAULT_TRACK_COUNT);

    let seed = match QUOTED_PATTERN.captures(prompt) {
        Some(caps) => caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str())
            .to_string(),
        None if !WORD_PATTERN.is_match(prompt) => prompt.to_string(),
        None => last_words(prompt, SEED_WORDS),
    };

    ParsedPrompt {
        seed: seed.trim().to_string(),
        count,
    }
}

fn last_words(text: &str, n: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    words[words.len().saturating_sub(n)..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_seed_and_count() {
        let parsed = parse("generate me a playlist of 20 songs like 'Blinding Lights'");
        assert_eq!(
            parsed,
            ParsedPrompt {
                seed: "Blinding Lights".to_string(),
                count: 20
            }
        );
    }

    #[test]
    fn double_quotes() {
        let parsed = parse(r#"3 songs like "Take On Me""#);
        assert_eq!(parsed.seed, "Take On Me");
        assert_eq!(parsed.count, 3);
    }

    #[test]
    fn first_quoted_substring_wins() {
        let parsed = parse(r#"mix 'Hello' and "Goodbye""#);
        assert_eq!(parsed.seed, "Hello");
    }

    #[test]
    fn count_without_seed() {
        let parsed = parse("5 songs");
        assert_eq!(parsed.count, 5);
        assert_eq!(parsed.seed, "5 songs");
    }

    #[test]
    fn singular_and_case_insensitive() {
        assert_eq!(parse("just 1 SONG please").count, 1);
        assert_eq!(parse("12   Songs of summer").count, 12);
    }

    #[test]
    fn empty_prompt() {
        assert_eq!(
            parse(""),
            ParsedPrompt {
                seed: String::new(),
                count: 20
            }
        );
    }

    #[test]
    fn last_five_words() {
        let parsed = parse("play something upbeat for a long road trip tonight");
        assert_eq!(parsed.seed, "a long road trip tonight");
        assert_eq!(parsed.count, 20);
    }

    #[test]
    fn punctuation_only_prompt_is_its_own_seed() {
        assert_eq!(parse("?!").seed, "?!");
    }

    #[test]
    fn oversized_count_falls_back_to_default() {
        assert_eq!(parse("99999999999999 songs").count, 20);
    }

    #[test]
    fn seed_is_trimmed() {
        assert_eq!(parse("like '  Hurt  '").seed, "Hurt");
    }
}
