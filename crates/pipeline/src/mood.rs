//! Free-text mood detection.
//!
//! A mood text such as "something funny for the kids" maps to genres by
//! whole-word keyword matches. Matching is case-insensitive; "laughing" does
//! not match "laugh".

use data_loader::Genre;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Mood keywords and the genre each mood maps to.
const MOOD_KEYWORDS: [(Genre, &[&str]); 8] = [
    (Genre::Action, &["action", "exciting", "adventure", "fight", "battle"]),
    (Genre::Comedy, &["funny", "comedy", "laugh", "humor", "hilarious"]),
    (Genre::Drama, &["drama", "emotional", "serious", "deep", "story"]),
    (Genre::Romance, &["romance", "love", "relationship", "heart"]),
    (Genre::Thriller, &["thriller", "suspense", "mystery", "crime"]),
    (Genre::Horror, &["horror", "scary", "fright", "ghost", "terror"]),
    (Genre::SciFi, &["sci-fi", "science", "future", "space", "alien"]),
    (Genre::Family, &["family", "kids", "children", "friendly"]),
];

static DEFAULT_ANALYZER: LazyLock<MoodAnalyzer> = LazyLock::new(MoodAnalyzer::new);

static WORD: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\w+"));

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Skipping invalid mood pattern {}: {}", pattern, e);
            None
        }
    }
}

/// Compiled keyword patterns, one per mood.
pub struct MoodAnalyzer {
    patterns: Vec<(Genre, Regex)>,
}

impl MoodAnalyzer {
    pub fn new() -> Self {
        let patterns = MOOD_KEYWORDS
            .iter()
            .filter_map(|(genre, keywords)| {
                let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
                let re = compile(&format!(r"\b(?:{})\b", alternatives.join("|")))?;
                Some((*genre, re))
            })
            .collect();
        Self { patterns }
    }

    /// Genres whose mood keywords appear in `text`.
    pub fn detect(&self, text: &str) -> BTreeSet<Genre> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return BTreeSet::new();
        }

        let moods: BTreeSet<Genre> = self
            .patterns
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(genre, _)| *genre)
            .collect();
        debug!("Detected {} mood tags", moods.len());
        moods
    }
}

impl Default for MoodAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect mood tags with the shared analyzer.
pub fn detect_mood(text: &str) -> BTreeSet<Genre> {
    DEFAULT_ANALYZER.detect(text)
}

/// Lower-cased word tokens of `text`.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    match WORD.as_ref() {
        Some(re) => re.find_iter(&lowered).map(|m| m.as_str().to_string()).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_multiple_moods() {
        let moods = detect_mood("Something FUNNY for the kids");
        assert_eq!(moods, BTreeSet::from([Genre::Comedy, Genre::Family]));
    }

    #[test]
    fn test_whole_words_only() {
        assert!(detect_mood("laughing all the way").is_empty());
        assert_eq!(detect_mood("I want to laugh"), BTreeSet::from([Genre::Comedy]));
    }

    #[test]
    fn test_hyphenated_keyword() {
        assert_eq!(detect_mood("classic sci-fi please"), BTreeSet::from([Genre::SciFi]));
    }

    #[test]
    fn test_hyphen_after_keyword() {
        assert_eq!(
            detect_mood("I want an action-packed adventure"),
            BTreeSet::from([Genre::Action])
        );
        assert_eq!(
            detect_mood("funny family movie"),
            BTreeSet::from([Genre::Comedy, Genre::Family])
        );
    }

    #[test]
    fn test_empty_and_unmatched_text() {
        assert!(detect_mood("").is_empty());
        assert!(detect_mood("   ").is_empty());
        assert!(detect_mood("nothing in particular").is_empty());
    }

    #[test]
    fn test_extract_keywords() {
        assert_eq!(
            extract_keywords("Scary, but FUN!"),
            vec!["scary".to_string(), "but".to_string(), "fun".to_string()]
        );
        assert!(extract_keywords("").is_empty());
    }
}
