//! Keyword lexicon
//!
//! Small labeled word lists behind the context and insight heuristics.
//! Markers match whole words or whole phrases of the lowercased text.

use std::collections::HashSet;

/// Words too common to count as topics
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "also", "although", "because", "been", "before", "being",
    "both", "could", "does", "doing", "down", "each", "even", "every", "from", "further", "have",
    "having", "here", "into", "just", "know", "like", "make", "maybe", "more", "most", "much",
    "must", "need", "only", "other", "over", "really", "same", "should", "some", "such", "than",
    "that", "their", "them", "then", "there", "these", "they", "thing", "things", "think", "this",
    "those", "through", "under", "until", "very", "want", "what", "when", "where", "which",
    "while", "will", "with", "would", "your", "yours", "we're", "it's", "that's", "what's", "let's", "don't",
];

/// Minimum length of a salient term
pub const MIN_TERM_LEN: usize = 4;

pub const COLLABORATIVE_MARKERS: &[&str] = &[
    "agree", "agreed", "great", "good idea", "together", "exactly", "love", "helpful", "thanks",
    "thank you", "yes",
];

pub const TENSE_MARKERS: &[&str] = &[
    "disagree", "wrong", "concern", "concerned", "concerns", "worried", "risk", "risky",
    "problem", "frustrated", "frustrating", "no way",
];

pub const PROPOSAL_MARKERS: &[&str] = &[
    "propose", "suggest", "should we", "what if", "let's", "option", "plan is",
];

pub const COUNTER_MARKERS: &[&str] = &[
    "instead", "alternatively", "rather", "counter", "but what about", "on the other hand",
];

pub const BUILDING_MARKERS: &[&str] = &[
    "building on", "also", "add", "adding", "plus", "furthermore", "agree", "agreed", "and then",
    "on top of",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "great", "good", "love", "excited", "happy", "excellent", "agree", "agreed", "awesome",
    "helpful",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "bad", "worried", "concern", "concerned", "frustrated", "frustrating", "problem", "wrong",
    "hate", "disagree", "risk", "risky",
];

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
}

/// Split text into salient lowercase terms, keeping first-seen order
pub fn salient_terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    words(&lowered)
        .filter(|w| w.chars().count() >= MIN_TERM_LEN && !STOPWORDS.contains(w))
        .filter(|w| seen.insert(*w))
        .map(str::to_string)
        .collect()
}

/// Lowercased text as space-separated words with a leading and trailing
/// space, so markers only match whole words
fn padded_words(text_lower: &str) -> String {
    let mut padded = String::with_capacity(text_lower.len() + 2);
    padded.push(' ');
    for word in words(text_lower) {
        padded.push_str(word);
        padded.push(' ');
    }
    padded
}

fn matches(padded: &str, marker: &str) -> bool {
    padded.contains(&format!(" {} ", marker))
}

/// Number of markers present as whole words or phrases in the lowercased text
pub fn count_markers(text_lower: &str, markers: &[&str]) -> usize {
    let padded = padded_words(text_lower);
    markers.iter().filter(|m| matches(&padded, m)).count()
}

pub fn contains_any(text_lower: &str, markers: &[&str]) -> bool {
    let padded = padded_words(text_lower);
    markers.iter().any(|m| matches(&padded, m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salient_terms_drop_short_and_stopwords() {
        let terms = salient_terms("What about the deployment strategy, and the deployment plan?");
        assert_eq!(terms, vec!["deployment", "strategy", "plan"]);
    }

    #[test]
    fn test_salient_terms_empty() {
        assert!(salient_terms("").is_empty());
        assert!(salient_terms("so we do it").is_empty());
    }

    #[test]
    fn test_count_markers() {
        let text = "i agree, great idea, let's do it together";
        assert_eq!(count_markers(text, COLLABORATIVE_MARKERS), 3);
        assert!(contains_any(text, PROPOSAL_MARKERS));
        assert!(!contains_any(text, COUNTER_MARKERS));
    }

    #[test]
    fn test_markers_match_whole_words_only() {
        let text = "i disagree with this rollout";
        assert_eq!(count_markers(text, COLLABORATIVE_MARKERS), 0);
        assert_eq!(count_markers(text, TENSE_MARKERS), 1);
        assert!(!contains_any(text, BUILDING_MARKERS));

        assert!(!contains_any("we should address it", BUILDING_MARKERS));
        assert!(!contains_any("keep your eyes open", COLLABORATIVE_MARKERS));
        assert!(contains_any("we could add canary stages", BUILDING_MARKERS));
    }

    #[test]
    fn test_phrases_match_across_punctuation() {
        assert!(contains_any("building on that, we ship", BUILDING_MARKERS));
        assert!(contains_any("what if... we wait?", PROPOSAL_MARKERS));
        assert!(!contains_any("nowhere way", TENSE_MARKERS));
    }
}
