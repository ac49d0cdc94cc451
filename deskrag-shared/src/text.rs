//! Small text utilities shared by the keyword matcher and the validator.

/// Words ignored when extracting key terms from a question.
const STOP_WORDS: [&str; 20] = [
    "what", "is", "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
    "with", "by", "about", "how", "does", "you",
];

/// Lowercases and collapses whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits text into lowercase alphanumeric words.
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Key terms of a question: stop words removed, short tokens dropped.
pub fn key_terms(text: &str) -> Vec<String> {
    words(text)
        .into_iter()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  What IS   the   Return Policy? "), "what is the return policy?");
    }

    #[test]
    fn key_terms_drop_stop_words() {
        let terms = key_terms("What is the return policy?");
        assert_eq!(terms, vec!["return".to_string(), "policy".to_string()]);
    }

    #[test]
    fn words_split_on_punctuation() {
        assert_eq!(words("credit-cards, PayPal!"), vec!["credit", "cards", "paypal"]);
    }
}
