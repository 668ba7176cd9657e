use std::collections::HashSet;

/// Relevance of a chunk to a query. Implementations must be deterministic;
/// a score of zero or less means "not relevant".
pub trait Scorer: Send + Sync {
    fn score(&self, query: &str, content: &str) -> f32;
}

/// Lower-cased, whitespace-separated unique words.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Counts the distinct words a query and a chunk have in common.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordOverlapScorer;

impl KeywordOverlapScorer {
    pub fn overlap(&self, query: &str, content: &str) -> usize {
        let query_words = tokenize(query);
        if query_words.is_empty() {
            return 0;
        }
        tokenize(content).intersection(&query_words).count()
    }
}

impl Scorer for KeywordOverlapScorer {
    fn score(&self, query: &str, content: &str) -> f32 {
        self.overlap(query, content) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_tokenize_into_unique_lowercase_words() {
        let words = tokenize("The cat  saw THE\tcat\nagain");
        let mut sorted: Vec<&str> = words.iter().map(String::as_str).collect();
        sorted.sort();

        assert_eq!(sorted, vec!["again", "cat", "saw", "the"]);
    }

    #[test]
    fn should_tokenize_empty_text_to_empty_set() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t").is_empty());
    }

    #[test]
    fn should_count_shared_words() {
        let scorer = KeywordOverlapScorer;

        assert_eq!(scorer.overlap("cat mat", "the cat sat on the mat"), 2);
        assert_eq!(scorer.overlap("cat mat", "dog ran fast"), 0);
    }

    #[test]
    fn should_ignore_case_and_duplicates() {
        let scorer = KeywordOverlapScorer;

        assert_eq!(scorer.overlap("CAT cat Cat", "the cat sat"), 1);
        assert_eq!(scorer.score("Mat", "on the MAT"), 1.0);
    }

    #[test]
    fn should_not_strip_punctuation() {
        let scorer = KeywordOverlapScorer;

        assert_eq!(scorer.overlap("mat", "on the mat."), 0);
    }

    #[test]
    fn should_be_symmetric() {
        let scorer = KeywordOverlapScorer;
        let a = "the quick brown fox";
        let b = "a quick red fox jumps";

        assert_eq!(scorer.score(a, b), scorer.score(b, a));
    }
}
