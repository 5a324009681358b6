//! Word-level statistics attached to posts.
//!
//! # Responsibility
//! - Derive per-word occurrence counts from post content.
//! - Shape a word table into the granularity a caller is allowed to see.
//!
//! # Invariants
//! - Words are lowercase and at least two characters long.
//! - Word tables are ordered by `occurrences DESC, word ASC`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}+#]*").expect("valid word regex"));

const MIN_WORD_CHARS: usize = 2;

/// Occurrence count of one word in one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStat {
    pub word: String,
    pub occurrences: u32,
}

impl WordStat {
    pub fn new(word: impl Into<String>, occurrences: u32) -> Self {
        Self {
            word: word.into(),
            occurrences,
        }
    }
}

/// How much of the word table a role may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordGranularity {
    /// Complete per-word table.
    Full,
    /// Only the `limit` most frequent words.
    Top { limit: u32 },
    /// Totals only, no individual words.
    Summary,
}

/// Word statistics as returned to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "granularity", rename_all = "snake_case")]
pub enum WordBreakdown {
    Full {
        words: Vec<WordStat>,
    },
    Top {
        words: Vec<WordStat>,
        /// Number of distinct words left out.
        omitted: u32,
    },
    Summary {
        distinct_words: u32,
        total_occurrences: u64,
    },
}

impl WordBreakdown {
    /// Builds the breakdown for `granularity` from an ordered word table.
    pub fn shape(mut words: Vec<WordStat>, granularity: WordGranularity) -> Self {
        match granularity {
            WordGranularity::Full => Self::Full { words },
            WordGranularity::Top { limit } => {
                let keep = (limit as usize).min(words.len());
                let omitted = (words.len() - keep) as u32;
                words.truncate(keep);
                Self::Top { words, omitted }
            }
            WordGranularity::Summary => Self::Summary {
                distinct_words: words.len() as u32,
                total_occurrences: words.iter().map(|stat| u64::from(stat.occurrences)).sum(),
            },
        }
    }
}

/// Derives the word table of one post body.
///
/// Tokens are lowercased; tokens shorter than two characters are dropped.
pub fn derive_word_stats(content: &str) -> Vec<WordStat> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in WORD_RE.find_iter(content) {
        let word = token.as_str().to_lowercase();
        if word.chars().count() < MIN_WORD_CHARS {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut stats = counts
        .into_iter()
        .map(|(word, occurrences)| WordStat { word, occurrences })
        .collect::<Vec<_>>();
    sort_word_stats(&mut stats);
    stats
}

/// Sorts a word table into canonical order.
pub fn sort_word_stats(stats: &mut [WordStat]) {
    stats.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.word.cmp(&b.word))
    });
}

#[cfg(test)]
mod tests {
    use super::{derive_word_stats, WordBreakdown, WordGranularity, WordStat};

    fn table() -> Vec<WordStat> {
        vec![
            WordStat::new("rust", 5),
            WordStat::new("tokio", 3),
            WordStat::new("serde", 1),
        ]
    }

    #[test]
    fn derive_counts_lowercased_words_in_canonical_order() {
        let stats = derive_word_stats("Rust and rust, C++ or Go. A b rust!");
        assert_eq!(stats[0], WordStat::new("rust", 3));
        assert!(stats.contains(&WordStat::new("c++", 1)));
        assert!(stats.contains(&WordStat::new("go", 1)));
        assert!(!stats.iter().any(|stat| stat.word == "a" || stat.word == "b"));
        assert_eq!(stats[1], WordStat::new("and", 1));
    }

    #[test]
    fn shape_top_truncates_and_reports_omitted() {
        let shaped = WordBreakdown::shape(table(), WordGranularity::Top { limit: 2 });
        assert_eq!(
            shaped,
            WordBreakdown::Top {
                words: vec![WordStat::new("rust", 5), WordStat::new("tokio", 3)],
                omitted: 1,
            }
        );
    }

    #[test]
    fn shape_top_with_large_limit_keeps_everything() {
        let shaped = WordBreakdown::shape(table(), WordGranularity::Top { limit: 50 });
        assert!(matches!(shaped, WordBreakdown::Top { ref words, omitted: 0 } if words.len() == 3));
    }

    #[test]
    fn shape_summary_hides_words() {
        let shaped = WordBreakdown::shape(table(), WordGranularity::Summary);
        assert_eq!(
            shaped,
            WordBreakdown::Summary {
                distinct_words: 3,
                total_occurrences: 9,
            }
        );
    }
}
