use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Generic function words plus planning filler that carries no topic.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    // English
    "the", "and", "of", "to", "in", "for", "is", "on", "with", "by", "as", "at", "be", "are",
    "this", "that", "from", "or", "an", "work", "plan", "plans", "planning",
    // Chinese
    "的", "和", "在", "是", "为", "了", "与", "中", "有", "及", "等", "或", "将", "会", "对",
    "进行", "工作", "规划", "计划",
];

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Turns text into an ordered token stream.
///
/// Implementations may plug in a real word segmenter; the extractor, scorer
/// and matcher only see the resulting tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Splits mixed-script text into runs of Han ideographs and runs of Latin
/// letters/digits. Latin runs are lower-cased.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptTokenizer;

fn script_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Han}+|[\p{Latin}0-9]+").expect("valid regex"))
}

impl Tokenizer for ScriptTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        script_run_re()
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// KeywordExtractor
// ---------------------------------------------------------------------------

pub struct KeywordExtractor {
    tokenizer: Box<dyn Tokenizer>,
    stopwords: HashSet<String>,
    max_keywords: usize,
}

impl KeywordExtractor {
    pub fn new(tokenizer: Box<dyn Tokenizer>, max_keywords: usize) -> Self {
        Self {
            tokenizer,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            max_keywords,
        }
    }

    pub fn with_stopwords<I, S>(mut self, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = stopwords.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_keywords(&self) -> usize {
        self.max_keywords
    }

    /// Top tokens by frequency, most frequent first. Equal counts keep the
    /// order in which the tokens first appeared.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut slot: HashMap<String, usize> = HashMap::new();

        for token in self.tokenizer.tokenize(text) {
            if token.chars().count() <= 1 || self.stopwords.contains(&token) {
                continue;
            }
            let next = counts.len();
            let i = *slot.entry(token.clone()).or_insert(next);
            if i == next {
                counts.push((token, 1));
            } else {
                counts[i].1 += 1;
            }
        }

        // stable: ties stay in first-seen order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(self.max_keywords)
            .map(|(token, _)| token)
            .collect()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(Box::new(ScriptTokenizer), 10)
    }
}

impl std::fmt::Debug for KeywordExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordExtractor")
            .field("stopwords", &self.stopwords.len())
            .field("max_keywords", &self.max_keywords)
            .finish()
    }
}
