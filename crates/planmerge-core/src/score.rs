use crate::config::MatchPolicy;
use crate::document::SubplanDocument;
use crate::outline::HeadingNode;
use crate::sequence::str_ratio;
use crate::text::take_chars;
use serde::Serialize;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// Both similarity terms and their weighted blend, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub keyword: f64,
    pub text: f64,
    pub total: f64,
}

/// Jaccard overlap of two keyword sets. Zero when either side is empty.
pub fn keyword_similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Score `subplan` against one master `section`.
///
/// The section side of the text comparison is its title followed by the
/// excerpt of its content.
pub fn score_section(
    subplan: &SubplanDocument,
    section: &HeadingNode,
    policy: &MatchPolicy,
) -> Score {
    let keyword = keyword_similarity(&subplan.keywords, &section.keywords);
    let section_text = format!(
        "{} {}",
        section.title,
        take_chars(&section.section_content, policy.excerpt_chars)
    );
    let text = str_ratio(
        take_chars(&subplan.content, policy.excerpt_chars),
        &section_text,
    );
    let w = policy.keyword_weight;
    let total = (keyword * w + text * (1.0 - w)).clamp(0.0, 1.0);
    Score {
        keyword,
        text,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn section(title: &str, content: &str, keywords: &[&str]) -> HeadingNode {
        HeadingNode {
            level: 2,
            title: title.to_string(),
            line_number: 1,
            section_content: content.to_string(),
            keywords: kws(keywords),
        }
    }

    fn subplan(content: &str, keywords: &[&str]) -> SubplanDocument {
        SubplanDocument {
            name: "sp".to_string(),
            path: "sp.md".into(),
            content: content.to_string(),
            structure: vec![],
            keywords: kws(keywords),
        }
    }

    #[test]
    fn keyword_similarity_is_symmetric() {
        let a = kws(&["budget", "hiring", "review"]);
        let b = kws(&["review", "budget", "audit", "travel"]);
        assert_eq!(keyword_similarity(&a, &b), keyword_similarity(&b, &a));
        assert!((keyword_similarity(&a, &b) - 2.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn keyword_similarity_identity_and_empty() {
        let a = kws(&["budget", "hiring"]);
        assert_eq!(keyword_similarity(&a, &a), 1.0);
        assert_eq!(keyword_similarity(&a, &[]), 0.0);
        assert_eq!(keyword_similarity(&[], &a), 0.0);
        assert_eq!(keyword_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn text_term_only_sees_excerpts() {
        let sp = subplan(&format!("T {}{}", "x".repeat(8), "a".repeat(50)), &[]);
        let sec = section("T", &format!("{}{}", "x".repeat(8), "b".repeat(50)), &[]);
        let short = MatchPolicy {
            excerpt_chars: 10,
            ..MatchPolicy::default()
        };
        // "T xxxxxxxx" against "T xxxxxxxxbb"
        assert!((score_section(&sp, &sec, &short).text - 20.0 / 22.0).abs() < 1e-12);
        assert!(score_section(&sp, &sec, &MatchPolicy::default()).text < 0.5);
    }

    #[test]
    fn total_is_weighted_blend() {
        let sp = subplan("zzzz", &["budget"]);
        let sec = section("Budget", "qqqq", &["budget"]);
        let score = score_section(&sp, &sec, &MatchPolicy::default());
        assert_eq!(score.keyword, 1.0);
        assert!((score.total - (0.5 + 0.5 * score.text)).abs() < 1e-12);

        let keywords_only = MatchPolicy {
            keyword_weight: 1.0,
            ..MatchPolicy::default()
        };
        assert_eq!(score_section(&sp, &sec, &keywords_only).total, 1.0);
    }

    #[test]
    fn total_stays_in_unit_interval() {
        let inputs = [
            ("", ""),
            ("数字化转型", "## 转型"),
            ("a b c d e f", "f e d c b a"),
            ("budget budget budget", "budget"),
        ];
        for (sp_text, sec_text) in inputs {
            let sp = subplan(sp_text, &["budget", "数字化转型"]);
            let sec = section("T", sec_text, &["budget"]);
            let s = score_section(&sp, &sec, &MatchPolicy::default());
            assert!((0.0..=1.0).contains(&s.total), "{sp_text:?} vs {sec_text:?}");
            assert!((0.0..=1.0).contains(&s.text));
            assert!((0.0..=1.0).contains(&s.keyword));
        }
    }
}
