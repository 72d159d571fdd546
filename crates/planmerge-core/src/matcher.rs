use crate::config::MatchPolicy;
use crate::document::SubplanDocument;
use crate::outline::HeadingNode;
use crate::score::score_section;
use serde::Serialize;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

/// A subplan assigned to one eligible master section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(rename = "subplan")]
    pub subplan_name: String,
    /// Index into the master structure.
    pub section_index: usize,
    pub section_title: String,
    pub similarity: f64,
    #[serde(rename = "match_reason")]
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    /// In subplan order.
    pub matches: Vec<MatchResult>,
    pub unmatched: Vec<String>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Best eligible section for `subplan`, or `None` when nothing reaches the
/// policy's threshold.
///
/// Eligible sections are those at or above `max_target_level`. A later
/// section only replaces the running best when strictly better, so the first
/// of several equal scores is kept.
pub fn find_best_section(
    subplan: &SubplanDocument,
    structure: &[HeadingNode],
    policy: &MatchPolicy,
) -> Option<MatchResult> {
    let mut best: Option<(usize, f64)> = None;
    let mut best_score = 0.0;

    for (index, section) in structure.iter().enumerate() {
        if !policy.is_target_level(section.level) {
            continue;
        }
        let score = score_section(subplan, section, policy);
        tracing::debug!(
            subplan = %subplan.name,
            section = %section.title,
            keyword = score.keyword,
            text = score.text,
            total = score.total,
            "scored"
        );
        if score.total > best_score {
            best_score = score.total;
            best = Some((index, score.total));
        }
    }

    let (index, similarity) = best?;
    if similarity < policy.min_similarity {
        tracing::info!(
            subplan = %subplan.name,
            similarity,
            "best section below threshold"
        );
        return None;
    }

    let section = &structure[index];
    Some(MatchResult {
        subplan_name: subplan.name.clone(),
        section_index: index,
        section_title: section.title.clone(),
        similarity,
        reason: match_reason(subplan, section, similarity, policy),
    })
}

/// Match each subplan independently, preserving subplan order.
pub fn match_subplans(
    subplans: &[SubplanDocument],
    structure: &[HeadingNode],
    policy: &MatchPolicy,
) -> MatchSet {
    let mut set = MatchSet::default();
    for subplan in subplans {
        match find_best_section(subplan, structure, policy) {
            Some(m) => {
                tracing::info!(
                    subplan = %m.subplan_name,
                    section = %m.section_title,
                    similarity = m.similarity,
                    "matched"
                );
                set.matches.push(m);
            }
            None => set.unmatched.push(subplan.name.clone()),
        }
    }
    set
}

/// Shared keywords (in the subplan's ranking order) plus a qualitative
/// bucket for the score.
pub fn match_reason(
    subplan: &SubplanDocument,
    section: &HeadingNode,
    similarity: f64,
    policy: &MatchPolicy,
) -> String {
    let section_keywords: HashSet<&str> = section.keywords.iter().map(String::as_str).collect();
    let shared: Vec<&str> = subplan
        .keywords
        .iter()
        .map(String::as_str)
        .filter(|k| section_keywords.contains(k))
        .take(policy.reason_keywords)
        .collect();

    let mut parts = Vec::new();
    if !shared.is_empty() {
        parts.push(format!("shared keywords: {}", shared.join(", ")));
    }
    parts.push(relation_bucket(similarity).to_string());
    parts.join("; ")
}

pub fn relation_bucket(similarity: f64) -> &'static str {
    if similarity > 0.5 {
        "highly related"
    } else if similarity > 0.3 {
        "moderately related"
    } else {
        "partially related"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
