use crate::config::MatchPolicy;
use crate::document::SubplanDocument;
use crate::matcher::MatchResult;
use crate::outline::HeadingNode;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Why a match produced no block in the merged text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// An earlier subplan already holds the section.
    SectionClaimed,
    /// The section index is not in the outline.
    SectionMissing,
    /// No loaded subplan carries the matched name.
    SubplanMissing,
}

impl SkipReason {
    pub const ALL: [SkipReason; 3] = [
        SkipReason::SectionClaimed,
        SkipReason::SectionMissing,
        SkipReason::SubplanMissing,
    ];
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::SectionClaimed => "section already claimed",
            SkipReason::SectionMissing => "section not in outline",
            SkipReason::SubplanMissing => "subplan not loaded",
        };
        write!(f, "{s}")
    }
}

/// Merged text plus, per match (same order as the input), `None` when its
/// block was inserted or the reason it was not.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDocument {
    pub text: String,
    pub skipped: Vec<Option<SkipReason>>,
}

/// Weave matched subplans into the master text.
///
/// Master lines are emitted unchanged and in order. A matched section's block
/// goes right after the first line following its heading (the line whose
/// 0-based index equals the heading's 1-based number); a heading on the
/// last line gets its block appended at the end. Each section receives at most
/// one block: the first match that claims it wins and any later match for the
/// same section is skipped. Claims live only for this call.
pub fn merge_document(
    master: &str,
    structure: &[HeadingNode],
    matches: &[MatchResult],
    subplans: &[SubplanDocument],
    policy: &MatchPolicy,
) -> MergedDocument {
    let by_name: HashMap<&str, &SubplanDocument> =
        subplans.iter().map(|s| (s.name.as_str(), s)).collect();
    let lines: Vec<&str> = master.split('\n').collect();

    // Tested deepest line first; the sort is stable, so matches on the same
    // section stay in subplan order.
    let mut order: Vec<usize> = (0..matches.len())
        .filter(|&m| structure.get(matches[m].section_index).is_some())
        .collect();
    order.sort_by_key(|&m| std::cmp::Reverse(structure[matches[m].section_index].line_number));

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut inserted = vec![false; matches.len()];
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut try_insert = |out: &mut Vec<String>, anchor: usize| {
        for &m in &order {
            let section_index = matches[m].section_index;
            if structure[section_index].line_number != anchor || claimed.contains(&section_index)
            {
                continue;
            }
            let Some(subplan) = by_name.get(matches[m].subplan_name.as_str()) else {
                continue;
            };
            push_block(out, subplan, policy);
            claimed.insert(section_index);
            inserted[m] = true;
            break;
        }
    };

    for (i, line) in lines.iter().enumerate() {
        out.push((*line).to_string());
        try_insert(&mut out, i);
    }
    // heading on the final line: nothing follows it
    try_insert(&mut out, lines.len());

    let skipped: Vec<Option<SkipReason>> = matches
        .iter()
        .zip(&inserted)
        .map(|(result, &done)| {
            if done {
                return None;
            }
            let reason = if structure.get(result.section_index).is_none() {
                SkipReason::SectionMissing
            } else if !by_name.contains_key(result.subplan_name.as_str()) {
                SkipReason::SubplanMissing
            } else {
                SkipReason::SectionClaimed
            };
            tracing::warn!(
                subplan = %result.subplan_name,
                section = %result.section_title,
                "subplan not inserted: {reason}"
            );
            Some(reason)
        })
        .collect();

    MergedDocument {
        text: out.join("\n"),
        skipped,
    }
}

fn push_block(out: &mut Vec<String>, subplan: &SubplanDocument, policy: &MatchPolicy) {
    out.push(policy.separator.clone());
    out.push(format!("{} {}", policy.block_label, subplan.name));
    out.push(String::new());
    for line in subplan.content.split('\n') {
        if !line.trim().is_empty() {
            out.push(format!("{}{}", policy.indent, line));
        }
    }
    out.push(String::new());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
