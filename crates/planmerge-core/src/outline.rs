use crate::keywords::KeywordExtractor;
use crate::text::{parse_heading_line, take_chars};
use serde::Serialize;

// ---------------------------------------------------------------------------
// HeadingNode
// ---------------------------------------------------------------------------

/// One heading of a document and the text it governs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingNode {
    /// 1 (shallowest) to 6 (deepest).
    pub level: u8,
    pub title: String,
    /// 1-based line of the heading in the source text.
    pub line_number: usize,
    /// Lines strictly between this heading and the next heading of the same
    /// or shallower level (or end of text), with trailing whitespace trimmed.
    pub section_content: String,
    pub keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `text` into its headings, in document order.
///
/// Keywords come from the title plus the first `context_chars` characters of
/// the section content. Hierarchy is implicit: a level-2 section's content
/// includes any level-3 headings below it.
pub fn parse_outline(
    text: &str,
    keywords: &KeywordExtractor,
    context_chars: usize,
) -> Vec<HeadingNode> {
    let lines: Vec<&str> = text.split('\n').collect();

    let heads: Vec<(usize, u8, &str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| parse_heading_line(line).map(|(level, title)| (i, level, title)))
        .collect();

    heads
        .iter()
        .enumerate()
        .map(|(h, &(idx, level, title))| {
            let end = heads[h + 1..]
                .iter()
                .find(|(_, next_level, _)| *next_level <= level)
                .map(|(next_idx, _, _)| *next_idx)
                .unwrap_or(lines.len());
            let section_content = lines[idx + 1..end].join("\n").trim_end().to_string();
            let context = format!("{title} {}", take_chars(&section_content, context_chars));
            HeadingNode {
                level,
                title: title.to_string(),
                line_number: idx + 1,
                keywords: keywords.extract(&context),
                section_content,
            }
        })
        .collect()
}
