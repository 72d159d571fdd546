use crate::keywords::KeywordExtractor;
use crate::outline::HeadingNode;
use serde::Serialize;
use std::collections::BTreeMap;

const PREVIEW_LINES: usize = 4;
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub level: u8,
    pub title: String,
    pub line_number: usize,
    pub content_preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub title: String,
    pub level: u8,
    pub line_number: usize,
    pub keywords: Vec<String>,
}

/// Outline overview of a single document.
#[derive(Debug, Clone, Serialize)]
pub struct StructureAnalysis {
    pub file_path: String,
    pub total_headings: usize,
    pub heading_levels: BTreeMap<u8, usize>,
    /// Level 1 and 2 headings.
    pub main_sections: Vec<SectionSummary>,
    pub detailed_structure: Vec<SectionSummary>,
    pub themes: Vec<Theme>,
}

pub fn analyze_structure(
    file_path: &str,
    content: &str,
    structure: &[HeadingNode],
    keywords: &KeywordExtractor,
) -> StructureAnalysis {
    let lines: Vec<&str> = content.split('\n').collect();

    let detailed: Vec<SectionSummary> = structure
        .iter()
        .map(|h| SectionSummary {
            level: h.level,
            title: h.title.clone(),
            line_number: h.line_number,
            content_preview: content_preview(&lines, h.line_number - 1),
        })
        .collect();

    let mut heading_levels = BTreeMap::new();
    for h in structure {
        *heading_levels.entry(h.level).or_insert(0) += 1;
    }

    let main_sections: Vec<SectionSummary> =
        detailed.iter().filter(|s| s.level <= 2).cloned().collect();

    let themes = main_sections
        .iter()
        .map(|s| Theme {
            title: s.title.clone(),
            level: s.level,
            line_number: s.line_number,
            keywords: keywords.extract(&format!("{} {}", s.title, s.content_preview)),
        })
        .collect();

    StructureAnalysis {
        file_path: file_path.to_string(),
        total_headings: structure.len(),
        heading_levels,
        main_sections,
        detailed_structure: detailed,
        themes,
    }
}

/// Up to four lines after the heading, stopping at anything that looks like
/// a heading, joined by spaces and capped at 100 characters.
fn content_preview(lines: &[&str], heading_idx: usize) -> String {
    let end = (heading_idx + 1 + PREVIEW_LINES).min(lines.len());
    let start = (heading_idx + 1).min(end);
    let taken: Vec<&str> = lines[start..end]
        .iter()
        .take_while(|l| !l.starts_with('#'))
        .copied()
        .collect();
    let preview = taken.join(" ");
    let preview = preview.trim();
    if preview.chars().count() > PREVIEW_CHARS {
        format!("{}...", crate::text::take_chars(preview, PREVIEW_CHARS))
    } else {
        preview.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::parse_outline;

    fn analyze(text: &str) -> StructureAnalysis {
        let kw = KeywordExtractor::default();
        let structure = parse_outline(text, &kw, 200);
        analyze_structure("plan.md", text, &structure, &kw)
    }

    #[test]
    fn counts_levels_and_main_sections() {
        let a = analyze("# Top\nintro\n## Budget\nspend\n### Detail\nx\n## Hiring\nrecruit\n");
        assert_eq!(a.total_headings, 4);
        assert_eq!(a.heading_levels.get(&1), Some(&1));
        assert_eq!(a.heading_levels.get(&2), Some(&2));
        assert_eq!(a.heading_levels.get(&3), Some(&1));
        let titles: Vec<&str> = a.main_sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Top", "Budget", "Hiring"]);
        assert_eq!(a.themes.len(), 3);
        assert_eq!(a.themes[1].keywords, vec!["budget", "spend"]);
    }

    #[test]
    fn preview_stops_at_heading_and_line_budget() {
        let a = analyze("# A\none\ntwo\n# B\nl1\nl2\nl3\nl4\nl5\n");
        assert_eq!(a.detailed_structure[0].content_preview, "one two");
        assert_eq!(a.detailed_structure[1].content_preview, "l1 l2 l3 l4");
    }

    #[test]
    fn preview_truncates_long_text() {
        let text = format!("# A\n{}\n", "字".repeat(150));
        let a = analyze(&text);
        let preview = &a.detailed_structure[0].content_preview;
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn heading_on_last_line_has_empty_preview() {
        let a = analyze("intro\n# End");
        assert_eq!(a.detailed_structure[0].content_preview, "");
    }

    #[test]
    fn serializes_levels_as_map() {
        let a = analyze("# A\n## B\n");
        let value = serde_json::to_value(&a).unwrap();
        assert_eq!(value["heading_levels"]["1"], 1);
        assert_eq!(value["heading_levels"]["2"], 1);
    }
}
