use crate::analyze::{analyze_structure, StructureAnalysis};
use crate::config::MatchPolicy;
use crate::document::{load_subplans, MasterDocument, SubplanDocument};
use crate::error::{InputKind, Result};
use crate::io::{atomic_write, read_utf8};
use crate::keywords::{KeywordExtractor, ScriptTokenizer, Tokenizer};
use crate::matcher::match_subplans;
use crate::merge::merge_document;
use crate::outline::{parse_outline, HeadingNode};
use crate::report::MergeReport;
use std::path::Path;

// ---------------------------------------------------------------------------
// MergeOutcome
// ---------------------------------------------------------------------------

/// Everything a run produces, computed before anything touches the disk.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: String,
    pub report: MergeReport,
}

impl MergeOutcome {
    /// Write the merged document, then the report when a path is given. The
    /// report is serialized before the first write.
    pub fn write(&self, output_file: &Path, report_file: Option<&Path>) -> Result<()> {
        let report = report_file
            .map(|path| self.report.to_json().map(|json| (path, json)))
            .transpose()?;
        atomic_write(output_file, self.merged.as_bytes())?;
        tracing::info!(path = %output_file.display(), "wrote merged document");
        if let Some((path, json)) = report {
            atomic_write(path, json.as_bytes())?;
            tracing::info!(path = %path.display(), "wrote match report");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PlanMerger
// ---------------------------------------------------------------------------

/// One policy plus the keyword extractor built for it.
#[derive(Debug)]
pub struct PlanMerger {
    policy: MatchPolicy,
    keywords: KeywordExtractor,
}

impl PlanMerger {
    pub fn new(policy: MatchPolicy) -> Self {
        Self::with_tokenizer(policy, Box::new(ScriptTokenizer))
    }

    pub fn with_tokenizer(policy: MatchPolicy, tokenizer: Box<dyn Tokenizer>) -> Self {
        let keywords = KeywordExtractor::new(tokenizer, policy.max_keywords);
        Self { policy, keywords }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn keywords(&self) -> &KeywordExtractor {
        &self.keywords
    }

    pub fn parse(&self, text: &str) -> Vec<HeadingNode> {
        parse_outline(text, &self.keywords, self.policy.keyword_context_chars)
    }

    pub fn master_from_text(&self, path: &Path, content: String) -> MasterDocument {
        MasterDocument::from_text(path.to_path_buf(), content, &self.keywords, &self.policy)
    }

    pub fn subplan_from_text(&self, name: &str, content: String) -> SubplanDocument {
        let path = format!("{name}.{}", self.policy.subplan_extension);
        SubplanDocument::from_text(name, path, content, &self.keywords, &self.policy)
    }

    /// Match and merge already-loaded documents. Pure: no IO.
    pub fn merge(
        &self,
        master: &MasterDocument,
        subplans: &[SubplanDocument],
        output_file: &Path,
    ) -> MergeOutcome {
        let set = match_subplans(subplans, &master.structure, &self.policy);
        let merged = merge_document(
            &master.content,
            &master.structure,
            &set.matches,
            subplans,
            &self.policy,
        );
        let report = MergeReport::build(
            &master.path,
            output_file,
            subplans.len(),
            set,
            &merged.skipped,
        );
        MergeOutcome {
            merged: merged.text,
            report,
        }
    }

    /// Load inputs from disk and merge them. Nothing is written; any failure
    /// returns before output exists.
    pub fn run(
        &self,
        master_file: &Path,
        subplans_dir: &Path,
        output_file: &Path,
    ) -> Result<MergeOutcome> {
        let master = MasterDocument::load(master_file, &self.keywords, &self.policy)?;
        let subplans = load_subplans(subplans_dir, &self.keywords, &self.policy)?;
        Ok(self.merge(&master, &subplans, output_file))
    }

    pub fn analyze_file(&self, path: &Path) -> Result<StructureAnalysis> {
        let content = read_utf8(path, InputKind::File)?;
        let structure = self.parse(&content);
        Ok(analyze_structure(
            &path.display().to_string(),
            &content,
            &structure,
            &self.keywords,
        ))
    }
}

impl Default for PlanMerger {
    fn default() -> Self {
        Self::new(MatchPolicy::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use tempfile::TempDir;

    const MASTER: &str = "# A\ncontentA\n# B\ncontentB\n";

    #[test]
    fn scenario_best_section_is_b() {
        let merger = PlanMerger::default();
        let master = merger.master_from_text(Path::new("master.md"), MASTER.to_string());
        let sp = merger.subplan_from_text("x", "contentB".to_string());
        assert_eq!(sp.keywords, master.structure[1].keywords);

        let outcome = merger.merge(&master, &[sp], Path::new("out.md"));
        let detail = &outcome.report.matching_details[0];
        assert_eq!(detail.result.section_title, "B");
        assert!(detail.result.similarity > 0.3);
    }

    #[test]
    fn scenario_shared_section_first_claim_wins() {
        let merger = PlanMerger::default();
        let master = merger.master_from_text(Path::new("master.md"), MASTER.to_string());
        let first = merger.subplan_from_text("a1", "contentA".to_string());
        let second = merger.subplan_from_text("a2", "contentA".to_string());

        let outcome = merger.merge(&master, &[first, second], Path::new("out.md"));

        // both matched, only the first-processed one is woven in
        assert_eq!(outcome.report.matches_found, 2);
        assert_eq!(outcome.report.inserted_count, 1);
        assert!(outcome.merged.contains("### 📋 a1"));
        assert!(!outcome.merged.contains("### 📋 a2"));
        let skipped: Vec<&str> = outcome
            .report
            .skipped()
            .map(|d| d.result.subplan_name.as_str())
            .collect();
        assert_eq!(skipped, vec!["a2"]);
    }

    #[test]
    fn scenario_unmatched_subplan_not_inserted() {
        let merger = PlanMerger::default();
        let master = merger.master_from_text(Path::new("master.md"), MASTER.to_string());
        let orphan = merger.subplan_from_text("orphan", "甲乙丙丁".to_string());

        let outcome = merger.merge(&master, &[orphan], Path::new("out.md"));
        assert_eq!(outcome.report.unmatched_subplans, vec!["orphan"]);
        assert!(outcome.report.matching_details.is_empty());
        assert_eq!(outcome.merged, MASTER);
    }

    #[test]
    fn run_missing_master_writes_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("subplans")).unwrap();
        let output = dir.path().join("merged.md");
        let err = PlanMerger::default()
            .run(
                &dir.path().join("master.md"),
                &dir.path().join("subplans"),
                &output,
            )
            .unwrap_err();
        assert!(matches!(err, MergeError::InputNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn run_and_write_round_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let master = dir.path().join("master.md");
        let subplans = dir.path().join("subplans");
        std::fs::write(&master, MASTER).unwrap();
        std::fs::create_dir(&subplans).unwrap();
        std::fs::write(subplans.join("b.md"), "contentB\nmore contentB").unwrap();

        let output = dir.path().join("out/merged.md");
        let report = dir.path().join("out/report.json");
        let outcome = PlanMerger::default()
            .run(&master, &subplans, &output)
            .unwrap();
        outcome.write(&output, Some(&report)).unwrap();

        let merged = std::fs::read_to_string(&output).unwrap();
        assert!(merged.contains("  more contentB"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(json["subplans_count"], 1);
        assert_eq!(json["matching_details"][0]["section_title"], "B");
    }

    #[test]
    fn write_emits_serialized_report_alongside_output() {
        let dir = TempDir::new().unwrap();
        let merger = PlanMerger::default();
        let master = merger.master_from_text(Path::new("master.md"), MASTER.to_string());
        let outcome = merger.merge(&master, &[], Path::new("merged.md"));

        let output = dir.path().join("merged.md");
        let report = dir.path().join("report.json");
        outcome.write(&output, Some(&report)).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), MASTER);
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        let expected: serde_json::Value =
            serde_json::from_str(&outcome.report.to_json().unwrap()).unwrap();
        assert_eq!(written, expected);
    }

    #[test]
    fn policies_do_not_interfere() {
        let strict = PlanMerger::new(MatchPolicy {
            min_similarity: 0.99,
            ..MatchPolicy::default()
        });
        let loose = PlanMerger::default();
        let text = "contentA extra words".to_string();

        let m1 = strict.master_from_text(Path::new("m.md"), MASTER.to_string());
        let s1 = strict.subplan_from_text("s", text.clone());
        let m2 = loose.master_from_text(Path::new("m.md"), MASTER.to_string());
        let s2 = loose.subplan_from_text("s", text);

        assert_eq!(strict.merge(&m1, &[s1], Path::new("o")).report.matches_found, 0);
        assert_eq!(loose.merge(&m2, &[s2], Path::new("o")).report.matches_found, 1);
    }
}
