use crate::error::Result;
use crate::matcher::{MatchResult, MatchSet};
use crate::merge::SkipReason;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct MatchDetail {
    #[serde(flatten)]
    pub result: MatchResult,
    pub inserted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub master_file: String,
    pub output_file: String,
    pub generated_at: String,
    pub subplans_count: usize,
    pub matches_found: usize,
    pub inserted_count: usize,
    pub matching_details: Vec<MatchDetail>,
    pub unmatched_subplans: Vec<String>,
}

impl MergeReport {
    pub fn build(
        master_file: &Path,
        output_file: &Path,
        subplans_count: usize,
        set: MatchSet,
        skipped: &[Option<SkipReason>],
    ) -> Self {
        debug_assert_eq!(set.matches.len(), skipped.len());
        let matching_details: Vec<MatchDetail> = set
            .matches
            .into_iter()
            .zip(skipped.iter().copied())
            .map(|(result, skip_reason)| MatchDetail {
                result,
                inserted: skip_reason.is_none(),
                skip_reason,
            })
            .collect();
        Self {
            master_file: master_file.display().to_string(),
            output_file: output_file.display().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            subplans_count,
            matches_found: matching_details.len(),
            inserted_count: matching_details.iter().filter(|d| d.inserted).count(),
            matching_details,
            unmatched_subplans: set.unmatched,
        }
    }

    /// Matches that produced no block, for any reason.
    pub fn skipped(&self) -> impl Iterator<Item = &MatchDetail> {
        self.matching_details.iter().filter(|d| !d.inserted)
    }

    pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &MatchDetail> {
        self.matching_details
            .iter()
            .filter(move |d| d.skip_reason == Some(reason))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
