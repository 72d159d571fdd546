use crate::error::{InputKind, MergeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// PolicyWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// MatchPolicy
// ---------------------------------------------------------------------------

/// Weights, thresholds and formatting used by one merge run.
///
/// A policy is an immutable value handed to the scorer, matcher and merger.
/// Two runs with different policies never observe each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchPolicy {
    /// Share of the keyword overlap term; the text term gets the rest.
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,
    /// Best scores below this leave the subplan unmatched.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    /// Deepest heading level that can receive an insertion.
    #[serde(default = "default_max_target_level")]
    pub max_target_level: u8,
    /// Characters of each text compared by the sequence ratio.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    /// Characters of section content folded into a heading's keywords.
    #[serde(default = "default_keyword_context_chars")]
    pub keyword_context_chars: usize,
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
    /// Shared keywords quoted in a match reason.
    #[serde(default = "default_reason_keywords")]
    pub reason_keywords: usize,
    /// Extension (without the dot) of subplan files.
    #[serde(default = "default_subplan_extension")]
    pub subplan_extension: String,
    /// File name prefixes skipped when loading subplans.
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
    /// Emitted before each inserted block.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Prefix of the line naming the inserted subplan.
    #[serde(default = "default_block_label")]
    pub block_label: String,
    /// Prepended to every inserted subplan line.
    #[serde(default = "default_indent")]
    pub indent: String,
}

fn default_keyword_weight() -> f64 {
    0.5
}

fn default_min_similarity() -> f64 {
    0.1
}

fn default_max_target_level() -> u8 {
    3
}

fn default_excerpt_chars() -> usize {
    500
}

fn default_keyword_context_chars() -> usize {
    200
}

fn default_max_keywords() -> usize {
    10
}

fn default_reason_keywords() -> usize {
    3
}

fn default_subplan_extension() -> String {
    "md".to_string()
}

fn default_excluded_prefixes() -> Vec<String> {
    vec!["master".to_string(), "总纲".to_string()]
}

fn default_separator() -> String {
    "\n--- Subplan Content ---\n".to_string()
}

fn default_block_label() -> String {
    "### 📋".to_string()
}

fn default_indent() -> String {
    "  ".to_string()
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            keyword_weight: default_keyword_weight(),
            min_similarity: default_min_similarity(),
            max_target_level: default_max_target_level(),
            excerpt_chars: default_excerpt_chars(),
            keyword_context_chars: default_keyword_context_chars(),
            max_keywords: default_max_keywords(),
            reason_keywords: default_reason_keywords(),
            subplan_extension: default_subplan_extension(),
            excluded_prefixes: default_excluded_prefixes(),
            separator: default_separator(),
            block_label: default_block_label(),
            indent: default_indent(),
        }
    }
}

impl MatchPolicy {
    /// Load a policy from a YAML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = crate::io::read_utf8(path, InputKind::PolicyFile)?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map.
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let policy: MatchPolicy = serde_yaml::from_str(data)?;
        Ok(policy)
    }

    /// Load from `path` when given, otherwise use the defaults. Fails on
    /// error-level validation findings.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let policy = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        policy.ensure_valid()?;
        Ok(policy)
    }

    /// Whether a section at `level` may receive an insertion.
    pub fn is_target_level(&self, level: u8) -> bool {
        level <= self.max_target_level
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<PolicyWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(PolicyWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        if !(0.0..=1.0).contains(&self.keyword_weight) {
            error(format!(
                "keyword_weight={} must be within [0, 1]",
                self.keyword_weight
            ));
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            error(format!(
                "min_similarity={} must be within [0, 1]",
                self.min_similarity
            ));
        }
        if !(1..=6).contains(&self.max_target_level) {
            error(format!(
                "max_target_level={} must be a heading level 1-6",
                self.max_target_level
            ));
        }
        if self.max_keywords == 0 {
            error("max_keywords must be at least 1".to_string());
        }

        if self.subplan_extension.trim().is_empty() {
            warnings.push(PolicyWarning {
                level: WarnLevel::Warning,
                message: "subplan_extension is empty; only files without an extension load"
                    .to_string(),
            });
        }
        if self.excerpt_chars == 0 {
            warnings.push(PolicyWarning {
                level: WarnLevel::Warning,
                message: "excerpt_chars=0 disables text similarity".to_string(),
            });
        }

        warnings
    }

    /// Log warning-level findings and reject the policy on any error.
    pub fn ensure_valid(&self) -> Result<()> {
        let mut errors = Vec::new();
        for w in self.validate() {
            match w.level {
                WarnLevel::Warning => tracing::warn!("{}", w.message),
                WarnLevel::Error => errors.push(w.message),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(MergeError::InvalidPolicy(errors.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let policy = MatchPolicy::default();
        assert!(policy.validate().is_empty());
        assert_eq!(policy.keyword_weight, 0.5);
        assert_eq!(policy.min_similarity, 0.1);
        assert_eq!(policy.max_target_level, 3);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "keyword_weight: 0.7\nmax_target_level: 2\n";
        let policy = MatchPolicy::from_yaml(yaml).unwrap();
        assert_eq!(policy.keyword_weight, 0.7);
        assert_eq!(policy.max_target_level, 2);
        assert_eq!(policy.min_similarity, 0.1);
        assert_eq!(policy.subplan_extension, "md");
        assert_eq!(policy.indent, "  ");
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(MatchPolicy::from_yaml("  \n").unwrap(), MatchPolicy::default());
    }

    #[test]
    fn misspelled_key_is_rejected() {
        let err = MatchPolicy::from_yaml("min_similarty: 0.5\n").unwrap_err();
        assert!(matches!(err, MergeError::Yaml(_)));
        assert!(err.to_string().contains("min_similarty"));
    }

    #[test]
    fn validate_rejects_out_of_range_weight() {
        let policy = MatchPolicy {
            keyword_weight: 1.5,
            ..MatchPolicy::default()
        };
        let warnings = policy.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("keyword_weight=1.5")));
        assert!(matches!(
            policy.ensure_valid(),
            Err(MergeError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_level() {
        let policy = MatchPolicy {
            max_target_level: 0,
            ..MatchPolicy::default()
        };
        assert!(policy
            .validate()
            .iter()
            .any(|w| w.message.contains("max_target_level=0")));
    }

    #[test]
    fn zero_excerpt_is_only_a_warning() {
        let policy = MatchPolicy {
            excerpt_chars: 0,
            ..MatchPolicy::default()
        };
        let warnings = policy.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(policy.ensure_valid().is_ok());
    }

    #[test]
    fn resolve_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(&path, "min_similarity: 0.25\n").unwrap();
        let policy = MatchPolicy::resolve(Some(&path)).unwrap();
        assert_eq!(policy.min_similarity, 0.25);
    }

    #[test]
    fn resolve_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = MatchPolicy::resolve(Some(&dir.path().join("missing.yaml"))).unwrap_err();
        assert!(matches!(
            err,
            MergeError::InputNotFound {
                kind: InputKind::PolicyFile,
                ..
            }
        ));
    }

    #[test]
    fn target_level_boundary() {
        let policy = MatchPolicy::default();
        assert!(policy.is_target_level(3));
        assert!(!policy.is_target_level(4));
    }
}
