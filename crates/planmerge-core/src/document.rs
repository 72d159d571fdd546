use crate::config::MatchPolicy;
use crate::error::{InputKind, MergeError, Result};
use crate::io::read_utf8;
use crate::keywords::KeywordExtractor;
use crate::outline::{parse_outline, HeadingNode};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MasterDocument
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MasterDocument {
    pub path: PathBuf,
    pub content: String,
    pub structure: Vec<HeadingNode>,
}

impl MasterDocument {
    pub fn from_text(
        path: impl Into<PathBuf>,
        content: String,
        keywords: &KeywordExtractor,
        policy: &MatchPolicy,
    ) -> Self {
        let structure = parse_outline(&content, keywords, policy.keyword_context_chars);
        Self {
            path: path.into(),
            content,
            structure,
        }
    }

    pub fn load(path: &Path, keywords: &KeywordExtractor, policy: &MatchPolicy) -> Result<Self> {
        let content = read_utf8(path, InputKind::MasterFile)?;
        let doc = Self::from_text(path.to_path_buf(), content, keywords, policy);
        tracing::info!(
            path = %path.display(),
            headings = doc.structure.len(),
            "loaded master"
        );
        Ok(doc)
    }
}

// ---------------------------------------------------------------------------
// SubplanDocument
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SubplanDocument {
    /// File stem of the source.
    pub name: String,
    pub path: PathBuf,
    pub content: String,
    pub structure: Vec<HeadingNode>,
    /// Keywords of the whole content.
    pub keywords: Vec<String>,
}

impl SubplanDocument {
    pub fn from_text(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        content: String,
        keywords: &KeywordExtractor,
        policy: &MatchPolicy,
    ) -> Self {
        let structure = parse_outline(&content, keywords, policy.keyword_context_chars);
        Self {
            name: name.into(),
            path: path.into(),
            keywords: keywords.extract(&content),
            structure,
            content,
        }
    }
}

/// Whether `path` names a subplan under `policy`: right extension, and not
/// starting with one of the excluded prefixes.
pub fn is_subplan_file(path: &Path, policy: &MatchPolicy) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext != policy.subplan_extension {
        return false;
    }
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !policy
        .excluded_prefixes
        .iter()
        .any(|prefix| file_name.starts_with(prefix.as_str()))
}

/// Load every subplan directly inside `dir`, sorted by name.
///
/// Sorting fixes match order, and with it tie-breaking and which subplan
/// claims a contested section, independent of directory listing order.
pub fn load_subplans(
    dir: &Path,
    keywords: &KeywordExtractor,
    policy: &MatchPolicy,
) -> Result<Vec<SubplanDocument>> {
    if !dir.is_dir() {
        return Err(MergeError::InputNotFound {
            kind: InputKind::SubplansDir,
            path: dir.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_subplan_file(&path, policy) {
            paths.push(path);
        } else {
            tracing::debug!(path = %path.display(), "skipping non-subplan entry");
        }
    }

    let mut subplans = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = read_utf8(&path, InputKind::File)?;
        subplans.push(SubplanDocument::from_text(
            name,
            path.clone(),
            content,
            keywords,
            policy,
        ));
    }
    subplans.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::info!(dir = %dir.display(), count = subplans.len(), "loaded subplans");
    Ok(subplans)
}
