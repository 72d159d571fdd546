use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("{kind} not found: {}", path.display())]
    InputNotFound { kind: InputKind, path: PathBuf },

    #[error("{} is not valid UTF-8", path.display())]
    Decode { path: PathBuf },

    #[error("invalid match policy: {0}")]
    InvalidPolicy(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Which input was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    MasterFile,
    SubplansDir,
    PolicyFile,
    File,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InputKind::MasterFile => "master file",
            InputKind::SubplansDir => "subplans directory",
            InputKind::PolicyFile => "policy file",
            InputKind::File => "file",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
