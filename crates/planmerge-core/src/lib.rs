pub mod analyze;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod io;
pub mod keywords;
pub mod matcher;
pub mod merge;
pub mod outline;
pub mod report;
pub mod score;
pub mod sequence;
pub mod text;

pub use config::MatchPolicy;
pub use engine::{MergeOutcome, PlanMerger};
pub use error::{MergeError, Result};
