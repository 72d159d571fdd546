pub mod analyze;
pub mod merge;
