pub mod analytics;
pub mod cohort;
pub mod core;
pub mod edits;
pub mod exchange;
