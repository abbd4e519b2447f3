use crate::model::Student;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the cohort's JSON form. Two cohorts share a revision
/// exactly when every stored and derived field matches.
pub fn cohort_revision(cohort: &[Student]) -> String {
    let mut hasher = Sha256::new();
    // Serializing plain data into a Vec cannot fail.
    let bytes = serde_json::to_vec(cohort).unwrap_or_default();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
