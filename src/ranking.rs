use crate::model::{Cohort, Student};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Semesters every student is ranked in.
pub const RANKED_SEMESTERS: [i64; 2] = [1, 2];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub id: String,
    pub name: String,
    pub reg_no: String,
    pub sgpa: f64,
    pub rank: i64,
}

fn rank_order(a: &RankEntry, b: &RankEntry) -> Ordering {
    b.sgpa
        .total_cmp(&a.sgpa)
        .then_with(|| a.name.cmp(&b.name))
        // Same name and SGPA: fall back to id so the order is still total.
        .then_with(|| a.id.cmp(&b.id))
}

/// Cohort ordered by the semester's SGPA (missing semester counts as 0),
/// ties by name. Ranks are 1-based positions, no gaps and no shared ranks.
pub fn compute_ranks(cohort: &[Student], semester_number: i64) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = cohort
        .iter()
        .map(|s| RankEntry {
            id: s.id.clone(),
            name: s.name.clone(),
            reg_no: s.reg_no.clone(),
            sgpa: s.sgpa(semester_number),
            rank: 0,
        })
        .collect();
    entries.sort_by(rank_order);
    for (i, e) in entries.iter_mut().enumerate() {
        e.rank = (i as i64) + 1;
    }
    entries
}

/// Returns the cohort with `rank_by_sem` and the legacy `rank` (semester 1)
/// re-struck. Idempotent.
pub fn attach_ranks(cohort: &[Student]) -> Cohort {
    let mut by_student: HashMap<String, BTreeMap<i64, i64>> = HashMap::new();
    for semester_number in RANKED_SEMESTERS {
        for entry in compute_ranks(cohort, semester_number) {
            by_student
                .entry(entry.id)
                .or_default()
                .insert(semester_number, entry.rank);
        }
    }

    cohort
        .iter()
        .map(|s| {
            let rank_by_sem = by_student.get(s.id.as_str()).cloned().unwrap_or_default();
            let rank = rank_by_sem.get(&1).copied().unwrap_or(0);
            Student {
                rank_by_sem,
                rank,
                ..s.clone()
            }
        })
        .collect()
}
