use crate::calc::{compute_cgpa, compute_sgpa, derive_subject, weak_subjects};
use crate::model::{Cohort, Semester, Student, SubjectEdit};
use crate::ranking::attach_ranks;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    Applied,
    StudentNotFound,
    SemesterNotFound,
    SubjectNotFound,
}

impl EditStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EditStatus::Applied => "applied",
            EditStatus::StudentNotFound => "student_not_found",
            EditStatus::SemesterNotFound => "semester_not_found",
            EditStatus::SubjectNotFound => "subject_not_found",
        }
    }

    pub fn applied(self) -> bool {
        self == EditStatus::Applied
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub cohort: Cohort,
    pub status: EditStatus,
    /// Field value before the edit, when the target record exists.
    pub previous: Option<i64>,
}

fn locate(cohort: &[Student], edit: &SubjectEdit) -> Result<(usize, usize, usize), EditStatus> {
    let si = cohort
        .iter()
        .position(|s| s.id == edit.student_id)
        .ok_or(EditStatus::StudentNotFound)?;
    let semi = cohort[si]
        .semesters
        .iter()
        .position(|s| s.semester_number == edit.semester_number)
        .ok_or(EditStatus::SemesterNotFound)?;
    let subi = cohort[si].semesters[semi]
        .subjects
        .iter()
        .position(|s| s.code == edit.code)
        .ok_or(EditStatus::SubjectNotFound)?;
    Ok((si, semi, subi))
}

/// Apply one raw-field edit and return the new steady-state cohort.
///
/// The edited student's subject, semester SGPA, CGPA and weak list are
/// re-struck; every other student's data is carried over as is; ranks are then
/// recomputed for the whole cohort. The value is written as given: clamping
/// into the field's domain is the caller's job. A miss on student, semester or
/// subject returns the cohort unchanged with the matching status.
pub fn apply_edit(cohort: &[Student], edit: &SubjectEdit) -> EditOutcome {
    let (si, semi, subi) = match locate(cohort, edit) {
        Ok(v) => v,
        Err(status) => {
            tracing::debug!(
                student = %edit.student_id,
                semester = edit.semester_number,
                code = %edit.code,
                status = status.as_str(),
                "edit target missing"
            );
            return EditOutcome {
                cohort: cohort.to_vec(),
                status,
                previous: None,
            };
        }
    };

    let target = &cohort[si];
    let previous = edit.field.read(&target.semesters[semi].subjects[subi]);

    let semesters: Vec<Semester> = target
        .semesters
        .iter()
        .enumerate()
        .map(|(i, sem)| {
            if i != semi {
                return sem.clone();
            }
            let subjects: Vec<_> = sem
                .subjects
                .iter()
                .enumerate()
                .map(|(j, sub)| {
                    if j != subi {
                        return sub.clone();
                    }
                    let mut next = sub.clone();
                    edit.field.write(&mut next, edit.value);
                    derive_subject(next)
                })
                .collect();
            let sgpa = compute_sgpa(&subjects);
            Semester {
                semester_number: sem.semester_number,
                subjects,
                sgpa,
            }
        })
        .collect();

    let updated = Student {
        cgpa: compute_cgpa(&semesters),
        weak_subjects: weak_subjects(&semesters),
        semesters,
        ..target.clone()
    };

    let mut next: Cohort = cohort.to_vec();
    next[si] = updated;

    tracing::trace!(
        student = %edit.student_id,
        field = edit.field.as_str(),
        previous,
        value = edit.value,
        "edit applied"
    );

    EditOutcome {
        cohort: attach_ranks(&next),
        status: EditStatus::Applied,
        previous: Some(previous),
    }
}
