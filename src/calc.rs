use crate::model::{Cohort, Grade, Semester, Student, SubjectRecord};
use crate::ranking;
use serde::Serialize;

/// Attendance below this forces F and clears eligibility.
pub const ATTENDANCE_MIN: i64 = 75;
/// A record with total marks below this is a weak subject.
pub const WEAK_MARKS_BELOW: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub grade: Grade,
    pub grade_point: i64,
    pub eligible: bool,
}

/// Grading scale. Attendance is checked first; a marks failure below 45 still
/// leaves the record eligible.
pub fn grade_of(total_marks: i64, attendance: i64) -> GradeResult {
    if attendance < ATTENDANCE_MIN {
        return GradeResult {
            grade: Grade::F,
            grade_point: 0,
            eligible: false,
        };
    }
    let (grade, grade_point) = match total_marks {
        t if t >= 91 => (Grade::S, 10),
        t if t >= 81 => (Grade::APlus, 9),
        t if t >= 71 => (Grade::A, 8),
        t if t >= 61 => (Grade::BPlus, 7),
        t if t >= 51 => (Grade::B, 6),
        t if t >= 45 => (Grade::C, 5),
        _ => (Grade::F, 0),
    };
    GradeResult {
        grade,
        grade_point,
        eligible: true,
    }
}

/// Round-half-up of `x` to `places` decimals: `Int(10^p * x + 0.5) / 10^p`.
pub fn round_half_up(x: f64, places: u32) -> f64 {
    let scale = 10_f64.powi(places as i32);
    ((scale * x) + 0.5).floor() / scale
}

/// Round-half-up of `num / den` to `places` decimals, computed on integers so
/// the result never depends on binary float representation. Returns 0 when
/// `den` is 0.
pub fn ratio_half_up(num: i64, den: i64, places: u32) -> f64 {
    if den <= 0 {
        return 0.0;
    }
    let scale = 10_i64.pow(places);
    let q = (2 * num * scale + den).div_euclid(2 * den);
    q as f64 / scale as f64
}

/// A value already rounded to 2 decimals, as an integer count of hundredths.
pub fn to_hundredths(x: f64) -> i64 {
    (x * 100.0).round() as i64
}

/// Credit-weighted mean grade point, 2 decimals. 0 for an empty set.
pub fn compute_sgpa(subjects: &[SubjectRecord]) -> f64 {
    let credits: i64 = subjects.iter().map(|s| s.credits).sum();
    let weighted: i64 = subjects.iter().map(|s| s.grade_point * s.credits).sum();
    ratio_half_up(weighted, credits, 2)
}

/// Credit-weighted mean of semester SGPAs, 2 decimals. Each semester weighs
/// the sum of its subjects' credits. 0 when there are no credits at all.
pub fn compute_cgpa(semesters: &[Semester]) -> f64 {
    let mut weighted: i64 = 0;
    let mut credits: i64 = 0;
    for sem in semesters {
        let c = sem.total_credits();
        weighted += to_hundredths(sem.sgpa) * c;
        credits += c;
    }
    ratio_half_up(weighted, credits * 100, 2)
}

pub fn is_weak(subject: &SubjectRecord) -> bool {
    subject.total_marks < WEAK_MARKS_BELOW || !subject.eligible
}

/// Codes of weak records across all semesters, first-seen order, no repeats.
pub fn weak_subjects(semesters: &[Semester]) -> Vec<String> {
    let mut ordered: Vec<&Semester> = semesters.iter().collect();
    ordered.sort_by_key(|s| s.semester_number);

    let mut out: Vec<String> = Vec::new();
    for sem in ordered {
        for sub in sem.subjects.iter().filter(|s| is_weak(s)) {
            if !out.iter().any(|c| *c == sub.code) {
                out.push(sub.code.clone());
            }
        }
    }
    out
}

pub fn derive_subject(mut subject: SubjectRecord) -> SubjectRecord {
    subject.total_marks = subject.internal_marks + subject.external_marks;
    let g = grade_of(subject.total_marks, subject.attendance);
    subject.grade = g.grade;
    subject.grade_point = g.grade_point;
    subject.eligible = g.eligible;
    subject
}

pub fn derive_semester(semester: Semester) -> Semester {
    let subjects: Vec<SubjectRecord> = semester.subjects.into_iter().map(derive_subject).collect();
    let sgpa = compute_sgpa(&subjects);
    Semester {
        semester_number: semester.semester_number,
        subjects,
        sgpa,
    }
}

/// Re-strike every per-student derived field. Rank fields are left alone;
/// they depend on the whole cohort.
pub fn derive_student(student: Student) -> Student {
    let mut semesters: Vec<Semester> = student.semesters.into_iter().map(derive_semester).collect();
    semesters.sort_by_key(|s| s.semester_number);
    let cgpa = compute_cgpa(&semesters);
    let weak = weak_subjects(&semesters);
    Student {
        semesters,
        cgpa,
        weak_subjects: weak,
        ..student
    }
}

/// Bring a cohort to steady state: derive every student, then rank.
pub fn derive_cohort(cohort: Cohort) -> Cohort {
    let derived: Cohort = cohort.into_iter().map(derive_student).collect();
    ranking::attach_ranks(&derived)
}
