use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "S")]
    S,
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "F")]
    F,
}

/// Canonical display order, best to worst.
pub const GRADE_ORDER: [Grade; 7] = [
    Grade::S,
    Grade::APlus,
    Grade::A,
    Grade::BPlus,
    Grade::B,
    Grade::C,
    Grade::F,
];

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One subject, one student, one semester.
///
/// `total_marks`, `grade`, `grade_point` and `eligible` are derived from the
/// three raw inputs and are re-struck by `calc::derive_subject`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub code: String,
    pub name: String,
    pub faculty_id: String,
    pub credits: i64,
    pub internal_marks: i64,
    pub external_marks: i64,
    #[serde(default)]
    pub total_marks: i64,
    pub attendance: i64,
    #[serde(default = "default_grade")]
    pub grade: Grade,
    #[serde(default)]
    pub grade_point: i64,
    #[serde(default)]
    pub eligible: bool,
}

fn default_grade() -> Grade {
    Grade::F
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semester {
    pub semester_number: i64,
    pub subjects: Vec<SubjectRecord>,
    #[serde(default)]
    pub sgpa: f64,
}

impl Semester {
    pub fn subject(&self, code: &str) -> Option<&SubjectRecord> {
        self.subjects.iter().find(|s| s.code == code)
    }

    pub fn total_credits(&self) -> i64 {
        self.subjects.iter().map(|s| s.credits).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub reg_no: String,
    pub email: String,
    /// Opaque credential carried through for the host; never inspected or
    /// written out.
    #[serde(default, skip_serializing)]
    pub password: String,
    pub semesters: Vec<Semester>,
    #[serde(default)]
    pub cgpa: f64,
    /// Mirrors semester 1's rank.
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub rank_by_sem: BTreeMap<i64, i64>,
    #[serde(default)]
    pub weak_subjects: Vec<String>,
}

impl Student {
    pub fn semester(&self, semester_number: i64) -> Option<&Semester> {
        self.semesters
            .iter()
            .find(|s| s.semester_number == semester_number)
    }

    pub fn subject(&self, semester_number: i64, code: &str) -> Option<&SubjectRecord> {
        self.semester(semester_number).and_then(|s| s.subject(code))
    }

    /// SGPA for the semester, 0 when the student has no such semester.
    pub fn sgpa(&self, semester_number: i64) -> f64 {
        self.semester(semester_number).map(|s| s.sgpa).unwrap_or(0.0)
    }
}

/// Every student subject to ranking and rollups.
pub type Cohort = Vec<Student>;

/// The raw fields a faculty edit may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditField {
    InternalMarks,
    ExternalMarks,
    Attendance,
}

impl EditField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "internalMarks" => Some(EditField::InternalMarks),
            "externalMarks" => Some(EditField::ExternalMarks),
            "attendance" => Some(EditField::Attendance),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EditField::InternalMarks => "internalMarks",
            EditField::ExternalMarks => "externalMarks",
            EditField::Attendance => "attendance",
        }
    }

    /// Inclusive domain of the field.
    pub fn domain(self) -> (i64, i64) {
        match self {
            EditField::InternalMarks => (0, 40),
            EditField::ExternalMarks => (0, 60),
            EditField::Attendance => (0, 100),
        }
    }

    pub fn clamp(self, value: i64) -> i64 {
        let (lo, hi) = self.domain();
        value.clamp(lo, hi)
    }

    pub fn read(self, subject: &SubjectRecord) -> i64 {
        match self {
            EditField::InternalMarks => subject.internal_marks,
            EditField::ExternalMarks => subject.external_marks,
            EditField::Attendance => subject.attendance,
        }
    }

    pub fn write(self, subject: &mut SubjectRecord, value: i64) {
        match self {
            EditField::InternalMarks => subject.internal_marks = value,
            EditField::ExternalMarks => subject.external_marks = value,
            EditField::Attendance => subject.attendance = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEdit {
    pub student_id: String,
    pub semester_number: i64,
    pub code: String,
    pub field: EditField,
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_serializes_with_symbols() {
        let v = serde_json::to_value(GRADE_ORDER).expect("serialize grades");
        assert_eq!(
            v,
            serde_json::json!(["S", "A+", "A", "B+", "B", "C", "F"])
        );
        let g: Grade = serde_json::from_str("\"B+\"").expect("parse grade");
        assert_eq!(g, Grade::BPlus);
    }

    #[test]
    fn edit_field_clamps_into_domain() {
        assert_eq!(EditField::InternalMarks.clamp(55), 40);
        assert_eq!(EditField::ExternalMarks.clamp(-3), 0);
        assert_eq!(EditField::Attendance.clamp(101), 100);
        assert_eq!(EditField::parse("attendance"), Some(EditField::Attendance));
        assert_eq!(EditField::parse("totalMarks"), None);
    }
}
