use crate::calc::{ratio_half_up, to_hundredths};
use crate::catalog::Catalog;
use crate::model::{Grade, Student, SubjectRecord, GRADE_ORDER};
use serde::Serialize;

/// Subjects failing more than this share of students are weak.
pub const WEAK_FAIL_PERCENT: f64 = 20.0;
/// Students below this CGPA are flagged at risk.
pub const AT_RISK_CGPA: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub student_id: String,
    pub student_name: String,
    pub reg_no: String,
    #[serde(flatten)]
    pub record: SubjectRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeCount {
    pub grade: Grade,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAnalytics {
    pub records: Vec<SubjectRow>,
    pub total: usize,
    pub fails: usize,
    pub passes: usize,
    pub avg: f64,
    pub top_score: i64,
    pub pass_percent: f64,
    pub fail_percent: f64,
    pub grade_distrib: Vec<GradeCount>,
    pub attendance_avg: f64,
}

/// Summary of one subject in one semester. Students without a matching record
/// are left out rather than counted as failing.
pub fn subject_analytics(cohort: &[Student], code: &str, semester_number: i64) -> SubjectAnalytics {
    let records: Vec<SubjectRow> = cohort
        .iter()
        .filter_map(|s| {
            s.subject(semester_number, code).map(|sub| SubjectRow {
                student_id: s.id.clone(),
                student_name: s.name.clone(),
                reg_no: s.reg_no.clone(),
                record: sub.clone(),
            })
        })
        .collect();

    let total = records.len();
    let fails = records.iter().filter(|r| r.record.grade == Grade::F).count();
    let passes = total - fails;
    let n = total as i64;
    let marks_sum: i64 = records.iter().map(|r| r.record.total_marks).sum();
    let attendance_sum: i64 = records.iter().map(|r| r.record.attendance).sum();
    let top_score = records.iter().map(|r| r.record.total_marks).max().unwrap_or(0);

    let grade_distrib = GRADE_ORDER
        .iter()
        .map(|g| GradeCount {
            grade: *g,
            count: records.iter().filter(|r| r.record.grade == *g).count(),
        })
        .collect();

    SubjectAnalytics {
        total,
        fails,
        passes,
        avg: ratio_half_up(marks_sum, n, 1),
        top_score,
        pass_percent: ratio_half_up(passes as i64 * 100, n, 1),
        fail_percent: ratio_half_up(fails as i64 * 100, n, 1),
        grade_distrib,
        attendance_avg: ratio_half_up(attendance_sum, n, 1),
        records,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub code: String,
    pub name: String,
    /// First two words of the subject name, for narrow chart labels.
    pub short: String,
    #[serde(flatten)]
    pub analytics: SubjectAnalytics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentOverview {
    pub subject_data: Vec<SubjectSummary>,
    #[serde(rename = "deptAvgSGPA")]
    pub dept_avg_sgpa: f64,
    pub total_students: usize,
    pub overall_pass_percent: f64,
    pub weak_subjects: Vec<SubjectSummary>,
}

fn short_name(name: &str) -> String {
    name.split(' ').take(2).collect::<Vec<_>>().join(" ")
}

pub fn department_overview(
    cohort: &[Student],
    catalog: &Catalog,
    semester_number: i64,
) -> DepartmentOverview {
    let subject_data: Vec<SubjectSummary> = catalog
        .subjects
        .iter()
        .map(|def| SubjectSummary {
            code: def.code.clone(),
            name: def.name.clone(),
            short: short_name(&def.name),
            analytics: subject_analytics(cohort, &def.code, semester_number),
        })
        .collect();

    let sgpa_hundredths: i64 = cohort
        .iter()
        .map(|s| to_hundredths(s.sgpa(semester_number)))
        .sum();
    let denom = (cohort.len().max(1) as i64) * 100;
    let dept_avg_sgpa = ratio_half_up(sgpa_hundredths, denom, 2);

    let total_pass: usize = subject_data.iter().map(|d| d.analytics.passes).sum();
    let total_studies: usize = subject_data.iter().map(|d| d.analytics.total).sum();

    let weak_subjects = subject_data
        .iter()
        .filter(|d| d.analytics.fail_percent > WEAK_FAIL_PERCENT)
        .cloned()
        .collect();

    DepartmentOverview {
        dept_avg_sgpa,
        total_students: cohort.len(),
        overall_pass_percent: ratio_half_up(total_pass as i64 * 100, total_studies as i64, 1),
        weak_subjects,
        subject_data,
    }
}

/// Top `n` students by CGPA. Ties keep cohort order.
pub fn top_students(cohort: &[Student], n: usize) -> Vec<Student> {
    let mut sorted: Vec<&Student> = cohort.iter().collect();
    sorted.sort_by(|a, b| b.cgpa.total_cmp(&a.cgpa));
    sorted.into_iter().take(n).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTopper {
    pub id: String,
    pub name: String,
    pub reg_no: String,
    pub marks: i64,
    pub grade: Grade,
}

/// Top `n` students by total marks in one subject. A missing record reads as
/// 0 marks and grade F. Ties keep cohort order.
pub fn top_in_subject(
    cohort: &[Student],
    code: &str,
    semester_number: i64,
    n: usize,
) -> Vec<SubjectTopper> {
    let mut rows: Vec<SubjectTopper> = cohort
        .iter()
        .map(|s| {
            let sub = s.subject(semester_number, code);
            SubjectTopper {
                id: s.id.clone(),
                name: s.name.clone(),
                reg_no: s.reg_no.clone(),
                marks: sub.map(|x| x.total_marks).unwrap_or(0),
                grade: sub.map(|x| x.grade).unwrap_or(Grade::F),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.marks.cmp(&a.marks));
    rows.truncate(n);
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRiskStudent {
    pub id: String,
    pub name: String,
    pub reg_no: String,
    pub cgpa: f64,
    /// Weak subjects across all semesters.
    pub weak_subjects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDefaulter {
    pub id: String,
    pub name: String,
    pub reg_no: String,
    pub ineligible_subjects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alerts {
    pub at_risk: Vec<AtRiskStudent>,
    pub attendance_defaulters: Vec<AttendanceDefaulter>,
    pub critical_subjects: Vec<SubjectSummary>,
    pub overall_pass_percent: f64,
}

pub fn alerts(cohort: &[Student], catalog: &Catalog, semester_number: i64) -> Alerts {
    let at_risk = cohort
        .iter()
        .filter(|s| s.cgpa < AT_RISK_CGPA)
        .map(|s| AtRiskStudent {
            id: s.id.clone(),
            name: s.name.clone(),
            reg_no: s.reg_no.clone(),
            cgpa: s.cgpa,
            weak_subjects: s.weak_subjects.clone(),
        })
        .collect();

    let attendance_defaulters = cohort
        .iter()
        .filter_map(|s| {
            let sem = s.semester(semester_number)?;
            let ineligible: Vec<String> = sem
                .subjects
                .iter()
                .filter(|sub| !sub.eligible)
                .map(|sub| sub.code.clone())
                .collect();
            if ineligible.is_empty() {
                return None;
            }
            Some(AttendanceDefaulter {
                id: s.id.clone(),
                name: s.name.clone(),
                reg_no: s.reg_no.clone(),
                ineligible_subjects: ineligible,
            })
        })
        .collect();

    let overview = department_overview(cohort, catalog, semester_number);
    Alerts {
        at_risk,
        attendance_defaulters,
        critical_subjects: overview.weak_subjects,
        overall_pass_percent: overview.overall_pass_percent,
    }
}

/// Registration number when the key has no `@`, email otherwise. Both
/// case-insensitive.
pub fn student_lookup<'a>(cohort: &'a [Student], key: &str) -> Option<&'a Student> {
    let k = key.trim().to_lowercase();
    if k.is_empty() {
        return None;
    }
    if k.contains('@') {
        cohort.iter().find(|s| s.email.to_lowercase() == k)
    } else {
        cohort.iter().find(|s| s.reg_no.to_lowercase() == k)
    }
}

/// Every student whose name or registration number contains `q`, ignoring
/// case, in cohort order. A blank query matches everyone.
pub fn student_search<'a>(cohort: &'a [Student], q: &str) -> Vec<&'a Student> {
    let q = q.trim().to_lowercase();
    cohort
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&q) || s.reg_no.to_lowercase().contains(&q))
        .collect()
}
