use crate::analytics::{student_lookup, student_search};
use crate::calc::derive_cohort;
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::helpers::{commit_cohort, db_conn, required_semester, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::model::{EditField, Student, SubjectRecord};
use crate::ranking::{compute_ranks, RANKED_SEMESTERS};
use crate::revision::cohort_revision;
use crate::seed;
use serde_json::json;
use std::collections::HashSet;

fn handle_cohort_seed(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let cohort = seed::build_cohort(&state.catalog);
    let count = cohort.len();
    match commit_cohort(state, req, cohort) {
        Ok(revision) => {
            tracing::info!(students = count, "cohort seeded");
            ok(&req.id, json!({ "studentCount": count, "revision": revision }))
        }
        Err(e) => e,
    }
}

type ImportErr = (String, serde_json::Value);

/// Raw fields must sit inside the ranges an edit could produce.
fn validate_record(s: &Student, semester_number: i64, sub: &SubjectRecord) -> Result<(), ImportErr> {
    if sub.credits <= 0 {
        return Err((
            "credits must be positive".into(),
            json!({ "studentId": s.id, "semester": semester_number, "code": sub.code, "credits": sub.credits }),
        ));
    }
    for field in [EditField::InternalMarks, EditField::ExternalMarks, EditField::Attendance] {
        let value = field.read(sub);
        if field.clamp(value) != value {
            let (lo, hi) = field.domain();
            return Err((
                format!("{} must be within {}..={}", field.as_str(), lo, hi),
                json!({
                    "studentId": s.id,
                    "semester": semester_number,
                    "code": sub.code,
                    "field": field.as_str(),
                    "value": value,
                }),
            ));
        }
    }
    Ok(())
}

/// Checks the engine relies on but does not enforce itself: unique keys,
/// exactly the ranked semesters each with at least one subject, and raw
/// values inside their domains.
fn validate_import(students: &[Student]) -> Result<(), ImportErr> {
    let mut ids = HashSet::new();
    let mut reg_nos = HashSet::new();
    for s in students {
        if s.id.trim().is_empty() {
            return Err(("student id must not be empty".into(), json!({ "regNo": s.reg_no })));
        }
        if !ids.insert(s.id.as_str()) {
            return Err(("duplicate student id".into(), json!({ "studentId": s.id })));
        }
        if !reg_nos.insert(s.reg_no.to_lowercase()) {
            return Err(("duplicate registration number".into(), json!({ "regNo": s.reg_no })));
        }
        let mut sems: Vec<i64> = s.semesters.iter().map(|sem| sem.semester_number).collect();
        sems.sort_unstable();
        if sems != RANKED_SEMESTERS {
            return Err((
                "student must carry exactly semesters 1 and 2".into(),
                json!({ "studentId": s.id, "semesters": sems }),
            ));
        }
        for sem in &s.semesters {
            if sem.subjects.is_empty() {
                return Err((
                    "semester has no subjects".into(),
                    json!({ "studentId": s.id, "semester": sem.semester_number }),
                ));
            }
            let mut codes = HashSet::new();
            for sub in &sem.subjects {
                if !codes.insert(sub.code.as_str()) {
                    return Err((
                        "duplicate subject code in semester".into(),
                        json!({ "studentId": s.id, "semester": sem.semester_number, "code": sub.code }),
                    ));
                }
                validate_record(s, sem.semester_number, sub)?;
            }
        }
    }
    Ok(())
}

fn handle_cohort_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let Some(raw) = req.params.get("students") else {
        return err(&req.id, ErrorCode::BadParams, "missing students[]", None);
    };
    let students: Vec<Student> = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, ErrorCode::BadParams, format!("invalid students: {e}"), None),
    };
    if let Err((message, details)) = validate_import(&students) {
        return err(&req.id, ErrorCode::BadParams, message, Some(details));
    }

    // Whatever derived values came in are discarded and re-derived.
    let cohort = derive_cohort(students);
    let count = cohort.len();
    match commit_cohort(state, req, cohort) {
        Ok(revision) => {
            tracing::info!(students = count, "cohort imported");
            ok(&req.id, json!({ "studentCount": count, "revision": revision }))
        }
        Err(e) => e,
    }
}

fn handle_cohort_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let students = match to_json(req, &state.cohort) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({
            "students": students,
            "revision": cohort_revision(&state.cohort),
        }),
    )
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(student) = state.cohort.iter().find(|s| s.id == student_id) else {
        return err(
            &req.id,
            ErrorCode::NotFound,
            "student not found",
            Some(json!({ "studentId": student_id })),
        );
    };
    match to_json(req, student) {
        Ok(v) => ok(&req.id, json!({ "student": v })),
        Err(e) => e,
    }
}

fn handle_students_find(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let key = match required_str(req, "key") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(student) = student_lookup(&state.cohort, &key) else {
        return err(&req.id, ErrorCode::NotFound, "student not found", Some(json!({ "key": key })));
    };
    match to_json(req, student) {
        Ok(v) => ok(&req.id, json!({ "student": v })),
        Err(e) => e,
    }
}

fn handle_students_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let q = req
        .params
        .get("q")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let matches = student_search(&state.cohort, q);
    match to_json(req, &matches) {
        Ok(v) => ok(&req.id, json!({ "q": q, "students": v })),
        Err(e) => e,
    }
}

fn handle_ranks_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let semester = match required_semester(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let ranks = compute_ranks(&state.cohort, semester);
    match to_json(req, &ranks) {
        Ok(v) => ok(&req.id, json!({ "semester": semester, "ranks": v })),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "cohort.seed" => Some(handle_cohort_seed(state, req)),
        "cohort.import" => Some(handle_cohort_import(state, req)),
        "cohort.get" => Some(handle_cohort_get(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.find" => Some(handle_students_find(state, req)),
        "students.search" => Some(handle_students_search(state, req)),
        "ranks.list" => Some(handle_ranks_list(state, req)),
        _ => None,
    }
}
