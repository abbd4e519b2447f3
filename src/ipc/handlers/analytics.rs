use crate::analytics;
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::helpers::{db_conn, optional_count, required_semester, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

const TOP_DEFAULT: usize = 3;
const TOP_MAX: usize = 100;

fn handle_subject(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let code = match required_str(req, "code") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let semester = match required_semester(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(def) = state.catalog.subject(&code) else {
        return err(&req.id, ErrorCode::NotFound, "subject not in catalog", Some(json!({ "code": code })));
    };
    let faculty = state.catalog.faculty_for_subject(&code);
    let summary = analytics::subject_analytics(&state.cohort, &code, semester);
    match to_json(req, &summary) {
        Ok(mut v) => {
            v["code"] = json!(def.code);
            v["name"] = json!(def.name);
            v["semester"] = json!(semester);
            v["faculty"] = json!(faculty.map(|f| json!({ "id": f.id, "name": f.name })));
            ok(&req.id, v)
        }
        Err(e) => e,
    }
}

fn handle_department(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let semester = match required_semester(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let overview = analytics::department_overview(&state.cohort, &state.catalog, semester);
    match to_json(req, &overview) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_top_students(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let n = match optional_count(req, "n", TOP_DEFAULT, TOP_MAX) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let top = analytics::top_students(&state.cohort, n);
    match to_json(req, &top) {
        Ok(v) => ok(&req.id, json!({ "students": v })),
        Err(e) => e,
    }
}

fn handle_top_in_subject(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let code = match required_str(req, "code") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let semester = match required_semester(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let n = match optional_count(req, "n", TOP_DEFAULT, TOP_MAX) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let top = analytics::top_in_subject(&state.cohort, &code, semester, n);
    match to_json(req, &top) {
        Ok(v) => ok(&req.id, json!({ "code": code, "semester": semester, "students": v })),
        Err(e) => e,
    }
}

fn handle_alerts(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let semester = match required_semester(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let alerts = analytics::alerts(&state.cohort, &state.catalog, semester);
    match to_json(req, &alerts) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.subject" => Some(handle_subject(state, req)),
        "analytics.department" => Some(handle_department(state, req)),
        "analytics.topStudents" => Some(handle_top_students(state, req)),
        "analytics.topInSubject" => Some(handle_top_in_subject(state, req)),
        "analytics.alerts" => Some(handle_alerts(state, req)),
        _ => None,
    }
}
