use crate::db;
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::helpers::{commit_cohort, db_conn, optional_count, required_i64, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::model::{EditField, SubjectEdit};
use crate::recompute::apply_edit;
use crate::revision::cohort_revision;
use serde_json::json;

const LOG_DEFAULT: usize = 50;
const LOG_MAX: usize = 1000;

fn parse_value(req: &Request) -> Result<i64, serde_json::Value> {
    let Some(v) = req.params.get("value") else {
        return Err(err(&req.id, ErrorCode::BadParams, "missing value", None));
    };
    if let Some(n) = v.as_i64() {
        return Ok(n);
    }
    match v.as_f64() {
        Some(f) if f.is_finite() => Ok(f.trunc() as i64),
        _ => Err(err(
            &req.id,
            ErrorCode::BadParams,
            "value must be a number",
            Some(json!({ "value": v })),
        )),
    }
}

fn parse_edit(req: &Request) -> Result<SubjectEdit, serde_json::Value> {
    let student_id = required_str(req, "studentId")?;
    let semester_number = required_i64(req, "semester")?;
    let code = required_str(req, "code")?;
    let field_raw = required_str(req, "field")?;
    let Some(field) = EditField::parse(&field_raw) else {
        return Err(err(
            &req.id,
            ErrorCode::BadParams,
            "field must be one of: internalMarks, externalMarks, attendance",
            Some(json!({ "field": field_raw })),
        ));
    };
    // Values outside the field's domain are clamped here, before the engine.
    let value = field.clamp(parse_value(req)?);
    Ok(SubjectEdit {
        student_id,
        semester_number,
        code,
        field,
        value,
    })
}

fn handle_edits_apply(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let edit = match parse_edit(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let revision_before = cohort_revision(&state.cohort);
    if let Some(expected) = req.params.get("expectedRevision").and_then(|v| v.as_str()) {
        if expected != revision_before {
            tracing::warn!(student = %edit.student_id, "rejecting edit against stale revision");
            return err(
                &req.id,
                ErrorCode::StaleRevision,
                "cohort changed since it was read",
                Some(json!({ "expected": expected, "current": revision_before })),
            );
        }
    }

    let outcome = apply_edit(&state.cohort, &edit);
    let status = outcome.status;
    let previous = outcome.previous;

    let revision_after = if status.applied() {
        match commit_cohort(state, req, outcome.cohort) {
            Ok(r) => r,
            Err(e) => return e,
        }
    } else {
        revision_before.clone()
    };

    if status.applied() {
        tracing::info!(
            student = %edit.student_id,
            semester = edit.semester_number,
            code = %edit.code,
            field = edit.field.as_str(),
            value = edit.value,
            "edit applied"
        );
    } else {
        tracing::warn!(
            student = %edit.student_id,
            semester = edit.semester_number,
            code = %edit.code,
            status = status.as_str(),
            "edit ignored"
        );
    }

    if let Some(conn) = state.db.as_ref() {
        if let Err(e) = db::edit_log_insert(
            conn,
            &edit.student_id,
            edit.semester_number,
            &edit.code,
            edit.field.as_str(),
            previous,
            edit.value,
            status.as_str(),
            &revision_before,
            &revision_after,
        ) {
            tracing::warn!(error = %e, "failed to record edit");
        }
    }

    let student = if status.applied() {
        match state.cohort.iter().find(|s| s.id == edit.student_id) {
            Some(s) => match to_json(req, s) {
                Ok(v) => v,
                Err(e) => return e,
            },
            None => serde_json::Value::Null,
        }
    } else {
        serde_json::Value::Null
    };

    ok(
        &req.id,
        json!({
            "applied": status.applied(),
            "status": status.as_str(),
            "studentId": edit.student_id,
            "semester": edit.semester_number,
            "code": edit.code,
            "field": edit.field.as_str(),
            "value": edit.value,
            "previous": previous,
            "revision": revision_after,
            "student": student,
        }),
    )
}

fn handle_edits_log(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let limit = match optional_count(req, "limit", LOG_DEFAULT, LOG_MAX) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let entries = match db::edit_log_list(conn, limit as i64) {
        Ok(v) => v,
        Err(e) => return err(&req.id, ErrorCode::DbQueryFailed, format!("{e:?}"), None),
    };
    match to_json(req, &entries) {
        Ok(v) => ok(&req.id, json!({ "entries": v })),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "edits.apply" => Some(handle_edits_apply(state, req)),
        "edits.log" => Some(handle_edits_log(state, req)),
        _ => None,
    }
}
