use crate::ipc::error::{err, ErrorCode};
use crate::ipc::types::{AppState, Request};
use crate::ranking::RANKED_SEMESTERS;
use rusqlite::Connection;
use serde_json::json;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| err(&req.id, ErrorCode::BadParams, format!("missing {}", key), None))
}

pub fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| err(&req.id, ErrorCode::BadParams, format!("missing/invalid {}", key), None))
}

/// Positive count with a default and an upper bound.
pub fn optional_count(
    req: &Request,
    key: &str,
    default: usize,
    max: usize,
) -> Result<usize, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(default),
        Some(v) if v.is_null() => Ok(default),
        Some(v) => match v.as_i64() {
            Some(n) if n >= 1 => Ok((n as usize).min(max)),
            _ => Err(err(
                &req.id,
                ErrorCode::BadParams,
                format!("{} must be a positive integer", key),
                Some(json!({ "field": key, "value": v })),
            )),
        },
    }
}

/// A semester the cohort is ranked in.
pub fn required_semester(req: &Request) -> Result<i64, serde_json::Value> {
    let n = required_i64(req, "semester")?;
    if !RANKED_SEMESTERS.contains(&n) {
        return Err(err(
            &req.id,
            ErrorCode::BadParams,
            "semester must be 1 or 2",
            Some(json!({ "semester": n })),
        ));
    }
    Ok(n)
}

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, ErrorCode::NoWorkspace, "select a workspace first", None))
}

pub fn to_json<T: serde::Serialize>(req: &Request, value: &T) -> Result<serde_json::Value, serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| err(&req.id, ErrorCode::Internal, format!("failed to encode result: {e}"), None))
}

/// Persist `cohort` wholesale and make it the current state. Returns its revision.
pub fn commit_cohort(
    state: &mut AppState,
    req: &Request,
    cohort: crate::model::Cohort,
) -> Result<String, serde_json::Value> {
    let conn = db_conn(state, req)?;
    if let Err(e) = crate::db::save_cohort(conn, &cohort) {
        return Err(err(&req.id, ErrorCode::DbInsertFailed, format!("{e:?}"), None));
    }
    let revision = crate::revision::cohort_revision(&cohort);
    state.cohort = cohort;
    Ok(revision)
}
