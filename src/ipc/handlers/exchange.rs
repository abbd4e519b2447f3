use crate::export::cohort_csv;
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::helpers::{db_conn, required_semester};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_exchange_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    let semester = match required_semester(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let out_path = req
        .params
        .get("outPath")
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let csv = cohort_csv(&state.cohort, &state.catalog, semester);
    let rows_exported = state.cohort.len();

    if let Some(out_path) = out_path.as_ref() {
        let out = PathBuf::from(out_path);
        if let Some(parent) = out.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return err(
                    &req.id,
                    ErrorCode::IoFailed,
                    e.to_string(),
                    Some(json!({ "path": out_path })),
                );
            }
        }
        if let Err(e) = std::fs::write(&out, &csv) {
            return err(
                &req.id,
                ErrorCode::IoFailed,
                e.to_string(),
                Some(json!({ "path": out_path })),
            );
        }
        tracing::info!(path = %out_path, rows = rows_exported, semester, "csv exported");
    }

    ok(
        &req.id,
        json!({
            "semester": semester,
            "rowsExported": rows_exported,
            "path": out_path,
            "csv": csv,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exchange.exportCsv" => Some(handle_exchange_export_csv(state, req)),
        _ => None,
    }
}
