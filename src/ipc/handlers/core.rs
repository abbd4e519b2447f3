use crate::catalog::{self, Catalog};
use crate::db;
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::helpers::{db_conn, to_json};
use crate::ipc::types::{AppState, Request};
use crate::revision::cohort_revision;
use serde_json::json;
use std::path::{Path, PathBuf};

const CATALOG_SETTING: &str = "catalog";

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "studentCount": state.cohort.len(),
        }),
    )
}

/// Workspace file wins; otherwise the copy cached in settings; otherwise the
/// built-in catalog.
fn resolve_catalog(path: &Path, conn: &rusqlite::Connection) -> Result<(Catalog, &'static str), catalog::CatalogError> {
    if let Some(c) = catalog::load_workspace_catalog(path)? {
        let cached = serde_json::to_value(&c)
            .map_err(|e| catalog::CatalogError::new("bad_catalog", e.to_string()))?;
        if let Err(e) = db::settings_set_json(conn, CATALOG_SETTING, &cached) {
            tracing::warn!(error = %e, "failed to cache catalog");
        }
        return Ok((c, "file"));
    }
    match db::settings_get_json(conn, CATALOG_SETTING) {
        Ok(Some(v)) => match serde_json::from_value::<Catalog>(v) {
            Ok(c) if c.validate().is_ok() => Ok((c, "settings")),
            _ => {
                tracing::warn!("ignoring invalid cached catalog");
                Ok((Catalog::default(), "default"))
            }
        },
        _ => Ok((Catalog::default(), "default")),
    }
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, ErrorCode::BadParams, "missing params.path", None);
    };

    let conn = match db::open_db(&path) {
        Ok(c) => c,
        Err(e) => return err(&req.id, ErrorCode::DbOpenFailed, format!("{e:?}"), None),
    };
    let (catalog, catalog_source) = match resolve_catalog(&path, &conn) {
        Ok(v) => v,
        Err(e) => {
            let code = if e.code == "io_failed" {
                ErrorCode::IoFailed
            } else {
                ErrorCode::BadCatalog
            };
            tracing::warn!(error = %e, "workspace catalog rejected");
            return err(
                &req.id,
                code,
                e.message,
                Some(json!({ "path": path.join(catalog::CATALOG_FILE).to_string_lossy() })),
            )
        }
    };
    let cohort = match db::load_cohort(&conn) {
        Ok(c) => c,
        Err(e) => return err(&req.id, ErrorCode::DbQueryFailed, format!("{e:?}"), None),
    };

    tracing::info!(
        workspace = %path.to_string_lossy(),
        students = cohort.len(),
        catalog = catalog_source,
        "workspace opened"
    );

    let revision = cohort_revision(&cohort);
    let student_count = cohort.len();
    state.workspace = Some(path.clone());
    state.db = Some(conn);
    state.catalog = catalog;
    state.cohort = cohort;

    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "studentCount": student_count,
            "catalogSource": catalog_source,
            "revision": revision,
        }),
    )
}

fn handle_catalog_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = db_conn(state, req) {
        return e;
    }
    match to_json(req, &state.catalog) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "catalog.get" => Some(handle_catalog_get(state, req)),
        _ => None,
    }
}
