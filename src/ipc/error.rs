use serde_json::json;
use std::fmt;

/// Every `error.code` the sidecar can reply with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadJson,
    BadParams,
    NoWorkspace,
    NotFound,
    StaleRevision,
    DbOpenFailed,
    DbQueryFailed,
    DbInsertFailed,
    IoFailed,
    BadCatalog,
    Internal,
    NotImplemented,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadJson => "bad_json",
            ErrorCode::BadParams => "bad_params",
            ErrorCode::NoWorkspace => "no_workspace",
            ErrorCode::NotFound => "not_found",
            ErrorCode::StaleRevision => "stale_revision",
            ErrorCode::DbOpenFailed => "db_open_failed",
            ErrorCode::DbQueryFailed => "db_query_failed",
            ErrorCode::DbInsertFailed => "db_insert_failed",
            ErrorCode::IoFailed => "io_failed",
            ErrorCode::BadCatalog => "bad_catalog",
            ErrorCode::Internal => "internal",
            ErrorCode::NotImplemented => "not_implemented",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn error_body(code: ErrorCode, message: String, details: Option<serde_json::Value>) -> serde_json::Value {
    let mut error = json!({
        "code": code.as_str(),
        "message": message,
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    error
}

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({ "id": id, "ok": true, "result": result })
}

pub fn err(
    id: &str,
    code: ErrorCode,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    json!({ "id": id, "ok": false, "error": error_body(code, message.into(), details) })
}

/// Reply for a line that never parsed into a request, so there is no id to echo.
pub fn err_without_id(code: ErrorCode, message: impl Into<String>) -> serde_json::Value {
    json!({ "ok": false, "error": error_body(code, message.into(), None) })
}
