use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::model::Cohort;
use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Host state. `cohort` is always the steady-state value last saved to `db`;
/// edits replace it wholesale, one request at a time.
#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub catalog: Catalog,
    pub cohort: Cohort,
}
