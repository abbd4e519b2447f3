use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const CATALOG_FILE: &str = "catalog.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDef {
    pub code: String,
    pub name: String,
    pub faculty_id: String,
    pub credits: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyDef {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub subject_code: String,
    pub subject_name: String,
}

/// Fixed subject catalog plus the faculty who own each subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub subjects: Vec<SubjectDef>,
    pub faculty: Vec<FacultyDef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogError {
    pub code: String,
    pub message: String,
}

impl CatalogError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CatalogError {}

fn subject(code: &str, name: &str, faculty_id: &str) -> SubjectDef {
    SubjectDef {
        code: code.to_string(),
        name: name.to_string(),
        faculty_id: faculty_id.to_string(),
        credits: 4,
    }
}

fn faculty(id: &str, name: &str, email: &str, subject_code: &str, subject_name: &str) -> FacultyDef {
    FacultyDef {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: "faculty123".to_string(),
        subject_code: subject_code.to_string(),
        subject_name: subject_name.to_string(),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            subjects: vec![
                subject("CS301", "Data Structures", "f1"),
                subject("CS302", "Computer Networks", "f2"),
                subject("CS303", "Database Systems", "f3"),
                subject("CS304", "Operating Systems", "f4"),
                subject("CS305", "Software Engineering", "f5"),
            ],
            faculty: vec![
                faculty("f1", "Rajesh Kumar", "rajesh@vitfaculty.ac.in", "CS301", "Data Structures"),
                faculty("f2", "Priya Sharma", "priya@vitfaculty.ac.in", "CS302", "Computer Networks"),
                faculty("f3", "Arun Menon", "arun@vitfaculty.ac.in", "CS303", "Database Systems"),
                faculty("f4", "Divya Nair", "divya@vitfaculty.ac.in", "CS304", "Operating Systems"),
                faculty("f5", "Suresh Pillai", "suresh@vitfaculty.ac.in", "CS305", "Software Engineering"),
            ],
        }
    }
}

impl Catalog {
    pub fn subject(&self, code: &str) -> Option<&SubjectDef> {
        self.subjects.iter().find(|s| s.code == code)
    }

    pub fn faculty_for_subject(&self, code: &str) -> Option<&FacultyDef> {
        let def = self.subject(code)?;
        self.faculty.iter().find(|f| f.id == def.faculty_id)
    }

    pub fn subject_for_faculty(&self, faculty_id: &str) -> Option<&SubjectDef> {
        let f = self.faculty.iter().find(|f| f.id == faculty_id)?;
        self.subject(&f.subject_code)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.subjects.is_empty() {
            return Err(CatalogError::new("bad_catalog", "catalog has no subjects"));
        }
        let faculty_ids: HashSet<&str> = self.faculty.iter().map(|f| f.id.as_str()).collect();
        let mut seen = HashSet::new();
        for s in &self.subjects {
            if s.code.trim().is_empty() {
                return Err(CatalogError::new("bad_catalog", "subject code must not be empty"));
            }
            if !seen.insert(s.code.as_str()) {
                return Err(CatalogError::new(
                    "bad_catalog",
                    format!("duplicate subject code {}", s.code),
                ));
            }
            if s.credits <= 0 {
                return Err(CatalogError::new(
                    "bad_catalog",
                    format!("subject {} must carry positive credits", s.code),
                ));
            }
            if !faculty_ids.contains(s.faculty_id.as_str()) {
                return Err(CatalogError::new(
                    "bad_catalog",
                    format!("subject {} names unknown faculty {}", s.code, s.faculty_id),
                ));
            }
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(text)
            .map_err(|e| CatalogError::new("bad_catalog", e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }
}

/// Catalog override from `catalog.json` in the workspace, if the file exists.
pub fn load_workspace_catalog(workspace: &Path) -> Result<Option<Catalog>, CatalogError> {
    let path = workspace.join(CATALOG_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)
        .map_err(|e| CatalogError::new("io_failed", e.to_string()))?;
    Catalog::from_json_str(&text).map(Some)
}
