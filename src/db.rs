use crate::calc::derive_cohort;
use crate::model::{Cohort, Grade, Semester, Student, SubjectRecord};
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use uuid::Uuid;

pub const DB_FILE: &str = "cohortd.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            reg_no TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            password TEXT NOT NULL,
            sort_order INTEGER NOT NULL
        )",
        [],
    )?;

    // Raw inputs only. Totals, grades, SGPA, CGPA and ranks are re-derived on load.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subject_records(
            student_id TEXT NOT NULL,
            semester_number INTEGER NOT NULL,
            position INTEGER NOT NULL,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            faculty_id TEXT NOT NULL,
            credits INTEGER NOT NULL,
            internal_marks INTEGER NOT NULL,
            external_marks INTEGER NOT NULL,
            attendance INTEGER NOT NULL,
            PRIMARY KEY(student_id, semester_number, code),
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subject_records_student ON subject_records(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS edit_log(
            id TEXT PRIMARY KEY,
            seq INTEGER NOT NULL,
            student_id TEXT NOT NULL,
            semester_number INTEGER NOT NULL,
            code TEXT NOT NULL,
            field TEXT NOT NULL,
            old_value INTEGER,
            new_value INTEGER NOT NULL,
            status TEXT NOT NULL,
            revision_before TEXT NOT NULL,
            revision_after TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

/// Replace the stored cohort wholesale.
pub fn save_cohort(conn: &Connection, cohort: &[Student]) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM subject_records", [])?;
    tx.execute("DELETE FROM students", [])?;
    {
        let mut student_stmt = tx.prepare(
            "INSERT INTO students(id, name, reg_no, email, password, sort_order)
             VALUES(?, ?, ?, ?, ?, ?)",
        )?;
        let mut subject_stmt = tx.prepare(
            "INSERT INTO subject_records(
                student_id, semester_number, position, code, name, faculty_id,
                credits, internal_marks, external_marks, attendance)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        for (i, s) in cohort.iter().enumerate() {
            student_stmt
                .execute((&s.id, &s.name, &s.reg_no, &s.email, &s.password, i as i64))
                .with_context(|| format!("failed to store student {}", s.id))?;
            for sem in &s.semesters {
                for (pos, sub) in sem.subjects.iter().enumerate() {
                    subject_stmt.execute((
                        &s.id,
                        sem.semester_number,
                        pos as i64,
                        &sub.code,
                        &sub.name,
                        &sub.faculty_id,
                        sub.credits,
                        sub.internal_marks,
                        sub.external_marks,
                        sub.attendance,
                    ))?;
                }
            }
        }
    }
    tx.commit()?;
    Ok(())
}

/// Load the stored cohort and bring it to steady state.
pub fn load_cohort(conn: &Connection) -> anyhow::Result<Cohort> {
    let mut stmt = conn.prepare(
        "SELECT id, name, reg_no, email, password FROM students ORDER BY sort_order",
    )?;
    let mut students: Vec<Student> = stmt
        .query_map([], |r| {
            Ok(Student {
                id: r.get(0)?,
                name: r.get(1)?,
                reg_no: r.get(2)?,
                email: r.get(3)?,
                password: r.get(4)?,
                semesters: Vec::new(),
                cgpa: 0.0,
                rank: 0,
                rank_by_sem: BTreeMap::new(),
                weak_subjects: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut rec_stmt = conn.prepare(
        "SELECT student_id, semester_number, code, name, faculty_id, credits,
                internal_marks, external_marks, attendance
         FROM subject_records
         ORDER BY student_id, semester_number, position",
    )?;
    let rows = rec_stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, i64>(1)?,
                SubjectRecord {
                    code: r.get(2)?,
                    name: r.get(3)?,
                    faculty_id: r.get(4)?,
                    credits: r.get(5)?,
                    internal_marks: r.get(6)?,
                    external_marks: r.get(7)?,
                    total_marks: 0,
                    attendance: r.get(8)?,
                    grade: Grade::F,
                    grade_point: 0,
                    eligible: false,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut by_student: HashMap<String, BTreeMap<i64, Vec<SubjectRecord>>> = HashMap::new();
    for (student_id, semester_number, rec) in rows {
        by_student
            .entry(student_id)
            .or_default()
            .entry(semester_number)
            .or_default()
            .push(rec);
    }
    for s in &mut students {
        if let Some(sems) = by_student.remove(&s.id) {
            s.semesters = sems
                .into_iter()
                .map(|(semester_number, subjects)| Semester {
                    semester_number,
                    subjects,
                    sgpa: 0.0,
                })
                .collect();
        }
    }

    Ok(derive_cohort(students))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditLogEntry {
    pub id: String,
    pub student_id: String,
    pub semester_number: i64,
    pub code: String,
    pub field: String,
    pub old_value: Option<i64>,
    pub new_value: i64,
    pub status: String,
    pub revision_before: String,
    pub revision_after: String,
    pub created_at: String,
}

#[allow(clippy::too_many_arguments)]
pub fn edit_log_insert(
    conn: &Connection,
    student_id: &str,
    semester_number: i64,
    code: &str,
    field: &str,
    old_value: Option<i64>,
    new_value: i64,
    status: &str,
    revision_before: &str,
    revision_after: &str,
) -> anyhow::Result<String> {
    let id = Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();
    let seq: i64 = conn.query_row("SELECT COALESCE(MAX(seq), 0) + 1 FROM edit_log", [], |r| {
        r.get(0)
    })?;
    conn.execute(
        "INSERT INTO edit_log(
            id, seq, student_id, semester_number, code, field, old_value, new_value,
            status, revision_before, revision_after, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            id,
            seq,
            student_id,
            semester_number,
            code,
            field,
            old_value,
            new_value,
            status,
            revision_before,
            revision_after,
            created_at
        ],
    )?;
    Ok(id)
}

/// Most recent edits first.
pub fn edit_log_list(conn: &Connection, limit: i64) -> anyhow::Result<Vec<EditLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, student_id, semester_number, code, field, old_value, new_value,
                status, revision_before, revision_after, created_at
         FROM edit_log
         ORDER BY seq DESC
         LIMIT ?",
    )?;
    let rows = stmt
        .query_map([limit], |r| {
            Ok(EditLogEntry {
                id: r.get(0)?,
                student_id: r.get(1)?,
                semester_number: r.get(2)?,
                code: r.get(3)?,
                field: r.get(4)?,
                old_value: r.get(5)?,
                new_value: r.get(6)?,
                status: r.get(7)?,
                revision_before: r.get(8)?,
                revision_after: r.get(9)?,
                created_at: r.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
