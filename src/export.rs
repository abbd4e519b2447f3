use crate::catalog::Catalog;
use crate::model::Student;

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn header(catalog: &Catalog) -> Vec<String> {
    let mut cols = vec!["Reg No".to_string(), "Name".to_string(), "CGPA".to_string()];
    for s in &catalog.subjects {
        cols.push(format!("{} Grade", s.code));
        cols.push(format!("{} Marks", s.code));
        cols.push(format!("{} Att%", s.code));
    }
    cols.push("SGPA".to_string());
    cols.push("Rank".to_string());
    cols
}

fn row(student: &Student, catalog: &Catalog, semester_number: i64) -> Vec<String> {
    let sem = student.semester(semester_number);
    let mut cells = vec![
        student.reg_no.clone(),
        student.name.clone(),
        student.cgpa.to_string(),
    ];
    for def in &catalog.subjects {
        match sem.and_then(|s| s.subject(&def.code)) {
            Some(sub) => {
                cells.push(sub.grade.to_string());
                cells.push(sub.total_marks.to_string());
                cells.push(sub.attendance.to_string());
            }
            None => cells.extend([String::new(), String::new(), String::new()]),
        }
    }
    cells.push(sem.map(|s| s.sgpa.to_string()).unwrap_or_default());
    cells.push(
        student
            .rank_by_sem
            .get(&semester_number)
            .map(|r| r.to_string())
            .unwrap_or_default(),
    );
    cells
}

/// Per-student export for one semester. Columns follow catalog order; rows
/// follow cohort order. No trailing newline.
pub fn cohort_csv(cohort: &[Student], catalog: &Catalog, semester_number: i64) -> String {
    std::iter::once(header(catalog))
        .chain(cohort.iter().map(|s| row(s, catalog, semester_number)))
        .map(|cells| {
            cells
                .iter()
                .map(|c| csv_quote(c))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
