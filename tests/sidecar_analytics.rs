mod test_support;

use serde_json::json;
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn calls_before_workspace_select_and_unknown_methods_fail_cleanly() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["workspacePath"].is_null());
    assert_eq!(health["studentCount"], 0);

    let early = request(
        &mut stdin,
        &mut reader,
        "2",
        "analytics.department",
        json!({ "semester": 1 }),
    );
    assert_eq!(error_code(&early).as_deref(), Some("no_workspace"));

    let unknown = request(&mut stdin, &mut reader, "3", "grades.explode", json!({}));
    assert_eq!(error_code(&unknown).as_deref(), Some("not_implemented"));

    let no_path = request(&mut stdin, &mut reader, "4", "workspace.select", json!({}));
    assert_eq!(error_code(&no_path).as_deref(), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn seeded_cohort_analytics_are_consistent() {
    let workspace = temp_dir("cohortd-analytics");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(&mut stdin, &mut reader, "2", "cohort.seed", json!({}));

    let dept = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "analytics.department",
        json!({ "semester": 1 }),
    );
    assert_eq!(dept["totalStudents"], 50);
    let subject_data = dept["subjectData"].as_array().expect("subjectData");
    let codes: Vec<&str> = subject_data.iter().filter_map(|d| d["code"].as_str()).collect();
    assert_eq!(codes, vec!["CS301", "CS302", "CS303", "CS304", "CS305"]);
    let dept_avg = dept["deptAvgSGPA"].as_f64().expect("deptAvgSGPA");
    assert!(dept_avg > 0.0 && dept_avg <= 10.0);
    let weak: Vec<&str> = dept["weakSubjects"]
        .as_array()
        .expect("weakSubjects")
        .iter()
        .filter_map(|d| d["code"].as_str())
        .collect();
    for d in subject_data {
        let fail = d["failPercent"].as_f64().expect("failPercent");
        let code = d["code"].as_str().expect("code");
        assert_eq!(weak.contains(&code), fail > 20.0, "{code}");
    }

    let subject = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "analytics.subject",
        json!({ "code": "CS302", "semester": 1 }),
    );
    assert_eq!(subject["name"], "Computer Networks");
    assert_eq!(subject["faculty"]["id"], "f2");
    assert_eq!(subject["total"], 50);
    assert_eq!(subject["records"].as_array().map(|r| r.len()), Some(50));
    let same = subject_data
        .iter()
        .find(|d| d["code"] == "CS302")
        .expect("CS302 summary");
    assert_eq!(subject["failPercent"], same["failPercent"]);
    assert_eq!(subject["avg"], same["avg"]);

    let missing = request(
        &mut stdin,
        &mut reader,
        "5",
        "analytics.subject",
        json!({ "code": "CS999", "semester": 1 }),
    );
    assert_eq!(error_code(&missing).as_deref(), Some("not_found"));

    let top = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "analytics.topStudents",
        json!({ "n": 5 }),
    );
    let cgpas: Vec<f64> = top["students"]
        .as_array()
        .expect("students")
        .iter()
        .filter_map(|s| s["cgpa"].as_f64())
        .collect();
    assert_eq!(cgpas.len(), 5);
    assert!(cgpas.windows(2).all(|w| w[0] >= w[1]));

    let toppers = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "analytics.topInSubject",
        json!({ "code": "CS301", "semester": 2 }),
    );
    let marks: Vec<i64> = toppers["students"]
        .as_array()
        .expect("students")
        .iter()
        .filter_map(|s| s["marks"].as_i64())
        .collect();
    assert_eq!(marks.len(), 3);
    assert!(marks.windows(2).all(|w| w[0] >= w[1]));

    let alerts = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "analytics.alerts",
        json!({ "semester": 1 }),
    );
    for s in alerts["atRisk"].as_array().expect("atRisk") {
        assert!(s["cgpa"].as_f64().expect("cgpa") < 5.0);
        // A CGPA below 5 needs at least one F, which is always weak.
        assert!(!s["weakSubjects"].as_array().expect("weakSubjects").is_empty());
    }
    for d in alerts["attendanceDefaulters"].as_array().expect("attendanceDefaulters") {
        assert!(!d["ineligibleSubjects"].as_array().expect("codes").is_empty());
    }
    assert_eq!(alerts["criticalSubjects"], dept["weakSubjects"]);
    assert_eq!(alerts["overallPassPercent"], dept["overallPassPercent"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&workspace);
}

#[test]
fn export_csv_follows_workspace_catalog() {
    let workspace = temp_dir("cohortd-export");
    let catalog = json!({
        "subjects": [
            { "code": "MA201", "name": "Discrete Mathematics", "facultyId": "f7", "credits": 3 },
            { "code": "CS310", "name": "Compiler Design", "facultyId": "f8", "credits": 4 },
        ],
        "faculty": [
            {
                "id": "f7",
                "name": "Lakshmi Rao",
                "email": "lakshmi@vitfaculty.ac.in",
                "subjectCode": "MA201",
                "subjectName": "Discrete Mathematics",
            },
            {
                "id": "f8",
                "name": "Vikram Iyer",
                "email": "vikram@vitfaculty.ac.in",
                "subjectCode": "CS310",
                "subjectName": "Compiler Design",
            },
        ],
    });
    std::fs::write(workspace.join("catalog.json"), catalog.to_string()).expect("write catalog");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(selected["catalogSource"], "file");

    let got = request_ok(&mut stdin, &mut reader, "2", "catalog.get", json!({}));
    assert_eq!(got["subjects"][1]["code"], "CS310");
    assert!(got["faculty"][0].get("password").is_none());

    request_ok(&mut stdin, &mut reader, "3", "cohort.seed", json!({}));

    let out_path = workspace.join("exports").join("sem2.csv");
    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "exchange.exportCsv",
        json!({ "semester": 2, "outPath": out_path.to_string_lossy() }),
    );
    assert_eq!(exported["rowsExported"], 50);

    let text = std::fs::read_to_string(&out_path).expect("read csv");
    assert_eq!(exported["csv"], text.as_str());
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 51);
    assert_eq!(
        lines[0],
        "Reg No,Name,CGPA,MA201 Grade,MA201 Marks,MA201 Att%,CS310 Grade,CS310 Marks,CS310 Att%,SGPA,Rank"
    );
    assert!(lines[1].starts_with("21BCE1001,"));
    assert!(!text.ends_with('\n'));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&workspace);
}

#[test]
fn invalid_workspace_catalog_is_rejected() {
    let workspace = temp_dir("cohortd-bad-catalog");
    std::fs::write(workspace.join("catalog.json"), "{\"subjects\": [], \"faculty\": []}")
        .expect("write catalog");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(error_code(&resp).as_deref(), Some("bad_catalog"));
    assert!(resp["error"]["details"]["path"]
        .as_str()
        .expect("path")
        .ends_with("catalog.json"));

    let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
    assert!(health["workspacePath"].is_null());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&workspace);
}
