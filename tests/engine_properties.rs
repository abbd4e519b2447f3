use cohortd::analytics::{department_overview, subject_analytics, WEAK_FAIL_PERCENT};
use cohortd::calc::{compute_cgpa, compute_sgpa, derive_cohort};
use cohortd::catalog::Catalog;
use cohortd::model::{Cohort, EditField, Grade, Semester, Student, SubjectEdit, SubjectRecord};
use cohortd::ranking::{attach_ranks, compute_ranks};
use cohortd::recompute::{apply_edit, EditStatus};
use cohortd::seed::build_cohort;
use std::collections::BTreeMap;

fn raw(code: &str, internal: i64, external: i64, attendance: i64) -> SubjectRecord {
    SubjectRecord {
        code: code.to_string(),
        name: code.to_string(),
        faculty_id: "f1".to_string(),
        credits: 4,
        internal_marks: internal,
        external_marks: external,
        total_marks: 0,
        attendance,
        grade: Grade::F,
        grade_point: 0,
        eligible: false,
    }
}

fn student(id: &str, name: &str, sem1: Vec<SubjectRecord>, sem2: Vec<SubjectRecord>) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        reg_no: format!("21BCE{id}"),
        email: format!("{id}@vitstudent.ac.in"),
        password: String::new(),
        semesters: vec![
            Semester {
                semester_number: 1,
                subjects: sem1,
                sgpa: 0.0,
            },
            Semester {
                semester_number: 2,
                subjects: sem2,
                sgpa: 0.0,
            },
        ],
        cgpa: 0.0,
        rank: 0,
        rank_by_sem: BTreeMap::new(),
        weak_subjects: Vec::new(),
    }
}

fn scenario_cohort() -> Cohort {
    derive_cohort(vec![
        student(
            "s1",
            "Kiran Yadav",
            vec![raw("CS301", 20, 25, 80), raw("CS302", 30, 45, 85)],
            vec![raw("CS301", 30, 45, 85), raw("CS302", 30, 45, 85)],
        ),
        student(
            "s2",
            "Esha Reddy",
            vec![raw("CS301", 28, 42, 90), raw("CS302", 30, 45, 85)],
            vec![raw("CS301", 30, 45, 85), raw("CS302", 30, 45, 85)],
        ),
        student(
            "s3",
            "Arjun Nair",
            vec![raw("CS301", 35, 50, 90), raw("CS302", 30, 48, 90)],
            vec![raw("CS301", 30, 45, 85), raw("CS302", 30, 45, 85)],
        ),
    ])
}

fn edit(student_id: &str, code: &str, field: EditField, value: i64) -> SubjectEdit {
    SubjectEdit {
        student_id: student_id.to_string(),
        semester_number: 1,
        code: code.to_string(),
        field,
        value,
    }
}

#[test]
fn seeded_ranks_are_a_gapless_permutation_ordered_by_sgpa() {
    let cohort = build_cohort(&Catalog::default());
    for semester in [1, 2] {
        let ranks = compute_ranks(&cohort, semester);
        let mut seen: Vec<i64> = ranks.iter().map(|r| r.rank).collect();
        seen.sort_unstable();
        assert_eq!(seen, (1..=cohort.len() as i64).collect::<Vec<_>>());

        for a in &ranks {
            for b in &ranks {
                if a.sgpa > b.sgpa {
                    assert!(a.rank < b.rank, "{} vs {}", a.id, b.id);
                }
                if a.sgpa == b.sgpa && a.name < b.name {
                    assert!(a.rank < b.rank, "tie {} vs {}", a.id, b.id);
                }
            }
        }
    }
}

#[test]
fn attach_ranks_is_idempotent_on_seeded_cohort() {
    let cohort = build_cohort(&Catalog::default());
    let once = attach_ranks(&cohort);
    assert_eq!(attach_ranks(&once), once);
    for s in &once {
        assert_eq!(Some(&s.rank), s.rank_by_sem.get(&1));
        assert!(s.rank_by_sem.contains_key(&2));
    }
}

#[test]
fn derived_fields_match_derivation_functions() {
    let cohort = build_cohort(&Catalog::default());
    for s in &cohort {
        for sem in &s.semesters {
            assert_eq!(sem.sgpa, compute_sgpa(&sem.subjects));
        }
        assert_eq!(s.cgpa, compute_cgpa(&s.semesters));
    }
}

#[test]
fn aggregation_ignores_semester_and_subject_order() {
    let cohort = build_cohort(&Catalog::default());
    let s = &cohort[7];
    let mut reversed = s.semesters.clone();
    reversed.reverse();
    for sem in &mut reversed {
        sem.subjects.reverse();
        assert_eq!(compute_sgpa(&sem.subjects), sem.sgpa);
    }
    assert_eq!(compute_cgpa(&reversed), s.cgpa);
}

#[test]
fn unknown_student_edit_is_a_no_op() {
    let cohort = build_cohort(&Catalog::default());
    let out = apply_edit(&cohort, &edit("s999", "CS301", EditField::Attendance, 10));
    assert_eq!(out.status, EditStatus::StudentNotFound);
    assert_eq!(out.cohort, cohort);
}

#[test]
fn edit_touches_only_the_target_students_subject_data() {
    let cohort = build_cohort(&Catalog::default());
    let target = &cohort[40];
    let current = target.semesters[0].subjects[2].external_marks;
    let new_value = if current >= 55 { 10 } else { 60 };
    let out = apply_edit(
        &cohort,
        &edit(&target.id, &target.semesters[0].subjects[2].code, EditField::ExternalMarks, new_value),
    );
    assert_eq!(out.status, EditStatus::Applied);
    for (before, after) in cohort.iter().zip(out.cohort.iter()) {
        if before.id == target.id {
            assert_ne!(before.semesters, after.semesters);
            continue;
        }
        assert_eq!(before.semesters, after.semesters);
        assert_eq!(before.cgpa, after.cgpa);
        assert_eq!(before.weak_subjects, after.weak_subjects);
    }
}

#[test]
fn passing_scenario_moves_subject_out_of_weak_list_and_reranks() {
    let cohort = scenario_cohort();
    let s1 = &cohort[0];
    let cs301 = s1.subject(1, "CS301").expect("CS301");
    assert_eq!(cs301.total_marks, 45);
    assert_eq!(cs301.grade, Grade::C);
    assert_eq!(cs301.grade_point, 5);
    assert!(cs301.eligible);
    assert!(s1.weak_subjects.contains(&"CS301".to_string()));
    assert_eq!(s1.rank, 3);

    let out = apply_edit(&cohort, &edit("s1", "CS301", EditField::ExternalMarks, 45));
    let after = &out.cohort[0];
    let cs301 = after.subject(1, "CS301").expect("CS301");
    assert_eq!(cs301.total_marks, 65);
    assert_eq!(cs301.grade, Grade::BPlus);
    assert_eq!(cs301.grade_point, 7);
    assert!(!after.weak_subjects.contains(&"CS301".to_string()));
    assert!(after.sgpa(1) > s1.sgpa(1));
    assert!(after.cgpa > s1.cgpa);

    // 7.5 ties s2; "Esha Reddy" sorts first.
    assert_eq!(out.cohort[1].sgpa(1), 7.5);
    assert_eq!(after.sgpa(1), 7.5);
    assert_eq!(out.cohort[2].rank, 1);
    assert_eq!(out.cohort[1].rank, 2);
    assert_eq!(after.rank, 3);

    // 85 -> A+, 8.5 ties s3 and overtakes s2.
    let out = apply_edit(&out.cohort, &edit("s1", "CS301", EditField::InternalMarks, 40));
    assert_eq!(out.cohort[0].sgpa(1), 8.5);
    assert_eq!(out.cohort[2].rank, 1);
    assert_eq!(out.cohort[0].rank, 2);
    assert_eq!(out.cohort[1].rank, 3);
    assert_eq!(out.previous, Some(20));
}

#[test]
fn attendance_edit_forces_fail_and_weak_flag() {
    let cohort = scenario_cohort();
    let out = apply_edit(&cohort, &edit("s3", "CS301", EditField::Attendance, 70));
    let s3 = &out.cohort[2];
    let cs301 = s3.subject(1, "CS301").expect("CS301");
    assert_eq!(cs301.total_marks, 85);
    assert_eq!(cs301.grade, Grade::F);
    assert_eq!(cs301.grade_point, 0);
    assert!(!cs301.eligible);
    assert!(s3.weak_subjects.contains(&"CS301".to_string()));
}

#[test]
fn department_weak_subjects_match_subject_analytics() {
    let catalog = Catalog::default();
    let cohort = build_cohort(&catalog);
    for semester in [1, 2] {
        let overview = department_overview(&cohort, &catalog, semester);
        let expected: Vec<String> = catalog
            .subjects
            .iter()
            .filter(|def| subject_analytics(&cohort, &def.code, semester).fail_percent > WEAK_FAIL_PERCENT)
            .map(|def| def.code.clone())
            .collect();
        let actual: Vec<String> = overview.weak_subjects.iter().map(|w| w.code.clone()).collect();
        assert_eq!(actual, expected);
        assert_eq!(overview.total_students, 50);
        for d in &overview.subject_data {
            assert_eq!(d.analytics.total, 50);
            assert_eq!(d.analytics.passes + d.analytics.fails, d.analytics.total);
            let dist: usize = d.analytics.grade_distrib.iter().map(|g| g.count).sum();
            assert_eq!(dist, 50);
        }
    }
}
