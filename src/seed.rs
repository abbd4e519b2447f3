use crate::calc::derive_cohort;
use crate::catalog::Catalog;
use crate::model::{Cohort, Grade, Semester, Student, SubjectRecord};
use std::collections::BTreeMap;

const NAMES: [&str; 50] = [
    "Aarav Sharma", "Aditya Verma", "Akash Singh", "Amit Kumar", "Ananya Rao",
    "Arjun Nair", "Aryan Gupta", "Ashwin Pillai", "Bhavya Mehta", "Chetan Joshi",
    "Deepak Patel", "Dhruv Agarwal", "Divya Krishnan", "Esha Reddy", "Farhan Khan",
    "Gaurav Malhotra", "Harini Subramanian", "Harsh Pandey", "Ishaan Bose", "Jatin Tiwari",
    "Kavitha Venkatesh", "Keerthana Mohan", "Kiran Yadav", "Kritika Saxena", "Lakshmi Narayanan",
    "Manoj Srinivasan", "Meera Iyer", "Mihir Shah", "Nandita Rao", "Naveen Choudhary",
    "Neha Jain", "Nikita Banerjee", "Nikhil Deshpande", "Pallavi Mishra", "Pratheek Nair",
    "Priya Subramaniam", "Rajesh Babu", "Rakesh Chandra", "Ravi Shankar", "Rohit Menon",
    "Sahana Krishnamurthy", "Sandeep Patil", "Sanjana Hegde", "Siddharth Kulkarni", "Sneha Ramachandran",
    "Supriya Chatterjee", "Tanmay Goswami", "Uma Maheshwari", "Varun Nambiar", "Vishal Acharya",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    High,
    Avg,
    Risk,
    Fail,
}

struct TierRange {
    internal: (i64, i64),
    external: (i64, i64),
    attendance: (i64, i64),
}

impl Tier {
    /// 5 high, 30 average, 10 at-risk, 5 failing.
    fn for_index(i: usize) -> Tier {
        match i {
            0..=4 => Tier::High,
            5..=34 => Tier::Avg,
            35..=44 => Tier::Risk,
            _ => Tier::Fail,
        }
    }

    fn range(self) -> TierRange {
        match self {
            Tier::High => TierRange {
                internal: (30, 40),
                external: (50, 60),
                attendance: (85, 98),
            },
            Tier::Avg => TierRange {
                internal: (19, 34),
                external: (32, 52),
                attendance: (76, 93),
            },
            Tier::Risk => TierRange {
                internal: (12, 24),
                external: (20, 38),
                attendance: (66, 84),
            },
            Tier::Fail => TierRange {
                internal: (5, 18),
                external: (10, 28),
                attendance: (55, 78),
            },
        }
    }
}

/// Linear-congruential generator: `s' = (1664525*s + 1013904223) mod 2^32`.
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in [0, 1].
    pub fn next_f64(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        f64::from(self.state) / f64::from(u32::MAX)
    }

    /// Integer in [min, max], rounding half up.
    pub fn int_in(&mut self, min: i64, max: i64) -> i64 {
        let x = self.next_f64() * ((max - min) as f64) + (min as f64);
        (x + 0.5).floor() as i64
    }
}

fn make_semester(rng: &mut Lcg, catalog: &Catalog, tier: Tier, semester_number: i64) -> Semester {
    let r = tier.range();
    let subjects = catalog
        .subjects
        .iter()
        .map(|def| {
            let internal = rng.int_in(r.internal.0, r.internal.1);
            let external = rng.int_in(r.external.0, r.external.1);
            let mut attendance = rng.int_in(r.attendance.0, r.attendance.1);
            // Roughly 8% of records are attendance defaulters.
            if rng.next_f64() < 0.08 {
                attendance = rng.int_in(55, 74);
            }
            SubjectRecord {
                code: def.code.clone(),
                name: def.name.clone(),
                faculty_id: def.faculty_id.clone(),
                credits: def.credits,
                internal_marks: internal,
                external_marks: external,
                total_marks: 0,
                attendance,
                grade: Grade::F,
                grade_point: 0,
                eligible: false,
            }
        })
        .collect();
    Semester {
        semester_number,
        subjects,
        sgpa: 0.0,
    }
}

/// Deterministic demo cohort in steady state.
pub fn build_cohort(catalog: &Catalog) -> Cohort {
    let students = NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let tier = Tier::for_index(i);
            let reg_no = format!("21BCE{:04}", 1001 + i);
            let idx = i as u32;
            let sem1 = make_semester(&mut Lcg::new(idx * 9973 + 1_234_567), catalog, tier, 1);
            let sem2 = make_semester(&mut Lcg::new(idx * 7919 + 7_654_321), catalog, tier, 2);
            Student {
                id: format!("s{}", i + 1),
                name: name.to_string(),
                email: format!("{reg_no}@vitstudent.ac.in"),
                password: reg_no[reg_no.len() - 4..].to_string(),
                reg_no,
                semesters: vec![sem1, sem2],
                cgpa: 0.0,
                rank: 0,
                rank_by_sem: BTreeMap::new(),
                weak_subjects: Vec::new(),
            }
        })
        .collect();
    derive_cohort(students)
}
