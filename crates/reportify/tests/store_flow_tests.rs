//! End-to-end store flows against a file-backed database.

mod common;

use common::*;
use reportify::db::{evaluation_repo, guidance_repo, report_repo, student_repo, supervisor_repo};
use reportify::model::{parse_date, DailyReportPatch, SupervisorFields};
use reportify::tracking::{self, status};

#[test]
fn test_student_lifecycle_with_reports_and_evaluation() {
    let harness = TestHarness::new();
    let db = &harness.db;

    let fields = StudentBuilder::new("budi@student.ac.id").build();
    let created = student_repo::create_or_fetch(db, &fields).unwrap();
    assert!(created.is_created());

    let again = student_repo::create_or_fetch(db, &fields).unwrap();
    assert!(!again.is_created());
    assert_eq!(again.as_inner().id, created.as_inner().id);

    let first = report_repo::create_for_student(
        db,
        "budi@student.ac.id",
        &daily_report("2024-01-10", &["Rapat kickoff"]),
    )
    .unwrap()
    .expect("student exists");
    let second = report_repo::create_for_student(
        db,
        "budi@student.ac.id",
        &daily_report("2024-01-11", &["Desain basis data", "Coding"]),
    )
    .unwrap()
    .unwrap();

    let profile = student_repo::find_by_email(db, "budi@student.ac.id")
        .unwrap()
        .unwrap();
    let ids: Vec<_> = profile.reports.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

    evaluation_repo::insert(db, &evaluation(&first.id, status::ACCEPTED)).unwrap();

    let report_ids: Vec<String> = profile.reports.iter().map(|r| r.id.clone()).collect();
    let evaluations = evaluation_repo::find_by_reports(db, &report_ids).unwrap();
    let rows = tracking::report_rows(&profile.reports, &evaluations);

    assert_eq!(rows[0].status, status::ACCEPTED);
    assert!(!rows[0].editable);
    assert_eq!(rows[1].title, "Desain basis data");
    assert_eq!(rows[1].status, status::NOT_EVALUATED);
    assert!(rows[1].editable);
}

#[test]
fn test_report_for_unknown_student_writes_nothing() {
    let harness = TestHarness::new();

    let result = report_repo::create_for_student(
        &harness.db,
        "ghost@student.ac.id",
        &daily_report("2024-01-10", &["Rapat"]),
    )
    .unwrap();

    assert!(result.is_none());
    assert!(report_repo::find_all(&harness.db).unwrap().is_empty());
}

#[test]
fn test_report_patch_keeps_owner_link() {
    let harness = TestHarness::new();
    let db = &harness.db;
    student_repo::create_or_fetch(db, &StudentBuilder::new("ani@student.ac.id").build()).unwrap();
    let report = report_repo::create_for_student(
        db,
        "ani@student.ac.id",
        &daily_report("2024-02-01", &["Rapat"]),
    )
    .unwrap()
    .unwrap();

    let patch = DailyReportPatch {
        tanggal: parse_date("2024-02-02"),
        agenda: Some(vec![agenda_item("Revisi"), agenda_item("Testing")]),
    };
    let updated = report_repo::update(db, &report.id, &patch).unwrap().unwrap();
    assert_eq!(updated.agenda.len(), 2);

    assert_eq!(
        report_repo::owner_email(db, &report.id).unwrap().as_deref(),
        Some("ani@student.ac.id")
    );
    let reports = report_repo::find_by_student(db, "ani@student.ac.id")
        .unwrap()
        .unwrap();
    assert_eq!(reports[0].agenda[0].judul_agenda, "Revisi");
}

#[test]
fn test_data_survives_reopen() {
    let harness = TestHarness::new();
    student_repo::create_or_fetch(&harness.db, &StudentBuilder::new("c@student.ac.id").build())
        .unwrap();
    guidance_repo::create_for_student(&harness.db, "c@student.ac.id", &guidance("pending"))
        .unwrap()
        .unwrap();

    let reopened = harness.reopen();
    let profile = student_repo::find_by_email(&reopened, "c@student.ac.id")
        .unwrap()
        .unwrap();
    assert_eq!(profile.bimbingan.len(), 1);
    assert_eq!(profile.bimbingan[0].status.as_deref(), Some("pending"));
}

#[test]
fn test_supervisor_sees_assigned_students() {
    let harness = TestHarness::new();
    let db = &harness.db;

    supervisor_repo::create_or_fetch(
        db,
        &SupervisorFields {
            email: "joko@maju.co.id".to_string(),
            nip: "19800101".to_string(),
            nama: "Pak Joko".to_string(),
            instansi: "PT Maju Jaya".to_string(),
            jabatan_instansi: None,
        },
    )
    .unwrap();

    for (email, supervisor) in [
        ("a@student.ac.id", "Pak Joko"),
        ("b@student.ac.id", "Bu Sari"),
        ("c@student.ac.id", "Pak Joko"),
    ] {
        let fields = StudentBuilder::new(email).supervisor(supervisor).build();
        student_repo::create_or_fetch(db, &fields).unwrap();
    }

    let supervisor = supervisor_repo::find_by_email(db, "joko@maju.co.id")
        .unwrap()
        .unwrap();
    let students = student_repo::find_by_supervisor(db, &supervisor.nama).unwrap();
    let emails: Vec<_> = students.iter().map(|s| s.email.as_str()).collect();
    assert_eq!(emails, vec!["a@student.ac.id", "c@student.ac.id"]);
}

#[test]
fn test_statistics_over_stored_students() {
    let harness = TestHarness::new();
    let db = &harness.db;

    let students = [
        StudentBuilder::new("a@student.ac.id")
            .nim("12210001")
            .advisor("Bu Rina")
            .period("2024-01-01", Some("2024-03-01")),
        StudentBuilder::new("b@student.ac.id")
            .nim("12220002")
            .advisor("Pak Dedi")
            .period("2023-01-01", Some("2023-03-01")),
        StudentBuilder::new("c@student.ac.id")
            .nim("12210003")
            .advisor("Bu Rina")
            .period("2024-06-01", Some("2024-08-01")),
    ];
    for builder in students {
        student_repo::create_or_fetch(db, &builder.build()).unwrap();
    }
    guidance_repo::create_for_student(db, "a@student.ac.id", &guidance("pending"))
        .unwrap()
        .unwrap();
    guidance_repo::create_for_student(db, "a@student.ac.id", &guidance("selesai"))
        .unwrap()
        .unwrap();

    let all = student_repo::find_all(db).unwrap();
    let stats = tracking::compute_statistics(&all, parse_date("2024-02-01").unwrap());

    assert_eq!(stats.total_mahasiswa, 3);
    assert_eq!(stats.per_dosen[0].dosen_pembimbing, "Bu Rina");
    assert_eq!(stats.per_dosen[0].jumlah, 2);
    assert_eq!(stats.status_progres.completed, 1);
    assert_eq!(stats.status_progres.in_progress, 1);
    assert_eq!(stats.status_progres.pending, 1);
    assert_eq!(stats.bimbingan_pending, 1);
}
