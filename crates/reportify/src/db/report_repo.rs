//! Daily report repository: operations on the `daily_reports` table.
//!
//! Agenda items are stored as a JSON array in the `agenda` column.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    decode_time, encode_time, new_id, now_timestamp, student_repo, Database, DatabaseError,
};
use crate::model::{DailyReport, DailyReportPatch, NewDailyReport};

struct ReportRow {
    id: String,
    tanggal: String,
    agenda: String,
}

impl ReportRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            tanggal: row.get("tanggal")?,
            agenda: row.get("agenda")?,
        })
    }

    fn into_report(self) -> Result<DailyReport, DatabaseError> {
        Ok(DailyReport {
            id: self.id,
            tanggal: decode_time(&self.tanggal)?,
            agenda: serde_json::from_str(&self.agenda)?,
        })
    }
}

fn collect(rows: Vec<ReportRow>) -> Result<Vec<DailyReport>, DatabaseError> {
    rows.into_iter().map(ReportRow::into_report).collect()
}

pub(crate) fn load(conn: &Connection, id: &str) -> Result<Option<DailyReport>, DatabaseError> {
    conn.query_row(
        "SELECT id, tanggal, agenda FROM daily_reports WHERE id = ?1",
        params![id],
        ReportRow::from_row,
    )
    .optional()?
    .map(ReportRow::into_report)
    .transpose()
}

/// Reports linked to a student, in the order they were added.
pub(crate) fn for_student(
    conn: &Connection,
    student_id: &str,
) -> Result<Vec<DailyReport>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.tanggal, r.agenda FROM daily_reports r
         JOIN student_reports l ON l.report_id = r.id
         WHERE l.student_id = ?1
         ORDER BY l.position",
    )?;
    let rows = stmt
        .query_map(params![student_id], ReportRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    collect(rows)
}

/// Creates a report and appends it to the student's report list in one
/// transaction. Returns `None` (and writes nothing) when no student profile
/// exists for `email`.
pub fn create_for_student(
    db: &Database,
    email: &str,
    new: &NewDailyReport,
) -> Result<Option<DailyReport>, DatabaseError> {
    let _span = tracing::info_span!("store.daily_report.create").entered();

    db.with_tx(|tx| {
        let Some(student_id) = student_repo::id_for_email(tx, email)? else {
            return Ok(None);
        };

        let report = DailyReport {
            id: new_id(),
            tanggal: new.tanggal,
            agenda: new.agenda.clone(),
        };
        let now = now_timestamp();
        tx.execute(
            "INSERT INTO daily_reports (id, tanggal, agenda, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                report.id,
                encode_time(&report.tanggal),
                serde_json::to_string(&report.agenda)?,
                now,
            ],
        )?;
        student_repo::link_report(tx, &student_id, &report.id)?;

        log::info!("Saved daily report {} for {}", report.id, email);
        Ok(Some(report))
    })
}

pub fn find_all(db: &Database) -> Result<Vec<DailyReport>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, tanggal, agenda FROM daily_reports ORDER BY created_at, rowid",
        )?;
        let rows = stmt
            .query_map([], ReportRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        collect(rows)
    })
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<DailyReport>, DatabaseError> {
    db.with_conn(|conn| load(conn, id))
}

/// Reports of the student with `email`, or `None` if there is no such
/// student.
pub fn find_by_student(
    db: &Database,
    email: &str,
) -> Result<Option<Vec<DailyReport>>, DatabaseError> {
    db.with_conn(|conn| match student_repo::id_for_email(conn, email)? {
        Some(student_id) => for_student(conn, &student_id).map(Some),
        None => Ok(None),
    })
}

/// Email of the student whose list holds `report_id`.
pub fn owner_email(db: &Database, report_id: &str) -> Result<Option<String>, DatabaseError> {
    db.with_conn(|conn| {
        Ok(conn
            .query_row(
                "SELECT s.email FROM students s
                 JOIN student_reports l ON l.student_id = s.id
                 WHERE l.report_id = ?1",
                params![report_id],
                |r| r.get(0),
            )
            .optional()?)
    })
}

/// Applies the fields present in `patch`. Returns the updated report, or
/// `None` if `id` is unknown.
pub fn update(
    db: &Database,
    id: &str,
    patch: &DailyReportPatch,
) -> Result<Option<DailyReport>, DatabaseError> {
    db.with_tx(|tx| {
        let Some(mut report) = load(tx, id)? else {
            return Ok(None);
        };
        if let Some(tanggal) = patch.tanggal {
            report.tanggal = tanggal;
        }
        if let Some(agenda) = &patch.agenda {
            report.agenda = agenda.clone();
        }

        tx.execute(
            "UPDATE daily_reports SET tanggal = ?2, agenda = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                report.id,
                encode_time(&report.tanggal),
                serde_json::to_string(&report.agenda)?,
                now_timestamp(),
            ],
        )?;
        Ok(Some(report))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::student_repo;
    use crate::model::{parse_date, AgendaItem, StudentFields};

    fn seed_student(db: &Database, email: &str) {
        student_repo::create_or_fetch(
            db,
            &StudentFields {
                email: email.to_string(),
                nim: "12250111".to_string(),
                nama: "Budi".to_string(),
                judul_kp: "Sistem".to_string(),
                instansi: "PT Maju".to_string(),
                pembimbing_instansi: "Pak Joko".to_string(),
                dosen_pembimbing: "Bu Rina".to_string(),
                mulai_kp: parse_date("2024-01-01").unwrap(),
                selesai_kp: None,
            },
        )
        .unwrap();
    }

    fn item(title: &str) -> AgendaItem {
        AgendaItem {
            waktu_mulai: "08:00".to_string(),
            waktu_selesai: "10:00".to_string(),
            judul_agenda: title.to_string(),
            deskripsi_agenda: "desc".to_string(),
            files: vec!["https://cdn.example.com/a.png".to_string()],
        }
    }

    fn new_report(date: &str, titles: &[&str]) -> NewDailyReport {
        NewDailyReport {
            tanggal: parse_date(date).unwrap(),
            agenda: titles.iter().map(|t| item(t)).collect(),
        }
    }

    #[test]
    fn test_create_links_report_to_student() {
        let db = Database::open_in_memory().unwrap();
        seed_student(&db, "b@x.com");

        let report = create_for_student(&db, "b@x.com", &new_report("2024-01-10", &["Rapat"]))
            .unwrap()
            .unwrap();

        let reports = find_by_student(&db, "b@x.com").unwrap().unwrap();
        assert_eq!(reports, vec![report.clone()]);
        assert_eq!(find_by_id(&db, &report.id).unwrap().unwrap().agenda.len(), 1);
        assert_eq!(
            owner_email(&db, &report.id).unwrap().as_deref(),
            Some("b@x.com")
        );
        assert!(owner_email(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_create_for_unknown_student_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let created = create_for_student(&db, "ghost@x.com", &new_report("2024-01-10", &[])).unwrap();
        assert!(created.is_none());
        assert!(find_all(&db).unwrap().is_empty());
        assert!(find_by_student(&db, "ghost@x.com").unwrap().is_none());
    }

    #[test]
    fn test_reports_keep_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        seed_student(&db, "b@x.com");
        for date in ["2024-01-12", "2024-01-10", "2024-01-11"] {
            create_for_student(&db, "b@x.com", &new_report(date, &["x"])).unwrap();
        }

        let dates: Vec<_> = find_by_student(&db, "b@x.com")
            .unwrap()
            .unwrap()
            .iter()
            .map(|r| crate::model::format_date(&r.tanggal))
            .collect();
        assert_eq!(
            dates,
            vec![
                "2024-01-12T00:00:00.000Z",
                "2024-01-10T00:00:00.000Z",
                "2024-01-11T00:00:00.000Z"
            ]
        );
    }

    #[test]
    fn test_update_applies_present_fields_only() {
        let db = Database::open_in_memory().unwrap();
        seed_student(&db, "b@x.com");
        let report = create_for_student(&db, "b@x.com", &new_report("2024-01-10", &["Rapat"]))
            .unwrap()
            .unwrap();

        let patch = DailyReportPatch {
            tanggal: None,
            agenda: Some(vec![item("Coding"), item("Review")]),
        };
        let updated = update(&db, &report.id, &patch).unwrap().unwrap();
        assert_eq!(updated.tanggal, report.tanggal);
        assert_eq!(updated.agenda[0].judul_agenda, "Coding");
        assert_eq!(updated.agenda.len(), 2);

        assert!(update(&db, "missing", &patch).unwrap().is_none());
    }
}
