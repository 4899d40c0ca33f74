//! Student profile repository: operations on the `students` table and its
//! ordered report and guidance link tables.
//!
//! Every lookup returns profiles with `reports` and `bimbingan` resolved.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    decode_time, encode_time, guidance_repo, new_id, now_timestamp, report_repo, Database,
    DatabaseError, Upserted,
};
use crate::model::{StudentFields, StudentProfile};

const COLUMNS: &str = "id, email, nim, nama, judul_kp, instansi, pembimbing_instansi, \
                       dosen_pembimbing, mulai_kp, selesai_kp";

struct StudentRow {
    id: String,
    email: String,
    nim: String,
    nama: String,
    judul_kp: String,
    instansi: String,
    pembimbing_instansi: String,
    dosen_pembimbing: String,
    mulai_kp: String,
    selesai_kp: Option<String>,
}

impl StudentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            nim: row.get("nim")?,
            nama: row.get("nama")?,
            judul_kp: row.get("judul_kp")?,
            instansi: row.get("instansi")?,
            pembimbing_instansi: row.get("pembimbing_instansi")?,
            dosen_pembimbing: row.get("dosen_pembimbing")?,
            mulai_kp: row.get("mulai_kp")?,
            selesai_kp: row.get("selesai_kp")?,
        })
    }

    /// Builds the profile and resolves its linked records.
    fn resolve(self, conn: &Connection) -> Result<StudentProfile, DatabaseError> {
        let reports = report_repo::for_student(conn, &self.id)?;
        let bimbingan = guidance_repo::for_student(conn, &self.id)?;
        Ok(StudentProfile {
            mulai_kp: decode_time(&self.mulai_kp)?,
            selesai_kp: self.selesai_kp.as_deref().map(decode_time).transpose()?,
            id: self.id,
            email: self.email,
            nim: self.nim,
            nama: self.nama,
            judul_kp: self.judul_kp,
            instansi: self.instansi,
            pembimbing_instansi: self.pembimbing_instansi,
            dosen_pembimbing: self.dosen_pembimbing,
            reports,
            bimbingan,
        })
    }
}

fn find_in(conn: &Connection, email: &str) -> Result<Option<StudentProfile>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM students WHERE email = ?1"),
        params![email],
        StudentRow::from_row,
    )
    .optional()?
    .map(|row| row.resolve(conn))
    .transpose()
}

fn select_where(
    conn: &Connection,
    condition: &str,
    value: Option<&str>,
) -> Result<Vec<StudentProfile>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM students {condition} ORDER BY created_at, rowid");
    let mut stmt = conn.prepare(&sql)?;
    let rows = match value {
        Some(v) => stmt.query_map(params![v], StudentRow::from_row)?,
        None => stmt.query_map([], StudentRow::from_row)?,
    }
    .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(|row| row.resolve(conn)).collect()
}

pub(crate) fn id_for_email(conn: &Connection, email: &str) -> Result<Option<String>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT id FROM students WHERE email = ?1",
            params![email],
            |r| r.get(0),
        )
        .optional()?)
}

/// Appends `report_id` to the end of the student's report list.
pub(crate) fn link_report(
    conn: &Connection,
    student_id: &str,
    report_id: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO student_reports (student_id, report_id, position)
         VALUES (?1, ?2, (SELECT COALESCE(MAX(position) + 1, 0)
                          FROM student_reports WHERE student_id = ?1))",
        params![student_id, report_id],
    )?;
    Ok(())
}

/// Appends `guidance_id` to the end of the student's guidance list.
pub(crate) fn link_guidance(
    conn: &Connection,
    student_id: &str,
    guidance_id: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO student_guidance (student_id, guidance_id, position)
         VALUES (?1, ?2, (SELECT COALESCE(MAX(position) + 1, 0)
                          FROM student_guidance WHERE student_id = ?1))",
        params![student_id, guidance_id],
    )?;
    Ok(())
}

/// Returns the profile for `fields.email`, creating it first if needed.
/// An existing profile is returned unchanged.
pub fn create_or_fetch(
    db: &Database,
    fields: &StudentFields,
) -> Result<Upserted<StudentProfile>, DatabaseError> {
    db.with_tx(|tx| {
        if let Some(existing) = find_in(tx, &fields.email)? {
            return Ok(Upserted::Existing(existing));
        }

        let id = new_id();
        tx.execute(
            "INSERT INTO students (id, email, nim, nama, judul_kp, instansi, pembimbing_instansi,
             dosen_pembimbing, mulai_kp, selesai_kp, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                id,
                fields.email,
                fields.nim,
                fields.nama,
                fields.judul_kp,
                fields.instansi,
                fields.pembimbing_instansi,
                fields.dosen_pembimbing,
                encode_time(&fields.mulai_kp),
                fields.selesai_kp.as_ref().map(encode_time),
                now_timestamp(),
            ],
        )?;
        log::info!("Created student profile for {}", fields.email);

        let created = find_in(tx, &fields.email)?
            .ok_or_else(|| DatabaseError::NotFound(fields.email.clone()))?;
        Ok(Upserted::Created(created))
    })
}

pub fn find_by_email(db: &Database, email: &str) -> Result<Option<StudentProfile>, DatabaseError> {
    db.with_conn(|conn| find_in(conn, email))
}

/// Students assigned to the institution supervisor named `name`.
pub fn find_by_supervisor(db: &Database, name: &str) -> Result<Vec<StudentProfile>, DatabaseError> {
    db.with_conn(|conn| select_where(conn, "WHERE pembimbing_instansi = ?1", Some(name)))
}

/// Students assigned to the academic advisor named `name`.
pub fn find_by_advisor(db: &Database, name: &str) -> Result<Vec<StudentProfile>, DatabaseError> {
    db.with_conn(|conn| select_where(conn, "WHERE dosen_pembimbing = ?1", Some(name)))
}

pub fn find_all(db: &Database) -> Result<Vec<StudentProfile>, DatabaseError> {
    db.with_conn(|conn| select_where(conn, "", None))
}

/// Overwrites every scalar field of the profile keyed by `fields.email`.
/// Linked reports and guidance sessions are kept. Returns `None` if no
/// profile exists.
pub fn update_profile(
    db: &Database,
    fields: &StudentFields,
) -> Result<Option<StudentProfile>, DatabaseError> {
    db.with_tx(|tx| {
        let changed = tx.execute(
            "UPDATE students SET nim = ?2, nama = ?3, judul_kp = ?4, instansi = ?5,
             pembimbing_instansi = ?6, dosen_pembimbing = ?7, mulai_kp = ?8, selesai_kp = ?9,
             updated_at = ?10
             WHERE email = ?1",
            params![
                fields.email,
                fields.nim,
                fields.nama,
                fields.judul_kp,
                fields.instansi,
                fields.pembimbing_instansi,
                fields.dosen_pembimbing,
                encode_time(&fields.mulai_kp),
                fields.selesai_kp.as_ref().map(encode_time),
                now_timestamp(),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        find_in(tx, &fields.email)
    })
}

/// Appends an existing report to the student's list and returns the
/// refreshed profile, or `None` when the student does not exist.
pub fn add_report(
    db: &Database,
    email: &str,
    report_id: &str,
) -> Result<Option<StudentProfile>, DatabaseError> {
    db.with_tx(|tx| {
        let Some(student_id) = id_for_email(tx, email)? else {
            return Ok(None);
        };
        if report_repo::load(tx, report_id)?.is_none() {
            return Err(DatabaseError::NotFound(format!("DailyReport {report_id}")));
        }
        link_report(tx, &student_id, report_id)?;
        find_in(tx, email)
    })
}

/// Appends an existing guidance session to the student's list and returns
/// the refreshed profile, or `None` when the student does not exist.
pub fn add_guidance(
    db: &Database,
    email: &str,
    guidance_id: &str,
) -> Result<Option<StudentProfile>, DatabaseError> {
    db.with_tx(|tx| {
        let Some(student_id) = id_for_email(tx, email)? else {
            return Ok(None);
        };
        if guidance_repo::load(tx, guidance_id)?.is_none() {
            return Err(DatabaseError::NotFound(format!("Bimbingan {guidance_id}")));
        }
        link_guidance(tx, &student_id, guidance_id)?;
        find_in(tx, email)
    })
}
