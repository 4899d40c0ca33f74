//! Guidance session repository: operations on the `guidance_sessions` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    decode_time, encode_time, new_id, now_timestamp, student_repo, Database, DatabaseError,
};
use crate::model::{GuidancePatch, GuidanceSession, NewGuidanceSession};

struct GuidanceRow {
    id: String,
    nip: Option<String>,
    tanggal: String,
    komentar: String,
    status: Option<String>,
}

impl GuidanceRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            nip: row.get("nip")?,
            tanggal: row.get("tanggal")?,
            komentar: row.get("komentar")?,
            status: row.get("status")?,
        })
    }

    fn into_session(self) -> Result<GuidanceSession, DatabaseError> {
        Ok(GuidanceSession {
            id: self.id,
            nip: self.nip,
            tanggal: decode_time(&self.tanggal)?,
            komentar: self.komentar,
            status: self.status,
        })
    }
}

fn collect(rows: Vec<GuidanceRow>) -> Result<Vec<GuidanceSession>, DatabaseError> {
    rows.into_iter().map(GuidanceRow::into_session).collect()
}

pub(crate) fn load(conn: &Connection, id: &str) -> Result<Option<GuidanceSession>, DatabaseError> {
    conn.query_row(
        "SELECT id, nip, tanggal, komentar, status FROM guidance_sessions WHERE id = ?1",
        params![id],
        GuidanceRow::from_row,
    )
    .optional()?
    .map(GuidanceRow::into_session)
    .transpose()
}

pub(crate) fn for_student(
    conn: &Connection,
    student_id: &str,
) -> Result<Vec<GuidanceSession>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.nip, g.tanggal, g.komentar, g.status FROM guidance_sessions g
         JOIN student_guidance l ON l.guidance_id = g.id
         WHERE l.student_id = ?1
         ORDER BY l.position",
    )?;
    let rows = stmt
        .query_map(params![student_id], GuidanceRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    collect(rows)
}

/// Creates a session and appends it to the student's guidance list in one
/// transaction. Returns `None` when no student profile exists for
/// `student_email`.
pub fn create_for_student(
    db: &Database,
    student_email: &str,
    new: &NewGuidanceSession,
) -> Result<Option<GuidanceSession>, DatabaseError> {
    let _span = tracing::info_span!("store.guidance.create").entered();

    db.with_tx(|tx| {
        let Some(student_id) = student_repo::id_for_email(tx, student_email)? else {
            return Ok(None);
        };

        let session = GuidanceSession {
            id: new_id(),
            nip: Some(new.nip.clone()),
            tanggal: new.tanggal,
            komentar: new.komentar.clone(),
            status: Some(new.status.clone()),
        };
        tx.execute(
            "INSERT INTO guidance_sessions (id, nip, tanggal, komentar, status, created_at,
             updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                session.id,
                session.nip,
                encode_time(&session.tanggal),
                session.komentar,
                session.status,
                now_timestamp(),
            ],
        )?;
        student_repo::link_guidance(tx, &student_id, &session.id)?;

        log::info!("Saved guidance session {} for {}", session.id, student_email);
        Ok(Some(session))
    })
}

pub fn find_all(db: &Database) -> Result<Vec<GuidanceSession>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, nip, tanggal, komentar, status FROM guidance_sessions
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt
            .query_map([], GuidanceRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        collect(rows)
    })
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<GuidanceSession>, DatabaseError> {
    db.with_conn(|conn| load(conn, id))
}

pub fn update(
    db: &Database,
    id: &str,
    patch: &GuidancePatch,
) -> Result<Option<GuidanceSession>, DatabaseError> {
    db.with_tx(|tx| {
        let Some(mut session) = load(tx, id)? else {
            return Ok(None);
        };
        if let Some(nip) = &patch.nip {
            session.nip = Some(nip.clone());
        }
        if let Some(tanggal) = patch.tanggal {
            session.tanggal = tanggal;
        }
        if let Some(komentar) = &patch.komentar {
            session.komentar = komentar.clone();
        }
        if let Some(status) = &patch.status {
            session.status = Some(status.clone());
        }

        tx.execute(
            "UPDATE guidance_sessions SET nip = ?2, tanggal = ?3, komentar = ?4, status = ?5,
             updated_at = ?6 WHERE id = ?1",
            params![
                session.id,
                session.nip,
                encode_time(&session.tanggal),
                session.komentar,
                session.status,
                now_timestamp(),
            ],
        )?;
        Ok(Some(session))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, StudentFields};

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

    fn new_session(status: &str) -> NewGuidanceSession {
        NewGuidanceSession {
            nip: "19800101".to_string(),
            tanggal: parse_date("2024-02-01").unwrap(),
            komentar: "Lanjutkan bab 2".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_create_links_to_student() {
        let db = Database::open_in_memory().unwrap();
        seed_student(&db, "b@x.com");

        let session = create_for_student(&db, "b@x.com", &new_session("pending"))
            .unwrap()
            .unwrap();

        let linked = db.with_conn(|conn| {
            let id = student_repo::id_for_email(conn, "b@x.com")?.unwrap();
            for_student(conn, &id)
        });
        assert_eq!(linked.unwrap(), vec![session]);
    }

    #[test]
    fn test_create_for_unknown_student_is_rolled_back() {
        let db = Database::open_in_memory().unwrap();
        assert!(create_for_student(&db, "ghost@x.com", &new_session("pending"))
            .unwrap()
            .is_none());
        assert!(find_all(&db).unwrap().is_empty());
    }

    #[test]
    fn test_update_applies_present_fields_only() {
        let db = Database::open_in_memory().unwrap();
        seed_student(&db, "b@x.com");
        let a = create_for_student(&db, "b@x.com", &new_session("pending"))
            .unwrap()
            .unwrap();

        let patch = GuidancePatch {
            status: Some("selesai".to_string()),
            ..Default::default()
        };
        let updated = update(&db, &a.id, &patch).unwrap().unwrap();
        assert_eq!(updated.status.as_deref(), Some("selesai"));
        assert_eq!(updated.komentar, a.komentar);

        assert!(update(&db, "missing", &patch).unwrap().is_none());
        assert!(find_by_id(&db, "missing").unwrap().is_none());
    }
}
