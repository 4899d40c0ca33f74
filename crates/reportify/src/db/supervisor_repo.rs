//! Institution supervisor repository: operations on the `supervisors` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{new_id, now_timestamp, Database, DatabaseError, Upserted};
use crate::model::{SupervisorFields, SupervisorProfile};

const COLUMNS: &str = "id, email, nip, nama, instansi, jabatan_instansi";

fn from_row(row: &Row<'_>) -> Result<SupervisorProfile, rusqlite::Error> {
    Ok(SupervisorProfile {
        id: row.get("id")?,
        email: row.get("email")?,
        nip: row.get("nip")?,
        nama: row.get("nama")?,
        instansi: row.get("instansi")?,
        jabatan_instansi: row.get("jabatan_instansi")?,
    })
}

fn find_in(conn: &Connection, email: &str) -> Result<Option<SupervisorProfile>, DatabaseError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM supervisors WHERE email = ?1"),
            params![email],
            from_row,
        )
        .optional()?)
}

pub fn create_or_fetch(
    db: &Database,
    fields: &SupervisorFields,
) -> Result<Upserted<SupervisorProfile>, DatabaseError> {
    db.with_tx(|tx| {
        if let Some(existing) = find_in(tx, &fields.email)? {
            return Ok(Upserted::Existing(existing));
        }

        let profile = SupervisorProfile {
            id: new_id(),
            email: fields.email.clone(),
            nip: fields.nip.clone(),
            nama: fields.nama.clone(),
            instansi: fields.instansi.clone(),
            jabatan_instansi: fields.jabatan_instansi.clone(),
        };
        tx.execute(
            "INSERT INTO supervisors (id, email, nip, nama, instansi, jabatan_instansi,
             created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                profile.id,
                profile.email,
                profile.nip,
                profile.nama,
                profile.instansi,
                profile.jabatan_instansi,
                now_timestamp(),
            ],
        )?;
        log::info!("Created supervisor profile for {}", profile.email);
        Ok(Upserted::Created(profile))
    })
}

pub fn find_by_email(db: &Database, email: &str) -> Result<Option<SupervisorProfile>, DatabaseError> {
    db.with_conn(|conn| find_in(conn, email))
}

/// First profile registered for `instansi`.
pub fn find_by_instansi(
    db: &Database,
    instansi: &str,
) -> Result<Option<SupervisorProfile>, DatabaseError> {
    db.with_conn(|conn| {
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM supervisors WHERE instansi = ?1
                     ORDER BY created_at, rowid LIMIT 1"
                ),
                params![instansi],
                from_row,
            )
            .optional()?)
    })
}

pub fn find_all(db: &Database) -> Result<Vec<SupervisorProfile>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM supervisors ORDER BY created_at, rowid"))?;
        let rows = stmt.query_map([], from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Overwrites every field of the profile keyed by `fields.email`.
/// Returns `None` when no such profile exists.
pub fn update(
    db: &Database,
    fields: &SupervisorFields,
) -> Result<Option<SupervisorProfile>, DatabaseError> {
    db.with_tx(|tx| {
        let changed = tx.execute(
            "UPDATE supervisors SET nip = ?2, nama = ?3, instansi = ?4, jabatan_instansi = ?5,
             updated_at = ?6 WHERE email = ?1",
            params![
                fields.email,
                fields.nip,
                fields.nama,
                fields.instansi,
                fields.jabatan_instansi,
                now_timestamp(),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        find_in(tx, &fields.email)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(email: &str, instansi: &str) -> SupervisorFields {
        SupervisorFields {
            email: email.to_string(),
            nip: "19800101".to_string(),
            nama: "Pak Joko".to_string(),
            instansi: instansi.to_string(),
            jabatan_instansi: None,
        }
    }

    #[test]
    fn test_create_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let first = create_or_fetch(&db, &fields("p@x.com", "PT Maju")).unwrap();
        let second = create_or_fetch(&db, &fields("p@x.com", "PT Lain")).unwrap();
        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(second.into_inner().instansi, "PT Maju");
    }

    #[test]
    fn test_find_by_instansi_returns_first() {
        let db = Database::open_in_memory().unwrap();
        create_or_fetch(&db, &fields("p1@x.com", "PT Maju")).unwrap();
        create_or_fetch(&db, &fields("p2@x.com", "PT Maju")).unwrap();

        let found = find_by_instansi(&db, "PT Maju").unwrap().unwrap();
        assert_eq!(found.email, "p1@x.com");
        assert!(find_by_instansi(&db, "DoesNotExist").unwrap().is_none());
        assert_eq!(find_all(&db).unwrap().len(), 2);
    }

    #[test]
    fn test_update_overwrites_fields() {
        let db = Database::open_in_memory().unwrap();
        create_or_fetch(&db, &fields("p@x.com", "PT Maju")).unwrap();

        let mut changed = fields("p@x.com", "PT Baru");
        changed.jabatan_instansi = Some("Manajer".to_string());
        let updated = update(&db, &changed).unwrap().unwrap();
        assert_eq!(updated.instansi, "PT Baru");
        assert_eq!(updated.jabatan_instansi.as_deref(), Some("Manajer"));

        assert!(update(&db, &fields("ghost@x.com", "X")).unwrap().is_none());
    }
}
