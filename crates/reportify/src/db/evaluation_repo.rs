//! Evaluation repository: operations on the `evaluations` table.
//!
//! `daily_report_id` is a plain string reference. Nothing checks that the
//! report exists; lookups simply compare identifiers.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::{new_id, now_timestamp, Database, DatabaseError};
use crate::model::{Evaluation, EvaluationPatch, NewEvaluation};

const COLUMNS: &str = "id, daily_report_id, nip, komentar, status";

fn from_row(row: &Row<'_>) -> Result<Evaluation, rusqlite::Error> {
    Ok(Evaluation {
        id: row.get("id")?,
        daily_report_id: row.get("daily_report_id")?,
        nip: row.get("nip")?,
        komentar: row.get("komentar")?,
        status: row.get("status")?,
    })
}

fn load(conn: &Connection, id: &str) -> Result<Option<Evaluation>, DatabaseError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM evaluations WHERE id = ?1"),
            params![id],
            from_row,
        )
        .optional()?)
}

pub fn insert(db: &Database, new: &NewEvaluation) -> Result<Evaluation, DatabaseError> {
    let evaluation = Evaluation {
        id: new_id(),
        daily_report_id: new.daily_report_id.clone(),
        nip: new.nip.clone(),
        komentar: new.komentar.clone(),
        status: new.status.clone(),
    };
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO evaluations (id, daily_report_id, nip, komentar, status, created_at,
             updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                evaluation.id,
                evaluation.daily_report_id,
                evaluation.nip,
                evaluation.komentar,
                evaluation.status,
                now_timestamp(),
            ],
        )?;
        Ok(())
    })?;
    log::info!(
        "Saved evaluation {} for report {}",
        evaluation.id,
        evaluation.daily_report_id
    );
    Ok(evaluation)
}

pub fn find_all(db: &Database) -> Result<Vec<Evaluation>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM evaluations ORDER BY created_at, rowid"))?;
        let rows = stmt.query_map([], from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<Evaluation>, DatabaseError> {
    db.with_conn(|conn| load(conn, id))
}

/// Evaluations referencing `report_id`, oldest first.
pub fn find_by_report(db: &Database, report_id: &str) -> Result<Vec<Evaluation>, DatabaseError> {
    find_by_reports(db, &[report_id.to_string()])
}

/// Evaluations referencing any of `report_ids`, oldest first.
pub fn find_by_reports(
    db: &Database,
    report_ids: &[String],
) -> Result<Vec<Evaluation>, DatabaseError> {
    if report_ids.is_empty() {
        return Ok(Vec::new());
    }
    db.with_conn(|conn| {
        let placeholders = (1..=report_ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {COLUMNS} FROM evaluations WHERE daily_report_id IN ({placeholders})
             ORDER BY created_at, rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(report_ids.iter()), from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

pub fn update(
    db: &Database,
    id: &str,
    patch: &EvaluationPatch,
) -> Result<Option<Evaluation>, DatabaseError> {
    db.with_tx(|tx| {
        let Some(mut evaluation) = load(tx, id)? else {
            return Ok(None);
        };
        if let Some(report_id) = &patch.daily_report_id {
            evaluation.daily_report_id = report_id.clone();
        }
        if let Some(nip) = &patch.nip {
            evaluation.nip = nip.clone();
        }
        if let Some(komentar) = &patch.komentar {
            evaluation.komentar = komentar.clone();
        }
        if let Some(status) = &patch.status {
            evaluation.status = status.clone();
        }

        tx.execute(
            "UPDATE evaluations SET daily_report_id = ?2, nip = ?3, komentar = ?4, status = ?5,
             updated_at = ?6 WHERE id = ?1",
            params![
                evaluation.id,
                evaluation.daily_report_id,
                evaluation.nip,
                evaluation.komentar,
                evaluation.status,
                now_timestamp(),
            ],
        )?;
        Ok(Some(evaluation))
    })
}
