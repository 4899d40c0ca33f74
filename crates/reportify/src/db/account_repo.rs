//! Account repository: operations on the `accounts` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{new_id, now_timestamp, Database, DatabaseError, Upserted};
use crate::model::{Account, NewAccount};

struct AccountRow {
    id: String,
    email: String,
    nama: String,
    roles: String,
}

impl AccountRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            nama: row.get("nama")?,
            roles: row.get("roles")?,
        })
    }

    fn into_account(self) -> Result<Account, DatabaseError> {
        Ok(Account {
            id: self.id,
            email: self.email,
            nama: self.nama,
            roles: serde_json::from_str(&self.roles)?,
        })
    }
}

fn find_in(conn: &Connection, email: &str) -> Result<Option<Account>, DatabaseError> {
    conn.query_row(
        "SELECT id, email, nama, roles FROM accounts WHERE email = ?1",
        params![email],
        AccountRow::from_row,
    )
    .optional()?
    .map(AccountRow::into_account)
    .transpose()
}

/// Returns the account for `new.email`, creating it first if needed.
/// An existing account is returned unchanged.
pub fn create_or_fetch(db: &Database, new: &NewAccount) -> Result<Upserted<Account>, DatabaseError> {
    db.with_tx(|tx| {
        if let Some(existing) = find_in(tx, &new.email)? {
            return Ok(Upserted::Existing(existing));
        }

        let account = Account {
            id: new_id(),
            email: new.email.clone(),
            nama: new.nama.clone(),
            roles: new.roles.clone(),
        };
        let now = now_timestamp();
        tx.execute(
            "INSERT INTO accounts (id, email, nama, roles, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                account.id,
                account.email,
                account.nama,
                serde_json::to_string(&account.roles)?,
                now,
            ],
        )?;
        log::info!("Created account for {}", account.email);
        Ok(Upserted::Created(account))
    })
}

pub fn find_by_email(db: &Database, email: &str) -> Result<Option<Account>, DatabaseError> {
    db.with_conn(|conn| find_in(conn, email))
}

/// All accounts holding `role`, oldest first.
pub fn find_by_role(db: &Database, role: &str) -> Result<Vec<Account>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, email, nama, roles FROM accounts
             WHERE EXISTS (SELECT 1 FROM json_each(accounts.roles) WHERE json_each.value = ?1)
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt
            .query_map(params![role], AccountRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(AccountRow::into_account).collect()
    })
}
