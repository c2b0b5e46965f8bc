use crate::Database;
use crate::models::{PushSubscriptionRow, TransactionRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, name: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, username, password_hash) VALUES (?1, ?2, ?3, ?4)",
                (id, name, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, "SELECT id, name, username, password_hash FROM users WHERE username = ?1", username)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, "SELECT id, name, username, password_hash FROM users WHERE id = ?1", id)
        })
    }

    pub fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                (password_hash, id),
            )?;
            Ok(())
        })
    }

    // -- Transactions --

    pub fn insert_transaction(&self, row: &TransactionRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO transactions (id, user_id, contributor_name, amount, type, date, note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    row.id,
                    row.user_id,
                    row.contributor_name,
                    row.amount,
                    row.kind,
                    row.date,
                    row.note,
                ],
            )?;
            Ok(())
        })
    }

    /// One user's entries, newest first.
    pub fn transactions_for_user(&self, user_id: &str) -> Result<Vec<TransactionRow>> {
        self.with_conn(|conn| {
            query_transactions(
                conn,
                "SELECT id, user_id, contributor_name, amount, type, date, note
                 FROM transactions
                 WHERE user_id = ?1
                 ORDER BY date DESC, id",
                Some(user_id),
            )
        })
    }

    /// The whole shared ledger, newest first, id as tie-breaker.
    pub fn all_transactions(&self) -> Result<Vec<TransactionRow>> {
        self.with_conn(|conn| {
            query_transactions(
                conn,
                "SELECT id, user_id, contributor_name, amount, type, date, note
                 FROM transactions
                 ORDER BY date DESC, id",
                None,
            )
        })
    }

    // -- Push subscriptions --

    /// Create or refresh a subscription, keyed by endpoint. A colliding
    /// endpoint takes over the row: a device re-subscribing under another
    /// account overwrites user_id and both keys.
    pub fn upsert_push_subscription(&self, user_id: &str, endpoint: &str, p256dh: &str, auth: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(endpoint) DO UPDATE SET
                     user_id = excluded.user_id,
                     p256dh = excluded.p256dh,
                     auth = excluded.auth",
                (user_id, endpoint, p256dh, auth),
            )?;
            Ok(())
        })
    }

    /// Idempotent: deleting an unknown endpoint is a no-op.
    pub fn delete_push_subscription(&self, endpoint: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM push_subscriptions WHERE endpoint = ?1", [endpoint])?;
            Ok(())
        })
    }

    /// Batch delete after a dispatch pass. Returns the number of rows removed;
    /// ids already pruned by a concurrent dispatch simply don't count.
    pub fn delete_push_subscriptions_by_id(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "DELETE FROM push_subscriptions WHERE id IN ({})",
                placeholders.join(", ")
            );

            let params: Vec<&dyn rusqlite::types::ToSql> =
                ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();

            let removed = conn.execute(&sql, params.as_slice())?;
            Ok(removed)
        })
    }

    pub fn list_push_subscriptions(&self) -> Result<Vec<PushSubscriptionRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, user_id, endpoint, p256dh, auth FROM push_subscriptions")?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(PushSubscriptionRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        endpoint: row.get(2)?,
                        p256dh: row.get(3)?,
                        auth: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, sql: &str, key: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(sql)?;

    let row = stmt
        .query_row([key], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                username: row.get(2)?,
                password_hash: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_transactions(conn: &Connection, sql: &str, user_id: Option<&str>) -> Result<Vec<TransactionRow>> {
    let mut stmt = conn.prepare(sql)?;

    let map_row = |row: &rusqlite::Row<'_>| {
        Ok(TransactionRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            contributor_name: row.get(2)?,
            amount: row.get(3)?,
            kind: row.get(4)?,
            date: row.get(5)?,
            note: row.get(6)?,
        })
    };

    let rows = match user_id {
        Some(user_id) => stmt.query_map([user_id], map_row)?.collect::<std::result::Result<Vec<_>, _>>()?,
        None => stmt.query_map([], map_row)?.collect::<std::result::Result<Vec<_>, _>>()?,
    };

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
