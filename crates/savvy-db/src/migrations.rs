use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            username       TEXT NOT NULL UNIQUE,
            password_hash  TEXT NOT NULL,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Append-only shared ledger. user_id is a soft reference: deleting a
        -- user must not cascade into the ledger.
        CREATE TABLE IF NOT EXISTS transactions (
            id                TEXT PRIMARY KEY,
            user_id           TEXT NOT NULL,
            contributor_name  TEXT NOT NULL,
            amount            INTEGER NOT NULL,
            type              TEXT NOT NULL,
            date              TEXT NOT NULL,
            note              TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_date
            ON transactions(date DESC, id);

        -- One row per device endpoint. The UNIQUE constraint serializes
        -- concurrent re-subscriptions of the same endpoint.
        CREATE TABLE IF NOT EXISTS push_subscriptions (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id   TEXT NOT NULL,
            endpoint  TEXT NOT NULL UNIQUE,
            p256dh    TEXT NOT NULL,
            auth      TEXT NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
