/// Database row types — these map directly to SQLite rows.
/// Distinct from the savvy-types wire models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password_hash: String,
}

pub struct TransactionRow {
    pub id: String,
    pub user_id: String,
    pub contributor_name: String,
    pub amount: i64,
    pub kind: String,
    /// RFC 3339 UTC with millisecond precision; the fixed format keeps
    /// lexicographic and chronological order identical.
    pub date: String,
    pub note: Option<String>,
}

pub struct PushSubscriptionRow {
    pub id: i64,
    pub user_id: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}
