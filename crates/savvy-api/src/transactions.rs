use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;
use uuid::Uuid;

use savvy_db::models::TransactionRow;
use savvy_types::api::{CreateTransactionRequest, TransactionsQuery};
use savvy_types::models::{Transaction, TransactionKind};

use crate::auth::AppState;
use crate::error::{ApiError, run_blocking};

const FETCH_FAILED: &str = "Gagal mengambil transaksi";
const INCOMPLETE: &str = "Data transaksi tidak lengkap";

/// Entries are stored under the id's canonical lowercase form; every path
/// that compares against stored ids must normalize the same way, or a client
/// sending the uppercase form of its own id stops seeing its entries.
pub(crate) fn canonical_user_id(raw: String) -> String {
    match raw.parse::<Uuid>() {
        Ok(id) => id.to_string(),
        Err(_) => raw,
    }
}

/// One user's entries, newest first.
pub async fn list_for_user(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let user_id = query
        .user_id
        .filter(|u| !u.is_empty())
        .map(canonical_user_id)
        .ok_or_else(|| ApiError::invalid("userId wajib"))?;

    let rows = {
        let db = state.db.clone();
        run_blocking(FETCH_FAILED, move || db.transactions_for_user(&user_id)).await?
    };

    Ok(Json(rows.into_iter().map(entry_from_row).collect()))
}

/// The whole shared ledger, newest first. Clients seed their seen-id set
/// from this on every (re)connect.
pub async fn list_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let rows = {
        let db = state.db.clone();
        run_blocking(FETCH_FAILED, move || db.all_transactions()).await?
    };

    Ok(Json(rows.into_iter().map(entry_from_row).collect()))
}

/// Append one entry to the shared ledger, then fan it out: a frame to every
/// live channel and a push to everyone else's devices. Only the append can
/// fail this request; fan-out errors are logged and absorbed.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let user_id_raw = req
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::invalid(INCOMPLETE))?;
    let contributor_name = req
        .contributor_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::invalid(INCOMPLETE))?;
    let amount = match req.amount {
        Some(amount) if amount > 0 => amount as u64,
        _ => return Err(ApiError::invalid(INCOMPLETE)),
    };
    let kind_raw = req
        .kind
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::invalid(INCOMPLETE))?;

    let kind = TransactionKind::parse(&kind_raw)
        .ok_or_else(|| ApiError::invalid("Tipe transaksi tidak valid"))?;

    let user_id: Uuid = user_id_raw
        .parse()
        .map_err(|_| ApiError::invalid(INCOMPLETE))?;

    let date = match req.date {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| ApiError::invalid("Tanggal transaksi tidak valid"))?,
        None => Utc::now(),
    };
    // Canonical millisecond precision, so stored text order is time order.
    let date = DateTime::from_timestamp_millis(date.timestamp_millis()).unwrap_or(date);

    let entry = Transaction {
        id: Uuid::new_v4(),
        user_id,
        contributor_name,
        amount,
        kind,
        date,
        note: req.note.unwrap_or_default(),
    };

    {
        let db = state.db.clone();
        let row = TransactionRow {
            id: entry.id.to_string(),
            user_id: entry.user_id.to_string(),
            contributor_name: entry.contributor_name.clone(),
            amount: entry.amount as i64,
            kind: entry.kind.as_str().to_string(),
            date: entry.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            note: if entry.note.is_empty() {
                None
            } else {
                Some(entry.note.clone())
            },
        };
        run_blocking("Gagal menyimpan transaksi", move || db.insert_transaction(&row)).await?;
    }

    // The row is durable; the write has succeeded regardless of what the
    // fan-out does from here.
    state.fanout.publish(&entry).await;

    Ok(Json(entry))
}

fn entry_from_row(row: TransactionRow) -> Transaction {
    let id = row.id.parse().unwrap_or_else(|e| {
        warn!("Corrupt transaction id '{}': {}", row.id, e);
        Uuid::default()
    });
    let user_id = row.user_id.parse().unwrap_or_else(|e| {
        warn!("Corrupt user_id '{}' on transaction '{}': {}", row.user_id, row.id, e);
        Uuid::default()
    });
    let kind = TransactionKind::parse(&row.kind).unwrap_or_else(|| {
        warn!("Corrupt type '{}' on transaction '{}'", row.kind, row.id);
        TransactionKind::Deposit
    });
    let date = row
        .date
        .parse::<DateTime<Utc>>()
        .unwrap_or_else(|e| {
            warn!("Corrupt date '{}' on transaction '{}': {}", row.date, row.id, e);
            DateTime::default()
        });

    Transaction {
        id,
        user_id,
        contributor_name: row.contributor_name,
        amount: row.amount.max(0) as u64,
        kind,
        date,
        note: row.note.unwrap_or_default(),
    }
}
