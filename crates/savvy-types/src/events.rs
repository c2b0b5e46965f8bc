use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Transaction, TransactionKind};

/// Frames sent server→client over the live channel. Tagged envelope:
/// `{"type": "transaction", "data": {…}}`. Clients dedupe by entry id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum LedgerEvent {
    Transaction(Transaction),
}

/// Body pushed to each registered endpoint. The client service worker renders
/// a notification from these fields with `data.type` as its tag so successive
/// notifications of the same kind replace one another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub data: PushPayloadData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayloadData {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> Transaction {
        Transaction {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            contributor_name: "Andi".into(),
            amount: 50000,
            kind: TransactionKind::Deposit,
            date: "2026-08-27T10:00:00.000Z".parse().unwrap(),
            note: String::new(),
        }
    }

    #[test]
    fn event_envelope_shape() {
        let value = serde_json::to_value(LedgerEvent::Transaction(sample_entry())).unwrap();
        assert_eq!(value["type"], "transaction");
        assert_eq!(value["data"]["amount"], 50000);
        assert_eq!(value["data"]["type"], "DEPOSIT");
    }

    #[test]
    fn push_payload_shape() {
        let payload = PushPayload {
            title: "Tabungan Masuk".into(),
            body: "Andi menabung Rp 50.000".into(),
            data: PushPayloadData {
                kind: TransactionKind::Deposit,
                user_id: Uuid::nil(),
            },
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Tabungan Masuk",
                "body": "Andi menabung Rp 50.000",
                "data": { "type": "DEPOSIT", "userId": Uuid::nil().to_string() },
            })
        );
    }
}
