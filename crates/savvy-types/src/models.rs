use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a ledger entry. Closed set; anything else is rejected at the
/// API boundary before a row is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    /// Parse the wire string. Returns `None` for anything outside the set,
    /// so callers can answer with their own error body.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DEPOSIT" => Some(Self::Deposit),
            "WITHDRAWAL" => Some(Self::Withdrawal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
        }
    }
}

/// One immutable entry in the shared ledger, in its wire shape. The same
/// object is returned from the HTTP write, broadcast on the live channel,
/// and reconstructed from storage on the read paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contributor_name: String,
    pub amount: u64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    /// Always present on the wire; absent notes normalize to "".
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_strings() {
        assert_eq!(TransactionKind::parse("DEPOSIT"), Some(TransactionKind::Deposit));
        assert_eq!(TransactionKind::parse("WITHDRAWAL"), Some(TransactionKind::Withdrawal));
        assert_eq!(TransactionKind::parse("TRANSFER"), None);
        assert_eq!(TransactionKind::parse("deposit"), None);
        assert_eq!(TransactionKind::Deposit.as_str(), "DEPOSIT");
    }

    #[test]
    fn transaction_serializes_camel_case() {
        let entry = Transaction {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            contributor_name: "Andi".into(),
            amount: 50000,
            kind: TransactionKind::Deposit,
            date: "2026-08-27T10:00:00.000Z".parse().unwrap(),
            note: String::new(),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["contributorName"], "Andi");
        assert_eq!(value["userId"], Uuid::nil().to_string());
        assert_eq!(value["type"], "DEPOSIT");
        assert_eq!(value["amount"], 50000);
        assert_eq!(value["note"], "");
    }
}
