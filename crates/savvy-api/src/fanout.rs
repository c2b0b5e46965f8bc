use std::sync::Arc;

use savvy_db::Database;
use savvy_gateway::hub::Hub;
use savvy_push::PushDispatcher;
use savvy_types::events::{LedgerEvent, PushPayload, PushPayloadData};
use savvy_types::models::{Transaction, TransactionKind};

/// Turns one committed ledger entry into the two fan-outs: a frame to every
/// live channel, then a best-effort push to every registered endpoint except
/// the author's own devices.
#[derive(Clone)]
pub struct FanoutCoordinator {
    hub: Hub,
    push: PushDispatcher,
    db: Arc<Database>,
}

impl FanoutCoordinator {
    pub fn new(hub: Hub, push: PushDispatcher, db: Arc<Database>) -> Self {
        Self { hub, push, db }
    }

    /// Callers invoke this only after the entry is durable. The broadcast is
    /// enqueued before the first await, so no other I/O can slip between the
    /// committed append and the frames — foreground clients see the entry
    /// before any push notification can arrive.
    pub async fn publish(&self, entry: &Transaction) {
        self.hub.broadcast(LedgerEvent::Transaction(entry.clone()));

        let payload = notification_for(entry);
        self.push
            .dispatch(self.db.clone(), &payload, Some(entry.user_id))
            .await;
    }
}

fn notification_for(entry: &Transaction) -> PushPayload {
    let (title, verb) = match entry.kind {
        TransactionKind::Deposit => ("Tabungan Masuk", "menabung"),
        TransactionKind::Withdrawal => ("Penarikan Dana", "menarik"),
    };

    PushPayload {
        title: title.to_string(),
        body: format!(
            "{} {} Rp {}",
            entry.contributor_name,
            verb,
            format_rupiah(entry.amount)
        ),
        data: PushPayloadData {
            kind: entry.kind,
            user_id: entry.user_id,
        },
    }
}

/// id-ID thousands grouping: 1234567 -> "1.234.567".
fn format_rupiah(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(kind: TransactionKind, amount: u64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            contributor_name: "Andi".into(),
            amount,
            kind,
            date: "2026-08-27T10:00:00.000Z".parse().unwrap(),
            note: String::new(),
        }
    }

    #[test]
    fn rupiah_grouping() {
        assert_eq!(format_rupiah(0), "0");
        assert_eq!(format_rupiah(999), "999");
        assert_eq!(format_rupiah(1000), "1.000");
        assert_eq!(format_rupiah(50000), "50.000");
        assert_eq!(format_rupiah(1234567), "1.234.567");
    }

    #[test]
    fn deposit_notification_text() {
        let entry = entry(TransactionKind::Deposit, 50000);
        let payload = notification_for(&entry);
        assert_eq!(payload.title, "Tabungan Masuk");
        assert_eq!(payload.body, "Andi menabung Rp 50.000");
        assert_eq!(payload.data.user_id, entry.user_id);
    }

    #[test]
    fn withdrawal_notification_text() {
        let payload = notification_for(&entry(TransactionKind::Withdrawal, 1250000));
        assert_eq!(payload.title, "Penarikan Dana");
        assert_eq!(payload.body, "Andi menarik Rp 1.250.000");
    }

    #[tokio::test]
    async fn publish_reaches_every_live_channel() {
        let hub = Hub::new();
        let db = Arc::new(Database::open_in_memory().unwrap());
        let coordinator = FanoutCoordinator::new(hub.clone(), PushDispatcher::disabled(), db);

        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();

        let sent = entry(TransactionKind::Deposit, 50000);
        coordinator.publish(&sent).await;

        for rx in [&mut rx1, &mut rx2] {
            let LedgerEvent::Transaction(got) = rx.try_recv().unwrap();
            assert_eq!(got.id, sent.id);
        }
    }
}
