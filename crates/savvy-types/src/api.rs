use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Request fields are all optional so the handlers can answer a missing field
// with the API's own 400 body instead of a serde rejection. Presence checks
// treat empty strings as missing, matching the original surface. Ids arrive
// as plain strings: an unknown or malformed id must fall through to the
// handler's own error mapping (e.g. 404 on change-password).

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub user_id: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// The outward face of a user. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

// -- Push subscriptions --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub user_id: Option<String>,
    pub subscription: Option<SubscriptionPayload>,
}

/// Browser `PushSubscription.toJSON()` shape. Extra fields such as
/// `expirationTime` are ignored.
#[derive(Debug, Deserialize)]
pub struct SubscriptionPayload {
    pub endpoint: Option<String>,
    pub keys: Option<SubscriptionKeys>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: Option<String>,
    pub auth: Option<String>,
}

// -- Transactions --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub user_id: Option<String>,
    pub contributor_name: Option<String>,
    /// A wrong-typed amount (float, string) reads as absent rather than
    /// failing the whole body, so the handler answers with its own 400.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub amount: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub note: Option<String>,
    /// Optional explicit timestamp, parsed strictly as RFC 3339.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkBody {
    pub ok: bool,
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?.and_then(|v| v.as_i64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreateTransactionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.user_id.is_none());
        assert!(req.amount.is_none());
        assert!(req.kind.is_none());
    }

    #[test]
    fn create_request_reads_wrong_typed_amounts_as_absent() {
        for amount in [
            serde_json::json!(50000.5),
            serde_json::json!("50000"),
            serde_json::json!(null),
        ] {
            let req: CreateTransactionRequest =
                serde_json::from_value(serde_json::json!({ "amount": amount })).unwrap();
            assert!(req.amount.is_none(), "amount {} should read as absent", amount);
        }

        let req: CreateTransactionRequest =
            serde_json::from_value(serde_json::json!({ "amount": 50000 })).unwrap();
        assert_eq!(req.amount, Some(50000));
    }

    #[test]
    fn subscribe_request_ignores_expiration_time() {
        let req: SubscribeRequest = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "subscription": {
                "endpoint": "https://push.example/ep",
                "expirationTime": null,
                "keys": { "p256dh": "a", "auth": "b" },
            },
        }))
        .unwrap();

        let sub = req.subscription.unwrap();
        assert_eq!(sub.endpoint.as_deref(), Some("https://push.example/ep"));
        assert_eq!(sub.keys.unwrap().auth.as_deref(), Some("b"));
    }
}
