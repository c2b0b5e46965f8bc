use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use web_push::{
    ContentEncoding, HyperWebPushClient, PartialVapidSignatureBuilder, SubscriptionInfo,
    URL_SAFE_NO_PAD, VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessageBuilder,
};

use savvy_db::Database;
use savvy_db::models::PushSubscriptionRow;
use savvy_types::events::PushPayload;

/// Cap on concurrent sends within one dispatch.
const MAX_IN_FLIGHT: usize = 32;

/// Per-endpoint send timeout.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// VAPID identity (RFC 8292). Without a keypair the dispatcher is disabled.
#[derive(Debug, Clone)]
pub struct VapidIdentity {
    pub subject: String,
    pub public_key: String,
    pub private_key: String,
}

/// Best-effort web-push fan-out. Cheap to clone. A dispatcher built without
/// an identity is a no-op, so the fan-out path never branches on
/// configuration.
#[derive(Clone)]
pub struct PushDispatcher {
    inner: Option<Arc<Inner>>,
}

struct Inner {
    client: HyperWebPushClient,
    signer: PartialVapidSignatureBuilder,
    subject: String,
}

impl PushDispatcher {
    pub fn new(identity: &VapidIdentity) -> Result<Self, WebPushError> {
        let signer =
            VapidSignatureBuilder::from_base64_no_sub(&identity.private_key, URL_SAFE_NO_PAD)?;

        Ok(Self {
            inner: Some(Arc::new(Inner {
                client: HyperWebPushClient::new(),
                signer,
                subject: identity.subject.clone(),
            })),
        })
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Send `payload` to every registered endpoint except those owned by
    /// `exclude_user` (all of the originator's devices, not just one).
    ///
    /// The subscription list is snapshotted up front; endpoints answering
    /// with a gone status (404/410) are collected during the pass and removed
    /// only after every send has resolved, so iteration never mutates the
    /// collection it walks. Never fails: every error ends in the log, not at
    /// the caller.
    pub async fn dispatch(&self, db: Arc<Database>, payload: &PushPayload, exclude_user: Option<Uuid>) {
        let Some(inner) = &self.inner else {
            return;
        };

        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(e) => {
                error!("push dispatch aborted, unencodable payload: {}", e);
                return;
            }
        };

        let snapshot = {
            let db = db.clone();
            tokio::task::spawn_blocking(move || db.list_push_subscriptions()).await
        };
        let subscriptions = match snapshot {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                error!("push dispatch aborted, cannot list subscriptions: {:#}", e);
                return;
            }
            Err(e) => {
                error!("push dispatch aborted, join error: {}", e);
                return;
            }
        };

        let targets = eligible(subscriptions, exclude_user);
        if targets.is_empty() {
            debug!("no push targets");
            return;
        }

        let pruned: Mutex<Vec<i64>> = Mutex::new(Vec::new());

        futures_util::stream::iter(targets)
            .for_each_concurrent(MAX_IN_FLIGHT, |sub| {
                let body = body.as_str();
                let pruned = &pruned;
                let inner = Arc::clone(inner);
                async move {
                    match tokio::time::timeout(SEND_TIMEOUT, inner.send_one(&sub, body)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) if endpoint_gone(&e) => {
                            info!("pruning gone push endpoint {}: {}", sub.endpoint, e);
                            pruned.lock().await.push(sub.id);
                        }
                        Ok(Err(e)) => {
                            warn!("push send to {} failed: {}", sub.endpoint, e);
                        }
                        Err(_) => {
                            warn!("push send to {} timed out", sub.endpoint);
                        }
                    }
                }
            })
            .await;

        let pruned = pruned.into_inner();
        if pruned.is_empty() {
            return;
        }

        let removed =
            tokio::task::spawn_blocking(move || db.delete_push_subscriptions_by_id(&pruned)).await;
        match removed {
            Ok(Ok(n)) => info!("pruned {} dead push subscription(s)", n),
            Ok(Err(e)) => error!("failed to prune push subscriptions: {:#}", e),
            Err(e) => error!("prune join error: {}", e),
        }
    }
}

impl Inner {
    async fn send_one(&self, sub: &PushSubscriptionRow, body: &str) -> Result<(), WebPushError> {
        let info =
            SubscriptionInfo::new(sub.endpoint.clone(), sub.p256dh.clone(), sub.auth.clone());

        let mut signature = self.signer.clone().add_sub_info(&info);
        signature.add_claim("sub", self.subject.as_str());

        let mut message = WebPushMessageBuilder::new(&info);
        message.set_vapid_signature(signature.build()?);
        message.set_payload(ContentEncoding::Aes128Gcm, body.as_bytes());

        self.client.send(message.build()?).await
    }
}

/// 404/410-equivalent: the push service says this endpoint will never
/// deliver again.
fn endpoint_gone(err: &WebPushError) -> bool {
    matches!(
        err,
        WebPushError::EndpointNotFound | WebPushError::EndpointNotValid
    )
}

fn eligible(rows: Vec<PushSubscriptionRow>, exclude_user: Option<Uuid>) -> Vec<PushSubscriptionRow> {
    let exclude = exclude_user.map(|u| u.to_string());
    rows.into_iter()
        .filter(|row| Some(&row.user_id) != exclude.as_ref())
        .collect()
}
