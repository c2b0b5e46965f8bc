use axum::http::Uri;
use axum::{Json, extract::State};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use savvy_types::api::{OkBody, SubscribeRequest};

use crate::auth::AppState;
use crate::error::{ApiError, run_blocking};

const INCOMPLETE: &str = "Data subscription tidak lengkap";
const INVALID: &str = "Data subscription tidak valid";

/// Register or refresh a device's push endpoint for a user. Keyed by
/// endpoint: the same device re-subscribing under another account takes the
/// row over.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<Json<OkBody>, ApiError> {
    let user_id = req
        .user_id
        .filter(|u| !u.trim().is_empty())
        .map(crate::transactions::canonical_user_id)
        .ok_or_else(|| ApiError::invalid(INCOMPLETE))?;
    let subscription = req.subscription.ok_or_else(|| ApiError::invalid(INCOMPLETE))?;
    let endpoint = subscription
        .endpoint
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::invalid(INCOMPLETE))?;
    let keys = subscription.keys.ok_or_else(|| ApiError::invalid(INCOMPLETE))?;
    let p256dh = keys
        .p256dh
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::invalid(INCOMPLETE))?;
    let auth = keys
        .auth
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::invalid(INCOMPLETE))?;

    // Endpoint must be an absolute URL, keys must be base64url.
    let uri: Uri = endpoint.parse().map_err(|_| ApiError::invalid(INVALID))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(ApiError::invalid(INVALID));
    }
    if URL_SAFE_NO_PAD.decode(&p256dh).is_err() || URL_SAFE_NO_PAD.decode(&auth).is_err() {
        return Err(ApiError::invalid(INVALID));
    }

    let db = state.db.clone();
    run_blocking("Gagal menyimpan subscription", move || {
        db.upsert_push_subscription(&user_id, &endpoint, &p256dh, &auth)
    })
    .await?;

    Ok(Json(OkBody { ok: true }))
}
