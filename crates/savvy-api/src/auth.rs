use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{Json, extract::State};
use uuid::Uuid;

use savvy_db::Database;
use savvy_gateway::hub::Hub;
use savvy_types::api::{ChangePasswordRequest, LoginRequest, OkBody, PublicUser, RegisterRequest};

use crate::error::{ApiError, run_blocking};
use crate::fanout::FanoutCoordinator;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub hub: Hub,
    pub fanout: FanoutCoordinator,
}

/// Presence check matching the original surface: absent and empty both
/// count as missing.
fn required(field: Option<String>, message: &str) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::invalid(message)),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let name = required(req.name, "Data registrasi tidak lengkap")?;
    let username = required(req.username, "Data registrasi tidak lengkap")?;
    let password = required(req.password, "Data registrasi tidak lengkap")?;

    let existing = {
        let db = state.db.clone();
        let username = username.clone();
        run_blocking("Gagal mendaftar", move || db.get_user_by_username(&username)).await?
    };
    if existing.is_some() {
        return Err(ApiError::Conflict("Username sudah digunakan".into()));
    }

    let id = Uuid::new_v4();
    {
        let db = state.db.clone();
        let name = name.clone();
        let username = username.clone();
        // Hashing is CPU-bound; it stays off the scheduler with the insert.
        run_blocking("Gagal mendaftar", move || {
            let hash = hash_password(&password)?;
            db.create_user(&id.to_string(), &name, &username, &hash)
        })
        .await?;
    }

    Ok(Json(PublicUser { id, name, username }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let username = required(req.username, "Username atau password kosong")?;
    let password = required(req.password, "Username atau password kosong")?;

    let user = {
        let db = state.db.clone();
        let username = username.clone();
        run_blocking("Gagal login", move || db.get_user_by_username(&username)).await?
    }
    .ok_or_else(|| ApiError::NotAuthenticated("Username atau password salah".into()))?;

    let password_hash = user.password_hash.clone();
    let valid =
        run_blocking("Gagal login", move || Ok(verify_password(&password, &password_hash))).await?;
    if !valid {
        return Err(ApiError::NotAuthenticated("Username atau password salah".into()));
    }

    let id = user.id.parse().map_err(|e| {
        ApiError::storage("Gagal login")(anyhow::anyhow!("corrupt user id '{}': {}", user.id, e))
    })?;

    Ok(Json(PublicUser {
        id,
        name: user.name,
        username: user.username,
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<OkBody>, ApiError> {
    let user_id = required(req.user_id, "Data tidak lengkap")?;
    let current = required(req.current_password, "Data tidak lengkap")?;
    let new = required(req.new_password, "Data tidak lengkap")?;
    if new.len() < 6 {
        return Err(ApiError::invalid("Password baru minimal 6 karakter"));
    }

    let user = {
        let db = state.db.clone();
        let user_id = user_id.clone();
        run_blocking("Gagal mengganti password", move || db.get_user_by_id(&user_id)).await?
    }
    .ok_or_else(|| ApiError::NotFound("User tidak ditemukan".into()))?;

    let password_hash = user.password_hash.clone();
    let valid = run_blocking("Gagal mengganti password", move || {
        Ok(verify_password(&current, &password_hash))
    })
    .await?;
    if !valid {
        return Err(ApiError::NotAuthenticated("Password sekarang salah".into()));
    }

    {
        let db = state.db.clone();
        run_blocking("Gagal mengganti password", move || {
            let hash = hash_password(&new)?;
            db.update_password_hash(&user_id, &hash)
        })
        .await?;
    }

    Ok(Json(OkBody { ok: true }))
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
