use crate::core::RegisterPayload;
use crate::utils::error::{Result, TryOnError};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

/// bcrypt work factor for stored password hashes.
pub const BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

pub fn validate_registration(payload: &RegisterPayload) -> Result<Registration> {
    let email = payload.email.as_deref().map(str::trim).unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(TryOnError::input("Email and password are required."));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(TryOnError::input(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }

    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok(Registration {
        email: email.to_string(),
        password: password.to_string(),
        name,
    })
}

/// bcrypt is CPU bound, so it runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| TryOnError::HashingError {
            detail: e.to_string(),
        })?;

    hashed.map_err(|e| TryOnError::HashingError {
        detail: e.to_string(),
    })
}

pub fn new_user_id() -> String {
    format!("user_{}", Uuid::new_v4().simple())
}
