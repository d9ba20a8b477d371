use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;

use crate::{AppError, AppResult, GetField};

pub const USER: &str = "user";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
}

/// Map an identity-toolkit profile into a [`User`]. A profile without a
/// display name or photo is not a valid sign-in.
pub fn map_account(profile: &Value) -> AppResult<User> {
    let id = profile.get_str_field("localId")?;

    let name = profile.get("displayName").and_then(Value::as_str).unwrap_or("");
    let avatar_url = profile.get("photoUrl").and_then(Value::as_str).unwrap_or("");
    if name.is_empty() || avatar_url.is_empty() {
        return Err(AppError::IncompleteProfile);
    }

    Ok(User {
        id,
        name: name.to_owned(),
        avatar_url: avatar_url.to_owned(),
    })
}

pub async fn current_user(session: &Session) -> AppResult<Option<User>> {
    Ok(session.get::<User>(USER).await?)
}

pub async fn require_user(session: &Session) -> AppResult<User> {
    current_user(session).await?.ok_or(AppError::SignedOut)
}
