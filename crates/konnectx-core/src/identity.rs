// ── Identity capability ──
//
// The wizard needs the current user's id (for connect) and email (for
// device discovery). It reads them through `IdentityProvider` and never
// writes credentials anywhere.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Source of the signed-in user's identity.
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
    fn current_user_email(&self) -> Option<String>;
}

/// Fixed identity, for explicit CLI flags and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: Some(email.into()),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn current_user_email(&self) -> Option<String> {
        self.email.clone()
    }
}

/// A stored user object, as written by the sign-in flow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredUser {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl StoredUser {
    /// Parse a stored user object. Malformed input yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw)
            .map_err(|e| debug!(error = %e, "ignoring malformed stored user"))
            .ok()
    }
}

/// Identity recovered from a stored user object, falling back to the
/// claims segment of a bearer token.
#[derive(Debug, Clone, Default)]
pub struct StoredIdentity {
    user_id: Option<String>,
    email: Option<String>,
}

impl StoredIdentity {
    /// Combine a stored user with token claims. User fields win.
    pub fn new(user: Option<StoredUser>, token: Option<&str>) -> Self {
        let user = user.unwrap_or_default();
        let claims = token.and_then(decode_claims).unwrap_or_default();
        Self {
            user_id: non_empty(user.id).or_else(|| non_empty(claims.id)),
            email: non_empty(user.email).or_else(|| non_empty(claims.email)),
        }
    }
}

impl IdentityProvider for StoredIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn current_user_email(&self) -> Option<String> {
        self.email.clone()
    }
}

/// Decode the payload segment of a JWT-shaped token without verifying it.
///
/// Accepts `id`, `user_id`, `userId` and `sub` for the user id.
pub fn decode_claims(token: &str) -> Option<StoredUser> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| debug!(error = %e, "token payload is not base64url"))
        .ok()?;
    let claims: serde_json::Map<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|e| debug!(error = %e, "token payload is not a JSON object"))
        .ok()?;

    let id = ["id", "user_id", "userId", "sub"]
        .iter()
        .find_map(|key| claims.get(*key).and_then(value_to_id));
    let email = claims
        .get("email")
        .and_then(Value::as_str)
        .map(String::from);

    Some(StoredUser { id, email })
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn opt_id<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(de)?
        .as_ref()
        .and_then(value_to_id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token(claims: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.signature",
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn stored_user_wins_over_claims() {
        let user = StoredUser::from_json(r#"{"id": 42, "email": "demo@konnectx.com"}"#);
        let jwt = token(r#"{"sub": "other", "email": "other@example.com"}"#);
        let identity = StoredIdentity::new(user, Some(&jwt));
        assert_eq!(identity.current_user_id().as_deref(), Some("42"));
        assert_eq!(
            identity.current_user_email().as_deref(),
            Some("demo@konnectx.com")
        );
    }

    #[test]
    fn falls_back_to_token_claims() {
        let jwt = token(r#"{"user_id": "u-7", "email": "demo@konnectx.com"}"#);
        let identity = StoredIdentity::new(None, Some(&format!("Bearer {jwt}")));
        assert_eq!(identity.current_user_id().as_deref(), Some("u-7"));
        assert_eq!(
            identity.current_user_email().as_deref(),
            Some("demo@konnectx.com")
        );
    }

    #[test]
    fn claim_precedence_prefers_id() {
        let claims = decode_claims(&token(r#"{"sub": "s", "id": "i"}"#)).unwrap();
        assert_eq!(claims.id.as_deref(), Some("i"));
    }

    #[test]
    fn garbage_token_yields_nothing() {
        assert!(decode_claims("not-a-jwt").is_none());
        assert!(decode_claims("a.!!!.c").is_none());
        let identity = StoredIdentity::new(StoredUser::from_json("{oops"), Some("x.y.z"));
        assert!(identity.current_user_id().is_none());
        assert!(identity.current_user_email().is_none());
    }
}
