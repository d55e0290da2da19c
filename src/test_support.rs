//! Token builders shared by unit tests.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Fixed evaluation instant used across tests (2024-01-01T00:00:00Z).
pub const NOW_MS: i64 = 1_704_067_200_000;

/// Unsigned token whose payload is `claims`.
pub fn token_with_claims(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}

/// Token expiring `offset_secs` after [`NOW_MS`] (negative for the past).
pub fn token_expiring_in(offset_secs: i64) -> String {
    token_with_claims(&serde_json::json!({
        "user_id": 42,
        "exp": NOW_MS / 1000 + offset_secs,
    }))
}

/// Token expiring `offset_secs` after the real current time.
pub fn live_token_expiring_in(offset_secs: i64) -> String {
    token_with_claims(&serde_json::json!({
        "user_id": 42,
        "exp": crate::util::clock::now_ms() / 1000 + offset_secs,
    }))
}
