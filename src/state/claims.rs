//! Bearer-token claims decoding and validity classification.
//!
//! DESIGN
//! ======
//! Tokens are opaque signed structures issued by the backend. The client only
//! reads the payload segment to learn the expiry and subject; signatures are
//! never verified here. Every decode failure folds into [`TokenStatus`] so
//! callers outside this module never see a decode error.

#[cfg(test)]
#[path = "claims_test.rs"]
mod claims_test;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Deserializer};

/// URL-safe alphabet that accepts payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Fields decoded from a token payload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Claims {
    /// Expiry instant in milliseconds since the Unix epoch (`exp` on the
    /// wire, in seconds). `None` when absent or not a number.
    #[serde(rename = "exp", default, deserialize_with = "deserialize_exp_ms")]
    pub expires_at_ms: Option<i64>,
    /// Every other claim, untyped.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Subject identifier: `sub` when it is a string, else the backend's
    /// numeric or string `user_id`.
    pub fn subject(&self) -> Option<String> {
        if let Some(sub) = self.extra.get("sub").and_then(serde_json::Value::as_str) {
            return Some(sub.to_owned());
        }
        match self.extra.get("user_id")? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Why a token could not be decoded into [`Claims`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("payload is not valid base64url: {0}")]
    Base64(String),
    #[error("payload is not a JSON claims object: {0}")]
    Json(String),
}

/// Decode the payload segment of `token` without verifying its signature.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let payload = token.split('.').nth(1).ok_or(DecodeError::MissingPayload)?;
    // Accept the standard alphabet too; some issuers emit `+` and `/`.
    let normalized: String = payload
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = PAYLOAD_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))
}

/// Validity of the session token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token in the session.
    Absent,
    /// The token could not be decoded.
    Malformed,
    /// The token decoded but carries no expiry; treated as invalid.
    MissingExpiry,
    /// The expiry is at or before the evaluation instant.
    Expired,
    /// The expiry is strictly after the evaluation instant.
    Valid,
}

impl TokenStatus {
    /// Classify `token` at `now_ms` (milliseconds since the Unix epoch).
    pub fn evaluate(token: Option<&str>, now_ms: i64) -> Self {
        let Some(token) = token else {
            return Self::Absent;
        };
        match decode(token) {
            Ok(claims) => Self::from_claims(&claims, now_ms),
            Err(_) => Self::Malformed,
        }
    }

    /// Classify already-decoded claims at `now_ms`.
    pub fn from_claims(claims: &Claims, now_ms: i64) -> Self {
        match claims.expires_at_ms {
            None => Self::MissingExpiry,
            Some(exp) if exp > now_ms => Self::Valid,
            Some(_) => Self::Expired,
        }
    }

    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// `exp` is a JSON number of seconds, possibly fractional. Anything else is
/// treated as a missing expiry rather than a malformed token. Expiries past
/// the `i64` millisecond range saturate.
fn deserialize_exp_ms<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Number(number)) = value else {
        return Ok(None);
    };
    if let Some(secs) = number.as_i64() {
        return Ok(Some(secs.saturating_mul(1000)));
    }
    if number.as_u64().is_some() {
        return Ok(Some(i64::MAX));
    }
    // Float-to-int `as` casts saturate at the bounds.
    #[allow(clippy::cast_possible_truncation)]
    let ms = number.as_f64().map(|secs| (secs * 1000.0).floor() as i64);
    Ok(ms)
}
