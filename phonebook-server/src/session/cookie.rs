//! Signed session cookie codec
//!
//! Token format: `base64url(json) "." base64url(hmac_sha256(secret, payload))`.

use std::fmt;
use std::sync::Arc;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use super::SessionData;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie
pub const COOKIE_NAME: &str = "phonebook_session";

/// Browsers cap a cookie at roughly 4KB
const MAX_TOKEN_LEN: usize = 4096;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("malformed session cookie: {0}")]
    Malformed(String),

    #[error("session signature mismatch")]
    BadSignature,

    #[error("session token of {0} bytes exceeds the cookie size limit")]
    TooLarge(usize),

    #[error("invalid session key")]
    InvalidKey,

    #[error("session payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Secret used to sign and verify session cookies
#[derive(Clone)]
pub struct SessionKey(Arc<[u8]>);

impl SessionKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.0).map_err(|_| SessionError::InvalidKey)
    }

    pub fn encode(&self, data: &SessionData) -> Result<String, SessionError> {
        let payload_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(data)?);
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        let token = format!("{}.{}", payload_part, sig_part);
        if token.len() > MAX_TOKEN_LEN {
            return Err(SessionError::TooLarge(token.len()));
        }
        Ok(token)
    }

    pub fn decode(&self, token: &str) -> Result<SessionData, SessionError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(SessionError::Malformed("token exceeds max length".into()));
        }
        let (payload_part, sig_part) = token
            .split_once('.')
            .ok_or_else(|| SessionError::Malformed("missing signature".into()))?;

        let expected = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| SessionError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        Ok(serde_json::from_slice(&payload)?)
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

/// Value of the first cookie called `name` across all `Cookie` headers
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Flash, FlashLevel};
    use axum::http::HeaderValue;

    fn sample() -> SessionData {
        let mut data = SessionData::default();
        data.pending.await_update(7);
        data
    }

    #[test]
    fn signed_token_decodes() {
        let key = SessionKey::new("secret");
        let token = key.encode(&sample()).unwrap();

        let decoded = key.decode(&token).unwrap();
        assert_eq!(decoded.pending.update, Some(7));
        assert_eq!(decoded.pending.delete, None);
    }

    #[test]
    fn other_key_is_rejected() {
        let token = SessionKey::new("secret").encode(&sample()).unwrap();

        let err = SessionKey::new("different").decode(&token).unwrap_err();
        assert!(matches!(err, SessionError::BadSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let key = SessionKey::new("secret");
        let token = key.encode(&sample()).unwrap();
        let (_, sig) = token.split_once('.').unwrap();
        let forged_payload =
            URL_SAFE_NO_PAD.encode(br#"{"pending":{"update":7,"delete":1}}"#);

        let err = key.decode(&format!("{}.{}", forged_payload, sig)).unwrap_err();
        assert!(matches!(err, SessionError::BadSignature));
    }

    #[test]
    fn oversized_session_is_not_encoded() {
        let mut data = sample();
        data.flashes.push(Flash {
            level: FlashLevel::Error,
            message: "x".repeat(MAX_TOKEN_LEN),
        });

        let err = SessionKey::new("secret").encode(&data).unwrap_err();
        assert!(matches!(err, SessionError::TooLarge(len) if len > MAX_TOKEN_LEN));
    }

    #[test]
    fn garbage_is_malformed() {
        let key = SessionKey::new("secret");
        assert!(matches!(
            key.decode("no-dot-here"),
            Err(SessionError::Malformed(_))
        ));
        assert!(matches!(
            key.decode("abc.!!!"),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; lang=en"));
        headers.append(COOKIE, HeaderValue::from_static("phonebook_session=abc.def"));

        assert_eq!(find_cookie(&headers, COOKIE_NAME), Some("abc.def"));
        assert_eq!(find_cookie(&headers, "lang"), Some("en"));
        assert_eq!(find_cookie(&headers, "missing"), None);
    }
}
