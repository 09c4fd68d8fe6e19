//! Per-client session state carried in a signed cookie
//!
//! Holds the pending confirmations (which entries await update or delete)
//! and the queue of flash messages for the next rendered page.

pub mod cookie;

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponseParts, ResponseParts};
use serde::{Deserialize, Serialize};

pub use cookie::{SessionError, SessionKey, COOKIE_NAME};

/// Oldest flashes are dropped past this many
pub const MAX_FLASHES: usize = 10;

/// Entries awaiting a confirmed update or delete.
///
/// The two slots are independent: confirming a delete leaves a pending
/// update in place and the other way round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingActions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<i64>,
}

impl PendingActions {
    pub fn await_update(&mut self, id: i64) {
        self.update = Some(id);
    }

    pub fn await_delete(&mut self, id: i64) {
        self.delete = Some(id);
    }

    pub fn take_update(&mut self) -> Option<i64> {
        self.update.take()
    }

    pub fn take_delete(&mut self) -> Option<i64> {
        self.delete.take()
    }

    pub fn is_empty(&self) -> bool {
        self.update.is_none() && self.delete.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Serialized session contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub pending: PendingActions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.flashes.is_empty()
    }
}

/// Session extractor.
///
/// Return it as part of the response to persist changes; the cookie is only
/// rewritten when the contents changed.
#[derive(Debug)]
pub struct Session {
    data: SessionData,
    loaded: SessionData,
    /// The request carried a cookie we could not use
    discard: bool,
    key: SessionKey,
}

impl Session {
    /// Empty session, as for a client without a cookie
    pub fn new(key: SessionKey) -> Self {
        Self {
            data: SessionData::default(),
            loaded: SessionData::default(),
            discard: false,
            key,
        }
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn pending(&self) -> PendingActions {
        self.data.pending
    }

    pub fn await_update(&mut self, id: i64) {
        self.data.pending.await_update(id);
    }

    pub fn await_delete(&mut self, id: i64) {
        self.data.pending.await_delete(id);
    }

    pub fn take_update(&mut self) -> Option<i64> {
        self.data.pending.take_update()
    }

    pub fn take_delete(&mut self) -> Option<i64> {
        self.data.pending.take_delete()
    }

    /// Queue a flash, dropping the oldest once [`MAX_FLASHES`] are queued
    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        let flashes = &mut self.data.flashes;
        if flashes.len() >= MAX_FLASHES {
            let excess = flashes.len() + 1 - MAX_FLASHES;
            flashes.drain(..excess);
        }
        flashes.push(Flash {
            level,
            message: message.into(),
        });
    }

    /// Drain the flash queue for rendering
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.data.flashes)
    }

    fn set_cookie(&self) -> Option<HeaderValue> {
        if !self.discard && self.data == self.loaded {
            return None;
        }

        let cookie = if self.data.is_empty() {
            format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", COOKIE_NAME)
        } else {
            match self.key.encode(&self.data) {
                Ok(token) => format!("{}={}; Path=/; HttpOnly; SameSite=Lax", COOKIE_NAME, token),
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode session");
                    return None;
                }
            }
        };

        match HeaderValue::from_str(&cookie) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, "session cookie is not a valid header value");
                None
            }
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKey: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = SessionKey::from_ref(state);
        let mut session = Self::new(key);

        if let Some(token) = cookie::find_cookie(&parts.headers, COOKIE_NAME) {
            match session.key.decode(token) {
                Ok(data) => {
                    session.loaded = data.clone();
                    session.data = data;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "discarding session cookie");
                    session.discard = true;
                }
            }
        }

        Ok(session)
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.set_cookie() {
            res.headers_mut().append(SET_COOKIE, value);
        }
        Ok(res)
    }
}
