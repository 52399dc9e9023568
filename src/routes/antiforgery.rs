//! Anti-forgery protection for form posts.
//!
//! Double-submit scheme: the browser holds a random nonce in an `HttpOnly`
//! cookie, and every rendered form embeds a signed, expiring token carrying the
//! same nonce. A post is accepted only when both are present and agree, and
//! when any `Origin` header names this host.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const COOKIE_NAME: &str = "todo_af";
const NONCE_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    nonce: String,
    iat: usize,
    exp: usize,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and checks form tokens. Cheap to clone.
#[derive(Clone)]
pub struct Antiforgery {
    keys: Arc<Keys>,
    ttl: Duration,
}

impl Antiforgery {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            // Unrepresentable lifetimes fail in `issue_at`.
            ttl: Duration::try_minutes(ttl_minutes).unwrap_or(Duration::MAX),
        }
    }

    /// Token to embed in a form rendered for `guard`'s browser.
    pub fn issue(&self, guard: &FormGuard) -> AppResult<String> {
        self.issue_at(&guard.nonce, Utc::now())
    }

    fn issue_at(&self, nonce: &str, now: DateTime<Utc>) -> AppResult<String> {
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("anti-forgery token lifetime overflows".to_string()))?;

        let claims = Claims {
            nonce: nonce.to_string(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(|e| AppError::Internal(format!("token encode error: {}", e)))
    }

    /// Must run before any storage call in a mutating handler.
    pub fn verify(&self, guard: &FormGuard, token: &str) -> AppResult<()> {
        if !guard.from_cookie {
            return Err(AppError::Forgery("missing cookie"));
        }

        if guard.cross_origin {
            return Err(AppError::Forgery("cross-origin request"));
        }

        if token.is_empty() {
            return Err(AppError::Forgery("missing token"));
        }

        let data = decode::<Claims>(token, &self.keys.decoding, &Validation::default()).map_err(|e| {
            tracing::debug!("anti-forgery token decode error: {}", e);
            AppError::Forgery("invalid token")
        })?;

        if data.claims.nonce != guard.nonce {
            return Err(AppError::Forgery("token does not match cookie"));
        }

        Ok(())
    }
}

/// Generate a cookie nonce: 32 random alphanumeric characters.
pub fn generate_nonce() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let mut rng = rand::thread_rng();
    (0..NONCE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// The browser's anti-forgery nonce, or a fresh one if it has none yet.
pub struct FormGuard {
    nonce: String,
    from_cookie: bool,
    cross_origin: bool,
}

impl<S> FromRequestParts<S> for FormGuard
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cross_origin = is_cross_origin(&parts.headers);

        Ok(match cookie_nonce(&parts.headers) {
            Some(nonce) => FormGuard {
                nonce,
                from_cookie: true,
                cross_origin,
            },
            None => FormGuard {
                nonce: generate_nonce(),
                from_cookie: false,
                cross_origin,
            },
        })
    }
}

impl FormGuard {
    /// `Set-Cookie` value that (re)installs the nonce.
    pub fn set_cookie(&self) -> AppResult<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict",
            COOKIE_NAME, self.nonce
        ))
        .map_err(|e| AppError::Internal(format!("invalid cookie header: {}", e)))
    }
}

fn cookie_nonce(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.to_string())
        .filter(|value| value.len() == NONCE_LENGTH && value.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// An `Origin` header that does not name the requested host. Requests without
/// `Origin` are treated as same-origin.
fn is_cross_origin(headers: &HeaderMap) -> bool {
    let Some(origin) = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());

    match (origin.split_once("://"), host) {
        (Some((_, authority)), Some(host)) => !authority.eq_ignore_ascii_case(host),
        _ => true,
    }
}
