use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http, http::request::Parts};
use base64::{engine::general_purpose, Engine};
use sqlx::{query_as, Pool, Sqlite};

use crate::{
    error::ApiError,
    model::User,
    password,
    token::{extract_bearer_token, TokenService},
    AppState,
};

/// A credential attempt parsed from an Authorization header. The two
/// schemes are a closed set: basic username/password and bearer token.
#[derive(Debug)]
pub enum CredentialAttempt {
    Basic { username: String, password: String },
    Token(String),
}

impl CredentialAttempt {
    /// Parses an Authorization header value. Returns None when the header
    /// carries neither scheme or the basic payload is not decodable.
    pub fn from_header(value: &str) -> Option<Self> {
        if let Some(token) = extract_bearer_token(value) {
            return Some(CredentialAttempt::Token(token.to_string()));
        }
        if let Some(encoded) = value.strip_prefix("Basic ") {
            let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
            let credentials = String::from_utf8(decoded).ok()?;
            let (username, password) = credentials.split_once(':')?;
            return Some(CredentialAttempt::Basic {
                username: username.to_string(),
                password: password.to_string(),
            });
        }
        None
    }

    /// Resolves the attempt to a User or a uniform authentication failure.
    /// "No such user" and "wrong password" are indistinguishable to the
    /// caller, and a valid token whose user has since disappeared is an
    /// authentication failure too, not a 404.
    pub async fn resolve(
        self,
        db: &Pool<Sqlite>,
        tokens: &TokenService,
    ) -> Result<User, ApiError> {
        match self {
            CredentialAttempt::Basic { username, password } => {
                let user = query_as::<_, User>(
                    "SELECT id, username, password_hash FROM users WHERE username = ?",
                )
                .bind(&username)
                .fetch_optional(db)
                .await?;

                match user {
                    Some(user) if password::verify(&user.password_hash, &password) => Ok(user),
                    _ => {
                        tracing::debug!(%username, "basic credential verification failed");
                        Err(ApiError::AuthenticationFailed)
                    }
                }
            }
            CredentialAttempt::Token(token) => {
                let user_id = tokens.verify(&token).map_err(|failure| {
                    tracing::debug!(?failure, "token verification failed");
                    ApiError::AuthenticationFailed
                })?;

                query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE id = ?")
                    .bind(user_id)
                    .fetch_optional(db)
                    .await?
                    .ok_or(ApiError::AuthenticationFailed)
            }
        }
    }
}

fn authorization_header(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::AuthenticationFailed)
}

/// Identity resolved from a bearer token. Every mutating Todo operation
/// requires this extractor: presenting basic credentials there is rejected
/// with a distinct "get a token first" message, which is deliberate policy.
pub struct BearerIdentity(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for BearerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = authorization_header(parts)?;
        match CredentialAttempt::from_header(header) {
            Some(attempt @ CredentialAttempt::Token(_)) => {
                let user = attempt.resolve(&state.db, &state.tokens).await?;
                Ok(BearerIdentity(user))
            }
            Some(CredentialAttempt::Basic { .. }) => Err(ApiError::TokenRequired),
            None => Err(ApiError::AuthenticationFailed),
        }
    }
}

/// Identity resolved from basic credentials. Only the token issuance
/// endpoint accepts this scheme.
pub struct BasicIdentity(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for BasicIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = authorization_header(parts)?;
        match CredentialAttempt::from_header(header) {
            Some(attempt @ CredentialAttempt::Basic { .. }) => {
                let user = attempt.resolve(&state.db, &state.tokens).await?;
                Ok(BasicIdentity(user))
            }
            _ => Err(ApiError::AuthenticationFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_header() {
        let attempt = CredentialAttempt::from_header("Bearer abc.def.ghi").unwrap();
        assert!(matches!(attempt, CredentialAttempt::Token(token) if token == "abc.def.ghi"));
    }

    #[test]
    fn parses_basic_header() {
        // base64("User_1:secret1")
        let attempt = CredentialAttempt::from_header("Basic VXNlcl8xOnNlY3JldDE=").unwrap();
        match attempt {
            CredentialAttempt::Basic { username, password } => {
                assert_eq!(username, "User_1");
                assert_eq!(password, "secret1");
            }
            other => panic!("expected basic attempt, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_schemes_and_bad_payloads() {
        assert!(CredentialAttempt::from_header("Digest whatever").is_none());
        assert!(CredentialAttempt::from_header("Basic %%%not-base64%%%").is_none());
        // base64("no-colon-here")
        assert!(CredentialAttempt::from_header("Basic bm8tY29sb24taGVyZQ==").is_none());
    }
}
