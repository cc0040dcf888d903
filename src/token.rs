use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Claims carried inside an issued token: the user id, when it was issued,
/// and when it stops being valid.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub iat: u64,
    pub exp: u64,
}

/// Why a presented token was rejected. The boundary collapses all three
/// into a uniform authentication failure; the distinction exists for
/// logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    /// Tampered with, or signed under a different key.
    SignatureInvalid,
    /// Signature checks out but the token is past its maximum age.
    Expired,
    /// Not decodable as a token at all.
    Malformed,
}

/// Issues and verifies signed, time-limited tokens. The secret is
/// process-wide configuration; rotating it invalidates every token
/// issued before the rotation.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    max_age_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, max_age_secs: u64) -> Self {
        let mut validation = Validation::default();
        // No leeway: the expiry boundary is exact.
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            max_age_secs,
        }
    }

    /// Issues a token for the given user id, valid from now until the
    /// configured maximum age has passed.
    pub fn issue(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, unix_now())
    }

    fn issue_at(&self, user_id: i64, iat: u64) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id: user_id,
            iat,
            exp: iat + self.max_age_secs,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verifies a presented token and returns the user id it was issued
    /// for. Signature and expiry are both checked.
    pub fn verify(&self, token: &str) -> Result<i64, VerifyFailure> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.id),
            Err(err) => Err(match err.kind() {
                ErrorKind::ExpiredSignature => VerifyFailure::Expired,
                ErrorKind::InvalidSignature => VerifyFailure::SignatureInvalid,
                _ => VerifyFailure::Malformed,
            }),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Extracts the bearer token from an Authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-secret", 3600)
    }

    #[test]
    fn round_trip_yields_issuing_user() {
        let tokens = service();
        let token = tokens.issue(42).unwrap();
        assert_eq!(tokens.verify(&token), Ok(42));
    }

    #[test]
    fn token_past_max_age_is_expired() {
        let tokens = service();
        let stale = tokens.issue_at(7, unix_now() - 3700).unwrap();
        assert_eq!(tokens.verify(&stale), Err(VerifyFailure::Expired));
    }

    #[test]
    fn tampered_token_never_verifies() {
        let tokens = service();
        let token = tokens.issue(42).unwrap();
        // Flip one character in the payload section.
        let payload_start = token.find('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[payload_start] = if bytes[payload_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        let failure = tokens.verify(&tampered).unwrap_err();
        assert!(matches!(
            failure,
            VerifyFailure::SignatureInvalid | VerifyFailure::Malformed
        ));
    }

    #[test]
    fn token_signed_under_other_key_is_invalid() {
        let token = TokenService::new("some-other-secret", 3600)
            .issue(42)
            .unwrap();
        assert_eq!(
            service().verify(&token),
            Err(VerifyFailure::SignatureInvalid)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            service().verify("definitely not a token"),
            Err(VerifyFailure::Malformed)
        );
    }

    #[test]
    fn bearer_prefix_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Basic dXNlcjpwdw=="), None);
    }
}
