//! Access and refresh token codec.
//!
//! Both token kinds are HS256 JWTs signed with separate secrets. The refresh
//! token travels as two halves (header+payload and signature) so that neither
//! half alone is a usable credential; [`RefreshTokenParts`] does the split and
//! [`reconstruct_refresh_token`] undoes it.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{AccessClaims, RefreshClaims, User};

/// Access token lifetime: 1 hour.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 60 * 60;

/// Refresh token lifetime: 1 day.
pub const REFRESH_TOKEN_EXPIRY_SECS: i64 = 24 * 60 * 60;

/// The two signing secrets, loaded once at startup.
#[derive(Clone)]
pub struct TokenSecrets {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSecrets")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Claims that name the user they were issued for.
pub trait TokenSubject {
    fn user_id(&self) -> Uuid;
}

impl TokenSubject for AccessClaims {
    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl TokenSubject for RefreshClaims {
    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// A token verifier for one kind of token. Callers pick the implementation
/// ([`AccessTokens`] or [`RefreshTokens`]) at the call site.
pub trait TokenVerifier: Send + Sync {
    type Claims: DeserializeOwned + TokenSubject + Send;

    fn verify(&self, token: &str) -> Result<Self::Claims, AuthError>;
}

/// HMAC key pair for one secret.
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn new(name: &'static str, secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret(name));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;
        decode::<T>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Verifier for bearer access tokens.
pub struct AccessTokens(SigningKeys);

impl TokenVerifier for AccessTokens {
    type Claims = AccessClaims;

    fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.0.verify(token)
    }
}

/// Verifier for reconstructed refresh tokens.
pub struct RefreshTokens(SigningKeys);

impl TokenVerifier for RefreshTokens {
    type Claims = RefreshClaims;

    fn verify(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        self.0.verify(token)
    }
}

/// A refresh token split for transport: `header.payload` and `signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenParts {
    pub header_payload: String,
    pub signature: String,
}

impl RefreshTokenParts {
    /// Split a compact JWT at its last `.`.
    pub fn split(token: &str) -> Result<Self, AuthError> {
        let (header_payload, signature) = token
            .rsplit_once('.')
            .ok_or_else(|| AuthError::TokenError("refresh token is not a compact JWT".into()))?;
        if !header_payload.contains('.') {
            return Err(AuthError::TokenError(
                "refresh token is not a compact JWT".into(),
            ));
        }
        Ok(Self {
            header_payload: header_payload.to_string(),
            signature: signature.to_string(),
        })
    }

    /// Rejoin the halves into the original token string.
    pub fn reconstruct(&self) -> String {
        reconstruct_refresh_token(&self.header_payload, &self.signature)
    }
}

/// Rejoin the two refresh-token halves. Exact inverse of [`RefreshTokenParts::split`].
pub fn reconstruct_refresh_token(header_payload: &str, signature: &str) -> String {
    format!("{header_payload}.{signature}")
}

/// Issues and verifies access and refresh tokens. Immutable after
/// construction and safe to share across requests.
pub struct TokenCodec {
    access: AccessTokens,
    refresh: RefreshTokens,
}

impl TokenCodec {
    /// Build the codec from the two secrets. Empty secrets are rejected.
    pub fn new(secrets: &TokenSecrets) -> Result<Self, AuthError> {
        Ok(Self {
            access: AccessTokens(SigningKeys::new("ACCESS_TOKEN_SECRET", &secrets.access)?),
            refresh: RefreshTokens(SigningKeys::new(
                "REFRESH_TOKEN_SECRET",
                &secrets.refresh,
            )?),
        })
    }

    pub fn access(&self) -> &AccessTokens {
        &self.access
    }

    pub fn refresh(&self) -> &RefreshTokens {
        &self.refresh
    }

    /// Issue an access token `{userId, nickname}` valid for one hour.
    pub fn issue_access_token(&self, user: &User) -> Result<String, AuthError> {
        self.issue_access_token_at(user, Utc::now())
    }

    /// Issue an access token as if at `now`.
    pub fn issue_access_token_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = AccessClaims {
            user_id: user.id,
            nickname: user.nickname.clone(),
            exp: (now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
            iat: now.timestamp(),
        };
        self.access.0.sign(&claims)
    }

    /// Issue a refresh token `{userId}` valid for one day, already split.
    pub fn issue_refresh_token(&self, user: &User) -> Result<RefreshTokenParts, AuthError> {
        self.issue_refresh_token_at(user, Utc::now())
    }

    /// Issue a split refresh token as if at `now`.
    pub fn issue_refresh_token_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<RefreshTokenParts, AuthError> {
        let claims = RefreshClaims {
            user_id: user.id,
            exp: (now + Duration::seconds(REFRESH_TOKEN_EXPIRY_SECS)).timestamp(),
            iat: now.timestamp(),
        };
        let token = self.refresh.0.sign(&claims)?;
        RefreshTokenParts::split(&token)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.access.verify(token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        self.refresh.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&TokenSecrets {
            access: "access-secret".into(),
            refresh: "refresh-secret".into(),
        })
        .unwrap()
    }

    fn user() -> User {
        User {
            id: Uuid::now_v7(),
            email: "test@test.com".into(),
            nickname: "test".into(),
        }
    }

    fn flip_bit(s: &str, index: usize, bit: u8) -> String {
        let mut bytes = s.as_bytes().to_vec();
        bytes[index] ^= 1 << bit;
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = TokenCodec::new(&TokenSecrets {
            access: "a".into(),
            refresh: String::new(),
        })
        .err()
        .unwrap();
        assert!(matches!(err, AuthError::MissingSecret("REFRESH_TOKEN_SECRET")));
    }

    #[test]
    fn access_token_carries_user_and_nickname() {
        let codec = codec();
        let user = user();
        let token = codec.issue_access_token(&user).unwrap();
        let claims = codec.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.nickname, "test");
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_EXPIRY_SECS);
    }

    #[test]
    fn access_token_expires_after_one_hour() {
        let codec = codec();
        let user = user();

        let stale = codec
            .issue_access_token_at(&user, Utc::now() - Duration::minutes(61))
            .unwrap();
        assert!(matches!(
            codec.verify_access_token(&stale),
            Err(AuthError::InvalidToken)
        ));

        let fresh = codec
            .issue_access_token_at(&user, Utc::now() - Duration::minutes(59))
            .unwrap();
        assert!(codec.verify_access_token(&fresh).is_ok());
    }

    #[test]
    fn refresh_split_round_trips() {
        let codec = codec();
        let user = user();
        let parts = codec.issue_refresh_token(&user).unwrap();

        assert_eq!(parts.header_payload.matches('.').count(), 1);
        assert!(!parts.signature.contains('.'));

        let token = reconstruct_refresh_token(&parts.header_payload, &parts.signature);
        assert_eq!(RefreshTokenParts::split(&token).unwrap(), parts);
        assert_eq!(parts.reconstruct(), token);

        let claims = codec.verify_refresh_token(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.exp - claims.iat, REFRESH_TOKEN_EXPIRY_SECS);
    }

    #[test]
    fn tampering_with_either_half_fails() {
        let codec = codec();
        let parts = codec.issue_refresh_token(&user()).unwrap();

        for index in 0..parts.header_payload.len() {
            for bit in 0..7 {
                let hp = flip_bit(&parts.header_payload, index, bit);
                let token = reconstruct_refresh_token(&hp, &parts.signature);
                assert!(
                    codec.verify_refresh_token(&token).is_err(),
                    "tampered header/payload accepted at byte {index} bit {bit}"
                );
            }
        }
        for index in 0..parts.signature.len() {
            for bit in 0..7 {
                let sig = flip_bit(&parts.signature, index, bit);
                let token = reconstruct_refresh_token(&parts.header_payload, &sig);
                assert!(
                    codec.verify_refresh_token(&token).is_err(),
                    "tampered signature accepted at byte {index} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn half_token_does_not_verify() {
        let codec = codec();
        let parts = codec.issue_refresh_token(&user()).unwrap();
        assert!(codec.verify_refresh_token(&parts.header_payload).is_err());
        assert!(codec.verify_refresh_token(&parts.signature).is_err());
        assert!(
            codec
                .verify_refresh_token(&reconstruct_refresh_token("", &parts.signature))
                .is_err()
        );
    }

    #[test]
    fn token_kinds_do_not_cross_verify() {
        let codec = codec();
        let user = user();
        let access = codec.issue_access_token(&user).unwrap();
        let refresh = codec.issue_refresh_token(&user).unwrap().reconstruct();
        assert!(codec.verify_refresh_token(&access).is_err());
        assert!(codec.verify_access_token(&refresh).is_err());
    }

    #[test]
    fn split_rejects_non_jwt() {
        assert!(RefreshTokenParts::split("no-dots").is_err());
        assert!(RefreshTokenParts::split("one.dot").is_err());
    }
}
