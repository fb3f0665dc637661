use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::Modify;

use crate::error::ApiError;
use crate::model::User;
use crate::repo;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Tokens are stateless: one stays valid until its embedded expiry even if the
/// account changes afterwards. Logout is the client discarding its token.
pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime_secs: i64,
}

impl Keys {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime_secs: lifetime_hours.saturating_mul(3600),
        }
    }

    /// Sign a token for `email` expiring after the configured lifetime.
    pub fn issue(&self, email: &str) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let exp = now.checked_add(self.lifetime_secs).ok_or_else(|| {
            tracing::error!("token lifetime of {}s overflows expiry", self.lifetime_secs);
            ApiError::TokenCreation
        })?;
        let claims = Claims {
            sub: email.to_string(),
            iat: now,
            exp,
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| {
            tracing::error!("sign token: {}", e);
            ApiError::TokenCreation
        })
    }

    /// Returns the subject email. Structure, signature and expiry failures
    /// all collapse into [`ApiError::Unauthenticated`].
    pub fn validate(&self, token: &str) -> Result<String, ApiError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                tracing::debug!("validate token: {}", e);
                ApiError::Unauthenticated
            })
    }
}

/// Well-formed Argon2 hash that matches no password. Login verifies against it
/// when the email is unknown so both rejections cost the same.
pub const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$aG9zdGVsLWR1bW15LXNsdA$m2G2/Kc6QqYyUsMYxd8xjOCRT+1mt2xOTh+PqbEsLFQ";

/// Check `password` against a stored Argon2 PHC string. A hash that does not
/// parse never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is malformed: {}", e);
            false
        }
    }
}

/// The authenticated caller, resolved from the bearer token on every
/// protected route before the handler body runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<crate::State> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::State,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthenticated)?;
        let email = state.keys.validate(bearer.token())?;

        let mut conn = state.pool.get().await?;
        // deleted accounts keep a signature-valid token until expiry
        let user = repo::find_user_by_email(&mut conn, &email)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        Ok(CurrentUser(user))
    }
}

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(Default::default)
            .add_security_scheme(
                "hostel_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use argon2::password_hash::{PasswordHasher, SaltString};

    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

    pub(crate) fn hash(password: &str) -> String {
        let salt = SaltString::encode_b64(b"hostel-test-salt").unwrap();
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn issued_token_validates_to_subject() {
        let keys = Keys::new(SECRET, 24);
        let token = keys.issue("student@hostel.test").unwrap();
        assert_eq!(keys.validate(&token).unwrap(), "student@hostel.test");
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = Keys::new(SECRET, 24);
        let now = Utc::now().timestamp();
        let token = keys
            .sign(&Claims {
                sub: "student@hostel.test".into(),
                iat: now - 7200,
                exp: now - 5,
            })
            .unwrap();
        assert!(matches!(
            keys.validate(&token),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = Keys::new("secret-alpha", 24).issue("a@hostel.test").unwrap();
        let result = Keys::new("secret-bravo", 24).validate(&token);
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = Keys::new(SECRET, 24);
        assert!(keys.validate("not-a-jwt").is_err());
        assert!(keys.validate("").is_err());
    }

    #[test]
    fn expiry_follows_configured_lifetime() {
        let keys = Keys::new(SECRET, 2);
        let token = keys.issue("a@hostel.test").unwrap();
        let claims = decode::<Claims>(&token, &keys.decoding, &keys.validation)
            .unwrap()
            .claims;
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn verifies_matching_password_only() {
        let stored = hash("correct-horse-battery-staple");
        assert!(verify_password("correct-horse-battery-staple", &stored));
        assert!(!verify_password("wrong-password", &stored));
    }

    #[test]
    fn dummy_hash_parses_and_never_matches() {
        assert!(PasswordHash::new(DUMMY_HASH).is_ok());
        assert!(!verify_password("", DUMMY_HASH));
        assert!(!verify_password("hostel-dummy", DUMMY_HASH));
    }

    #[test]
    fn oversized_lifetime_fails_instead_of_overflowing() {
        let keys = Keys::new(SECRET, i64::MAX);
        assert!(matches!(
            keys.issue("a@hostel.test"),
            Err(ApiError::TokenCreation)
        ));
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password("plaintext", "plaintext"));
        assert!(!verify_password("", ""));
    }
}
