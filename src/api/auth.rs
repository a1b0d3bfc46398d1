//! Caller identity from bearer session tokens

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::decode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::api::handlers::AppState;
use crate::config::AuthConfig;
use crate::errors::AppError;
use crate::errors::Result;

/// Session token claims; `sub` is the user id
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

/// The authenticated user id, if the request carried a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub Option<String>);

impl Identity {
    /// Resolve identity from the `Authorization: Bearer` header.
    ///
    /// Missing, malformed or unverifiable tokens yield an anonymous identity.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, auth: &AuthConfig) -> Self {
        if auth.jwt_secret.is_empty() {
            return Self(None);
        }
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        let Some(token) = token else {
            return Self(None);
        };

        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
            &validation,
        ) {
            Ok(data) if !data.claims.sub.is_empty() => Self(Some(data.claims.sub)),
            Ok(_) => Self(None),
            Err(e) => {
                debug!("Rejected bearer token: {}", e);
                Self(None)
            }
        }
    }

    /// The user id, or `AuthRequired`
    pub fn require(self) -> Result<String> {
        self.0.ok_or(AppError::AuthRequired)
    }

    /// The token's user when present, else a dev-mode user id from the request body
    pub fn or_dev_user(self, claimed: Option<&str>, auth: &AuthConfig) -> Result<String> {
        match (self.0, claimed) {
            (Some(user_id), _) => Ok(user_id),
            (None, Some(user_id)) if is_dev_user(user_id, auth) => Ok(user_id.to_string()),
            (None, _) => Err(AppError::AuthRequired),
        }
    }

    /// Allow anonymous access when the request asked for dev mode
    pub fn allow_dev_mode(&self, dev_mode: bool, auth: &AuthConfig) -> Result<()> {
        if self.0.is_some() || (dev_mode && auth.dev_mode_enabled) {
            Ok(())
        } else {
            Err(AppError::AuthRequired)
        }
    }
}

fn is_dev_user(user_id: &str, auth: &AuthConfig) -> bool {
    auth.dev_mode_enabled
        && !auth.dev_user_prefix.is_empty()
        && user_id.starts_with(&auth.dev_user_prefix)
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &state.auth))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use jsonwebtoken::encode;
    use jsonwebtoken::EncodingKey;
    use jsonwebtoken::Header;

    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig {
            jwt_secret: "secret".to_string(),
            ..AuthConfig::default()
        }
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn token(secret: &str, sub: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
            email: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let identity = Identity::from_headers(&headers_with(&token("secret", "user-42")), &auth());
        assert_eq!(identity, Identity(Some("user-42".to_string())));
    }

    #[test]
    fn test_wrong_secret_is_anonymous() {
        let identity = Identity::from_headers(&headers_with(&token("other", "user-42")), &auth());
        assert_eq!(identity, Identity(None));
        assert!(matches!(identity.require(), Err(AppError::AuthRequired)));
    }

    #[test]
    fn test_dev_user_bypass() {
        let auth = auth();
        assert_eq!(
            Identity(None).or_dev_user(Some("dev-user-1"), &auth).unwrap(),
            "dev-user-1"
        );
        assert!(Identity(None).or_dev_user(Some("someone"), &auth).is_err());

        let disabled = AuthConfig {
            dev_mode_enabled: false,
            ..auth
        };
        assert!(Identity(None).or_dev_user(Some("dev-user-1"), &disabled).is_err());
    }

    #[test]
    fn test_token_user_wins_over_claimed_dev_user() {
        let auth = auth();
        let identity = Identity::from_headers(&headers_with(&token("secret", "user-42")), &auth);
        assert_eq!(
            identity.or_dev_user(Some("dev-user-1"), &auth).unwrap(),
            "user-42"
        );
        assert_eq!(
            Identity(Some("user-42".into())).or_dev_user(None, &auth).unwrap(),
            "user-42"
        );
    }

    #[test]
    fn test_dev_mode_search_access() {
        let auth = auth();
        assert!(Identity(None).allow_dev_mode(true, &auth).is_ok());
        assert!(Identity(None).allow_dev_mode(false, &auth).is_err());
        assert!(Identity(Some("u".into())).allow_dev_mode(false, &auth).is_ok());
    }
}
