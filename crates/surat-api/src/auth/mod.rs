//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs issued by the hosted auth provider and verified
//! against a shared secret. The middleware resolves the caller's profile,
//! auto-provisioning a `Staff` profile on first contact, and stores an
//! [`AuthContext`] in request extensions for handlers to extract.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use surat_core::models::{Profile, Role};
use surat_core::AppError;
use surat_db::ProfileRepository;
use uuid::Uuid;

use crate::error::HttpAppError;

/// Claims we care about from the auth provider's tokens.
#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

/// State for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    decoding_key: Arc<DecodingKey>,
    profiles: ProfileRepository,
}

impl AuthState {
    pub fn new(jwt_secret: &str, profiles: ProfileRepository) -> Self {
        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
            profiles,
        }
    }
}

/// Authenticated caller: the auth-provider subject plus their profile row.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub profile: Profile,
}

impl AuthContext {
    pub fn role(&self) -> Role {
        self.profile.role
    }
}

// FromRequestParts so AuthContext works alongside Multipart extractors.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Missing authentication context".to_string(),
                ))
            })
    }
}

fn bearer_token(parts_headers: &axum::http::HeaderMap) -> Result<&str, AppError> {
    let header = parts_headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header must be a Bearer token".to_string()))
}

fn decode_claims(token: &str, key: &DecodingKey) -> Result<JwtClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<JwtClaims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Display name for auto-provisioned profiles: the local part of the email,
/// or a generic fallback when the token carries no email.
fn name_from_email(email: Option<&str>) -> String {
    email
        .and_then(|e| e.split('@').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("Pengguna")
        .to_string()
}

/// Verify the bearer token and resolve the caller's profile.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    let token = bearer_token(request.headers())?;
    let claims = decode_claims(token, &auth.decoding_key)?;

    let profile = match auth.profiles.get_by_user_id(claims.sub).await? {
        Some(profile) => profile,
        None => {
            let name = name_from_email(claims.email.as_deref());
            tracing::info!(user_id = %claims.sub, name = %name, "Auto-provisioning profile");
            auth.profiles.create(claims.sub, &name, Role::Staff).await?
        }
    };

    request.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        profile,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret-at-least-16-chars";

    fn make_token(exp_offset: i64) -> String {
        let claims = json!({
            "sub": Uuid::new_v4(),
            "email": "budi.santoso@example.go.id",
            "exp": chrono::Utc::now().timestamp() + exp_offset,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_valid_token() {
        let token = make_token(3600);
        let key = DecodingKey::from_secret(SECRET);
        let claims = decode_claims(&token, &key).unwrap();
        assert_eq!(claims.email.as_deref(), Some("budi.santoso@example.go.id"));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = make_token(-3600);
        let key = DecodingKey::from_secret(SECRET);
        assert!(matches!(
            decode_claims(&token, &key),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = make_token(3600);
        let key = DecodingKey::from_secret(b"a-different-secret-16");
        assert!(decode_claims(&token, &key).is_err());
    }

    #[test]
    fn test_name_from_email() {
        assert_eq!(name_from_email(Some("sari@bps.go.id")), "sari");
        assert_eq!(name_from_email(None), "Pengguna");
        assert_eq!(name_from_email(Some("@nodomain")), "Pengguna");
    }
}
