use std::sync::LazyLock;

use axum::{
    Json, RequestPartsExt,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    app::{ServiceError, ServiceResult},
    util::validate_email,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

const TOKEN_TTL_HOURS: i64 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    exp: usize,
}

impl Claims {
    /// Owner gate: routes scoped to a member's own data must present a token
    /// for exactly that email.
    pub fn require_self(&self, email: &str) -> ServiceResult<()> {
        if self.sub != email {
            return ServiceError::forbidden("forbidden access");
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum AuthError {
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "unauthorized access"),
        };
        let body = Json(json!({
            "error": error_message,
        }));
        (status, body).into_response()
    }
}

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;
        let token_data = decode::<Claims>(bearer.token(), &KEYS.decoding, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(token_data.claims)
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

static KEYS: LazyLock<Keys> = LazyLock::new(|| {
    let secret = read_or_generate_secret();
    Keys::new(&secret)
});

fn read_or_generate_secret() -> Vec<u8> {
    if let Ok(secret) = std::env::var("MATRI_JWT_SECRET") {
        secret.as_bytes().to_vec()
    } else {
        log::warn!("JWT secret not found, generating a random one...");
        Uuid::new_v4().as_bytes().to_vec()
    }
}

pub fn generate_jwt(email: &str) -> String {
    let claims = Claims {
        sub: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &KEYS.encoding).expect("Failed to encode JWT")
}

#[derive(Deserialize)]
pub struct TokenPayload {
    pub email: String,
}

#[derive(Serialize)]
pub struct TokenBody {
    pub token: String,
}

// Identity is established upstream (the web client's login provider); this
// endpoint only mints a short-lived bearer token for the presented email.
#[axum::debug_handler]
pub async fn handle_issue_token(
    Json(payload): Json<TokenPayload>,
) -> Result<Json<TokenBody>, ServiceError> {
    let email = validate_email(&payload.email)?;
    let token = generate_jwt(&email);
    Ok(Json(TokenBody { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_round_trip() {
        let token = generate_jwt("alice@example.com");
        let data = decode::<Claims>(&token, &KEYS.decoding, &Validation::default()).unwrap();
        assert_eq!(data.claims.sub, "alice@example.com");
        assert!(decode::<Claims>("not-a-token", &KEYS.decoding, &Validation::default()).is_err());
    }

    #[test]
    fn test_require_self() {
        let claims = Claims {
            sub: "alice@example.com".to_string(),
            exp: 0,
        };
        assert!(claims.require_self("alice@example.com").is_ok());
        assert!(matches!(
            claims.require_self("bob@example.com"),
            Err(ServiceError::Forbidden(..))
        ));
    }
}
