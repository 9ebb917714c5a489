use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, routes::error::ErrorResponse};

/// Claims issued by the identity provider. `sub` is the stable subject id;
/// the profile claims are optional and may lag behind the provider's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub exp: usize,
}

/// The resolved identity of the caller, as carried in request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: AuthUser,
}

pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

/// Extract and validate the bearer token, resolving it to a `RequestContext`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ErrorResponse> {
    let unauthorized = || ErrorResponse::new(StatusCode::UNAUTHORIZED, "not authenticated");

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?;

    let claims = state.jwt().verify(token).map_err(|error| {
        tracing::debug!(?error, "rejected bearer token");
        unauthorized()
    })?;

    let ctx = RequestContext {
        user: AuthUser {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            picture_url: claims.picture,
        },
    };

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
