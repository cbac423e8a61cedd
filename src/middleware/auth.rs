use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, TokenKind};
use crate::database::models::User;
use crate::database::Repository;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user resolved from the bearer access token
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

/// Validates the bearer token and loads its user into the request extensions
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers())?;
    let claims = state.tokens.decode(token, TokenKind::Access)?;

    let user = Repository::<User>::new("users", "User", state.pool.clone())
        .select_one(claims.uid)
        .await?;

    // A renamed or deleted user invalidates outstanding tokens
    let user = match user {
        Some(user) if user.username == claims.sub => user,
        _ => {
            tracing::warn!("Token for user {} ({}) no longer matches a user", claims.uid, claims.sub);
            return Err(AuthError::UnknownUser.into());
        }
    };

    tracing::debug!("Authenticated user {}", user.username);
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("non-ascii Authorization header".into()))?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        Some(_) => Err(AuthError::MissingToken),
        None => Err(AuthError::InvalidToken("Authorization header must use Bearer scheme".into())),
    }
}
