// handlers/public/users.rs - Registration and token acquisition

use axum::{
    extract::{Query, State},
    Form, Json,
};
use serde::Deserialize;

use crate::auth::TokenPair;
use crate::database::models::{NewUser, UserView};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::state::AppState;

/// OAuth2 password-flow form body
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    pub refresh_token: String,
}

/// POST /api/users/register
pub async fn register_post(State(state): State<AppState>, Json(new): Json<NewUser>) -> ApiResult<UserView> {
    let user = UserService::new(state.pool).register(new).await?;
    Ok(ApiResponse::created(user))
}

/// POST /api/users/login - form-encoded `username` and `password`
pub async fn login_post(State(state): State<AppState>, Form(form): Form<LoginForm>) -> ApiResult<TokenPair> {
    let pair = UserService::new(state.pool)
        .login(&state.tokens, &form.username, &form.password)
        .await?;
    Ok(ApiResponse::success(pair))
}

/// POST /api/users/refresh?refresh_token=...
pub async fn refresh_post(State(state): State<AppState>, Query(query): Query<RefreshQuery>) -> ApiResult<TokenPair> {
    let pair = UserService::new(state.pool)
        .refresh(&state.tokens, &query.refresh_token)
        .await?;
    Ok(ApiResponse::success(pair))
}
