use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::jwt::AuthError;
use crate::infra::{app_state::AppState, errors::AppError};

/// The verified caller, inserted into request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = {
        let token = extract_bearer_token(&request)?;
        state.token_verifier.verify(token)?
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });
    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Result<&str, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}
