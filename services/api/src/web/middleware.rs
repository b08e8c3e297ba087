//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for the GraphQL endpoint.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::state::AppState;

/// Middleware that verifies an optional bearer token and attaches the
/// resulting `RequestContext` to the request extensions.
///
/// Requests are never rejected here: a missing or invalid token simply yields
/// an anonymous context, and the resolvers that need an identity refuse it.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    // 1. Extract bearer token
    let token = bearer_token(req.headers());

    // 2. Verify it and build the context
    let ctx = state.service.authenticate(token.as_deref());

    // 3. Insert the context into request extensions
    req.extensions_mut().insert(ctx);

    // 4. Continue to the handler
    next.run(req).await
}

/// Reads `Authorization: Bearer <token>`. The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}
