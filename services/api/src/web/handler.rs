//! services/api/src/web/handler.rs
//!
//! Axum handlers for the GraphQL endpoint, the GraphiQL playground and the
//! health check, plus the router that ties them together.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    middleware as axum_middleware,
    response::{Html, IntoResponse},
    routing::get,
    Extension, Json, Router,
};
use reading_list_core::RequestContext;
use std::sync::Arc;

use crate::web::{middleware::resolve_identity, state::AppState};

/// Builds the application router. CORS and tracing layers are added by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    let graphql_routes = Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(graphql_routes)
        .with_state(state)
}

/// POST /graphql - execute a query or mutation with the caller's context
pub async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner().data(ctx);
    state.schema.execute(request).await.into()
}

/// GET /graphql - GraphiQL playground (only for browsers)
pub async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

/// GET /health - liveness probe, reporting which storage backend is active
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "storage": state.config.storage.name(),
    }))
}
