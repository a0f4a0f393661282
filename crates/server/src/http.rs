use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use api::auth::{decode_token, token_from_headers, AuthConfig, CurrentUser};
use async_graphql::{http::GraphiQLSource, EmptySubscription, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    response::Html,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

pub type HrSchema = Schema<api::schema::QueryRoot, api::schema::MutationRoot, EmptySubscription>;

#[derive(Clone)]
pub struct AppState {
    pub schema: HrSchema,
    pub auth: Arc<AuthConfig>,
    pub cors_allowed_origins: Arc<Vec<String>>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let layer = CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([Method::POST, Method::GET]);
    if allowed.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_credentials(true)
            .allow_origin(AllowOrigin::list(allowed))
    }
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    let cors = cors_layer(&state.cors_allowed_origins);
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/graphiql", get(graphiql_handler))
        .route("/graphql", get(graphql_handler).post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn graphiql_handler() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(user) = authenticate(&state.auth, &headers) {
        request = request.data(user);
    }
    state.schema.execute(request).await.into()
}

/// Resolves the caller from a bearer token or session cookie; invalid tokens
/// are treated as anonymous.
fn authenticate(auth: &AuthConfig, headers: &HeaderMap) -> Option<CurrentUser> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    let token = token_from_headers(authorization, cookie)?;
    match decode_token(&token, auth) {
        Ok(claims) => Some(CurrentUser::from_claims(claims)),
        Err(err) => {
            debug!(error = %err, "rejected bearer token");
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
