//! HTTP host for the user directory: owns the router, the global middleware
//! stack, the OpenAPI document and the listening socket.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
pub mod error;
pub mod openapi;
pub mod request_id;
pub mod web;

pub use config::ApiIngressConfig;
pub use error::ErrorResponse;

/// Assembles module routes behind the shared middleware stack.
#[derive(Debug, Clone)]
pub struct ApiIngress {
    config: ApiIngressConfig,
    request_timeout: Option<Duration>,
    expose_internal_errors: bool,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            request_timeout: None,
            expose_internal_errors: false,
        }
    }

    /// Per-request timeout; `None` or zero disables it.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Echo panic messages in 500 bodies (development only).
    pub fn with_internal_errors_exposed(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    fn cors_layer(&self) -> Result<CorsLayer> {
        let origin = self.config.cors_origin.trim();
        if origin == "*" {
            return Ok(CorsLayer::permissive());
        }
        let origin = HeaderValue::from_str(origin)
            .with_context(|| format!("Invalid CORS origin '{origin}'"))?;
        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([Method::GET, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, request_id::header()])
            .allow_credentials(true))
    }

    /// Build the HTTP router from module routes and their OpenAPI documents.
    pub fn build_router(
        &self,
        module_routes: Router,
        module_docs: Vec<utoipa::openapi::OpenApi>,
    ) -> Result<Router> {
        tracing::debug!("Building router");
        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(module_routes);

        if self.config.enable_docs {
            // Serialized once; every request gets the same bytes.
            let doc = Arc::new(serde_json::to_value(openapi::build_openapi(module_docs))?);
            router = router.route(
                "/openapi.json",
                get(move || {
                    let doc = doc.clone();
                    async move {
                        ([(header::CACHE_CONTROL, "no-store")], Json((*doc).clone())).into_response()
                    }
                }),
            );
        }

        router = router
            .method_not_allowed_fallback(error::route_not_found)
            .fallback(error::route_not_found);

        // Layers wrap everything added before them, so the list below runs
        // innermost first: body limit .. request id.
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(self.cors_layer()?);
        }

        if let Some(timeout) = self.request_timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        let expose = self.expose_internal_errors;
        router = router.layer(CatchPanicLayer::custom(move |payload| {
            error::panic_response(payload, expose)
        }));

        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(request_id::make_span)
                .on_response(request_id::record_response),
        );

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn bind_and_serve<F>(router: Router, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Self::serve(listener, router, shutdown).await
    }

    /// Serve on an already bound listener, draining in-flight requests on shutdown.
    pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener.local_addr()?;
        tracing::info!("HTTP server bound on {}", local);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
