//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the route table and the shared application context
//! - Wrap the dispatcher in the middleware chain
//! - Bind to a listener and serve until shutdown
//! - Resolve each request to an action (or the rate-limit action) and dispatch it

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

use crate::actions::errors::RateLimitExceeded;
use crate::actions::{dispatch, factory, ActionFactory, Problem, RequestContext};
use crate::app::{AppContext, SharedApp};
use crate::config::HorizonConfig;
use crate::data::LedgerSource;
use crate::http::middleware::MiddlewareChain;
use crate::lifecycle::Shutdown;
use crate::observability::MetricsRegistry;
use crate::routing::{install_actions, RouteError, Router as ActionRouter};

/// HTTP server for the ledger API.
pub struct HttpServer {
    router: Router,
    app: SharedApp,
}

impl HttpServer {
    /// Create a server with a fresh metrics registry.
    pub fn new(
        config: HorizonConfig,
        source: Arc<dyn LedgerSource>,
        shutdown: Shutdown,
    ) -> Result<Self, RouteError> {
        Self::with_metrics(config, source, MetricsRegistry::new(), shutdown)
    }

    pub fn with_metrics(
        config: HorizonConfig,
        source: Arc<dyn LedgerSource>,
        metrics: MetricsRegistry,
        shutdown: Shutdown,
    ) -> Result<Self, RouteError> {
        let routes = Arc::new(install_actions(&config.routes)?);
        let app = Arc::new(AppContext::new(config, source, metrics, shutdown));
        let router = Self::build_router(routes, app.clone());
        Ok(Self { router, app })
    }

    fn build_router(routes: Arc<ActionRouter>, app: SharedApp) -> Router {
        let dispatcher = Router::new()
            .fallback(dispatch_request)
            .with_state(routes.clone());
        MiddlewareChain::standard().apply(dispatcher, routes, app)
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn app(&self) -> &SharedApp {
        &self.app
    }

    /// Serve on `listener` until the shutdown coordinator fires.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let mut shutdown = self.app.shutdown().subscribe();
        let service = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler behind the middleware chain.
async fn dispatch_request(State(routes): State<Arc<ActionRouter>>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();

    let Some(app) = parts.extensions.get::<SharedApp>().cloned() else {
        tracing::error!("Request reached the dispatcher without an application context");
        return Problem::ServerError("missing application context".into()).into_response();
    };

    let client = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let matched = routes.resolve(&parts.method, parts.uri.path());
    let action: ActionFactory = if app.is_throttled(&client) {
        tracing::warn!(client = %client, "Client throttled");
        factory::<RateLimitExceeded>
    } else {
        matched.factory
    };

    let ctx = RequestContext::new(&parts, matched.params, app);
    dispatch(action, ctx).await
}
