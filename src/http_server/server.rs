//! # HTTP Server
//!
//! Combines the health and table routers into one Axum server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::health_routes::health_routes;
use super::table_routes::table_routes;
use crate::catalog::CatalogService;
use crate::config::HttpConfig;

/// HTTP server for the table API
pub struct HttpServer {
    config: HttpConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over the given catalog
    pub fn new(config: HttpConfig, catalog: Arc<CatalogService>) -> Self {
        let router = Self::build_router(&config, catalog);
        Self { config, router }
    }

    fn build_router(config: &HttpConfig, catalog: Arc<CatalogService>) -> Router {
        let methods = [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ];

        // An empty origin list allows any origin
        let origin = if config.cors_origins.is_empty() {
            AllowOrigin::from(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            AllowOrigin::list(origins)
        };

        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .merge(health_routes())
            .nest("/api", table_routes(catalog))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid listen address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "tabula listening");

        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
