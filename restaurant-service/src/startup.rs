//! Service lifecycle: connect storage, bind the listener, serve, shut down.

use crate::config::RestaurantConfig;
use crate::handlers;
use crate::services::{MongoRestaurantRepository, RestaurantRepository};
use axum::{
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{make_request_span, metrics_middleware, request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn RestaurantRepository>,
}

/// Routes of the restaurant API plus health and metrics endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/restaurants",
            get(handlers::list_restaurants)
                .post(handlers::create_restaurant)
                .fallback(handlers::not_found),
        )
        .route(
            "/restaurants/:id",
            get(handlers::get_restaurant)
                .put(handlers::update_restaurant)
                .delete(handlers::delete_restaurant)
                .fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| make_request_span(request)),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// A service whose storage is connected and whose listener is bound, but which
/// is not serving yet.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect to MongoDB and bind the configured port.
    pub async fn build(config: RestaurantConfig) -> Result<Self, AppError> {
        let repository =
            MongoRestaurantRepository::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;

        Self::build_with_repository(config, Arc::new(repository)).await
    }

    /// Bind the configured port in front of an already connected repository.
    ///
    /// If binding fails the repository is disconnected before the error is
    /// returned, so a failed start leaves nothing open.
    pub async fn build_with_repository(
        config: RestaurantConfig,
        repository: Arc<dyn RestaurantRepository>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let bound = match TcpListener::bind(addr).await {
            Ok(listener) => listener.local_addr().map(|local| (listener, local.port())),
            Err(e) => Err(e),
        };

        let (listener, port) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
                if let Err(disconnect_err) = repository.disconnect().await {
                    tracing::error!("Failed to disconnect repository: {}", disconnect_err);
                }
                return Err(AppError::from(e));
            }
        };

        tracing::info!("Your app is listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState { repository },
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until `shutdown` resolves, then disconnect storage.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let repository = self.state.repository.clone();

        let result = axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await;

        if let Err(e) = repository.disconnect().await {
            tracing::error!("Failed to disconnect repository: {}", e);
        }

        result
    }

    /// Serve in a background task. The returned handle stops the service.
    pub fn spawn(self) -> RunningApplication {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let port = self.port;
        let repository = self.state.repository.clone();

        let server = axum::serve(self.listener, router(self.state)).with_graceful_shutdown(
            async move {
                let _ = shutdown_rx.await;
            },
        );
        let handle = tokio::spawn(async move { server.await });

        RunningApplication {
            port,
            repository,
            shutdown_tx,
            handle,
        }
    }
}

/// Handle to a service started with [`Application::spawn`].
pub struct RunningApplication {
    port: u16,
    repository: Arc<dyn RestaurantRepository>,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl RunningApplication {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Close the storage connection, then the listener. Completes once both are
    /// closed.
    pub async fn stop(self) -> Result<(), AppError> {
        self.repository.disconnect().await?;

        tracing::info!("Closing server");
        // The receiver only disappears if the server task already ended.
        let _ = self.shutdown_tx.send(());

        self.handle
            .await
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))??;
        Ok(())
    }
}
