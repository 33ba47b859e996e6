//! # Appointly API
//!
//! HTTP boundary for the Appointly booking service. Handlers translate
//! requests into calls on the `appointly-core` services and map their
//! `AgendaError`s to status codes.
//!
//! ## Architecture
//!
//! - **Routes**: URL structure, one module per resource
//! - **Handlers**: extract input, call a service, shape the response
//! - **Middleware**: caller identity and error mapping
//! - **Config**: environment-driven server settings
//!
//! Persistence is injected through the core ports, so the same router runs
//! over PostgreSQL in production and over in-memory stores in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Caller identity and error mapping
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use appointly_core::clock::Clock;
use appointly_core::queue::NotificationQueue;
use appointly_core::repositories::{AppointmentStore, NotificationStore, UserDirectory};
use appointly_core::services::{
    AvailabilityService, CancellationPolicy, NotificationService, SchedulingService,
};
use axum::Router;
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// Every service is built over the same set of ports, so a booking made
/// through `scheduling` is immediately visible to `availability`.
pub struct ApiState {
    pub scheduling: SchedulingService,
    pub cancellation: CancellationPolicy,
    pub availability: AvailabilityService,
    pub notifications: NotificationService,
}

impl ApiState {
    /// Wires the services over one set of ports.
    ///
    /// `queue` only needs its handlers registered; the API process enqueues
    /// but never consumes.
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        users: Arc<dyn UserDirectory>,
        notifications: Arc<dyn NotificationStore>,
        queue: Arc<NotificationQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scheduling: SchedulingService::new(
                appointments.clone(),
                users.clone(),
                notifications.clone(),
                clock.clone(),
            ),
            cancellation: CancellationPolicy::new(appointments.clone(), users.clone(), queue, clock.clone()),
            availability: AvailabilityService::new(appointments, clock),
            notifications: NotificationService::new(notifications, users),
        }
    }
}

/// Builds the application router with every route attached to `state`.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Booking, listing and cancellation
        .merge(routes::appointments::routes())
        // Provider availability and day schedule
        .merge(routes::availability::routes())
        .merge(routes::schedule::routes())
        // Provider inbox
        .merge(routes::notifications::routes())
        .with_state(state)
}

/// Starts the API server with the provided configuration and state
///
/// Installs the global tracing subscriber, applies CORS and request timeout
/// layers, then serves until the process is stopped.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// let state = Arc::new(ApiState::new(appointments, users, notifications, queue, clock));
/// start_server(config, state).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let app = build_router(state).layer(TraceLayer::new_for_http());

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse()
                    .wrap_err_with(|| format!("Invalid CORS origin '{origin}'"))
            })
            .collect::<Result<Vec<axum::http::HeaderValue>>>()?;

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
                axum::http::HeaderName::from_static(middleware::auth::USER_ID_HEADER),
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(middleware::error_handling::handle_timeout))
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .into_inner(),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
