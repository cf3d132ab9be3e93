//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use mailer::{MailerOptions, MailerService};
use sqlx::PgPool;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::domains::bookings::BookingEngine;
use crate::kernel::{
    BaseMailer, HtmlReportRenderer, NoopMailer, ServerDeps, SmtpMailerAdapter,
};
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    approve_booking_handler, booking_report_handler, cancel_booking_handler,
    check_availability_handler, create_address_handler, create_booking_handler,
    create_room_handler, delete_address_handler, get_booking_handler, get_room_handler,
    health_handler, list_addresses_handler, list_all_bookings_handler, list_own_bookings_handler,
    list_rooms_handler, list_users_handler, login_handler, profile_handler,
    register_admin_handler, register_handler, set_active_address_handler,
    update_address_handler, update_booking_handler, update_profile_handler, update_room_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub engine: BookingEngine,
    pub server_deps: Arc<ServerDeps>,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application from configuration.
///
/// Wires the production dependencies: SMTP mail when configured (a logging
/// noop otherwise), the HTML report renderer, and the booking engine with
/// the configured policy.
pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    let mailer: Arc<dyn BaseMailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailerAdapter::new(Arc::new(MailerService::new(
            MailerOptions {
                smtp_host: smtp.host.clone(),
                smtp_port: smtp.port,
                smtp_username: smtp.username.clone(),
                smtp_password: smtp.password.clone(),
                from_address: smtp.from_address.clone(),
                from_name: smtp.from_name.clone(),
            },
        )))),
        None => Arc::new(NoopMailer),
    };

    let engine = BookingEngine::new(pool.clone(), config.booking_policy);

    let server_deps = Arc::new(ServerDeps::new(
        pool.clone(),
        engine.clone(),
        jwt_service.clone(),
        mailer,
        Arc::new(HtmlReportRenderer),
    ));

    let app_state = AppState {
        db_pool: pool,
        engine,
        server_deps,
        jwt_service: jwt_service.clone(),
    };

    build_router(app_state, jwt_service)
}

/// Build the router from prepared state.
///
/// Split from `build_app` so tests can inject spy dependencies.
pub fn build_router(app_state: AppState, jwt_service: Arc<JwtService>) -> Router {
    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Rate limiting: 10 requests per second per IP with bursts up to 20.
    // Prevents API abuse, DoS attacks, and resource exhaustion.
    let rate_limit_config = std::sync::Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            // X-Forwarded-For first (proxy deployments), peer address otherwise
            .key_extractor(SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Authentication
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        // Admin: accounts and inventory
        .route("/api/admin/register-admin", post(register_admin_handler))
        .route("/api/admin/users", get(list_users_handler))
        .route("/api/admin/rooms", post(create_room_handler))
        .route("/api/admin/rooms/:id", put(update_room_handler))
        // Profile
        .route("/api/user/profile", get(profile_handler))
        .route("/api/user", put(update_profile_handler))
        // Room catalog (public)
        .route("/api/rooms", get(list_rooms_handler))
        .route("/api/rooms/:id", get(get_room_handler))
        // Bookings
        .route(
            "/api/bookings/check-availability",
            get(check_availability_handler),
        )
        .route(
            "/api/bookings",
            post(create_booking_handler).get(list_own_bookings_handler),
        )
        .route("/api/bookings/all", get(list_all_bookings_handler))
        .route(
            "/api/bookings/:id",
            get(get_booking_handler).put(update_booking_handler),
        )
        .route("/api/bookings/:id/approve", put(approve_booking_handler))
        .route("/api/bookings/:id/cancel", put(cancel_booking_handler))
        .route("/api/bookings/:id/report", get(booking_report_handler))
        // Address book
        .route(
            "/api/addresses",
            get(list_addresses_handler).post(create_address_handler),
        )
        .route(
            "/api/addresses/:id",
            put(update_address_handler).delete(delete_address_handler),
        )
        .route(
            "/api/addresses/:id/set-active",
            put(set_active_address_handler),
        )
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        })) // JWT authentication
        .layer(rate_limit_layer)
        .layer(Extension(app_state)) // Add shared state (must be after middlewares that need it)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
