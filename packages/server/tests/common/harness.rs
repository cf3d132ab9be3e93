//! Test harness with testcontainers for integration testing.
//!
//! Uses a shared Postgres container across all tests for dramatically
//! improved performance. The container starts and migrations run once on
//! the first test; every test then gets its own connection pool.

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use server_core::common::Actor;
use server_core::domains::auth::JwtService;
use server_core::domains::bookings::{BookingEngine, BookingPolicy};
use server_core::domains::users::User;
use server_core::kernel::{HtmlReportRenderer, ServerDeps, SpyMailer};
use server_core::server::{build_router, AppState};

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    /// Initialize shared infrastructure (container + migrations).
    async fn init() -> Result<Self> {
        // Respect RUST_LOG when tests run with -- --nocapture.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// The database is shared across tests; fixtures generate unique rows and
/// tests book distinct days so they stay independent.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let engine = ctx.engine();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl TestHarness {
    /// Creates a new test harness using the shared container.
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self { db_pool })
    }

    /// A booking engine with the default (production) policy.
    pub fn engine(&self) -> BookingEngine {
        self.engine_with(BookingPolicy::default())
    }

    /// A booking engine with a custom policy, for quota and lead-time tests.
    pub fn engine_with(&self, policy: BookingPolicy) -> BookingEngine {
        BookingEngine::new(self.db_pool.clone(), policy)
    }

    /// A full application wired with spy dependencies, for route tests.
    pub fn app(&self) -> TestApp {
        TestApp::new(self.db_pool.clone(), BookingPolicy::default())
    }
}

/// An in-process application with spy dependencies injected.
pub struct TestApp {
    pub router: Router,
    pub jwt_service: Arc<JwtService>,
    pub mailer: SpyMailer,
    pub db_pool: PgPool,
}

impl TestApp {
    pub fn new(db_pool: PgPool, policy: BookingPolicy) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            "test-only-secret",
            "harborview-test".to_string(),
        ));
        let mailer = SpyMailer::new();
        let engine = BookingEngine::new(db_pool.clone(), policy);

        let server_deps = Arc::new(ServerDeps::new(
            db_pool.clone(),
            engine.clone(),
            jwt_service.clone(),
            Arc::new(mailer.clone()),
            Arc::new(HtmlReportRenderer),
        ));

        let app_state = AppState {
            db_pool: db_pool.clone(),
            engine,
            server_deps,
            jwt_service: jwt_service.clone(),
        };

        let router = build_router(app_state, jwt_service.clone());

        Self {
            router,
            jwt_service,
            mailer,
            db_pool,
        }
    }

    /// Issue a bearer token for a persisted user.
    pub fn token_for(&self, user: &User) -> String {
        self.jwt_service
            .create_token(user.id, user.email.clone(), user.is_admin())
            .expect("token creation should not fail")
    }
}

/// The `Actor` a persisted user acts as.
pub fn actor_for(user: &User) -> Actor {
    Actor {
        user_id: user.id,
        is_admin: user.is_admin(),
    }
}
