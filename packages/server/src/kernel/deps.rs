//! Server dependencies for route handlers (using traits for testability)
//!
//! This module provides the central dependency container shared by all
//! routes. External services sit behind trait abstractions so tests can
//! swap them out.

use anyhow::Result;
use async_trait::async_trait;
use mailer::MailerService;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::domains::bookings::BookingEngine;
use crate::kernel::{BaseMailer, BaseReportRenderer};

// =============================================================================
// MailerService Adapter (implements BaseMailer trait)
// =============================================================================

/// Wrapper around the SMTP `MailerService` that implements BaseMailer
pub struct SmtpMailerAdapter(pub Arc<MailerService>);

impl SmtpMailerAdapter {
    pub fn new(service: Arc<MailerService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseMailer for SmtpMailerAdapter {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        self.0
            .send_text(to, subject, body)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// Noop Mailer (used when SMTP is unconfigured)
// =============================================================================

/// Logs instead of sending. Keeps local development and SMTP-less
/// deployments working without credentials.
pub struct NoopMailer;

#[async_trait]
impl BaseMailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        tracing::info!(to = %to, subject = %subject, "mail suppressed (SMTP not configured)");
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to route handlers
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Booking availability and lifecycle engine
    pub engine: BookingEngine,
    /// JWT service for token creation
    pub jwt_service: Arc<JwtService>,
    pub mailer: Arc<dyn BaseMailer>,
    pub report_renderer: Arc<dyn BaseReportRenderer>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: PgPool,
        engine: BookingEngine,
        jwt_service: Arc<JwtService>,
        mailer: Arc<dyn BaseMailer>,
        report_renderer: Arc<dyn BaseReportRenderer>,
    ) -> Self {
        Self {
            db_pool,
            engine,
            jwt_service,
            mailer,
            report_renderer,
        }
    }
}
