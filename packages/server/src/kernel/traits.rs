// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like "send the welcome mail") lives in domain/route code
// that uses these traits.
//
// Naming convention: Base* for trait names (e.g., BaseMailer)

use anyhow::Result;
use async_trait::async_trait;

use super::report::BookingReport;

// =============================================================================
// Mailer Trait (Infrastructure - outbound notifications)
// =============================================================================

#[async_trait]
pub trait BaseMailer: Send + Sync {
    /// Send a plain-text message to one recipient
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

// =============================================================================
// Report Renderer Trait (Infrastructure - booking documents)
// =============================================================================

pub trait BaseReportRenderer: Send + Sync {
    /// MIME type of documents produced by this renderer
    fn content_type(&self) -> &'static str;

    /// Render a booking report to a document body
    fn render(&self, report: &BookingReport) -> Result<Vec<u8>>;
}
