//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod report;
pub mod test_dependencies;
pub mod traits;

pub use deps::{NoopMailer, ServerDeps, SmtpMailerAdapter};
pub use report::{BookingReport, HtmlReportRenderer};
pub use test_dependencies::{SentMail, SpyMailer};
pub use traits::*;
