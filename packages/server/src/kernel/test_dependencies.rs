// Test dependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::BaseMailer;

// =============================================================================
// Spy Mailer
// =============================================================================

/// A mail sent through the spy
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records every send so tests can assert on notification behavior.
#[derive(Clone, Default)]
pub struct SpyMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl SpyMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next send fail, for testing best-effort delivery paths.
    pub fn fail_next(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseMailer for SpyMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let mut fail = self.fail_next.lock().unwrap();
        if *fail {
            *fail = false;
            anyhow::bail!("simulated mailer outage");
        }
        drop(fail);

        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spy_records_sends() {
        let spy = SpyMailer::new();
        spy.send("maya@example.com", "Welcome", "Hello!").await.unwrap();

        let sent = spy.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "maya@example.com");
        assert_eq!(sent[0].subject, "Welcome");
    }

    #[tokio::test]
    async fn test_fail_next_fails_once() {
        let spy = SpyMailer::new();
        spy.fail_next();

        assert!(spy.send("a@example.com", "s", "b").await.is_err());
        assert!(spy.send("a@example.com", "s", "b").await.is_ok());
        assert_eq!(spy.sent_count(), 1);
    }
}
