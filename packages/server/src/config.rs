use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::bookings::BookingPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub smtp: Option<SmtpConfig>,
    pub booking_policy: BookingPolicy,
}

/// SMTP settings for outbound mail. Optional: when absent the server logs
/// mail instead of sending it.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "harborview-stays".to_string()),
            smtp: SmtpConfig::from_env()?,
            booking_policy: booking_policy_from_env()?,
        })
    }
}

impl SmtpConfig {
    /// SMTP_HOST switches mail on; the remaining credentials are then required.
    fn from_env() -> Result<Option<Self>> {
        let Ok(host) = env::var("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            host,
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .context("SMTP_PORT must be a valid number")?,
            username: env::var("SMTP_USERNAME")
                .context("SMTP_USERNAME must be set when SMTP_HOST is set")?,
            password: env::var("SMTP_PASSWORD")
                .context("SMTP_PASSWORD must be set when SMTP_HOST is set")?,
            from_address: env::var("SMTP_FROM_ADDRESS")
                .context("SMTP_FROM_ADDRESS must be set when SMTP_HOST is set")?,
            from_name: env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Harborview Stays".to_string()),
        }))
    }
}

fn booking_policy_from_env() -> Result<BookingPolicy> {
    let defaults = BookingPolicy::default();

    Ok(BookingPolicy {
        lead_time_days: env::var("BOOKING_LEAD_TIME_DAYS")
            .map(|v| v.parse())
            .unwrap_or(Ok(defaults.lead_time_days))
            .context("BOOKING_LEAD_TIME_DAYS must be a valid number")?,
        max_user_bookings_per_day: env::var("BOOKING_USER_DAILY_LIMIT")
            .map(|v| v.parse())
            .unwrap_or(Ok(defaults.max_user_bookings_per_day))
            .context("BOOKING_USER_DAILY_LIMIT must be a valid number")?,
        max_system_bookings_per_day: env::var("BOOKING_SYSTEM_DAILY_LIMIT")
            .map(|v| v.parse())
            .unwrap_or(Ok(defaults.max_system_bookings_per_day))
            .context("BOOKING_SYSTEM_DAILY_LIMIT must be a valid number")?,
    })
}
