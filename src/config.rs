use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use std::env;

use crate::availability::ParkCode;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub subscribed_phone_number: String,
    pub port: u16,
    pub poll_interval_secs: u64,
    pub park_code: ParkCode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID")
                .context("TWILIO_ACCOUNT_SID must be set")?,
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN")
                .context("TWILIO_AUTH_TOKEN must be set")?,
            subscribed_phone_number: env::var("SUBSCRIBED_PHONE_NUMBER")
                .context("SUBSCRIBED_PHONE_NUMBER must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("POLL_INTERVAL_SECS must be a valid number")?,
            park_code: ParkCode(
                env::var("PARK_CODE")
                    .unwrap_or_else(|_| "80007944".to_string())
                    .parse()
                    .context("PARK_CODE must be a numeric park code")?,
            ),
            start_date: date_var("START_DATE", "2023-04-08")?,
            end_date: date_var("END_DATE", "2023-04-08")?,
        };

        ensure!(
            config.start_date <= config.end_date,
            "START_DATE must not be after END_DATE"
        );
        ensure!(
            config.poll_interval_secs > 0,
            "POLL_INTERVAL_SECS must be at least 1"
        );

        Ok(config)
    }
}

fn date_var(name: &str, default: &str) -> Result<NaiveDate> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .with_context(|| format!("{} must be a YYYY-MM-DD date", name))
}
