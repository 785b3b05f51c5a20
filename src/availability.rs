use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Walt Disney World availability-calendar API.
pub const CALENDAR_API_URL: &str = "https://disneyworld.disney.go.com/availability-calendar/api";

/// Status value meaning every park has open reservations for the window.
const FULLY_AVAILABLE: &str = "full";

/// Numeric park code used by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParkCode(pub u64);

impl ParkCode {
    /// Human-readable park name for message text.
    pub fn display_name(self) -> String {
        match self.0 {
            80007944 => "Magic Kingdom".to_string(),
            80007823 => "Epcot".to_string(),
            80007838 => "Animal Kingdom".to_string(),
            80007998 => "Disney's Hollywood Studios".to_string(),
            code => format!("park {}", code),
        }
    }
}

/// The park and date range being tracked. Built once at startup and
/// immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct CheckWindow {
    pub park: ParkCode,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One record of the calendar API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationWindow {
    pub availability: String,
    pub parks: Vec<u64>,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("calendar request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("calendar API returned status {0}")]
    Status(StatusCode),

    #[error("unexpected calendar response body: {0}")]
    Body(#[source] serde_json::Error),
}

/// Seam for stubbing the availability check in driver tests.
#[async_trait]
pub trait AvailabilityCheck: Send + Sync {
    async fn check_availability(&self, window: &CheckWindow) -> Result<bool, CheckError>;
}

/// Client for the availability-calendar API.
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new() -> Self {
        Self::with_base_url(CALENDAR_API_URL)
    }

    /// Point the client at a different base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Queries the calendar API for the date range and checks whether the
    /// tracked park has an open reservation. One outbound GET, no retries.
    pub async fn check_availability(&self, window: &CheckWindow) -> Result<bool, CheckError> {
        let url = format!("{}/calendar", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("segment", "tickets".to_string()),
                ("startDate", window.start.format("%Y-%m-%d").to_string()),
                ("endDate", window.end.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status(status));
        }

        let body = response.text().await?;
        let records: Vec<ReservationWindow> =
            serde_json::from_str(&body).map_err(CheckError::Body)?;

        Ok(records
            .iter()
            .any(|record| window_matches(record, window.park)))
    }
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvailabilityCheck for CalendarClient {
    async fn check_availability(&self, window: &CheckWindow) -> Result<bool, CheckError> {
        CalendarClient::check_availability(self, window).await
    }
}

/// A record matches when the window is fully available or the tracked park
/// appears in its park list.
fn window_matches(record: &ReservationWindow, park: ParkCode) -> bool {
    record.availability == FULLY_AVAILABLE || record.parks.contains(&park.0)
}
