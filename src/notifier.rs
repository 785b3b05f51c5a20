use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub const TWILIO_API_URL: &str = "https://api.twilio.com";

/// Dedicated Twilio number the alerts are sent from.
pub const SMS_SENDER: &str = "+18444197426";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMS request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("SMS provider rejected message ({status}): {detail}")]
    Rejected { status: StatusCode, detail: String },
}

/// Seam for stubbing the notifier in driver tests.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Sends one message and returns the provider-assigned message SID.
    async fn send(&self, to: &str, body: &str) -> Result<String, NotifyError>;
}

/// Sends SMS messages through the Twilio REST API.
pub struct SmsNotifier {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
}

/// Fields of the Twilio message resource we care about.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

impl SmsNotifier {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self::with_base_url(TWILIO_API_URL, account_sid, auth_token)
    }

    /// Point the notifier at a different base URL (used by tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Sends one SMS via the create-message operation. Each call is one
    /// billable outbound message; the send-once guard lives in the caller.
    pub async fn send(&self, to: &str, body: &str) -> Result<String, NotifyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", SMS_SENDER), ("To", to), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, detail });
        }

        let message: MessageResource = response.json().await?;
        tracing::info!("SMS message {} sent to {}", message.sid, to);

        Ok(message.sid)
    }
}

#[async_trait]
impl Notify for SmsNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<String, NotifyError> {
        SmsNotifier::send(self, to, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_send_posts_create_message_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("From".into(), SMS_SENDER.into()),
                Matcher::UrlEncoded("To".into(), "+15551234567".into()),
                Matcher::UrlEncoded("Body".into(), "test".into()),
            ]))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"sid":"SM123","status":"queued"}"#)
            .expect(1)
            .create_async()
            .await;

        let notifier = SmsNotifier::with_base_url(server.url(), "AC123", "secret");
        let sid = notifier.send("+15551234567", "test").await.unwrap();

        assert_eq!(sid, "SM123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_fails_when_provider_rejects() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(401)
            .with_body(r#"{"code":20003,"message":"Authenticate"}"#)
            .create_async()
            .await;

        let notifier = SmsNotifier::with_base_url(server.url(), "AC123", "wrong-token");
        let err = notifier.send("+15551234567", "test").await.unwrap_err();

        assert!(matches!(
            err,
            NotifyError::Rejected { status, .. } if status == 401
        ));
    }

    #[tokio::test]
    async fn test_send_is_not_idempotent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(201)
            .with_body(r#"{"sid":"SM123"}"#)
            .expect(2)
            .create_async()
            .await;

        let notifier = SmsNotifier::with_base_url(server.url(), "AC123", "secret");
        notifier.send("+15551234567", "one").await.unwrap();
        notifier.send("+15551234567", "two").await.unwrap();

        mock.assert_async().await;
    }
}
