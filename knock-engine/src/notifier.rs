use std::time::Duration;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::types::NotifyResponse;

/// Outbound notification collaborator: a bare POST, no headers, no body, no
/// auth. Timeout enforcement is this collaborator's responsibility — the
/// detection loop imposes none of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, url: &str) -> Result<NotifyResponse, NotifyError>;
}

/// Upper bound on a single notification attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Production notifier backed by reqwest.
pub struct HttpNotifier {
    client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new() -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn post(&self, url: &str) -> Result<NotifyResponse, NotifyError> {
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        Ok(NotifyResponse { status, body })
    }
}
