use crate::config::WidgetConfig;
use crate::payload::LeadPayload;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("submit callback failed: {0}")]
    Callback(String),
}

/// Pluggable mechanism by which a collected lead leaves the widget. Selected
/// once at configuration time; the engine never branches on the kind.
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    async fn deliver(&self, payload: &LeadPayload) -> Result<(), TransportError>;
}

/// `POST`s the lead as JSON to a configured webhook. Any non-success status
/// counts as a failed delivery.
pub struct WebhookTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl WebhookTransport {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl SubmitTransport for WebhookTransport {
    async fn deliver(&self, payload: &LeadPayload) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }
        debug!(%status, "webhook accepted lead");
        Ok(())
    }
}

type BoxedSubmitFn = dyn Fn(LeadPayload) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send>>
    + Send
    + Sync;

/// Hands the lead to a caller-supplied async function instead of the network.
/// An error returned by the callback is treated exactly like a failed request.
pub struct CallbackTransport {
    callback: Box<BoxedSubmitFn>,
}

impl CallbackTransport {
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(LeadPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        Self {
            callback: Box::new(move |payload| Box::pin(callback(payload))),
        }
    }
}

#[async_trait]
impl SubmitTransport for CallbackTransport {
    async fn deliver(&self, payload: &LeadPayload) -> Result<(), TransportError> {
        (self.callback)(payload.clone())
            .await
            .map_err(TransportError::Callback)
    }
}

/// Fallback when neither a webhook nor a callback is configured: log the lead
/// and report success, matching the script variant's console default.
#[derive(Default)]
pub struct NullTransport;

#[async_trait]
impl SubmitTransport for NullTransport {
    async fn deliver(&self, payload: &LeadPayload) -> Result<(), TransportError> {
        info!(?payload, "no transport configured; lead logged only");
        Ok(())
    }
}

/// Build the transport the configuration calls for. A caller-supplied
/// callback wins over the webhook endpoint.
pub fn for_config(
    config: &WidgetConfig,
    callback: Option<CallbackTransport>,
) -> Arc<dyn SubmitTransport> {
    if let Some(callback) = callback {
        return Arc::new(callback);
    }
    match &config.endpoint_url {
        Some(endpoint) => Arc::new(WebhookTransport::new(endpoint.clone())),
        None => {
            info!("no endpoint configured; using null transport");
            Arc::new(NullTransport)
        }
    }
}
