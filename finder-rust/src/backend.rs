use crate::SessionConfig;
use bbp_sdk::{
    openai::{OpenAIClient, OpenAIClientOptions},
    DocumentIndex, ResponsesService,
};
use std::sync::Arc;

/// Everything a session needs from the remote service.
pub trait Backend: DocumentIndex + ResponsesService {}

impl<T: DocumentIndex + ResponsesService> Backend for T {}

/// Builds a backend from the session's credential. Only called once the
/// session has checked that an API key is present.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &SessionConfig) -> Arc<dyn Backend>;
}

/// Connects to the `OpenAI` API (or a compatible endpoint set through the
/// session's base URL).
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAIConnector;

impl Connector for OpenAIConnector {
    fn connect(&self, config: &SessionConfig) -> Arc<dyn Backend> {
        Arc::new(OpenAIClient::new(OpenAIClientOptions {
            base_url: config.base_url().map(ToString::to_string),
            api_key: config.api_key().to_string(),
            ..Default::default()
        }))
    }
}

/// A shared backend hands out itself regardless of the credential.
impl<T: Backend + 'static> Connector for Arc<T> {
    fn connect(&self, _config: &SessionConfig) -> Arc<dyn Backend> {
        self.clone()
    }
}
