use std::future::Future;

use anyhow::{Context, Result};
use reqwest::Client;
use thiserror::Error;

use crate::config::GenerationConfig;

use super::{
    inference::{build_request, parse_response},
    offline,
};

/// Anything that turns a (system instruction, user message) pair into text.
/// Implementations never fail: unavailable or broken backends answer through
/// the offline responder instead.
pub trait TextGenerator {
    fn generate(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> impl Future<Output = String> + Send;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendUnavailable {
    #[error("no API credential configured")]
    MissingCredential,
    #[error("offline mode forced")]
    Forced,
    #[error("HTTP client could not be constructed: {0}")]
    HttpClient(String),
}

/// Chat-completions backend reached over HTTP.
#[derive(Clone)]
pub struct LiveBackend {
    http: Client,
    api_key: String,
    config: GenerationConfig,
}

impl LiveBackend {
    pub fn new(http: Client, config: GenerationConfig) -> Result<Self, BackendUnavailable> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(BackendUnavailable::MissingCredential)?;
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Single round-trip to the backend. Errors are returned as-is; callers
    /// wanting the never-fails contract go through [`TextGenerator`].
    pub async fn complete(&self, system_instruction: &str, user_message: &str) -> Result<String> {
        let request = build_request(
            self.config.model.clone(),
            self.config.temperature,
            system_instruction,
            user_message,
        );
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.config.api_url))?
            .error_for_status()?;

        parse_response(response).await
    }
}

impl TextGenerator for LiveBackend {
    async fn generate(&self, system_instruction: &str, user_message: &str) -> String {
        match self.complete(system_instruction, user_message).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    target: "ai",
                    error = ?err,
                    model = %self.config.model,
                    "live generation failed; falling back to offline responder"
                );
                offline::respond(system_instruction, user_message)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

impl TextGenerator for OfflineBackend {
    async fn generate(&self, system_instruction: &str, user_message: &str) -> String {
        offline::respond(system_instruction, user_message)
    }
}

/// The backend chosen once at startup.
#[derive(Clone)]
pub enum GenerationClient {
    Live(LiveBackend),
    Offline(OfflineBackend),
}

impl GenerationClient {
    pub fn from_config(config: &GenerationConfig, force_offline: bool) -> Self {
        match Self::try_live(config, force_offline) {
            Ok(live) => {
                tracing::info!(
                    target: "ai",
                    model = %live.model(),
                    "using live generation backend"
                );
                GenerationClient::Live(live)
            }
            Err(reason) => {
                if let BackendUnavailable::HttpClient(_) = reason {
                    tracing::warn!(
                        target: "ai",
                        reason = %reason,
                        "live backend unavailable; using offline responder"
                    );
                } else {
                    tracing::debug!(target: "ai", reason = %reason, "using offline responder");
                }
                GenerationClient::Offline(OfflineBackend)
            }
        }
    }

    fn try_live(
        config: &GenerationConfig,
        force_offline: bool,
    ) -> Result<LiveBackend, BackendUnavailable> {
        if force_offline {
            return Err(BackendUnavailable::Forced);
        }
        if config.api_key.is_none() {
            return Err(BackendUnavailable::MissingCredential);
        }
        let http = Client::builder()
            .user_agent(format!("mail-prompt-agent/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| BackendUnavailable::HttpClient(err.to_string()))?;
        LiveBackend::new(http, config.clone())
    }

    pub fn is_live(&self) -> bool {
        matches!(self, GenerationClient::Live(_))
    }
}

impl TextGenerator for GenerationClient {
    async fn generate(&self, system_instruction: &str, user_message: &str) -> String {
        match self {
            GenerationClient::Live(live) => live.generate(system_instruction, user_message).await,
            GenerationClient::Offline(offline) => {
                offline.generate(system_instruction, user_message).await
            }
        }
    }
}
