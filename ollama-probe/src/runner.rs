//! The sequential diagnostic runner.
//!
//! [`ProbeRunner::run`] performs the two probes in order and writes a plain
//! text report to the given sink:
//!
//! 1. `GET /api/tags`: prints the status and, on `200`, the listing body.
//! 2. `POST /api/chat`: prints the status and either the reply text or the
//!    raw error body.
//!
//! A probe that fails outright (no response, or an undecodable body) prints a
//! single `Error testing Ollama: ...` line. If that happens on the listing
//! probe the chat probe is skipped. Non-200 statuses are reported and the run
//! carries on.

use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use metrics::counter;
#[cfg(feature = "tracing")]
use tracing::{debug, info, instrument, warn};

use crate::config::ProbeConfig;
use crate::types::chat::{ChatRequestMessage, ChatResponse, SimpleChatRequest};
use crate::types::ListModelsResponse;
#[cfg(feature = "tracing")]
use crate::types::OllamaError;
use crate::{Error, OllamaClient, Result};

/// Printed in place of the reply when the chat response carries no text.
pub const NO_CONTENT: &str = "No content";

/// How a single probe ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The endpoint answered `200` and the body was usable.
    Passed { status: u16, latency: Duration },
    /// The endpoint answered with some other status.
    Rejected { status: u16, latency: Duration },
    /// No usable response: transport failure, timeout or undecodable body.
    Failed { error: String },
    /// Not attempted because an earlier probe failed.
    Skipped,
}

impl ProbeOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Passed { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::Failed { .. } | Self::Skipped => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed { status, latency } => {
                write!(f, "passed (HTTP {status}, {}ms)", latency.as_millis())
            }
            Self::Rejected { status, latency } => {
                write!(f, "rejected (HTTP {status}, {}ms)", latency.as_millis())
            }
            Self::Failed { error } => write!(f, "failed: {error}"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of both probes of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub tags: ProbeOutcome,
    pub chat: ProbeOutcome,
}

impl RunReport {
    pub fn all_passed(&self) -> bool {
        self.tags.is_passed() && self.chat.is_passed()
    }
}

pub struct ProbeRunner {
    client: OllamaClient,
    config: ProbeConfig,
}

impl ProbeRunner {
    pub fn new(client: OllamaClient, config: ProbeConfig) -> Self {
        Self { client, config }
    }

    /// Builds a runner talking HTTP to the server described by `config`.
    pub fn from_config(config: ProbeConfig) -> Result<Self> {
        let client = OllamaClient::builder().config(&config)?.build()?;
        Ok(Self::new(client, config))
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// The request the chat probe sends: one user message, no streaming.
    pub fn chat_request(&self) -> SimpleChatRequest {
        SimpleChatRequest::new(self.config.model.clone())
            .add_message(ChatRequestMessage::user(self.config.prompt.clone()))
    }

    /// Runs both probes, writing the report to `out`.
    ///
    /// Probe failures are reported, not returned. The only error is failing to
    /// write to `out`.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub async fn run(&self, out: &mut impl Write) -> Result<RunReport> {
        let tags = match self.probe_tags(out).await {
            Ok(outcome) => outcome,
            Err(error) => {
                let tags = report_failure(out, "tags", error)?;
                return Ok(RunReport {
                    tags,
                    chat: ProbeOutcome::Skipped,
                });
            }
        };

        let chat = match self.probe_chat(out).await {
            Ok(outcome) => outcome,
            Err(error) => report_failure(out, "chat", error)?,
        };

        #[cfg(feature = "tracing")]
        info!(tags = %tags, chat = %chat, "probe run finished");

        Ok(RunReport { tags, chat })
    }

    /// Lists the models on the server.
    ///
    /// A `200` body that is not valid JSON is an error.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub async fn probe_tags(&self, out: &mut impl Write) -> Result<ProbeOutcome> {
        let started = Instant::now();
        let response = self.client.list_models(self.config.tags_timeout).await?;
        let latency = started.elapsed();
        let status = response.status;

        writeln!(out, "API tags response: {}", status)?;

        if !response.is_ok() {
            writeln!(out, "API returned status: {}", status)?;
            return Ok(ProbeOutcome::Rejected { status, latency });
        }

        writeln!(out, "Ollama API is accessible!")?;
        let listing = ListModelsResponse::from_bytes(response.bytes())?;

        #[cfg(feature = "tracing")]
        debug!(models = ?listing.model_names(), "model listing decoded");

        writeln!(out, "Available models: {}", listing)?;
        Ok(ProbeOutcome::Passed { status, latency })
    }

    /// Asks the configured model for a reply.
    ///
    /// A `200` body missing the `message` key, or a message without
    /// `content`, is reported as [`NO_CONTENT`]. A body that is not a JSON
    /// object, or whose `message` is not an object (including `null`), is an
    /// error.
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(model = %self.config.model)))]
    pub async fn probe_chat(&self, out: &mut impl Write) -> Result<ProbeOutcome> {
        let started = Instant::now();
        let response = self
            .client
            .chat_simple(self.chat_request(), self.config.chat_timeout)
            .await?;
        let latency = started.elapsed();
        let status = response.status;

        writeln!(out, "Chat API response: {}", status)?;

        if !response.is_ok() {
            #[cfg(feature = "tracing")]
            if let Some(server_error) = OllamaError::from_body(response.bytes()) {
                warn!(status, error = %server_error.error, "chat rejected by server");
            }

            writeln!(out, "Chat failed: {}", response.text())?;
            return Ok(ProbeOutcome::Rejected { status, latency });
        }

        let reply = ChatResponse::from_bytes(response.bytes())?;
        let text = reply.reply_text();
        writeln!(out, "Chat response: {}", text.as_deref().unwrap_or(NO_CONTENT))?;
        Ok(ProbeOutcome::Passed { status, latency })
    }
}

/// Prints the one-line diagnostic for a failed probe.
///
/// Write failures are not probe failures: they are handed back to the caller.
fn report_failure(out: &mut impl Write, probe: &'static str, error: Error) -> Result<ProbeOutcome> {
    let error = match error {
        Error::Io(io) => return Err(Error::Io(io)),
        other => other,
    };

    #[cfg(feature = "metrics")]
    counter!("ollama_probe.failures_total", "probe" => probe).increment(1);
    #[cfg(feature = "tracing")]
    warn!(probe, error = %error, "probe failed");
    #[cfg(not(any(feature = "metrics", feature = "tracing")))]
    let _ = probe;

    writeln!(out, "Error testing Ollama: {}", error)?;
    Ok(ProbeOutcome::Failed {
        error: error.to_string(),
    })
}
