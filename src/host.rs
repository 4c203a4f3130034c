//! Newline-delimited JSON bridge used by the `feedweave-host` binary.
//!
//! Each input line is a [`FeedCommand`]; each produces exactly one
//! [`FeedResponse`] line on the output. Malformed lines and rejected requests
//! are answered with an error response and the bridge keeps going.
//!
//! The output is reserved for the protocol; diagnostics go through `tracing`.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::context::Context;
use crate::error::FeedError;
use crate::orchestrator::{FeedOrchestrator, FeedReport, FeedRequest};
use crate::pool::ResourceFactory;

/// One feed request as sent by a host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedCommand {
    /// Caller-chosen correlation id, echoed in the response.
    #[serde(default)]
    pub request_id: Option<String>,
    /// The consumer's request context.
    pub context: Context,
    /// Overrides the configured default limit.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Overrides the configured default budget.
    #[serde(default)]
    pub budget_seconds: Option<f64>,
}

impl FeedCommand {
    /// The request to run, falling back to `defaults` for unset fields.
    pub fn request(&self, defaults: &FeedRequest) -> FeedRequest {
        FeedRequest {
            limit: self.limit.unwrap_or(defaults.limit),
            budget_seconds: self.budget_seconds.unwrap_or(defaults.budget_seconds),
        }
    }
}

/// The answer to one [`FeedCommand`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedResponse {
    /// The feed was built.
    Ok {
        /// Echo of the command's `request_id`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        /// Items and per-generator outcomes.
        report: FeedReport,
    },
    /// The command was malformed or rejected.
    Error {
        /// Echo of the command's `request_id`, when it could be parsed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        /// What went wrong.
        message: String,
    },
}

impl FeedResponse {
    fn error(request_id: Option<String>, message: impl Into<String>) -> Self {
        Self::Error {
            request_id,
            message: message.into(),
        }
    }
}

/// Answer commands read from `input` on `output` until `input` is exhausted.
///
/// Returns the number of commands answered.
///
/// # Errors
///
/// Returns [`FeedError::Io`] if reading or writing fails, or
/// [`FeedError::Json`] if a response cannot be serialized.
pub async fn serve<F, I, O>(
    orchestrator: &FeedOrchestrator<F>,
    defaults: &FeedRequest,
    input: I,
    mut output: O,
) -> Result<usize, FeedError>
where
    F: ResourceFactory,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut answered = 0;

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<FeedCommand>(trimmed) {
            Ok(command) => handle(orchestrator, defaults, command).await,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse feed command");
                FeedResponse::error(None, format!("failed to parse feed command: {e}"))
            }
        };

        let mut json = serde_json::to_string(&response)?;
        json.push('\n');
        output.write_all(json.as_bytes()).await?;
        output.flush().await?;
        answered += 1;
    }

    tracing::info!(answered, "input closed, stopping");
    Ok(answered)
}

async fn handle<F: ResourceFactory>(
    orchestrator: &FeedOrchestrator<F>,
    defaults: &FeedRequest,
    command: FeedCommand,
) -> FeedResponse {
    let request = command.request(defaults);
    match orchestrator.run(&command.context, &request).await {
        Ok(report) => FeedResponse::Ok {
            request_id: command.request_id,
            report,
        },
        Err(e) => {
            tracing::warn!(error = %e, consumer_id = %command.context.consumer_id, "feed request rejected");
            FeedResponse::error(command.request_id, e.to_string())
        }
    }
}
