//! # musicgpt-nodes
//!
//! Workflow-automation nodes for the MusicGPT audio API.
//!
//! The crate has three parts:
//! - **Schema** ([`schema`]): form declarations a host renders for the action
//!   and trigger nodes
//! - **Operations** ([`operations`]): one function per API operation, reading
//!   the form values, validating them and sending a single request
//! - **Trigger** ([`trigger`]): polling for finished conversions, deduplicated
//!   with a timestamp watermark the host persists
//!
//! All network traffic goes through the [`Transport`] trait; [`ApiClient`] is
//! the reqwest implementation. Nothing is retried.
//!
//! ## Quick Start
//!
//! ```no_run
//! use musicgpt_nodes::{ActionNode, Config, Credentials, Parameters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new(Credentials::from_env()?);
//!     let node = ActionNode::from_config(&config)?;
//!
//!     let items = node
//!         .execute(
//!             "audioGeneration",
//!             "generateAudio",
//!             &[Parameters::new().with("prompt", "lofi beat with soft rain")],
//!             false,
//!         )
//!         .await?;
//!
//!     println!("task: {}", items[0].json["task_id"]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Host-facing node facades
pub mod node;
/// Operation catalogue and dispatch
pub mod operations;
/// Node and field declarations
pub mod schema;
/// HTTP transport
pub mod transport;
/// Polling trigger
pub mod trigger;
/// Core types
pub mod types;


// Re-export commonly used types
pub use config::{ClientConfig, Config, Credentials, PollingConfig};
pub use error::{Error, Result};
pub use node::{ActionNode, TriggerNode};
pub use operations::{Operation, Resource, build_request, execute, execute_items};
pub use schema::{FieldKind, FieldSpec, NodeDescription, OptionSpec, action_node, trigger_node};
pub use transport::{ApiClient, ApiRequest, RequestBody, Transport, Verb};
pub use trigger::{PollBatch, PollScheduler, PollState, TriggerMode, poll, poll_at};
pub use types::{
    ApiResponse, AudioReference, BinaryPayload, ConversionType, ExecutionItem, OperationOutput,
    Parameters, Record,
};

/// Run a poll scheduler until the process receives a termination signal.
///
/// Batches go to `batches`. Returns the final watermark so the caller can
/// persist it before exiting. The scheduler also ends on its own when the
/// receiver is dropped.
///
/// Listens for SIGTERM and Ctrl+C on Unix, Ctrl+C elsewhere.
///
/// # Example
///
/// ```no_run
/// use musicgpt_nodes::{Config, Credentials, Parameters, PollBatch, TriggerNode, run_until_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::new(Credentials::from_env()?);
///     let node = TriggerNode::from_config(&config)?;
///     let scheduler = node.scheduler(&Parameters::new(), &config)?;
///
///     let (tx, mut rx) = tokio::sync::mpsc::channel::<PollBatch>(16);
///     tokio::spawn(async move {
///         while let Some(batch) = rx.recv().await {
///             println!("{} new conversions", batch.records.len());
///         }
///     });
///
///     let state = run_until_shutdown(scheduler, tx).await;
///     println!("{}", serde_json::to_string(&state)?);
///     Ok(())
/// }
/// ```
pub async fn run_until_shutdown(
    scheduler: PollScheduler,
    batches: tokio::sync::mpsc::Sender<PollBatch>,
) -> PollState {
    let cancel = tokio_util::sync::CancellationToken::new();
    let run = scheduler.run(batches, cancel.clone());
    tokio::pin!(run);

    tokio::select! {
        state = &mut run => state,
        _ = wait_for_signal() => {
            cancel.cancel();
            run.await
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM, stopping poll scheduler"),
                _ = ctrl_c() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for Ctrl+C only");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed,
/// leaving the scheduler to stop on its own
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl+C, stopping poll scheduler"),
        Err(e) => {
            tracing::warn!(error = %e, "could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
