//! Host-facing entry points
//!
//! [`ActionNode`] and [`TriggerNode`] bundle a transport with the schema,
//! operation dispatch and polling so a host only deals with selector strings,
//! parameter sets and the persisted [`PollState`].

use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::operations::{self, Operation};
use crate::schema::{self, LOAD_VOICES, LOAD_VOICES_REQUIRED, NodeDescription, OptionSpec};
use crate::transport::{ApiClient, Transport};
use crate::trigger::{self, PollBatch, PollScheduler, PollState, TriggerMode};
use crate::types::{ExecutionItem, Parameters};

fn client_from_config(config: &Config) -> Result<Arc<dyn Transport>> {
    config.validate()?;
    Ok(Arc::new(ApiClient::new(&config.credentials, &config.client)?))
}

/// The action node: runs one operation per input item
#[derive(Clone)]
pub struct ActionNode {
    transport: Arc<dyn Transport>,
}

impl ActionNode {
    /// Node sending requests through `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Node backed by an [`ApiClient`] built from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(client_from_config(config)?))
    }

    /// Form description
    pub fn description() -> NodeDescription {
        schema::action_node()
    }

    /// Run the selected operation over `items`
    ///
    /// # Errors
    /// Fails for an unknown selector pair, and for the first failing item
    /// unless `continue_on_fail` is set
    pub async fn execute(
        &self,
        resource: &str,
        operation: &str,
        items: &[Parameters],
        continue_on_fail: bool,
    ) -> Result<Vec<ExecutionItem>> {
        let operation = Operation::parse(resource, operation)?;
        debug!(operation = %operation, items = items.len(), "running action node");

        operations::execute_items(self.transport.as_ref(), operation, items, continue_on_fail).await
    }

    /// Entries for a dynamic options field
    pub async fn load_options(&self, method: &str) -> Result<Vec<OptionSpec>> {
        match method {
            LOAD_VOICES => Ok(operations::load_voices(self.transport.as_ref()).await),
            LOAD_VOICES_REQUIRED => Ok(operations::load_voices_required(self.transport.as_ref()).await),
            other => Err(Error::validation(
                "loadOptionsMethod",
                format!("unknown options method '{other}'"),
            )),
        }
    }
}

/// The polling trigger node
#[derive(Clone)]
pub struct TriggerNode {
    transport: Arc<dyn Transport>,
}

impl TriggerNode {
    /// Node sending requests through `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Node backed by an [`ApiClient`] built from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(client_from_config(config)?))
    }

    /// Form description
    pub fn description() -> NodeDescription {
        schema::trigger_node()
    }

    /// Poll once with the node's parameters and the persisted watermark
    ///
    /// `Ok(None)` means nothing new. The caller persists `state` afterwards
    /// whatever the outcome; on error it is unchanged.
    pub async fn poll(&self, params: &Parameters, state: &mut PollState) -> Result<Option<PollBatch>> {
        let mode = TriggerMode::from_parameters(params)?;
        trigger::poll(self.transport.as_ref(), &mode, state).await
    }

    /// Scheduler polling with these parameters on `config.polling.interval`
    pub fn scheduler(&self, params: &Parameters, config: &Config) -> Result<PollScheduler> {
        let mode = TriggerMode::from_parameters(params)?;
        Ok(PollScheduler::new(
            Arc::clone(&self.transport),
            mode,
            &config.polling,
        ))
    }
}
