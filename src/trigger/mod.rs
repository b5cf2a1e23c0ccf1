//! Polling trigger
//!
//! Two modes:
//! - **By ID** watches one conversion and emits it once the API reports it
//! - **By user** lists the account's conversions created since the last poll
//!
//! The by-user mode deduplicates with a timestamp watermark, [`PollState`].
//! The host persists it between polls and hands it back on the next call;
//! nothing here keeps state of its own.
//!
//! ```no_run
//! use musicgpt_nodes::config::{ClientConfig, Credentials};
//! use musicgpt_nodes::transport::ApiClient;
//! use musicgpt_nodes::trigger::{PollState, TriggerMode, poll};
//! use musicgpt_nodes::types::Parameters;
//!
//! # async fn example() -> musicgpt_nodes::Result<()> {
//! let client = ApiClient::new(&Credentials::from_env()?, &ClientConfig::default())?;
//! let mode = TriggerMode::from_parameters(&Parameters::new())?;
//! let mut state = PollState::default();
//!
//! if let Some(batch) = poll(&client, &mode, &mut state).await? {
//!     println!("{} new conversions", batch.records.len());
//! }
//! # Ok(())
//! # }
//! ```

mod scheduler;


use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::API_PREFIX;
use crate::error::{Error, Result};
use crate::transport::{ApiRequest, Transport};
use crate::types::{ConversionType, Parameters, Record};

pub use scheduler::PollScheduler;

/// How far back the first by-user poll looks
pub fn first_poll_lookback() -> TimeDelta {
    TimeDelta::hours(1)
}

/// Default page size for by-user polling
pub const DEFAULT_POLL_LIMIT: u32 = 50;

/// Result ordering for by-user polling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

impl SortOrder {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(Error::validation(
                "sortOrder",
                format!("expected 'ASC' or 'DESC', got '{s}'"),
            )),
        }
    }
}

/// Filters for the by-user mode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserQuery {
    /// Only this conversion type; all types when `None`
    pub conversion_type: Option<ConversionType>,
    /// Explicit window start; disables the watermark when set
    pub start_date: Option<String>,
    /// Window end
    pub end_date: Option<String>,
    /// Result ordering
    pub sort_order: SortOrder,
    /// Page size
    pub limit: u32,
    /// Pagination cursor to start from
    pub last_evaluated_key: Option<String>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            conversion_type: None,
            start_date: None,
            end_date: None,
            sort_order: SortOrder::default(),
            limit: DEFAULT_POLL_LIMIT,
            last_evaluated_key: None,
        }
    }
}

/// What the trigger watches
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// A single conversion
    ById {
        /// Conversion category
        conversion_type: ConversionType,
        /// Task identifier
        task_id: Option<String>,
        /// Conversion identifier
        conversion_id: Option<String>,
    },
    /// The account's conversions
    ByUser(UserQuery),
}

impl TriggerMode {
    /// `triggerOn` value for [`TriggerMode::ById`]
    pub const BY_ID: &'static str = "getConversionById";

    /// `triggerOn` value for [`TriggerMode::ByUser`]
    pub const BY_USER: &'static str = "getConversionsByUser";

    /// Read the mode from the trigger node's parameters
    ///
    /// # Errors
    /// Returns a validation error for unknown selector values, or when the
    /// by-ID mode has neither a task ID nor a conversion ID
    pub fn from_parameters(params: &Parameters) -> Result<Self> {
        let mode = match params.text_or("triggerOn", Self::BY_USER).as_str() {
            Self::BY_ID => TriggerMode::ById {
                conversion_type: params
                    .text_or("conversionType", ConversionType::VoiceConversion.as_str())
                    .parse()?,
                task_id: params.optional_text("task_id"),
                conversion_id: params.optional_text("conversion_id"),
            },
            Self::BY_USER => {
                let limit = params
                    .number("limit")?
                    .unwrap_or(f64::from(DEFAULT_POLL_LIMIT));
                // fract() is NaN for non-finite values, so they fail too
                if limit.fract() != 0.0 || limit < 1.0 || limit > f64::from(u32::MAX) {
                    return Err(Error::validation(
                        "limit",
                        format!("must be a whole number from 1 to {}, got {limit}", u32::MAX),
                    ));
                }

                TriggerMode::ByUser(UserQuery {
                    conversion_type: params
                        .optional_text("conversionType")
                        .map(|value| value.parse())
                        .transpose()?,
                    start_date: params.optional_text("startDate"),
                    end_date: params.optional_text("endDate"),
                    sort_order: params.text_or("sortOrder", "DESC").parse()?,
                    limit: limit as u32,
                    last_evaluated_key: params.optional_text("LastEvaluatedKey"),
                })
            }
            other => {
                return Err(Error::validation(
                    "triggerOn",
                    format!("unknown trigger '{other}'"),
                ));
            }
        };

        mode.validate()?;
        Ok(mode)
    }

    /// `triggerOn` selector value
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::ById { .. } => Self::BY_ID,
            TriggerMode::ByUser(_) => Self::BY_USER,
        }
    }

    /// Check the mode can be polled
    pub fn validate(&self) -> Result<()> {
        if let TriggerMode::ById {
            task_id,
            conversion_id,
            ..
        } = self
        {
            let blank = |id: &Option<String>| id.as_deref().is_none_or(|id| id.trim().is_empty());
            if blank(task_id) && blank(conversion_id) {
                return Err(Error::validation(
                    "task_id",
                    "Either Task ID or Conversion ID must be provided",
                ));
            }
        }

        Ok(())
    }
}

/// Persistent watermark for by-user polling
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollState {
    /// Invocation time of the last watermarked poll
    #[serde(default)]
    pub last_poll: Option<DateTime<Utc>>,
}

/// New data found by one poll
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PollBatch {
    /// One record per conversion
    pub records: Vec<Record>,
    /// Cursor for the next page when the API returned one; never followed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// ISO 8601 timestamp with millisecond precision, as the API expects
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Poll once, using the current time as the invocation time
pub async fn poll(
    transport: &dyn Transport,
    mode: &TriggerMode,
    state: &mut PollState,
) -> Result<Option<PollBatch>> {
    poll_at(transport, mode, state, Utc::now()).await
}

/// Poll once with an explicit invocation time
///
/// Returns `Ok(None)` when there is nothing new. On error the watermark is
/// left as it was.
pub async fn poll_at(
    transport: &dyn Transport,
    mode: &TriggerMode,
    state: &mut PollState,
    now: DateTime<Utc>,
) -> Result<Option<PollBatch>> {
    mode.validate()?;

    match mode {
        TriggerMode::ById {
            conversion_type,
            task_id,
            conversion_id,
        } => poll_by_id(transport, *conversion_type, task_id, conversion_id).await,
        TriggerMode::ByUser(query) => poll_by_user(transport, query, state, now).await,
    }
}

async fn poll_by_id(
    transport: &dyn Transport,
    conversion_type: ConversionType,
    task_id: &Option<String>,
    conversion_id: &Option<String>,
) -> Result<Option<PollBatch>> {
    let mut request = ApiRequest::get(format!("{API_PREFIX}/byId"))
        .with_query("conversionType", conversion_type.as_str());
    if let Some(task_id) = task_id.as_deref().filter(|id| !id.trim().is_empty()) {
        request = request.with_query("task_id", task_id);
    }
    if let Some(conversion_id) = conversion_id.as_deref().filter(|id| !id.trim().is_empty()) {
        request = request.with_query("conversion_id", conversion_id);
    }

    let response = transport.send(request).await?;

    let conversion = response
        .is_success()
        .then(|| response.get("conversion").and_then(Value::as_object).cloned())
        .flatten();

    match conversion {
        Some(record) => {
            info!(conversion_type = %conversion_type, "conversion found");
            Ok(Some(PollBatch {
                records: vec![record],
                next_cursor: None,
            }))
        }
        None => {
            debug!(conversion_type = %conversion_type, "conversion not available yet");
            Ok(None)
        }
    }
}

async fn poll_by_user(
    transport: &dyn Transport,
    query: &UserQuery,
    state: &mut PollState,
    now: DateTime<Utc>,
) -> Result<Option<PollBatch>> {
    let start_date = match &query.start_date {
        Some(start) => start.clone(),
        None => format_timestamp(state.last_poll.unwrap_or(now - first_poll_lookback())),
    };

    let mut request = ApiRequest::get(format!("{API_PREFIX}/byUser"))
        .with_query("limit", query.limit.to_string())
        .with_query("sortOrder", query.sort_order.as_str());
    if let Some(conversion_type) = query.conversion_type {
        request = request.with_query("conversionType", conversion_type.as_str());
    }
    request = request.with_query("startDate", start_date.as_str());
    if let Some(end_date) = &query.end_date {
        request = request.with_query("endDate", end_date.as_str());
    }
    if let Some(key) = &query.last_evaluated_key {
        request = request.with_query("LastEvaluatedKey", key.as_str());
    }

    let response = transport.send(request).await?;

    let records: Vec<Record> = if response.is_success() {
        response
            .array("conversions")
            .map(|items| items.iter().filter_map(|item| item.as_object().cloned()).collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    if query.start_date.is_none() {
        state.last_poll = Some(now);
    }

    info!(
        start_date = %start_date,
        count = records.len(),
        "polled conversions"
    );

    if records.is_empty() {
        return Ok(None);
    }

    Ok(Some(PollBatch {
        records,
        next_cursor: response.cursor(),
    }))
}
