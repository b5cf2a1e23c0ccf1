//! Voice list callbacks backing the dynamic voice selectors
//!
//! The list is fetched on every call. A failed fetch never reaches the user
//! as an error: the selector falls back to its default list and the failure
//! is logged.

use serde_json::Value;
use tracing::warn;

use crate::config::API_PREFIX;
use crate::error::Result;
use crate::schema::OptionSpec;
use crate::transport::{ApiRequest, Transport};

use super::builder::NO_VOICE;

/// Voices requested per callback
const VOICE_PAGE_SIZE: u32 = 100;

/// Option meaning "no explicit voice"
pub const NO_VOICE_OPTION: (&str, &str, &str) =
    ("No Voice (Default)", NO_VOICE, "Use default voice settings");

fn no_voice_option() -> OptionSpec {
    let (name, value, description) = NO_VOICE_OPTION;
    OptionSpec::new(name, value).with_description(description)
}

/// Options for optional voice selectors (`getVoices`)
///
/// Always starts with the "no voice" entry, which is also the whole list when
/// the fetch fails.
pub async fn load_voices(transport: &dyn Transport) -> Vec<OptionSpec> {
    let mut options = vec![no_voice_option()];

    match fetch_voice_options(transport).await {
        Ok(voices) => options.extend(voices),
        Err(e) => warn!(error = %e, "failed to load voices, offering the default voice only"),
    }

    options
}

/// Options for required voice selectors (`getVoicesRequired`)
///
/// Empty when the fetch fails.
pub async fn load_voices_required(transport: &dyn Transport) -> Vec<OptionSpec> {
    match fetch_voice_options(transport).await {
        Ok(voices) => voices,
        Err(e) => {
            warn!(error = %e, "failed to load voices");
            Vec::new()
        }
    }
}

async fn fetch_voice_options(transport: &dyn Transport) -> Result<Vec<OptionSpec>> {
    let request = ApiRequest::get(format!("{API_PREFIX}/getAllVoices"))
        .with_query("limit", VOICE_PAGE_SIZE.to_string())
        .with_query("page", "0");

    let response = transport.send(request).await?;
    if !response.is_success() {
        return Ok(Vec::new());
    }

    Ok(response
        .array("voices")
        .map(|voices| voices.iter().filter_map(voice_option).collect())
        .unwrap_or_default())
}

fn voice_option(voice: &Value) -> Option<OptionSpec> {
    let id = voice.get("voice_id").and_then(Value::as_str)?;
    let name = voice
        .get("voice_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(id);
    let tts_only = voice
        .get("tts_only")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(
        OptionSpec::new(name, id)
            .with_description(if tts_only { "TTS Only" } else { "Full Voice" }),
    )
}
