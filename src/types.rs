//! Core types for musicgpt-nodes

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A normalized output record (the JSON object handed back to the host)
pub type Record = serde_json::Map<String, Value>;

/// JSON number for `value`; whole numbers become integers so `5` does not
/// turn into `5.0`, and non-finite values become `null`
pub(crate) fn json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// Content type assumed for uploaded audio when none is known
pub const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Binary content attached to an input item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryPayload {
    /// Raw bytes
    pub data: Vec<u8>,
    /// File name sent with the multipart part
    pub file_name: String,
    /// MIME type sent with the multipart part
    pub content_type: String,
}

impl BinaryPayload {
    /// Create a payload with the default audio content type
    pub fn new(data: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            content_type: DEFAULT_AUDIO_CONTENT_TYPE.to_string(),
        }
    }

    /// Override the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Where an operation's input audio comes from
///
/// Exactly one variant is populated per reference, so a request can never
/// carry both a URL and an upload for the same slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioReference {
    /// Remote audio the API fetches itself
    Url(String),
    /// Audio uploaded with the request
    Binary(BinaryPayload),
}

/// Value of an `audioSource`-style selector field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    /// Read the URL field
    #[default]
    Url,
    /// Read the binary property named by the file field
    File,
}

impl FromStr for AudioSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "url" => Ok(AudioSource::Url),
            "file" | "binary" => Ok(AudioSource::File),
            other => Err(Error::validation(
                "audioSource",
                format!("expected 'url' or 'file', got '{other}'"),
            )),
        }
    }
}

/// Conversion categories understood by the lookup endpoints
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionType {
    /// Music generated from a prompt or lyrics
    MusicAi,
    /// Cover song
    Cover,
    /// Stem extraction
    Extraction,
    /// Any other processing job
    Other,
    /// Remix
    Remix,
    /// Text to speech
    TextToSpeech,
    /// Voice changer
    VoiceConversion,
}

impl ConversionType {
    /// Every conversion type, in display order
    pub const ALL: [ConversionType; 7] = [
        ConversionType::MusicAi,
        ConversionType::Cover,
        ConversionType::Extraction,
        ConversionType::Other,
        ConversionType::Remix,
        ConversionType::TextToSpeech,
        ConversionType::VoiceConversion,
    ];

    /// Wire value sent as `conversionType`
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionType::MusicAi => "MUSIC_AI",
            ConversionType::Cover => "COVER",
            ConversionType::Extraction => "EXTRACTION",
            ConversionType::Other => "OTHER",
            ConversionType::Remix => "REMIX",
            ConversionType::TextToSpeech => "TEXT_TO_SPEECH",
            ConversionType::VoiceConversion => "VOICE_CONVERSION",
        }
    }

    /// Label shown in option lists
    pub fn display_name(&self) -> &'static str {
        match self {
            ConversionType::MusicAi => "Audio Generation",
            ConversionType::Cover => "Cover Song",
            ConversionType::Extraction => "Extraction",
            ConversionType::Other => "Other",
            ConversionType::Remix => "Remix",
            ConversionType::TextToSpeech => "Text to Speech",
            ConversionType::VoiceConversion => "Voice Changer",
        }
    }
}

impl std::fmt::Display for ConversionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Older workflows stored lowercase names
        match s.trim() {
            "MUSIC_AI" | "audio_generation" | "music_ai" => Ok(ConversionType::MusicAi),
            "COVER" | "cover_song" | "cover" => Ok(ConversionType::Cover),
            "EXTRACTION" | "extraction" => Ok(ConversionType::Extraction),
            "OTHER" | "other" => Ok(ConversionType::Other),
            "REMIX" | "remix" => Ok(ConversionType::Remix),
            "TEXT_TO_SPEECH" | "text_to_speech" => Ok(ConversionType::TextToSpeech),
            "VOICE_CONVERSION" | "voice_changer" | "voice_conversion" => {
                Ok(ConversionType::VoiceConversion)
            }
            other => Err(Error::validation(
                "conversionType",
                format!("unknown conversion type '{other}'"),
            )),
        }
    }
}

/// Parameter values for one invocation of an operation
///
/// Values are keyed by field name exactly as declared in the schema. Binary
/// attachments are keyed by binary property name (usually `data`), which a
/// field such as `audio_file` points at.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    values: serde_json::Map<String, Value>,
    binaries: HashMap<String, BinaryPayload>,
}

impl Parameters {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object of values
    pub fn from_values(values: serde_json::Map<String, Value>) -> Self {
        Self {
            values,
            binaries: HashMap::new(),
        }
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style binary attachment
    pub fn with_binary(mut self, property: impl Into<String>, payload: BinaryPayload) -> Self {
        self.attach_binary(property, payload);
        self
    }

    /// Set a parameter value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Attach binary content under a property name
    pub fn attach_binary(&mut self, property: impl Into<String>, payload: BinaryPayload) {
        self.binaries.insert(property.into(), payload);
    }

    /// Text form of a scalar parameter; `None` when absent or null
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Text value, `None` when absent or blank
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.text(name).filter(|s| !s.trim().is_empty())
    }

    /// Text value that must be present and not blank
    pub fn required_text(&self, name: &str) -> Result<String> {
        self.optional_text(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    /// Text value falling back to `default` when absent or blank
    pub fn text_or(&self, name: &str, default: &str) -> String {
        self.optional_text(name)
            .unwrap_or_else(|| default.to_string())
    }

    /// Numeric value; strings holding a number are accepted
    pub fn number(&self, name: &str) -> Result<Option<f64>> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| Error::validation(name, format!("'{s}' is not a number"))),
            Some(other) => Err(Error::validation(
                name,
                format!("expected a number, got {other}"),
            )),
        }
    }

    /// Boolean flag, `false` when absent
    pub fn flag(&self, name: &str) -> bool {
        match self.values.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "1"),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => false,
        }
    }

    /// List of strings; a single string is treated as a one-element list
    pub fn text_list(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Binary content attached under `property`
    pub fn binary(&self, property: &str) -> Result<&BinaryPayload> {
        self.binaries
            .get(property)
            .ok_or_else(|| Error::MissingBinary(property.to_string()))
    }

    /// Resolve an audio reference from a source selector, a URL field and a
    /// binary-property-name field
    pub fn audio_reference(
        &self,
        source_field: &str,
        url_field: &str,
        file_field: &str,
        fallback_file_name: &str,
    ) -> Result<AudioReference> {
        let source = match self.optional_text(source_field) {
            Some(value) => value.parse::<AudioSource>()?,
            None => AudioSource::default(),
        };

        match source {
            AudioSource::Url => Ok(AudioReference::Url(self.required_text(url_field)?)),
            AudioSource::File => {
                let property = self.text_or(file_field, "data");
                let mut payload = self.binary(&property)?.clone();
                if payload.file_name.trim().is_empty() {
                    payload.file_name = fallback_file_name.to_string();
                }
                if payload.content_type.trim().is_empty() {
                    payload.content_type = DEFAULT_AUDIO_CONTENT_TYPE.to_string();
                }
                Ok(AudioReference::Binary(payload))
            }
        }
    }
}

/// Untyped response object returned by the API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse(pub Record);

impl ApiResponse {
    /// The `success` gate; other fields are only trusted when this is true
    pub fn is_success(&self) -> bool {
        self.0
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Field lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Array field lookup
    pub fn array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// Pagination cursor for the next page, if the API returned one
    pub fn cursor(&self) -> Option<String> {
        self.0
            .get("LastEvaluatedKey")
            .and_then(|key| match key {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Null | Value::String(_) => None,
                other => Some(other.to_string()),
            })
    }

    /// Best-effort error text from a rejected response
    pub fn message(&self) -> String {
        ["message", "error", "detail"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| "request was not successful".to_string())
    }
}

impl From<Record> for ApiResponse {
    fn from(record: Record) -> Self {
        Self(record)
    }
}

/// Records produced by one operation call
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OperationOutput {
    /// Normalized records, one per output item
    pub records: Vec<Record>,
    /// Cursor for the next page when the API returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl OperationOutput {
    /// Output holding a single record
    pub fn single(record: Record) -> Self {
        Self {
            records: vec![record],
            next_cursor: None,
        }
    }
}

/// One output item handed back to the host, paired with its input index
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionItem {
    /// Output record
    pub json: Record,
    /// Index of the input item that produced it
    pub paired_item: usize,
}
