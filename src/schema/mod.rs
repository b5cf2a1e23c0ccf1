//! Host-facing node descriptions
//!
//! The host renders forms from these declarations and feeds the collected
//! values back as [`Parameters`](crate::types::Parameters). Field names here
//! are the parameter names the operations read, so the two must stay in step.
//!
//! Everything serializes to camelCase JSON:
//!
//! ```json
//! {
//!   "name": "pitch",
//!   "displayName": "Pitch",
//!   "type": "number",
//!   "minValue": -12,
//!   "maxValue": 12,
//!   "default": 0,
//!   "displayOptions": { "show": { "operation": ["coverSong"], "resource": ["audioGeneration"] } }
//! }
//! ```

mod advanced_generation;
mod audio_generation;
mod audio_processing;
mod search;
mod trigger;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::operations::{Operation, Resource};
use crate::types::json_number;

pub use trigger::trigger_node;

/// Dynamic list method for optional voice selectors
pub const LOAD_VOICES: &str = "getVoices";

/// Dynamic list method for required voice selectors
pub const LOAD_VOICES_REQUIRED: &str = "getVoicesRequired";

/// One entry of an options list
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionSpec {
    /// Label shown to the user
    pub name: String,
    /// Value stored in the parameters
    pub value: Value,
    /// Help text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Verb phrase (operation selectors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl OptionSpec {
    /// Option with a label and value
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
            action: None,
        }
    }

    /// Set the help text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the action phrase
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Build an options list from `(label, value)` pairs
pub(crate) fn options(pairs: &[(&str, &str)]) -> Vec<OptionSpec> {
    pairs
        .iter()
        .map(|(name, value)| OptionSpec::new(*name, *value))
        .collect()
}

/// Field widget type
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FieldKind {
    /// Free text; `rows` > 1 renders a text area
    String {
        /// Text area height
        #[serde(skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
        /// Mask the value
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        password: bool,
    },
    /// Number input
    Number {
        /// Smallest accepted value
        #[serde(skip_serializing_if = "Option::is_none")]
        min_value: Option<f64>,
        /// Largest accepted value
        #[serde(skip_serializing_if = "Option::is_none")]
        max_value: Option<f64>,
    },
    /// Checkbox
    Boolean,
    /// Single choice from a fixed or dynamically loaded list
    Options {
        /// Fixed entries (empty for dynamic lists)
        options: Vec<OptionSpec>,
        /// Callback that loads the entries at render time
        #[serde(skip_serializing_if = "Option::is_none")]
        load_options_method: Option<String>,
    },
    /// Multiple choice
    MultiOptions {
        /// Entries
        options: Vec<OptionSpec>,
    },
    /// Date and time picker
    DateTime,
}

/// Visibility rules: the field shows only when every listed parameter has
/// one of the listed values
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DisplayOptions {
    /// Parameter name to accepted values
    pub show: BTreeMap<String, Vec<String>>,
}

impl DisplayOptions {
    /// Whether no rule is set
    pub fn is_empty(&self) -> bool {
        self.show.is_empty()
    }

    /// Whether the field is visible for the given parameter values
    pub fn is_visible(&self, values: &BTreeMap<&str, &str>) -> bool {
        self.show.iter().all(|(key, accepted)| {
            values
                .get(key.as_str())
                .is_some_and(|value| accepted.iter().any(|candidate| candidate == value))
        })
    }
}

/// One form field
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Parameter name
    pub name: String,
    /// Label
    pub display_name: String,
    /// Widget
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Initial value
    pub default: Value,
    /// Whether the host should insist on a value
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Help text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Visibility rules
    #[serde(skip_serializing_if = "DisplayOptions::is_empty")]
    pub display_options: DisplayOptions,
}

impl FieldSpec {
    fn new(name: &str, display_name: &str, kind: FieldKind, default: Value) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            kind,
            default,
            required: false,
            description: None,
            placeholder: None,
            display_options: DisplayOptions::default(),
        }
    }

    /// Single-line text field
    pub fn string(name: &str, display_name: &str) -> Self {
        Self::new(
            name,
            display_name,
            FieldKind::String {
                rows: None,
                password: false,
            },
            Value::from(""),
        )
    }

    /// Multi-line text field
    pub fn text_area(name: &str, display_name: &str, rows: u32) -> Self {
        Self::new(
            name,
            display_name,
            FieldKind::String {
                rows: Some(rows),
                password: false,
            },
            Value::from(""),
        )
    }

    /// Masked text field
    pub fn password(name: &str, display_name: &str) -> Self {
        Self::new(
            name,
            display_name,
            FieldKind::String {
                rows: None,
                password: true,
            },
            Value::from(""),
        )
    }

    /// Number field
    pub fn number(name: &str, display_name: &str, default: f64) -> Self {
        Self::new(
            name,
            display_name,
            FieldKind::Number {
                min_value: None,
                max_value: None,
            },
            json_number(default),
        )
    }

    /// Checkbox, off by default
    pub fn boolean(name: &str, display_name: &str) -> Self {
        Self::new(name, display_name, FieldKind::Boolean, Value::Bool(false))
    }

    /// Single choice from fixed options
    pub fn options(name: &str, display_name: &str, options: Vec<OptionSpec>, default: &str) -> Self {
        Self::new(
            name,
            display_name,
            FieldKind::Options {
                options,
                load_options_method: None,
            },
            Value::from(default),
        )
    }

    /// Single choice from a list loaded by `method`
    pub fn dynamic_options(name: &str, display_name: &str, method: &str, default: &str) -> Self {
        Self::new(
            name,
            display_name,
            FieldKind::Options {
                options: Vec::new(),
                load_options_method: Some(method.to_string()),
            },
            Value::from(default),
        )
    }

    /// Multiple choice
    pub fn multi_options(
        name: &str,
        display_name: &str,
        options: Vec<OptionSpec>,
        default: &[&str],
    ) -> Self {
        Self::new(
            name,
            display_name,
            FieldKind::MultiOptions { options },
            Value::from(default.to_vec()),
        )
    }

    /// Date and time picker
    pub fn date_time(name: &str, display_name: &str) -> Self {
        Self::new(name, display_name, FieldKind::DateTime, Value::from(""))
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the help text
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Set the example value
    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    /// Replace the default value
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Set number bounds (ignored for other widgets)
    pub fn bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        if let FieldKind::Number {
            min_value,
            max_value,
        } = &mut self.kind
        {
            *min_value = min;
            *max_value = max;
        }
        self
    }

    /// Show the field only when `key` has one of `values`
    pub fn show(mut self, key: &str, values: &[&str]) -> Self {
        self.display_options.show.insert(
            key.to_string(),
            values.iter().map(|value| value.to_string()).collect(),
        );
        self
    }

    /// Values a choice field accepts, `None` for free-form widgets and
    /// dynamic lists
    pub fn allowed_values(&self) -> Option<Vec<&Value>> {
        match &self.kind {
            FieldKind::Options {
                options,
                load_options_method: None,
            }
            | FieldKind::MultiOptions { options } => {
                Some(options.iter().map(|option| &option.value).collect())
            }
            _ => None,
        }
    }
}

/// A complete node declaration
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    /// Internal node name
    pub name: String,
    /// Label
    pub display_name: String,
    /// Help text
    pub description: String,
    /// Description version
    pub version: u32,
    /// Credential type the node needs
    pub credentials: Vec<String>,
    /// Whether the host should call the node on a timer
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub polling: bool,
    /// Form fields, in render order
    pub properties: Vec<FieldSpec>,
}

impl NodeDescription {
    /// Fields named `name`; one name can back several fields shown under
    /// different operations
    pub fn fields_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldSpec> + 'a {
        self.properties.iter().filter(move |field| field.name == name)
    }
}

/// Credential type name shared by both nodes
pub const CREDENTIAL_TYPE: &str = "musicGptApi";

// ---------------------------------------------------------------------------
// Shared field groups
// ---------------------------------------------------------------------------

/// Source selector, URL field and binary property field for one audio input
pub(crate) fn audio_fields(
    source: &str,
    url: &str,
    file: &str,
    label: &str,
) -> Vec<FieldSpec> {
    vec![
        FieldSpec::options(
            source,
            &format!("{label} Source"),
            vec![
                OptionSpec::new("URL", "url").with_description("Use an audio file URL"),
                OptionSpec::new("Binary Property", "file")
                    .with_description("Use audio from a binary property"),
            ],
            "url",
        )
        .description("Where the audio comes from"),
        FieldSpec::string(url, &format!("{label} URL"))
            .required()
            .placeholder("https://example.com/audio.mp3")
            .description("Publicly reachable URL of the audio file")
            .show(source, &["url"]),
        FieldSpec::string(file, "Binary Property Name")
            .required()
            .default_value("data")
            .description("Name of the binary property holding the audio file")
            .show(source, &["file"]),
    ]
}

/// The main input audio
pub(crate) fn main_audio() -> Vec<FieldSpec> {
    audio_fields("audioSource", "audio_url", "audio_file", "Audio")
}

pub(crate) fn webhook() -> FieldSpec {
    FieldSpec::string("webhook_url", "Webhook URL")
        .placeholder("https://your-webhook.com/callback")
        .description("URL the API calls when processing completes")
}

pub(crate) fn gender(default: &str) -> FieldSpec {
    FieldSpec::options(
        "gender",
        "Gender",
        options(&[("Male", "male"), ("Female", "female"), ("Neutral", "neutral")]),
        default,
    )
    .description("Vocal gender")
}

// ---------------------------------------------------------------------------
// Node assembly
// ---------------------------------------------------------------------------

/// Fields of `operation`, without the resource/operation visibility rules
pub fn fields_for(operation: Operation) -> Vec<FieldSpec> {
    match operation.resource() {
        Resource::AudioGeneration => audio_generation::fields(operation),
        Resource::AudioProcessing => audio_processing::fields(operation),
        Resource::AdvancedGeneration => advanced_generation::fields(operation),
        Resource::Search => search::fields(operation),
    }
}

fn resource_selector() -> FieldSpec {
    let options = Resource::ALL
        .iter()
        .map(|resource| {
            OptionSpec::new(resource.display_name(), resource.as_str())
                .with_description(resource.description())
        })
        .collect();

    FieldSpec::options(
        "resource",
        "Resource",
        options,
        Resource::AudioGeneration.as_str(),
    )
}

fn operation_selector(resource: Resource) -> FieldSpec {
    let operations: Vec<Operation> = resource.operations().collect();
    let default = operations
        .first()
        .map(Operation::as_str)
        .unwrap_or_default();
    let options = operations
        .iter()
        .map(|operation| {
            OptionSpec::new(operation.display_name(), operation.as_str())
                .with_description(operation.description())
                .with_action(operation.action())
        })
        .collect();

    FieldSpec::options("operation", "Operation", options, default).show("resource", &[resource.as_str()])
}

/// Description of the action node
pub fn action_node() -> NodeDescription {
    let mut properties = vec![resource_selector()];

    for resource in Resource::ALL {
        properties.push(operation_selector(resource));
    }

    for operation in Operation::ALL {
        properties.extend(fields_for(operation).into_iter().map(|field| {
            field
                .show("resource", &[operation.resource().as_str()])
                .show("operation", &[operation.as_str()])
        }));
    }

    NodeDescription {
        name: "musicGpt".to_string(),
        display_name: "MusicGPT".to_string(),
        description: "Interact with MusicGPT API for audio processing and voice management"
            .to_string(),
        version: 1,
        credentials: vec![CREDENTIAL_TYPE.to_string()],
        polling: false,
        properties,
    }
}

#[cfg(test)]
mod tests;
