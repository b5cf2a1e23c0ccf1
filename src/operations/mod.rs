//! Operation catalogue and dispatch
//!
//! A host selects an operation with a `(resource, operation)` pair of strings.
//! [`Operation::parse`] turns that pair into an [`Operation`]; from there
//! [`build_request`] reads the parameters into an [`ApiRequest`] and
//! [`execute`] sends it and maps the response into records.
//!
//! Every operation follows the same steps:
//! 1. Read the declared parameters, resolving audio references
//! 2. Validate required fields and bounds (before any network call)
//! 3. Assemble the body, omitting optional fields that are empty
//! 4. Send exactly one request
//! 5. Keep the response fields relevant to the operation

mod builder;
mod search;
mod table;

#[cfg(test)]
mod tests;

use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use crate::config::API_PREFIX;
use crate::error::{Error, Result};
use crate::transport::{ApiRequest, Transport};
use crate::types::{ApiResponse, ExecutionItem, OperationOutput, Parameters, Record};

use builder::RequestBuilder;
use table::ResponseMapping;

pub use search::{NO_VOICE_OPTION, load_voices, load_voices_required};
pub(crate) use table::MAX_SOUND_PROMPT_CHARS;

/// Top-level grouping shown in the resource selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Music, speech and voice generation
    AudioGeneration,
    /// Clean-up, mastering and conversion of existing audio
    AudioProcessing,
    /// Remix, extend, inpaint and other generation on top of existing audio
    AdvancedGeneration,
    /// Voice and conversion lookups
    Search,
}

impl Resource {
    /// Every resource, in selector order
    pub const ALL: [Resource; 4] = [
        Resource::AudioGeneration,
        Resource::AudioProcessing,
        Resource::AdvancedGeneration,
        Resource::Search,
    ];

    /// Selector value
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::AudioGeneration => "audioGeneration",
            Resource::AudioProcessing => "audioProcessing",
            Resource::AdvancedGeneration => "advancedGeneration",
            Resource::Search => "search",
        }
    }

    /// Label shown in the selector
    pub fn display_name(&self) -> &'static str {
        match self {
            Resource::AudioGeneration => "Audio Generation",
            Resource::AudioProcessing => "Audio Processing",
            Resource::AdvancedGeneration => "Advanced Generation",
            Resource::Search => "Search",
        }
    }

    /// One-line description shown in the selector
    pub fn description(&self) -> &'static str {
        match self {
            Resource::AudioGeneration => "Generate and process audio",
            Resource::AudioProcessing => "Process and enhance audio files",
            Resource::AdvancedGeneration => "Advanced audio generation and manipulation",
            Resource::Search => "Search and retrieve voices, conversions, and data",
        }
    }

    /// Operations belonging to this resource, in selector order
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL
            .into_iter()
            .filter(move |operation| operation.resource() == *self)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or_else(|| Error::validation("resource", format!("unknown resource '{s}'")))
    }
}

/// Every operation the action node can run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    CoverSong,
    Denoise,
    Extraction,
    GenerateAudio,
    TextToSpeech,
    VoiceChanger,
    AudioMastering,
    AudioToMidi,
    AudioTranscribe,
    ChangeAudioSpeed,
    Deecho,
    Dereverb,
    ExtractKeyBpm,
    FileConvert,
    TrimAudio,
    Extend,
    Inpaint,
    PromptToLyrics,
    Remix,
    SingOverInstrumental,
    SoundGenerator,
    GetAllVoices,
    SearchVoices,
    GetConversionById,
    GetConversionsByUser,
}

impl Operation {
    /// Every operation, grouped by resource in selector order
    pub const ALL: [Operation; 25] = [
        Operation::CoverSong,
        Operation::Denoise,
        Operation::Extraction,
        Operation::GenerateAudio,
        Operation::TextToSpeech,
        Operation::VoiceChanger,
        Operation::AudioMastering,
        Operation::AudioToMidi,
        Operation::AudioTranscribe,
        Operation::ChangeAudioSpeed,
        Operation::Deecho,
        Operation::Dereverb,
        Operation::ExtractKeyBpm,
        Operation::FileConvert,
        Operation::TrimAudio,
        Operation::Extend,
        Operation::Inpaint,
        Operation::PromptToLyrics,
        Operation::Remix,
        Operation::SingOverInstrumental,
        Operation::SoundGenerator,
        Operation::GetAllVoices,
        Operation::SearchVoices,
        Operation::GetConversionById,
        Operation::GetConversionsByUser,
    ];

    /// Resolve a `(resource, operation)` selector pair
    ///
    /// The pair must match: `("search", "remix")` is rejected even though
    /// `remix` exists under another resource.
    pub fn parse(resource: &str, operation: &str) -> Result<Operation> {
        let unknown = || Error::UnknownOperation {
            resource: resource.to_string(),
            operation: operation.to_string(),
        };

        let resource = resource.parse::<Resource>().map_err(|_| unknown())?;
        resource
            .operations()
            .find(|candidate| candidate.as_str() == operation)
            .ok_or_else(unknown)
    }

    /// Resource the operation is listed under
    pub fn resource(&self) -> Resource {
        use Operation::*;

        match self {
            CoverSong | Denoise | Extraction | GenerateAudio | TextToSpeech | VoiceChanger => {
                Resource::AudioGeneration
            }
            AudioMastering | AudioToMidi | AudioTranscribe | ChangeAudioSpeed | Deecho
            | Dereverb | ExtractKeyBpm | FileConvert | TrimAudio => Resource::AudioProcessing,
            Extend | Inpaint | PromptToLyrics | Remix | SingOverInstrumental | SoundGenerator => {
                Resource::AdvancedGeneration
            }
            GetAllVoices | SearchVoices | GetConversionById | GetConversionsByUser => {
                Resource::Search
            }
        }
    }

    /// Selector value
    pub fn as_str(&self) -> &'static str {
        self.labels().0
    }

    /// Label shown in the selector
    pub fn display_name(&self) -> &'static str {
        self.labels().1
    }

    /// One-line description shown in the selector
    pub fn description(&self) -> &'static str {
        self.labels().2
    }

    /// Short verb phrase the host shows for the configured node
    pub fn action(&self) -> &'static str {
        self.labels().3
    }

    /// Whether the operation reads an uploaded or linked audio file
    pub fn takes_audio(&self) -> bool {
        !table::spec(*self).audio.is_empty()
    }

    fn labels(&self) -> (&'static str, &'static str, &'static str, &'static str) {
        use Operation::*;

        match self {
            CoverSong => ("coverSong", "Cover Song", "Create a cover version with different voice", "Create cover"),
            Denoise => ("denoise", "Denoise", "Remove noise from audio", "Denoise audio"),
            Extraction => ("extraction", "Extraction", "Extract vocals, instrumentals, or stems", "Extract audio"),
            GenerateAudio => ("generateAudio", "Generate Audio", "Generate music from prompts or lyrics", "Generate audio"),
            TextToSpeech => ("textToSpeech", "Text to Speech", "Convert text to speech", "Text to speech"),
            VoiceChanger => ("voiceChanger", "Voice Changer", "Transform voice in audio", "Change voice"),
            AudioMastering => ("audioMastering", "Audio Mastering", "Master audio for professional quality", "Master audio"),
            AudioToMidi => ("audioToMidi", "Audio to MIDI", "Convert audio to MIDI", "Convert to MIDI"),
            AudioTranscribe => ("audioTranscribe", "Audio Transcribe", "Transcribe speech to text", "Transcribe audio"),
            ChangeAudioSpeed => ("changeAudioSpeed", "Change Audio Speed", "Adjust playback speed", "Change speed"),
            Deecho => ("deecho", "Deecho", "Remove echo from audio", "Remove echo"),
            Dereverb => ("dereverb", "Dereverb", "Remove reverb from audio", "Remove reverb"),
            ExtractKeyBpm => ("extractKeyBpm", "Extract Key/BPM", "Extract musical key and tempo", "Extract key and BPM"),
            FileConvert => ("fileConvert", "File Convert", "Convert audio format", "Convert format"),
            TrimAudio => ("trimAudio", "Trim Audio", "Cut audio to specific time range", "Trim audio"),
            Extend => ("extend", "Extend", "Extend audio duration", "Extend audio"),
            Inpaint => ("inpaint", "Inpaint", "Replace a section of audio", "Inpaint audio"),
            PromptToLyrics => ("promptToLyrics", "Prompt to Lyrics", "Generate lyrics from prompt", "Generate lyrics"),
            Remix => ("remix", "Remix", "Remix audio with AI", "Remix audio"),
            SingOverInstrumental => ("singOverInstrumental", "Sing Over Instrumental", "Add vocals to instrumental track", "Sing over instrumental"),
            SoundGenerator => ("soundGenerator", "Sound Generator", "Generate sound effects from text", "Generate sound"),
            GetAllVoices => ("getAllVoices", "Get All Voices", "Fetch all available voices with their IDs and metadata", "Get all voices"),
            SearchVoices => ("searchVoices", "Search Voices", "Search voices by name and return matching results", "Search voices"),
            GetConversionById => ("getConversionById", "Get Conversion by ID", "Retrieve a specific conversion by type and ID", "Get conversion by ID"),
            GetConversionsByUser => ("getConversionsByUser", "Get Conversions by User", "Fetch your conversions with optional filters and pagination", "Get conversions by user"),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of every parameter `operation` reads: audio inputs, body fields and
/// the values its prepare hook looks at
pub fn parameter_names(operation: Operation) -> Vec<&'static str> {
    let spec = table::spec(operation);

    let mut names: Vec<&'static str> = Vec::new();
    let all = spec
        .audio
        .iter()
        .flat_map(|slot| [slot.source, slot.url, slot.file])
        .chain(spec.hook_reads.iter().copied())
        .chain(spec.fields.iter().map(|field| field.name));
    for name in all {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Build the request for `operation` without sending it
///
/// All validation happens here, so an `Err` guarantees nothing was sent.
pub fn build_request(operation: Operation, params: &Parameters) -> Result<ApiRequest> {
    let spec = table::spec(operation);
    let mut builder = RequestBuilder::new();

    if let Some(prepare) = spec.prepare {
        prepare(params, &mut builder)?;
    }

    for slot in spec.audio {
        let reference = params.audio_reference(slot.source, slot.url, slot.file, slot.fallback_name)?;
        builder.audio(slot.url, slot.file, reference);
    }

    for field in spec.fields {
        builder.field(params, field)?;
    }

    builder.into_request(spec.verb, format!("{API_PREFIX}{}", spec.endpoint), spec.encoding)
}

/// Run one operation for one set of parameters
pub async fn execute(
    transport: &dyn Transport,
    operation: Operation,
    params: &Parameters,
) -> Result<OperationOutput> {
    let request = build_request(operation, params)?;
    let path = request.path.clone();

    debug!(
        operation = %operation,
        path = %path,
        body = request.body.kind(),
        "executing operation"
    );

    let response = transport.send(request).await?;
    map_response(table::spec(operation).response, &path, response)
}

/// Run one operation over every input item
///
/// Items run sequentially. With `continue_on_fail` a failing item produces an
/// error record paired with its index and the loop carries on; without it the
/// first failure aborts with [`Error::ItemFailed`].
pub async fn execute_items(
    transport: &dyn Transport,
    operation: Operation,
    items: &[Parameters],
    continue_on_fail: bool,
) -> Result<Vec<ExecutionItem>> {
    let mut results = Vec::with_capacity(items.len());

    for (index, params) in items.iter().enumerate() {
        match execute(transport, operation, params).await {
            Ok(output) => results.extend(output.records.into_iter().map(|json| ExecutionItem {
                json,
                paired_item: index,
            })),
            Err(e) if continue_on_fail => {
                debug!(operation = %operation, index, error = %e, "item failed, continuing");
                results.push(ExecutionItem {
                    json: e.to_record(),
                    paired_item: index,
                });
            }
            Err(e) => {
                return Err(Error::ItemFailed {
                    index,
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(results)
}

fn map_response(mapping: ResponseMapping, path: &str, response: ApiResponse) -> Result<OperationOutput> {
    match mapping {
        ResponseMapping::Fields(keys) => {
            if !response.is_success() {
                return Err(Error::Rejected {
                    path: path.to_string(),
                    message: response.message(),
                });
            }

            let record = keys
                .iter()
                .filter_map(|key| response.get(key).map(|value| (key.to_string(), value.clone())))
                .collect();
            Ok(OperationOutput::single(record))
        }
        ResponseMapping::Collection { key, id_fields } => {
            if !response.is_success() {
                return Ok(OperationOutput::default());
            }

            let records = response
                .array(key)
                .map(|items| items.iter().filter_map(|item| with_id(item, id_fields)).collect())
                .unwrap_or_default();

            Ok(OperationOutput {
                records,
                next_cursor: response.cursor(),
            })
        }
        ResponseMapping::Single { key, id_fields } => {
            let record = response
                .is_success()
                .then(|| response.get(key).and_then(|item| with_id(item, id_fields)))
                .flatten();

            Ok(OperationOutput {
                records: record.into_iter().collect(),
                next_cursor: None,
            })
        }
    }
}

/// Copy an object and add `id` from the first id field present
pub(crate) fn with_id(item: &Value, id_fields: &[&str]) -> Option<Record> {
    let mut record = item.as_object()?.clone();

    let id = id_fields
        .iter()
        .find_map(|field| record.get(*field).filter(|value| !value.is_null()).cloned());
    if let Some(id) = id {
        record.insert("id".to_string(), id);
    }

    Some(record)
}
