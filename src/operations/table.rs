//! Per-operation request and response settings
//!
//! Every operation is described by one [`OperationSpec`]. Anything that does
//! not fit the declarative fields (mode switches, cross-field checks) lives in
//! a `prepare` hook that runs before the audio and body fields are read, so
//! all validation happens before a request is built.

use super::Operation;
use super::builder::{NO_VOICE, RequestBuilder};
use crate::error::{Error, Result};
use crate::transport::Verb;
use crate::types::{ConversionType, Parameters};

/// Longest prompt the sound generator accepts, in characters
pub(crate) const MAX_SOUND_PROMPT_CHARS: usize = 300;

/// Upper bound for generated or extended audio length, in seconds
pub(crate) const MAX_OUTPUT_LENGTH: f64 = 300.0;

/// How the collected values are put on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Encoding {
    /// JSON body, switching to multipart when a file is attached
    Body,
    /// `application/x-www-form-urlencoded` body
    UrlEncoded,
    /// Query string on a GET
    Query,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Text,
    Number,
    Flag,
    /// String list sent as a JSON-encoded string
    List,
    /// Voice selector; `none` counts as empty
    Voice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Presence {
    Required,
    Optional,
    Default(&'static str),
}

/// A body or query field read straight from the parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BodyField {
    pub name: &'static str,
    pub kind: ValueKind,
    pub presence: Presence,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl BodyField {
    const fn new(name: &'static str, kind: ValueKind, presence: Presence) -> Self {
        Self {
            name,
            kind,
            presence,
            min: None,
            max: None,
        }
    }

    const fn required(name: &'static str, kind: ValueKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    const fn optional(name: &'static str, kind: ValueKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    const fn defaulted(name: &'static str, kind: ValueKind, default: &'static str) -> Self {
        Self::new(name, kind, Presence::Default(default))
    }

    const fn at_least(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    const fn between(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub(crate) fn check_bounds(&self, value: f64) -> Result<()> {
        check_bounds(self.name, value, self.min, self.max)
    }
}

pub(crate) fn check_bounds(name: &str, value: f64, min: Option<f64>, max: Option<f64>) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::validation(name, "must be a finite number"));
    }

    match (min, max) {
        (Some(min), Some(max)) if value < min || value > max => Err(Error::validation(
            name,
            format!("must be between {min} and {max}, got {value}"),
        )),
        (Some(min), None) if value < min => Err(Error::validation(
            name,
            format!("must be at least {min}, got {value}"),
        )),
        (None, Some(max)) if value > max => Err(Error::validation(
            name,
            format!("must be at most {max}, got {value}"),
        )),
        _ => Ok(()),
    }
}

/// Field names for one audio input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AudioSlot {
    pub source: &'static str,
    pub url: &'static str,
    pub file: &'static str,
    pub fallback_name: &'static str,
}

pub(crate) const MAIN_AUDIO: AudioSlot = AudioSlot {
    source: "audioSource",
    url: "audio_url",
    file: "audio_file",
    fallback_name: "audio.mp3",
};

pub(crate) const REFERENCE_AUDIO: AudioSlot = AudioSlot {
    source: "referenceAudioSource",
    url: "reference_audio_url",
    file: "reference_audio_file",
    fallback_name: "reference.mp3",
};

/// How the response becomes output records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResponseMapping {
    /// Gate on `success` and keep the listed fields
    Fields(&'static [&'static str]),
    /// One record per element of the array under `key`, `id` from the first
    /// present id field
    Collection {
        key: &'static str,
        id_fields: &'static [&'static str],
    },
    /// The object under `key` with an `id`
    Single {
        key: &'static str,
        id_fields: &'static [&'static str],
    },
}

pub(crate) type Prepare = fn(&Parameters, &mut RequestBuilder) -> Result<()>;

/// Everything needed to build one operation's request and read its response
#[derive(Clone, Copy, Debug)]
pub(crate) struct OperationSpec {
    pub verb: Verb,
    pub endpoint: &'static str,
    pub encoding: Encoding,
    pub audio: &'static [AudioSlot],
    pub prepare: Option<Prepare>,
    /// Parameters the prepare hook reads
    pub hook_reads: &'static [&'static str],
    pub fields: &'static [BodyField],
    pub response: ResponseMapping,
}

const TASK: &[&str] = &["success", "task_id", "conversion_id", "eta"];
const TASK_PAIR: &[&str] = &[
    "success",
    "task_id",
    "conversion_id_1",
    "conversion_id_2",
    "eta",
];
const GENERATED: &[&str] = &[
    "success",
    "task_id",
    "conversion_id_1",
    "conversion_id_2",
    "eta",
    "message",
];
const SOUND: &[&str] = &[
    "success",
    "task_id",
    "conversion_id",
    "eta",
    "credit_estimate",
    "message",
];
const LYRICS: &[&str] = &["success", "lyrics"];

const VOICE_IDS: &[&str] = &["voice_id"];
const CONVERSION_IDS: &[&str] = &["conversion_id", "task_id", "id"];

const ONE_AUDIO: &[AudioSlot] = &[MAIN_AUDIO];
const TWO_AUDIO: &[AudioSlot] = &[MAIN_AUDIO, REFERENCE_AUDIO];

const WEBHOOK: BodyField = BodyField::optional("webhook_url", ValueKind::Text);
const PITCH: BodyField = BodyField::defaulted("pitch", ValueKind::Number, "0").between(-12.0, 12.0);

const ONLY_WEBHOOK: &[BodyField] = &[WEBHOOK];

const GENERATE_FIELDS: &[BodyField] = &[
    BodyField::required("make_instrumental", ValueKind::Flag),
    BodyField::required("vocal_only", ValueKind::Flag),
    BodyField::optional("voice_id", ValueKind::Voice),
    BodyField::optional("negative_tags", ValueKind::Text),
    WEBHOOK,
];

const SPEECH_FIELDS: &[BodyField] = &[
    BodyField::required("text", ValueKind::Text),
    BodyField::defaulted("language", ValueKind::Text, "auto"),
    WEBHOOK,
];

const VOICE_CHANGER_FIELDS: &[BodyField] = &[
    BodyField::required("voice_id", ValueKind::Voice),
    BodyField::required("remove_background", ValueKind::Flag),
    PITCH,
    WEBHOOK,
];

const COVER_FIELDS: &[BodyField] = &[
    BodyField::required("voice_id", ValueKind::Voice),
    PITCH,
    WEBHOOK,
];

const EXTRACTION_FIELDS: &[BodyField] = &[
    BodyField::required("stems", ValueKind::List),
    BodyField::optional("preprocessing_options", ValueKind::List),
    WEBHOOK,
];

const MASTERING_FIELDS: &[BodyField] = &[
    BodyField::optional("output_extension", ValueKind::Text),
    WEBHOOK,
];

const TRIM_FIELDS: &[BodyField] = &[
    BodyField::required("start_time", ValueKind::Number).at_least(0.0),
    BodyField::required("end_time", ValueKind::Number).at_least(0.0),
    WEBHOOK,
];

const SPEED_FIELDS: &[BodyField] = &[
    BodyField::required("speed_factor", ValueKind::Number).between(0.5, 2.0),
    WEBHOOK,
];

const CONVERT_FIELDS: &[BodyField] = &[
    BodyField::required("target_format", ValueKind::Text),
    BodyField::defaulted("target_sr", ValueKind::Text, "44100"),
    BodyField::defaulted("target_bit_depth", ValueKind::Text, "16"),
    WEBHOOK,
];

const TRANSCRIBE_FIELDS: &[BodyField] = &[
    BodyField::optional("language", ValueKind::Text),
    WEBHOOK,
];

const REMIX_FIELDS: &[BodyField] = &[
    BodyField::optional("prompt", ValueKind::Text),
    BodyField::optional("lyrics", ValueKind::Text),
    BodyField::optional("gender", ValueKind::Text),
    BodyField::optional("title", ValueKind::Text),
    WEBHOOK,
];

const EXTEND_FIELDS: &[BodyField] = &[
    BodyField::required("extend_after", ValueKind::Number).between(0.0, MAX_OUTPUT_LENGTH),
    BodyField::optional("prompt", ValueKind::Text),
    BodyField::optional("lyrics", ValueKind::Text),
    BodyField::optional("gender", ValueKind::Text),
    BodyField::optional("title", ValueKind::Text),
    WEBHOOK,
];

const INPAINT_FIELDS: &[BodyField] = &[
    BodyField::required("replace_start_at", ValueKind::Number).at_least(0.0),
    BodyField::required("replace_end_at", ValueKind::Number).at_least(0.0),
    BodyField::optional("prompt", ValueKind::Text),
    BodyField::optional("lyrics", ValueKind::Text),
    BodyField::optional("gender", ValueKind::Text),
    WEBHOOK,
];

const SING_OVER_FIELDS: &[BodyField] = &[
    BodyField::required("lyrics", ValueKind::Text),
    BodyField::optional("prompt", ValueKind::Text),
    BodyField::optional("gender", ValueKind::Text),
    BodyField::optional("title", ValueKind::Text),
    WEBHOOK,
];

const SOUND_FIELDS: &[BodyField] = &[
    BodyField::defaulted("audio_length", ValueKind::Number, "5").at_least(1.0),
    WEBHOOK,
];

const LYRICS_FIELDS: &[BodyField] = &[
    BodyField::required("prompt", ValueKind::Text),
    BodyField::optional("style", ValueKind::Text),
    WEBHOOK,
];

const LIMIT: BodyField = BodyField::defaulted("limit", ValueKind::Number, "20").between(1.0, 100.0);
const PAGE: BodyField = BodyField::defaulted("page", ValueKind::Number, "0").at_least(0.0);

const ALL_VOICES_FIELDS: &[BodyField] = &[LIMIT, PAGE];

const SEARCH_VOICES_FIELDS: &[BodyField] = &[
    BodyField::required("query", ValueKind::Text),
    LIMIT,
    PAGE,
];

const BY_ID_FIELDS: &[BodyField] = &[
    BodyField::optional("task_id", ValueKind::Text),
    BodyField::optional("conversion_id", ValueKind::Text),
];

const BY_USER_FIELDS: &[BodyField] = &[
    BodyField::optional("startDate", ValueKind::Text),
    BodyField::optional("endDate", ValueKind::Text),
    BodyField::defaulted("limit", ValueKind::Number, "10").between(1.0, 100.0),
    BodyField::optional("LastEvaluatedKey", ValueKind::Text),
];

const fn post(
    endpoint: &'static str,
    audio: &'static [AudioSlot],
    fields: &'static [BodyField],
    response: &'static [&'static str],
) -> OperationSpec {
    OperationSpec {
        verb: Verb::Post,
        endpoint,
        encoding: Encoding::Body,
        audio,
        prepare: None,
        hook_reads: &[],
        fields,
        response: ResponseMapping::Fields(response),
    }
}

const fn get(endpoint: &'static str, fields: &'static [BodyField], response: ResponseMapping) -> OperationSpec {
    OperationSpec {
        verb: Verb::Get,
        endpoint,
        encoding: Encoding::Query,
        audio: &[],
        prepare: None,
        hook_reads: &[],
        fields,
        response,
    }
}

impl OperationSpec {
    const fn with_prepare(mut self, prepare: Prepare, reads: &'static [&'static str]) -> Self {
        self.prepare = Some(prepare);
        self.hook_reads = reads;
        self
    }

    const fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Look up the settings for `operation`
pub(crate) fn spec(operation: Operation) -> OperationSpec {
    use Operation::*;

    match operation {
        GenerateAudio => post("/MusicAI", &[], GENERATE_FIELDS, GENERATED).with_prepare(
            generation_mode,
            &["generationMode", "prompt", "music_style", "lyrics", "output_length"],
        ),
        TextToSpeech => post("/TextToSpeech", &[], SPEECH_FIELDS, TASK)
            .with_prepare(speech_voice, &["voiceSelection", "voice_id", "gender"]),
        VoiceChanger => post("/VoiceChanger", ONE_AUDIO, VOICE_CHANGER_FIELDS, TASK),
        CoverSong => post("/Cover", ONE_AUDIO, COVER_FIELDS, TASK),
        Extraction => post("/Extraction", ONE_AUDIO, EXTRACTION_FIELDS, TASK),
        Denoise => post("/denoise", ONE_AUDIO, ONLY_WEBHOOK, TASK),
        Deecho => post("/deecho", ONE_AUDIO, ONLY_WEBHOOK, TASK),
        Dereverb => post("/dereverb", ONE_AUDIO, ONLY_WEBHOOK, TASK),
        AudioMastering => post("/audio_mastering", TWO_AUDIO, MASTERING_FIELDS, TASK),
        TrimAudio => post("/audio_cutter", ONE_AUDIO, TRIM_FIELDS, TASK)
            .with_prepare(trim_window, &["start_time", "end_time"]),
        ChangeAudioSpeed => post("/audio_speed_changer", ONE_AUDIO, SPEED_FIELDS, TASK),
        AudioToMidi => post("/audio_to_midi", ONE_AUDIO, ONLY_WEBHOOK, TASK),
        ExtractKeyBpm => post("/extract_key_bpm", ONE_AUDIO, ONLY_WEBHOOK, TASK),
        FileConvert => post("/file_convert", ONE_AUDIO, CONVERT_FIELDS, TASK),
        AudioTranscribe => post("/audio_transcribe", ONE_AUDIO, TRANSCRIBE_FIELDS, TASK),
        Remix => post("/Remix", ONE_AUDIO, REMIX_FIELDS, TASK_PAIR),
        Extend => post("/extend", ONE_AUDIO, EXTEND_FIELDS, TASK_PAIR),
        Inpaint => post("/inpaint", ONE_AUDIO, INPAINT_FIELDS, TASK_PAIR)
            .with_prepare(inpaint_window, &["replace_start_at", "replace_end_at"]),
        SingOverInstrumental => {
            post("/sing_over_instrumental", ONE_AUDIO, SING_OVER_FIELDS, TASK_PAIR)
                .with_prepare(sing_over_lyrics, &["lyrics"])
        }
        SoundGenerator => post("/sound_generator", &[], SOUND_FIELDS, SOUND)
            .with_prepare(sound_prompt, &["prompt"])
            .with_encoding(Encoding::UrlEncoded),
        PromptToLyrics => OperationSpec {
            verb: Verb::Get,
            encoding: Encoding::Query,
            ..post("/prompt_to_lyrics", &[], LYRICS_FIELDS, LYRICS)
        },
        GetAllVoices => get(
            "/getAllVoices",
            ALL_VOICES_FIELDS,
            ResponseMapping::Collection {
                key: "voices",
                id_fields: VOICE_IDS,
            },
        ),
        SearchVoices => get(
            "/searchVoices",
            SEARCH_VOICES_FIELDS,
            ResponseMapping::Collection {
                key: "voices",
                id_fields: VOICE_IDS,
            },
        ),
        GetConversionById => get(
            "/byId",
            BY_ID_FIELDS,
            ResponseMapping::Single {
                key: "conversion",
                id_fields: CONVERSION_IDS,
            },
        )
        .with_prepare(conversion_lookup, &["conversionType", "task_id", "conversion_id"]),
        GetConversionsByUser => get(
            "/byUser",
            BY_USER_FIELDS,
            ResponseMapping::Collection {
                key: "conversions",
                id_fields: CONVERSION_IDS,
            },
        )
        .with_prepare(user_conversions, &["conversionType", "sortOrder"]),
    }
}

fn generation_mode(params: &Parameters, builder: &mut RequestBuilder) -> Result<()> {
    match params.text_or("generationMode", "prompt").as_str() {
        "prompt" => builder.text("prompt", params.required_text("prompt")?),
        "custom" => {
            builder.text("music_style", params.required_text("music_style")?);
            builder.optional_text("lyrics", params.optional_text("lyrics"));
        }
        other => {
            return Err(Error::validation(
                "generationMode",
                format!("expected 'prompt' or 'custom', got '{other}'"),
            ));
        }
    }

    if let Some(length) = params.number("output_length")? {
        check_bounds("output_length", length, Some(0.0), Some(MAX_OUTPUT_LENGTH))?;
        // Zero means "let the API decide"
        if length > 0.0 {
            builder.number("output_length", length);
        }
    }

    Ok(())
}

fn speech_voice(params: &Parameters, builder: &mut RequestBuilder) -> Result<()> {
    match params.text_or("voiceSelection", "gender").as_str() {
        "voice" => {
            let voice = params
                .optional_text("voice_id")
                .filter(|voice| voice != NO_VOICE);
            builder.optional_text("voice_id", voice);
        }
        "gender" => {
            let gender = params.text_or("gender", "m");
            if !matches!(gender.as_str(), "m" | "f") {
                return Err(Error::validation(
                    "gender",
                    format!("expected 'm' or 'f', got '{gender}'"),
                ));
            }
            builder.text("gender", gender);
        }
        other => {
            return Err(Error::validation(
                "voiceSelection",
                format!("expected 'voice' or 'gender', got '{other}'"),
            ));
        }
    }

    Ok(())
}

fn trim_window(params: &Parameters, _builder: &mut RequestBuilder) -> Result<()> {
    ordered_window(params, "start_time", "end_time")
}

fn inpaint_window(params: &Parameters, _builder: &mut RequestBuilder) -> Result<()> {
    ordered_window(params, "replace_start_at", "replace_end_at")
}

fn ordered_window(params: &Parameters, start_field: &str, end_field: &str) -> Result<()> {
    if let (Some(start), Some(end)) = (params.number(start_field)?, params.number(end_field)?)
        && end <= start
    {
        return Err(Error::validation(
            end_field,
            format!("must be greater than {start_field} ({start}), got {end}"),
        ));
    }

    Ok(())
}

fn sing_over_lyrics(params: &Parameters, _builder: &mut RequestBuilder) -> Result<()> {
    if params.optional_text("lyrics").is_none() {
        return Err(Error::validation(
            "lyrics",
            "Lyrics are required for Sing Over Instrumental. Provide the lyrics to sing over the instrumental track.",
        ));
    }

    Ok(())
}

fn sound_prompt(params: &Parameters, builder: &mut RequestBuilder) -> Result<()> {
    let prompt = params.text("prompt").unwrap_or_default();
    let prompt = prompt.trim();

    if prompt.is_empty() {
        return Err(Error::validation("prompt", "Prompt is required"));
    }

    let length = prompt.chars().count();
    if length > MAX_SOUND_PROMPT_CHARS {
        return Err(Error::validation(
            "prompt",
            format!(
                "Prompt is too long ({length} characters). Maximum allowed is {MAX_SOUND_PROMPT_CHARS} characters."
            ),
        ));
    }

    builder.text("prompt", prompt);
    Ok(())
}

fn conversion_lookup(params: &Parameters, builder: &mut RequestBuilder) -> Result<()> {
    let conversion_type: ConversionType = params.required_text("conversionType")?.parse()?;

    if params.optional_text("task_id").is_none() && params.optional_text("conversion_id").is_none() {
        return Err(Error::validation(
            "task_id",
            "either a task ID or a conversion ID is required",
        ));
    }

    builder.text("conversionType", conversion_type.as_str());
    Ok(())
}

fn user_conversions(params: &Parameters, builder: &mut RequestBuilder) -> Result<()> {
    if let Some(conversion_type) = params.optional_text("conversionType") {
        let conversion_type: ConversionType = conversion_type.parse()?;
        builder.text("conversionType", conversion_type.as_str());
    }

    let sort_order = params.text_or("sortOrder", "DESC").to_ascii_uppercase();
    if !matches!(sort_order.as_str(), "ASC" | "DESC") {
        return Err(Error::validation(
            "sortOrder",
            format!("expected 'ASC' or 'DESC', got '{sort_order}'"),
        ));
    }
    builder.text("sortOrder", sort_order);

    Ok(())
}
