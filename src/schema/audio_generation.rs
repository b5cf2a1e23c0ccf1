//! Fields for the audio generation resource

use super::{FieldSpec, LOAD_VOICES, LOAD_VOICES_REQUIRED, OptionSpec, main_audio, options, webhook};
use crate::operations::Operation;

const STEMS: &[(&str, &str)] = &[
    ("Acoustic Guitar", "acoustic_guitar"),
    ("Back Vocal", "back_vocal"),
    ("Bass", "bass"),
    ("Crash", "crash"),
    ("Drums", "drums"),
    ("Electric Guitar", "electric_guitar"),
    ("Female Vocal", "female_vocal"),
    ("Guitar", "guitar"),
    ("Hi-Hat", "hi_hat"),
    ("Instrumental", "instrumental"),
    ("Keys", "keys"),
    ("Kick Drum", "kick_drum"),
    ("Lead Vocal", "lead_vocal"),
    ("Male Vocal", "male_vocal"),
    ("Piano", "piano"),
    ("Rhythm Guitar", "rhythm_guitar"),
    ("Ride", "ride"),
    ("Snare Drum", "snare_drum"),
    ("Solo Guitar", "solo_guitar"),
    ("Strings", "strings"),
    ("Toms", "toms"),
    ("Vocals", "vocals"),
    ("Winds", "winds"),
];

pub(crate) const SPEECH_LANGUAGES: &[(&str, &str)] = &[
    ("Auto Detect", "auto"),
    ("Chinese", "zh"),
    ("English", "en"),
    ("French", "fr"),
    ("German", "de"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Portuguese", "pt"),
    ("Spanish", "es"),
];

fn required_voice() -> FieldSpec {
    FieldSpec::dynamic_options("voice_id", "Voice Name or ID", LOAD_VOICES_REQUIRED, "")
        .required()
        .description("Voice to use. Choose from the list, or specify an ID using an expression.")
}

fn optional_voice() -> FieldSpec {
    FieldSpec::dynamic_options("voice_id", "Voice Name or ID", LOAD_VOICES, "none")
        .description("Voice to use. Choose from the list, or specify an ID using an expression.")
}

fn pitch() -> FieldSpec {
    FieldSpec::number("pitch", "Pitch", 0.0)
        .bounds(Some(-12.0), Some(12.0))
        .description("Pitch shift in semitones")
}

pub(super) fn fields(operation: Operation) -> Vec<FieldSpec> {
    match operation {
        Operation::GenerateAudio => vec![
            FieldSpec::options(
                "generationMode",
                "Generation Mode",
                vec![
                    OptionSpec::new("Custom (Lyrics + Style)", "custom")
                        .with_description("Provide lyrics and a music style"),
                    OptionSpec::new("Prompt", "prompt")
                        .with_description("Describe the song in natural language"),
                ],
                "prompt",
            ),
            FieldSpec::text_area("prompt", "Prompt", 4)
                .required()
                .placeholder("An upbeat pop song about summer")
                .description("Natural language description of the music")
                .show("generationMode", &["prompt"]),
            FieldSpec::string("music_style", "Music Style")
                .required()
                .placeholder("Pop, Rock, Jazz")
                .description("Genre or style of the music")
                .show("generationMode", &["custom"]),
            FieldSpec::text_area("lyrics", "Lyrics", 6)
                .description("Lyrics to sing")
                .show("generationMode", &["custom"]),
            FieldSpec::boolean("make_instrumental", "Make Instrumental")
                .description("Whether to generate without vocals"),
            FieldSpec::boolean("vocal_only", "Vocal Only")
                .description("Whether to return only the vocals"),
            optional_voice(),
            FieldSpec::string("negative_tags", "Negative Tags")
                .placeholder("screaming, distortion")
                .description("Styles or elements to avoid"),
            FieldSpec::number("output_length", "Output Length", 0.0)
                .bounds(Some(0.0), Some(300.0))
                .description("Length in seconds. 0 lets the API decide."),
            webhook(),
        ],
        Operation::TextToSpeech => vec![
            FieldSpec::text_area("text", "Text", 4)
                .required()
                .description("Text to speak"),
            FieldSpec::options(
                "voiceSelection",
                "Voice Selection",
                options(&[("Use Gender", "gender"), ("Use Specific Voice", "voice")]),
                "gender",
            ),
            optional_voice().show("voiceSelection", &["voice"]),
            FieldSpec::options(
                "gender",
                "Gender",
                options(&[("Male", "m"), ("Female", "f")]),
                "m",
            )
            .show("voiceSelection", &["gender"]),
            FieldSpec::options("language", "Language", options(SPEECH_LANGUAGES), "auto"),
            webhook(),
        ],
        Operation::VoiceChanger => {
            let mut fields = main_audio();
            fields.extend([
                required_voice(),
                FieldSpec::boolean("remove_background", "Remove Background")
                    .description("Whether to strip the backing track first"),
                pitch(),
                webhook(),
            ]);
            fields
        }
        Operation::CoverSong => {
            let mut fields = main_audio();
            fields.extend([required_voice(), pitch(), webhook()]);
            fields
        }
        Operation::Extraction => {
            let mut fields = main_audio();
            fields.extend([
                FieldSpec::multi_options("stems", "Stems to Extract", options(STEMS), &["vocals"])
                    .required()
                    .description("Stems to separate from the track"),
                FieldSpec::multi_options(
                    "preprocessing_options",
                    "Preprocessing Options",
                    options(&[
                        ("Denoise", "Denoise"),
                        ("Deecho", "Deecho"),
                        ("Dereverb", "Dereverb"),
                    ]),
                    &[],
                )
                .description("Clean-up applied before extraction"),
                webhook(),
            ]);
            fields
        }
        Operation::Denoise => {
            let mut fields = main_audio();
            fields.push(webhook());
            fields
        }
        _ => Vec::new(),
    }
}
