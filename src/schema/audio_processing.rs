//! Fields for the audio processing resource

use super::{FieldSpec, OptionSpec, audio_fields, main_audio, options, webhook};
use crate::operations::Operation;

const FORMATS: &[(&str, &str)] = &[
    ("MP3", "mp3"),
    ("WAV", "wav"),
    ("FLAC", "flac"),
    ("OGG", "ogg"),
    ("AAC", "aac"),
    ("WEBM", "webm"),
];

const SAMPLE_RATES: &[(&str, &str)] = &[
    ("8000 Hz", "8000"),
    ("16000 Hz", "16000"),
    ("22050 Hz", "22050"),
    ("24000 Hz", "24000"),
    ("32000 Hz", "32000"),
    ("44100 Hz (CD Quality)", "44100"),
    ("48000 Hz (Professional)", "48000"),
    ("96000 Hz (High-Res)", "96000"),
    ("192000 Hz (Ultra High-Res)", "192000"),
];

const TRANSCRIBE_LANGUAGES: &[(&str, &str)] = &[
    ("Auto Detect", "auto"),
    ("English", "en"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Italian", "it"),
    ("Portuguese", "pt"),
    ("Chinese", "zh"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
];

pub(super) fn fields(operation: Operation) -> Vec<FieldSpec> {
    let extra = match operation {
        Operation::AudioMastering => {
            let mut fields = audio_fields(
                "referenceAudioSource",
                "reference_audio_url",
                "reference_audio_file",
                "Reference Audio",
            );
            let mut extensions = vec![OptionSpec::new("Same as Input", "")];
            extensions.extend(options(FORMATS));
            fields.push(
                FieldSpec::options("output_extension", "Output Extension", extensions, "")
                    .description("Format of the mastered file"),
            );
            fields
        }
        Operation::TrimAudio => vec![
            FieldSpec::number("start_time", "Start Time", 0.0)
                .required()
                .bounds(Some(0.0), None)
                .description("Start of the kept range, in seconds"),
            FieldSpec::number("end_time", "End Time", 0.0)
                .required()
                .bounds(Some(0.0), None)
                .description("End of the kept range, in seconds"),
        ],
        Operation::ChangeAudioSpeed => vec![
            FieldSpec::number("speed_factor", "Speed Factor", 1.0)
                .required()
                .bounds(Some(0.5), Some(2.0))
                .description("Playback speed multiplier"),
        ],
        Operation::FileConvert => vec![
            FieldSpec::options("target_format", "Target Format", options(FORMATS), "mp3").required(),
            FieldSpec::options("target_sr", "Target Sampling Rate", options(SAMPLE_RATES), "44100"),
            FieldSpec::options(
                "target_bit_depth",
                "Target Bit Depth",
                options(&[("16-bit (Standard)", "16"), ("24-bit (Professional)", "24")]),
                "16",
            ),
        ],
        Operation::AudioTranscribe => vec![
            FieldSpec::options("language", "Language", options(TRANSCRIBE_LANGUAGES), "auto")
                .description("Spoken language"),
        ],
        Operation::Deecho | Operation::Dereverb | Operation::AudioToMidi | Operation::ExtractKeyBpm => {
            Vec::new()
        }
        _ => return Vec::new(),
    };

    let mut fields = main_audio();
    fields.extend(extra);
    fields.push(webhook());
    fields
}
