//! Fields for the advanced generation resource

use super::{FieldSpec, gender, main_audio, webhook};
use crate::operations::{MAX_SOUND_PROMPT_CHARS, Operation};

fn prompt() -> FieldSpec {
    FieldSpec::text_area("prompt", "Prompt", 3).description("Direction for the generated audio")
}

fn lyrics(rows: u32) -> FieldSpec {
    FieldSpec::text_area("lyrics", "Lyrics", rows).description("Lyrics to sing")
}

fn title() -> FieldSpec {
    FieldSpec::string("title", "Title").description("Title of the result")
}

pub(super) fn fields(operation: Operation) -> Vec<FieldSpec> {
    let audio_extra = match operation {
        Operation::Remix => vec![prompt(), lyrics(6), gender("neutral"), title()],
        Operation::Extend => vec![
            FieldSpec::number("extend_after", "Extend After (seconds)", 30.0)
                .required()
                .bounds(Some(0.0), Some(300.0))
                .description("Point in the track where the extension starts"),
            prompt(),
            lyrics(4),
            gender("neutral"),
            title(),
        ],
        Operation::Inpaint => vec![
            FieldSpec::number("replace_start_at", "Start Time", 0.0)
                .required()
                .bounds(Some(0.0), None)
                .description("Start of the section to replace, in seconds"),
            FieldSpec::number("replace_end_at", "End Time", 0.0)
                .required()
                .bounds(Some(0.0), None)
                .description("End of the section to replace, in seconds"),
            prompt(),
            lyrics(4),
            gender("neutral"),
        ],
        Operation::SingOverInstrumental => vec![
            lyrics(5).required(),
            prompt(),
            gender("neutral"),
            title(),
        ],
        Operation::SoundGenerator => {
            return vec![
                FieldSpec::text_area("prompt", "Prompt", 4)
                    .required()
                    .placeholder("Thunder rolling over a quiet forest")
                    .description(&format!(
                        "Description of the sound, at most {MAX_SOUND_PROMPT_CHARS} characters"
                    )),
                FieldSpec::number("audio_length", "Audio Length", 5.0)
                    .bounds(Some(1.0), None)
                    .description("Length in seconds"),
                webhook(),
            ];
        }
        Operation::PromptToLyrics => {
            return vec![
                FieldSpec::text_area("prompt", "Prompt", 4)
                    .required()
                    .placeholder("A ballad about leaving home")
                    .description("What the lyrics should be about"),
                FieldSpec::string("style", "Style")
                    .placeholder("Folk")
                    .description("Musical style of the lyrics"),
                webhook(),
            ];
        }
        _ => return Vec::new(),
    };

    let mut fields = main_audio();
    fields.extend(audio_extra);
    fields.push(webhook());
    fields
}
