use super::*;
use crate::operations::{build_request, parameter_names};
use crate::types::Parameters;
use serde_json::json;

fn visible_for<'a>(node: &'a NodeDescription, values: &[(&'a str, &'a str)]) -> Vec<&'a FieldSpec> {
    let values: BTreeMap<&str, &str> = values.iter().copied().collect();
    node.properties
        .iter()
        .filter(|field| field.display_options.is_visible(&values))
        .collect()
}

#[test]
fn every_parameter_an_operation_reads_is_declared() {
    for operation in Operation::ALL {
        let declared: Vec<String> = fields_for(operation)
            .into_iter()
            .map(|field| field.name)
            .collect();

        for name in parameter_names(operation) {
            assert!(
                declared.iter().any(|field| field == name),
                "{operation} reads '{name}' but declares no such field"
            );
        }
    }
}

#[test]
fn values_read_by_prepare_hooks_count_as_parameters() {
    let cases: [(Operation, &[&str]); 4] = [
        (
            Operation::GenerateAudio,
            &["generationMode", "music_style", "output_length"],
        ),
        (Operation::TextToSpeech, &["voiceSelection", "gender"]),
        (Operation::GetConversionById, &["conversionType"]),
        (Operation::GetConversionsByUser, &["conversionType", "sortOrder"]),
    ];

    for (operation, hook_names) in cases {
        let names = parameter_names(operation);
        for name in hook_names {
            assert!(names.contains(name), "{operation} should read '{name}'");
        }
    }
}

#[test]
fn audio_fields_are_declared_exactly_for_audio_operations() {
    for operation in Operation::ALL {
        let declares_audio = fields_for(operation)
            .iter()
            .any(|field| field.name == "audioSource");

        assert_eq!(declares_audio, operation.takes_audio(), "{operation}");
    }
}

#[test]
fn action_node_starts_with_resource_and_operation_selectors() {
    let node = action_node();

    assert_eq!(node.properties[0].name, "resource");
    assert_eq!(node.properties[0].default, json!("audioGeneration"));
    assert_eq!(
        node.fields_named("operation").count(),
        Resource::ALL.len()
    );

    for selector in node.fields_named("operation") {
        let values = selector.allowed_values().unwrap();
        assert!(values.contains(&&selector.default), "{:?}", selector.display_options);
    }
}

#[test]
fn audio_url_is_only_visible_for_url_sources() {
    let node = action_node();
    let base = [("resource", "audioGeneration"), ("operation", "voiceChanger")];

    let url = visible_for(&node, &[base[0], base[1], ("audioSource", "url")]);
    assert!(url.iter().any(|field| field.name == "audio_url"));
    assert!(!url.iter().any(|field| field.name == "audio_file"));

    let file = visible_for(&node, &[base[0], base[1], ("audioSource", "file")]);
    assert!(file.iter().any(|field| field.name == "audio_file"));
    assert!(!file.iter().any(|field| field.name == "audio_url"));

    // Other operations' fields stay hidden
    assert!(!url.iter().any(|field| field.name == "stems"));
}

#[test]
fn fields_serialize_in_host_format() {
    let pitch = fields_for(Operation::CoverSong)
        .into_iter()
        .find(|field| field.name == "pitch")
        .unwrap()
        .show("operation", &["coverSong"]);

    assert_eq!(
        serde_json::to_value(&pitch).unwrap(),
        json!({
            "name": "pitch",
            "displayName": "Pitch",
            "type": "number",
            "minValue": -12.0,
            "maxValue": 12.0,
            "default": 0,
            "description": "Pitch shift in semitones",
            "displayOptions": { "show": { "operation": ["coverSong"] } }
        })
    );

    let voice = fields_for(Operation::CoverSong)
        .into_iter()
        .find(|field| field.name == "voice_id")
        .unwrap();
    let value = serde_json::to_value(&voice).unwrap();
    assert_eq!(value["type"], "options");
    assert_eq!(value["loadOptionsMethod"], LOAD_VOICES_REQUIRED);
    assert_eq!(value["required"], true);
}

#[test]
fn defaults_of_visible_fields_build_valid_requests() {
    // Operations whose required inputs all have usable defaults
    for operation in [
        Operation::Extraction,
        Operation::ChangeAudioSpeed,
        Operation::FileConvert,
        Operation::Extend,
        Operation::GetAllVoices,
        Operation::GetConversionsByUser,
    ] {
        let mut params = Parameters::new().with("audio_url", "https://cdn.example.com/a.mp3");
        for field in fields_for(operation) {
            if field.name != "audio_url" && field.display_options.is_empty() {
                params.insert(field.name.clone(), field.default.clone());
            }
        }

        assert!(
            build_request(operation, &params).is_ok(),
            "{operation}: {:?}",
            build_request(operation, &params).unwrap_err()
        );
    }
}

#[test]
fn trigger_node_polls_and_defaults_to_new_conversions() {
    let node = trigger_node();

    assert!(node.polling);
    assert_eq!(node.properties[0].name, "triggerOn");
    assert_eq!(node.properties[0].default, json!("getConversionsByUser"));

    let by_user = visible_for(&node, &[("triggerOn", "getConversionsByUser")]);
    let limit = by_user.iter().find(|field| field.name == "limit").unwrap();
    assert_eq!(limit.default, json!(50));
    assert!(by_user.iter().all(|field| field.name != "task_id"));

    let by_id = visible_for(&node, &[("triggerOn", "getConversionById")]);
    let conversion_type = by_id
        .iter()
        .find(|field| field.name == "conversionType")
        .unwrap();
    assert!(conversion_type.required);
    assert_eq!(conversion_type.default, json!("VOICE_CONVERSION"));
}
