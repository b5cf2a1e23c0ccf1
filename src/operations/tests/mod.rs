use super::*;
use super::table::{Presence, ValueKind};
use crate::config::{ClientConfig, Credentials};
use crate::testing::{RecordingTransport, api_error};
use crate::transport::{ApiClient, FormValue, RequestBody, Verb};
use crate::types::BinaryPayload;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn object(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn json_body(request: &ApiRequest) -> &Record {
    match &request.body {
        RequestBody::Json(map) => map,
        other => panic!("expected JSON body, got {other:?}"),
    }
}

fn with_audio_url(params: Parameters) -> Parameters {
    params.with("audio_url", "https://cdn.example.com/input.mp3")
}

fn sends(request: &ApiRequest, name: &str) -> bool {
    request.body.contains(name) || request.query_value(name).is_some()
}

/// The smallest valid input for each operation, audio excluded
fn required_inputs(operation: Operation) -> Parameters {
    use Operation::*;

    let params = Parameters::new();
    match operation {
        GenerateAudio => params.with("prompt", "jazz"),
        TextToSpeech => params.with("text", "Hello"),
        VoiceChanger | CoverSong => params.with("voice_id", "v-1"),
        Extraction => params.with("stems", json!(["vocals"])),
        AudioMastering => params.with("reference_audio_url", "https://cdn.example.com/ref.mp3"),
        TrimAudio => params.with("start_time", 1).with("end_time", 5),
        ChangeAudioSpeed => params.with("speed_factor", 1.5),
        FileConvert => params.with("target_format", "wav"),
        Extend => params.with("extend_after", 30),
        Inpaint => params.with("replace_start_at", 1).with("replace_end_at", 4),
        SingOverInstrumental => params.with("lyrics", "la la la"),
        SoundGenerator => params.with("prompt", "rain on a tin roof"),
        PromptToLyrics => params.with("prompt", "summer"),
        SearchVoices => params.with("query", "aria"),
        GetConversionById => params.with("conversionType", "MUSIC_AI").with("task_id", "t-1"),
        Denoise | Deecho | Dereverb | AudioToMidi | ExtractKeyBpm | AudioTranscribe | Remix
        | GetAllVoices | GetConversionsByUser => params,
    }
}

/// Optional values read by prepare hooks, with their "empty" form
fn blank_hook_inputs(operation: Operation) -> &'static [(&'static str, &'static str)] {
    match operation {
        Operation::GenerateAudio => &[("output_length", "0"), ("lyrics", "")],
        Operation::GetConversionsByUser => &[("conversionType", "")],
        _ => &[],
    }
}

/// Required inputs plus every optional field explicitly left blank; returns
/// the names that must not be sent
fn with_blank_optionals(operation: Operation) -> (Parameters, Vec<&'static str>) {
    let mut params = required_inputs(operation);
    let mut blank = Vec::new();

    for field in table::spec(operation).fields {
        if field.presence != Presence::Optional || params.text(field.name).is_some() {
            continue;
        }
        let empty = if field.kind == ValueKind::Voice { "none" } else { "" };
        params.insert(field.name, empty);
        blank.push(field.name);
    }
    for (name, empty) in blank_hook_inputs(operation) {
        params.insert(*name, *empty);
        blank.push(*name);
    }

    (params, blank)
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[test]
fn selector_pairs_resolve_only_under_their_resource() {
    assert_eq!(
        Operation::parse("advancedGeneration", "remix").unwrap(),
        Operation::Remix
    );
    assert_eq!(
        Operation::parse("audioGeneration", "denoise").unwrap(),
        Operation::Denoise
    );

    let err = Operation::parse("search", "remix").unwrap_err();
    assert!(matches!(err, Error::UnknownOperation { .. }));
    assert!(Operation::parse("billing", "getCredits").is_err());
}

#[test]
fn every_operation_is_listed_once() {
    let listed: Vec<Operation> = Resource::ALL
        .iter()
        .flat_map(|resource| resource.operations())
        .collect();

    assert_eq!(listed.len(), Operation::ALL.len());
    for operation in Operation::ALL {
        assert_eq!(
            listed.iter().filter(|candidate| **candidate == operation).count(),
            1,
            "{operation}"
        );
        assert_eq!(
            Operation::parse(operation.resource().as_str(), operation.as_str()).unwrap(),
            operation
        );
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

#[test]
fn generate_audio_prompt_mode_sends_flags_and_omits_empty_fields() {
    let params = Parameters::new()
        .with("prompt", "lofi beat with rain")
        .with("voice_id", "none")
        .with("negative_tags", "")
        .with("output_length", 0);

    let request = build_request(Operation::GenerateAudio, &params).unwrap();

    assert_eq!(request.verb, Verb::Post);
    assert_eq!(request.path, "/api/public/v1/MusicAI");
    assert_eq!(
        json_body(&request),
        &object(json!({
            "prompt": "lofi beat with rain",
            "make_instrumental": false,
            "vocal_only": false
        }))
    );
}

#[test]
fn generate_audio_custom_mode_needs_a_style() {
    let params = Parameters::new()
        .with("generationMode", "custom")
        .with("lyrics", "city lights");
    let err = build_request(Operation::GenerateAudio, &params).unwrap_err();
    assert!(matches!(err, Error::MissingParameter(name) if name == "music_style"));

    let params = params
        .with("music_style", "synthwave")
        .with("output_length", 120)
        .with("voice_id", "v-9")
        .with("make_instrumental", true);
    let request = build_request(Operation::GenerateAudio, &params).unwrap();
    let body = json_body(&request);

    assert_eq!(body["music_style"], "synthwave");
    assert_eq!(body["lyrics"], "city lights");
    assert_eq!(body["output_length"], 120);
    assert_eq!(body["voice_id"], "v-9");
    assert_eq!(body["make_instrumental"], true);
    assert!(!body.contains_key("prompt"));

    let too_long = params.with("output_length", 301);
    assert!(
        build_request(Operation::GenerateAudio, &too_long)
            .unwrap_err()
            .is_validation()
    );
}

#[test]
fn negative_output_length_is_rejected_not_dropped() {
    let params = Parameters::new()
        .with("prompt", "jazz")
        .with("output_length", -5);

    let err = build_request(Operation::GenerateAudio, &params).unwrap_err();

    assert!(err.is_validation());
    assert!(err.to_string().contains("output_length"));
}

#[test]
fn text_to_speech_switches_between_gender_and_voice() {
    let params = Parameters::new().with("text", "Hello there");
    let request = build_request(Operation::TextToSpeech, &params).unwrap();
    assert_eq!(
        json_body(&request),
        &object(json!({ "text": "Hello there", "language": "auto", "gender": "m" }))
    );

    let params = params
        .with("voiceSelection", "voice")
        .with("voice_id", "v-1")
        .with("gender", "f");
    let request = build_request(Operation::TextToSpeech, &params).unwrap();
    let body = json_body(&request);
    assert_eq!(body["voice_id"], "v-1");
    assert!(!body.contains_key("gender"));
}

#[test]
fn audio_operations_with_minimal_input_send_only_the_audio_and_defaults() {
    let params = with_audio_url(Parameters::new());

    for operation in [
        Operation::Denoise,
        Operation::Deecho,
        Operation::Dereverb,
        Operation::AudioToMidi,
        Operation::ExtractKeyBpm,
        Operation::AudioTranscribe,
        Operation::Remix,
    ] {
        let request = build_request(operation, &params).unwrap();
        assert_eq!(
            json_body(&request),
            &object(json!({ "audio_url": "https://cdn.example.com/input.mp3" })),
            "{operation}"
        );
    }
}

#[test]
fn blank_optional_fields_are_never_sent() {
    for operation in Operation::ALL {
        let (params, blank) = with_blank_optionals(operation);
        let params = if operation.takes_audio() {
            with_audio_url(params)
        } else {
            params
        };

        let request = build_request(operation, &params)
            .unwrap_or_else(|e| panic!("{operation}: {e}"));

        for name in blank {
            assert!(!sends(&request, name), "{operation} sent blank '{name}'");
        }
    }
}

#[test]
fn audio_is_sent_as_exactly_one_of_url_or_file() {
    let audio_operations: Vec<Operation> = Operation::ALL
        .into_iter()
        .filter(Operation::takes_audio)
        .collect();
    assert_eq!(audio_operations.len(), 17);

    for operation in audio_operations {
        let (params, blank) = with_blank_optionals(operation);

        let by_url = build_request(operation, &with_audio_url(params.clone()))
            .unwrap_or_else(|e| panic!("{operation}: {e}"));
        assert!(sends(&by_url, "audio_url"), "{operation}");
        assert!(!sends(&by_url, "audio_file"), "{operation}");

        // The URL stays set to show the source selector decides
        let uploaded = with_audio_url(params)
            .with("audioSource", "file")
            .with_binary("data", BinaryPayload::new(vec![0xFF, 0xFB, 0x90], "take.mp3"));
        let by_file = build_request(operation, &uploaded)
            .unwrap_or_else(|e| panic!("{operation}: {e}"));
        assert!(sends(&by_file, "audio_file"), "{operation}");
        assert!(!sends(&by_file, "audio_url"), "{operation}");
        assert_eq!(by_file.body.kind(), "multipart", "{operation}");

        for name in blank {
            assert!(!sends(&by_file, name), "{operation} sent blank '{name}'");
        }
    }
}

#[test]
fn webhook_is_forwarded_when_set() {
    let params = with_audio_url(Parameters::new()).with("webhook_url", "https://hooks.example.com/mgpt");
    let request = build_request(Operation::Denoise, &params).unwrap();

    assert_eq!(json_body(&request)["webhook_url"], "https://hooks.example.com/mgpt");
}

#[test]
fn uploaded_audio_turns_the_body_into_multipart() {
    let params = Parameters::new()
        .with("audioSource", "file")
        .with("voice_id", "v-3")
        .with("pitch", -2)
        .with_binary(
            "data",
            BinaryPayload::new(vec![0xFF, 0xFB], "take.wav").with_content_type("audio/wav"),
        );

    let request = build_request(Operation::VoiceChanger, &params).unwrap();

    let RequestBody::Multipart(parts) = &request.body else {
        panic!("expected multipart, got {:?}", request.body);
    };
    assert!(request.body.contains("audio_file"));
    assert!(!request.body.contains("audio_url"));
    assert!(parts.contains(&("voice_id".to_string(), FormValue::Text("v-3".into()))));
    assert!(parts.contains(&("pitch".to_string(), FormValue::Text("-2".into()))));
    assert!(parts.contains(&(
        "remove_background".to_string(),
        FormValue::Text("false".into())
    )));
}

#[test]
fn mastering_resolves_both_audio_slots_independently() {
    let params = with_audio_url(Parameters::new())
        .with("referenceAudioSource", "file")
        .with("reference_audio_file", "ref")
        .with_binary("ref", BinaryPayload::new(vec![1, 2, 3], ""))
        .with("output_extension", "wav");

    let request = build_request(Operation::AudioMastering, &params).unwrap();

    let RequestBody::Multipart(parts) = &request.body else {
        panic!("expected multipart, got {:?}", request.body);
    };
    assert!(parts.contains(&(
        "audio_url".to_string(),
        FormValue::Text("https://cdn.example.com/input.mp3".into())
    )));
    let reference = parts
        .iter()
        .find_map(|(name, value)| match value {
            FormValue::File(payload) if name == "reference_audio_file" => Some(payload),
            _ => None,
        })
        .unwrap();
    assert_eq!(reference.file_name, "reference.mp3");
    assert!(!request.body.contains("reference_audio_url"));
}

#[test]
fn missing_required_voice_fails_before_sending() {
    let params = with_audio_url(Parameters::new()).with("voice_id", "none");

    let err = build_request(Operation::CoverSong, &params).unwrap_err();
    assert!(matches!(err, Error::MissingParameter(name) if name == "voice_id"));
}

#[test]
fn pitch_outside_range_is_rejected() {
    let params = with_audio_url(Parameters::new())
        .with("voice_id", "v-1")
        .with("pitch", 13);

    let err = build_request(Operation::CoverSong, &params).unwrap_err();
    assert!(matches!(err, Error::Validation { field, .. } if field == "pitch"));
}

#[test]
fn extraction_sends_stems_as_a_json_string() {
    let params = with_audio_url(Parameters::new())
        .with("stems", json!(["vocals", "drums"]))
        .with("preprocessing_options", json!([]));

    let request = build_request(Operation::Extraction, &params).unwrap();
    let body = json_body(&request);

    assert_eq!(body["stems"], r#"["vocals","drums"]"#);
    assert!(!body.contains_key("preprocessing_options"));

    let empty = with_audio_url(Parameters::new()).with("stems", json!([]));
    assert!(
        build_request(Operation::Extraction, &empty)
            .unwrap_err()
            .is_validation()
    );
}

#[test]
fn trim_window_must_be_ordered() {
    let params = with_audio_url(Parameters::new())
        .with("start_time", 30)
        .with("end_time", 10);
    let err = build_request(Operation::TrimAudio, &params).unwrap_err();
    assert!(matches!(err, Error::Validation { field, .. } if field == "end_time"));

    let params = with_audio_url(Parameters::new())
        .with("start_time", 0)
        .with("end_time", 12.5);
    let request = build_request(Operation::TrimAudio, &params).unwrap();
    assert_eq!(request.path, "/api/public/v1/audio_cutter");
    assert_eq!(json_body(&request)["end_time"], 12.5);
}

#[test]
fn inpaint_uses_replace_window_fields() {
    let params = with_audio_url(Parameters::new())
        .with("replace_start_at", 5)
        .with("replace_end_at", 9)
        .with("prompt", "add a guitar solo");

    let request = build_request(Operation::Inpaint, &params).unwrap();
    let body = json_body(&request);

    assert_eq!(body["replace_start_at"], 5);
    assert_eq!(body["replace_end_at"], 9);
    assert!(!body.contains_key("start_time"));
}

#[test]
fn file_convert_fills_in_sample_rate_and_bit_depth() {
    let params = with_audio_url(Parameters::new()).with("target_format", "flac");

    let request = build_request(Operation::FileConvert, &params).unwrap();
    let body = json_body(&request);

    assert_eq!(body["target_format"], "flac");
    assert_eq!(body["target_sr"], "44100");
    assert_eq!(body["target_bit_depth"], "16");
}

#[test]
fn sound_prompt_is_trimmed_and_limited_to_300_characters() {
    let exact = "a".repeat(MAX_SOUND_PROMPT_CHARS);
    let params = Parameters::new().with("prompt", format!("  {exact}  "));
    let request = build_request(Operation::SoundGenerator, &params).unwrap();

    assert_eq!(
        request.body,
        RequestBody::UrlEncoded(vec![
            ("prompt".to_string(), exact.clone()),
            ("audio_length".to_string(), "5".to_string()),
        ])
    );

    let params = Parameters::new().with("prompt", format!("{exact}b"));
    let err = build_request(Operation::SoundGenerator, &params).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for 'prompt': Prompt is too long (301 characters). Maximum allowed is 300 characters."
    );
}

#[tokio::test]
async fn rejected_prompts_never_reach_the_transport() {
    let transport = RecordingTransport::new();

    let too_long = Parameters::new().with("prompt", "x".repeat(301));
    assert!(
        execute(&transport, Operation::SoundGenerator, &too_long)
            .await
            .is_err()
    );

    let blank_lyrics = with_audio_url(Parameters::new()).with("lyrics", "   ");
    let err = execute(&transport, Operation::SingOverInstrumental, &blank_lyrics)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Lyrics are required for Sing Over Instrumental"));

    assert_eq!(transport.request_count(), 0);
}

#[test]
fn prompt_to_lyrics_uses_the_query_string() {
    let params = Parameters::new()
        .with("prompt", "a song about autumn")
        .with("style", "");

    let request = build_request(Operation::PromptToLyrics, &params).unwrap();

    assert_eq!(request.verb, Verb::Get);
    assert_eq!(request.body, RequestBody::Empty);
    assert_eq!(request.query_value("prompt"), Some("a song about autumn"));
    assert_eq!(request.query_value("style"), None);
}

#[test]
fn conversion_lookup_needs_an_identifier() {
    let params = Parameters::new().with("conversionType", "MUSIC_AI");
    let err = build_request(Operation::GetConversionById, &params).unwrap_err();
    assert!(matches!(err, Error::Validation { field, .. } if field == "task_id"));

    let params = params.with("task_id", "t-1");
    let request = build_request(Operation::GetConversionById, &params).unwrap();
    assert_eq!(request.query_value("conversionType"), Some("MUSIC_AI"));
    assert_eq!(request.query_value("task_id"), Some("t-1"));
    assert_eq!(request.query_value("conversion_id"), None);
}

#[test]
fn user_conversions_normalise_type_and_sort_order() {
    let params = Parameters::new()
        .with("conversionType", "voice_changer")
        .with("sortOrder", "asc");

    let request = build_request(Operation::GetConversionsByUser, &params).unwrap();

    assert_eq!(request.query_value("conversionType"), Some("VOICE_CONVERSION"));
    assert_eq!(request.query_value("sortOrder"), Some("ASC"));
    assert_eq!(request.query_value("limit"), Some("10"));

    let bad = Parameters::new().with("sortOrder", "sideways");
    assert!(build_request(Operation::GetConversionsByUser, &bad).is_err());
}

// ---------------------------------------------------------------------------
// Response mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_submission_keeps_only_task_fields() {
    let transport = RecordingTransport::new().respond(json!({
        "success": true,
        "task_id": "t-1",
        "conversion_id_1": "c-1",
        "conversion_id_2": "c-2",
        "eta": 90,
        "message": "queued",
        "internal": "ignored"
    }));

    let output = execute(
        &transport,
        Operation::GenerateAudio,
        &Parameters::new().with("prompt", "jazz"),
    )
    .await
    .unwrap();

    assert_eq!(
        output.records,
        vec![object(json!({
            "success": true,
            "task_id": "t-1",
            "conversion_id_1": "c-1",
            "conversion_id_2": "c-2",
            "eta": 90,
            "message": "queued"
        }))]
    );
}

#[tokio::test]
async fn unsuccessful_task_submission_is_rejected() {
    let transport =
        RecordingTransport::new().respond(json!({ "success": false, "message": "Insufficient credits" }));

    let err = execute(
        &transport,
        Operation::Denoise,
        &with_audio_url(Parameters::new()),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        Error::Rejected { ref path, ref message }
            if path == "/api/public/v1/denoise" && message == "Insufficient credits"
    ));
}

#[tokio::test]
async fn conversions_get_ids_and_surface_the_cursor() {
    let transport = RecordingTransport::new().respond(json!({
        "success": true,
        "conversions": [
            { "conversion_id": "c-1", "status": "COMPLETED" },
            { "task_id": "t-2", "status": "IN_QUEUE" },
            "not an object"
        ],
        "LastEvaluatedKey": "cursor-2"
    }));

    let output = execute(&transport, Operation::GetConversionsByUser, &Parameters::new())
        .await
        .unwrap();

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[0]["id"], "c-1");
    assert_eq!(output.records[1]["id"], "t-2");
    assert_eq!(output.next_cursor.as_deref(), Some("cursor-2"));
}

#[tokio::test]
async fn unsuccessful_lookup_yields_no_records() {
    let transport = RecordingTransport::new()
        .respond(json!({ "success": false, "conversion": { "task_id": "t-1" } }));

    let output = execute(
        &transport,
        Operation::GetConversionById,
        &Parameters::new()
            .with("conversionType", "COVER")
            .with("task_id", "t-1"),
    )
    .await
    .unwrap();

    assert!(output.records.is_empty());
}

#[tokio::test]
async fn voice_search_maps_voice_ids() {
    let transport = RecordingTransport::new().respond(json!({
        "success": true,
        "voices": [{ "voice_id": "v-1", "voice_name": "Aria" }]
    }));

    let output = execute(
        &transport,
        Operation::SearchVoices,
        &Parameters::new().with("query", "aria").with("limit", 5),
    )
    .await
    .unwrap();

    assert_eq!(output.records[0]["id"], "v-1");
    let request = transport.last_request();
    assert_eq!(request.query_value("query"), Some("aria"));
    assert_eq!(request.query_value("limit"), Some("5"));
    assert_eq!(request.query_value("page"), Some("0"));
}

// ---------------------------------------------------------------------------
// Item loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn continue_on_fail_emits_error_records_in_place() {
    let transport = RecordingTransport::new()
        .respond(json!({ "success": true, "task_id": "t-1" }))
        .respond(json!({ "success": true, "task_id": "t-3" }));
    let items = vec![
        with_audio_url(Parameters::new()),
        Parameters::new(),
        with_audio_url(Parameters::new()),
    ];

    let results = execute_items(&transport, Operation::Dereverb, &items, true)
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].json["task_id"], "t-1");
    assert_eq!(results[1].paired_item, 1);
    assert_eq!(results[1].json["code"], "missing_parameter");
    assert_eq!(results[2].json["task_id"], "t-3");
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn first_failure_aborts_without_continue_on_fail() {
    let transport = RecordingTransport::new().fail(api_error("/api/public/v1/deecho", 500));
    let items = vec![with_audio_url(Parameters::new()), with_audio_url(Parameters::new())];

    let err = execute_items(&transport, Operation::Deecho, &items, false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ItemFailed { index: 0, .. }));
    assert_eq!(err.error_code(), "api_error");
    assert_eq!(transport.request_count(), 1);
}

// ---------------------------------------------------------------------------
// Voice list callbacks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn optional_voice_list_starts_with_no_voice() {
    let transport = RecordingTransport::new().respond(json!({
        "success": true,
        "voices": [{ "voice_id": "v-1", "voice_name": "Aria", "tts_only": false }]
    }));

    let options = load_voices(&transport).await;

    assert_eq!(options.len(), 2);
    assert_eq!(options[0].value, json!("none"));
    assert_eq!(options[1].name, "Aria");

    let request = transport.last_request();
    assert_eq!(request.path, "/api/public/v1/getAllVoices");
    assert_eq!(request.query_value("limit"), Some("100"));
}

#[tokio::test]
async fn voice_lists_fall_back_on_failure() {
    let transport = RecordingTransport::new()
        .fail(api_error("/api/public/v1/getAllVoices", 503))
        .fail(api_error("/api/public/v1/getAllVoices", 503));

    let optional = load_voices(&transport).await;
    assert_eq!(optional.len(), 1);
    assert_eq!(optional[0].name, NO_VOICE_OPTION.0);

    assert!(load_voices_required(&transport).await.is_empty());
}

// ---------------------------------------------------------------------------
// Over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sound_generator_posts_a_url_encoded_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/public/v1/sound_generator"))
        .and(header("authorization", "test-key"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("prompt=rain+on+a+tin+roof"))
        .and(body_string_contains("audio_length=8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "task_id": "t-9",
            "conversion_id": "c-9",
            "eta": 20,
            "credit_estimate": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(
        &Credentials::new("test-key").with_base_url(server.uri()),
        &ClientConfig::default(),
    )
    .unwrap();

    let output = execute(
        &client,
        Operation::SoundGenerator,
        &Parameters::new()
            .with("prompt", " rain on a tin roof ")
            .with("audio_length", 8),
    )
    .await
    .unwrap();

    assert_eq!(output.records[0]["credit_estimate"], 2);
}

#[tokio::test]
async fn get_all_voices_sends_paging_in_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/v1/getAllVoices"))
        .and(query_param("limit", "20"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "voices": [{ "voice_id": "v-1" }, { "voice_id": "v-2" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(
        &Credentials::new("test-key").with_base_url(server.uri()),
        &ClientConfig::default(),
    )
    .unwrap();

    let output = execute(
        &client,
        Operation::GetAllVoices,
        &Parameters::new().with("page", 2),
    )
    .await
    .unwrap();

    let ids: Vec<_> = output.records.iter().map(|record| record["id"].clone()).collect();
    assert_eq!(ids, vec![json!("v-1"), json!("v-2")]);
}
