//! Trigger node description

use super::search::{conversion_lookup_fields, user_conversion_fields};
use super::{CREDENTIAL_TYPE, FieldSpec, NodeDescription, OptionSpec};
use crate::trigger::TriggerMode;

/// Default page size for the new-conversions trigger
pub(crate) const TRIGGER_DEFAULT_LIMIT: f64 = 50.0;

/// Description of the polling trigger node
pub fn trigger_node() -> NodeDescription {
    let by_id = TriggerMode::BY_ID;
    let by_user = TriggerMode::BY_USER;

    let mut properties = vec![
        FieldSpec::options(
            "triggerOn",
            "Trigger On",
            vec![
                OptionSpec::new("Get Conversion", by_id)
                    .with_description("Retrieve a specific conversion by type and ID"),
                OptionSpec::new("New Conversions", by_user)
                    .with_description("Fetch conversions with filters and pagination"),
            ],
            by_user,
        )
        .required(),
    ];

    properties.extend(
        conversion_lookup_fields()
            .into_iter()
            .map(|field| field.show("triggerOn", &[by_id])),
    );
    properties.extend(
        user_conversion_fields(TRIGGER_DEFAULT_LIMIT)
            .into_iter()
            .map(|field| match field.name.as_str() {
                // No upper bound when polling
                "limit" => field.bounds(Some(1.0), None),
                _ => field,
            })
            .map(|field| field.show("triggerOn", &[by_user])),
    );

    NodeDescription {
        name: "musicGptTrigger".to_string(),
        display_name: "MusicGPT Trigger".to_string(),
        description: "Triggers on MusicGPT conversion events".to_string(),
        version: 1,
        credentials: vec![CREDENTIAL_TYPE.to_string()],
        polling: true,
        properties,
    }
}
