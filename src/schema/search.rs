//! Fields for the search resource, plus the conversion lookup fields the
//! trigger shares

use super::{FieldSpec, OptionSpec, options};
use crate::operations::Operation;
use crate::types::ConversionType;

/// Conversion type choices; `all` adds an empty "All Types" entry first
pub(super) fn conversion_types(all: bool) -> Vec<OptionSpec> {
    let mut choices = Vec::with_capacity(ConversionType::ALL.len() + 1);
    if all {
        choices.push(OptionSpec::new("All Types", ""));
    }
    choices.extend(
        ConversionType::ALL
            .iter()
            .map(|conversion_type| OptionSpec::new(conversion_type.display_name(), conversion_type.as_str())),
    );
    choices
}

/// Fields identifying a single conversion
pub(super) fn conversion_lookup_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::options(
            "conversionType",
            "Conversion Type",
            conversion_types(false),
            ConversionType::VoiceConversion.as_str(),
        )
        .required()
        .description("Type of conversion"),
        FieldSpec::string("task_id", "Task ID")
            .placeholder("task_12345")
            .description("Unique task identifier for the conversion"),
        FieldSpec::string("conversion_id", "Conversion ID")
            .placeholder("conv_67890")
            .description("Unique conversion identifier"),
    ]
}

/// Filter, sort and paging fields for listing the user's conversions
pub(super) fn user_conversion_fields(default_limit: f64) -> Vec<FieldSpec> {
    vec![
        FieldSpec::options("conversionType", "Conversion Type", conversion_types(true), "")
            .description("Filter by conversion type. Leave empty for all types."),
        FieldSpec::date_time("startDate", "Start Date")
            .placeholder("2024-01-01T00:00:00Z")
            .description("Only conversions created after this date (ISO 8601 format)"),
        FieldSpec::date_time("endDate", "End Date")
            .placeholder("2024-12-31T23:59:59Z")
            .description("Only conversions created before this date (ISO 8601 format)"),
        FieldSpec::options(
            "sortOrder",
            "Sort Order",
            options(&[
                ("Descending (Newest First)", "DESC"),
                ("Ascending (Oldest First)", "ASC"),
            ]),
            "DESC",
        )
        .description("Order of the results"),
        FieldSpec::number("limit", "Limit", default_limit)
            .bounds(Some(1.0), Some(100.0))
            .description("Max number of results to return"),
        FieldSpec::password("LastEvaluatedKey", "Last Evaluated Key")
            .placeholder("key_from_previous_request")
            .description("Pagination key from the previous response"),
    ]
}

fn paging() -> [FieldSpec; 2] {
    [
        FieldSpec::number("limit", "Limit", 20.0)
            .bounds(Some(1.0), Some(100.0))
            .description("Maximum number of voices per page"),
        FieldSpec::number("page", "Page", 0.0)
            .bounds(Some(0.0), None)
            .description("Page number, starting from 0"),
    ]
}

pub(super) fn fields(operation: Operation) -> Vec<FieldSpec> {
    match operation {
        Operation::GetAllVoices => paging().into(),
        Operation::SearchVoices => {
            let mut fields = vec![
                FieldSpec::string("query", "Search Query")
                    .required()
                    .placeholder("Justin Bieber")
                    .description("Search for voices by name"),
            ];
            fields.extend(paging());
            fields
        }
        Operation::GetConversionById => conversion_lookup_fields(),
        Operation::GetConversionsByUser => user_conversion_fields(10.0),
        _ => Vec::new(),
    }
}
