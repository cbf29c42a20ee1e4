//! Response classification.
//!
//! [`classify`] looks at a raw response exactly once and decides which
//! [`ResponseShape`] it is. Normalizers match on the shape and never probe
//! keys again.

use serde_json::{Map, Value};

use crate::error::PayloadError;
use crate::http_client::HttpResponse;

/// Top-level key that marks metadata-carrying JSON payloads.
pub const META_DATA_KEY: &str = "Meta Data";

pub const SECTOR_FUNCTION: &str = "SECTOR";
pub const OVERVIEW_FUNCTION: &str = "OVERVIEW";

const TABULAR_MEDIA_TYPES: [&str; 3] = ["text/csv", "application/csv", "application/x-download"];
const JSON_MEDIA_TYPES: [&str; 2] = ["application/json", "text/json"];

/// Payload shapes returned by the upstream API.
///
/// JSON objects keep their document key order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    TimeSeriesCsv(String),
    SectorJson(Map<String, Value>),
    TechnicalIndicatorJson(Map<String, Value>),
    OverviewJson(Map<String, Value>),
    ForexJson(Map<String, Value>),
    ApiErrorJson(Map<String, Value>),
}

impl ResponseShape {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TimeSeriesCsv(_) => "time_series_csv",
            Self::SectorJson(_) => "sector_json",
            Self::TechnicalIndicatorJson(_) => "technical_indicator_json",
            Self::OverviewJson(_) => "overview_json",
            Self::ForexJson(_) => "forex_json",
            Self::ApiErrorJson(_) => "api_error_json",
        }
    }
}

/// Classifies a raw response for the given function.
///
/// # Errors
///
/// - [`PayloadError::Http`] for any status outside `200..300`, before the body is looked at
/// - [`PayloadError::Malformed`] for an unrecognized content type, invalid JSON,
///   or JSON whose top level is not an object
pub fn classify(
    response: &HttpResponse,
    function: &str,
    is_forex: bool,
) -> Result<ResponseShape, PayloadError> {
    if !response.is_success() {
        return Err(PayloadError::Http {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let media_type = response.media_type();
    match media_type.as_deref() {
        Some(media) if TABULAR_MEDIA_TYPES.contains(&media) => {
            return Ok(ResponseShape::TimeSeriesCsv(response.body.clone()));
        }
        Some(media) if !is_json_media_type(media) => {
            return Err(PayloadError::malformed(format!(
                "unsupported content type '{media}'"
            )));
        }
        _ => {}
    }

    let payload = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            return Err(PayloadError::malformed(format!(
                "expected a JSON object, found {}",
                json_type_name(&other)
            )));
        }
        Err(error) => {
            return Err(PayloadError::malformed(format!("invalid JSON body: {error}")));
        }
    };

    let starts_with_meta = payload
        .keys()
        .next()
        .is_some_and(|key| key == META_DATA_KEY);

    let shape = if starts_with_meta {
        if function == SECTOR_FUNCTION {
            ResponseShape::SectorJson(payload)
        } else {
            ResponseShape::TechnicalIndicatorJson(payload)
        }
    } else if function == OVERVIEW_FUNCTION {
        ResponseShape::OverviewJson(payload)
    } else if is_forex {
        ResponseShape::ForexJson(payload)
    } else {
        ResponseShape::ApiErrorJson(payload)
    };

    Ok(shape)
}

fn is_json_media_type(media: &str) -> bool {
    JSON_MEDIA_TYPES.contains(&media) || media.ends_with("+json")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(body: &str) -> HttpResponse {
        HttpResponse::ok_json(body)
    }

    #[test]
    fn non_success_status_short_circuits() {
        let response = HttpResponse::new(404, Some("text/csv"), "Not Found");
        let err = classify(&response, "TIME_SERIES_DAILY", false).expect_err("must fail");
        assert_eq!(
            err,
            PayloadError::Http {
                status: 404,
                body: String::from("Not Found"),
            }
        );
    }

    #[test]
    fn tabular_content_type_wins_regardless_of_function() {
        for content_type in ["text/csv", "application/x-download", "text/csv; charset=utf-8"] {
            let response = HttpResponse::new(200, Some(content_type), "timestamp,open\n");
            let shape = classify(&response, OVERVIEW_FUNCTION, true).expect("classifies");
            assert_eq!(shape.name(), "time_series_csv", "{content_type}");
        }
    }

    #[test]
    fn meta_data_first_splits_sector_and_indicator() {
        let body = r#"{"Meta Data": {}, "Rank A": {}}"#;
        assert_eq!(
            classify(&json(body), SECTOR_FUNCTION, false).expect("classifies").name(),
            "sector_json"
        );
        assert_eq!(
            classify(&json(body), "SMA", false).expect("classifies").name(),
            "technical_indicator_json"
        );
    }

    #[test]
    fn meta_data_must_be_the_first_key() {
        let body = r#"{"Information": "x", "Meta Data": {}}"#;
        let shape = classify(&json(body), "SMA", false).expect("classifies");
        assert_eq!(shape.name(), "api_error_json");
    }

    #[test]
    fn overview_then_forex_then_error() {
        let body = r#"{"Symbol": "IBM"}"#;
        assert_eq!(
            classify(&json(body), OVERVIEW_FUNCTION, true).expect("classifies").name(),
            "overview_json"
        );
        assert_eq!(
            classify(&json(body), "CURRENCY_EXCHANGE_RATE", true)
                .expect("classifies")
                .name(),
            "forex_json"
        );
        assert_eq!(
            classify(&json(r#"{"Error Message": "Invalid API call"}"#), "GLOBAL_QUOTE", false)
                .expect("classifies")
                .name(),
            "api_error_json"
        );
    }

    #[test]
    fn missing_content_type_is_treated_as_json() {
        let response = HttpResponse::new(200, None, r#"{"Note": "slow down"}"#);
        let shape = classify(&response, "SMA", false).expect("classifies");
        assert_eq!(shape.name(), "api_error_json");
    }

    #[test]
    fn malformed_bodies_are_not_folded_into_a_shape() {
        let html = HttpResponse::new(200, Some("text/html"), "<html></html>");
        assert!(matches!(
            classify(&html, "SMA", false),
            Err(PayloadError::Malformed(_))
        ));

        assert!(matches!(
            classify(&json("{not json"), "SMA", false),
            Err(PayloadError::Malformed(_))
        ));

        assert!(matches!(
            classify(&json("[1, 2]"), OVERVIEW_FUNCTION, false),
            Err(PayloadError::Malformed(_))
        ));
    }
}
