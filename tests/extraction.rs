//! Payload extraction integration tests
//!
//! Covers the fixed-field extraction contracts for the weather and chat
//! payloads: required keys must be present, nested groups never become
//! table columns, and a malformed completion is an error rather than a
//! panic.

use rstest::rstest;

use skylark::chat::parse_completion;
use skylark::weather::parse_current;

const WEATHER_PAYLOAD: &str = r#"{
    "lat": "45.07N",
    "lon": "7.68E",
    "elevation": 239,
    "timezone": "Europe/Rome",
    "units": "metric",
    "current": {
        "icon": "cloudy",
        "icon_num": 7,
        "summary": "Cloudy",
        "temperature": 14.2,
        "wind": {"speed": 3.6, "angle": 45, "dir": "NE", "gusts": 6.2},
        "precipitation": {"total": 0.0, "type": "none"},
        "cloud_cover": 90,
        "humidity": 72,
        "visibility": 16.0
    }
}"#;

const CHAT_PAYLOAD: &str = r#"{
    "id": "chatcmpl-8Zx",
    "object": "chat.completion",
    "created": 1700000000,
    "model": "gpt-3.5-turbo",
    "choices": [
        {
            "index": 0,
            "message": {"role": "assistant", "content": "The answer is 42."},
            "finish_reason": "stop"
        }
    ],
    "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
}"#;

#[test]
fn weather_extraction_reads_fixed_field_set() {
    let report = parse_current(WEATHER_PAYLOAD).unwrap();

    assert_eq!(report.latitude, "45.07N");
    assert_eq!(report.longitude, "7.68E");
    assert_eq!(report.icon.name, "cloudy");
    assert_eq!(report.icon.number, 7);
    assert!((report.humidity - 72.0).abs() < f64::EPSILON);
    assert!((report.temperature - 14.2).abs() < f64::EPSILON);
    assert!((report.visibility - 16.0).abs() < f64::EPSILON);
    assert_eq!(report.wind.direction, "NE");
}

#[rstest]
#[case("temperature")]
#[case("humidity")]
#[case("visibility")]
#[case("icon")]
#[case("icon_num")]
#[case("wind")]
fn weather_extraction_fails_without_required_current_key(#[case] key: &str) {
    let mut payload: serde_json::Value = serde_json::from_str(WEATHER_PAYLOAD).unwrap();
    payload["current"].as_object_mut().unwrap().remove(key);

    let result = parse_current(&payload.to_string());
    assert!(result.is_err(), "payload without {key} must not extract");
}

#[rstest]
#[case("lat")]
#[case("lon")]
#[case("current")]
fn weather_extraction_fails_without_required_top_level_key(#[case] key: &str) {
    let mut payload: serde_json::Value = serde_json::from_str(WEATHER_PAYLOAD).unwrap();
    payload.as_object_mut().unwrap().remove(key);

    assert!(parse_current(&payload.to_string()).is_err());
}

#[test]
fn weather_table_contains_only_scalar_columns() {
    let report = parse_current(WEATHER_PAYLOAD).unwrap();
    let rendered = report.to_table().to_string();

    for column in ["Latitude", "Longitude", "Humidity", "Temperature", "Visibility"] {
        assert!(rendered.contains(column), "missing column {column}");
    }

    // The nested groups stay out of the table
    for excluded in ["Icon", "icon", "Wind", "wind", "NE", "cloudy"] {
        assert!(!rendered.contains(excluded), "unexpected value {excluded}");
    }
}

#[test]
fn chat_extraction_reads_reply_fields() {
    let reply = parse_completion(CHAT_PAYLOAD).unwrap();

    assert_eq!(reply.id, "chatcmpl-8Zx");
    assert_eq!(reply.message, "The answer is 42.");
    assert_eq!(reply.model, "gpt-3.5-turbo");
    assert_eq!(reply.finish_reason.as_deref(), Some("stop"));
}

#[rstest]
#[case("id")]
#[case("model")]
#[case("choices")]
fn chat_extraction_fails_without_required_key(#[case] key: &str) {
    let mut payload: serde_json::Value = serde_json::from_str(CHAT_PAYLOAD).unwrap();
    payload.as_object_mut().unwrap().remove(key);

    assert!(parse_completion(&payload.to_string()).is_err());
}

#[test]
fn chat_extraction_rejects_empty_choices() {
    let mut payload: serde_json::Value = serde_json::from_str(CHAT_PAYLOAD).unwrap();
    payload["choices"] = serde_json::json!([]);

    let err = parse_completion(&payload.to_string()).unwrap_err();
    assert!(err.to_string().contains("no choices"));
}

#[test]
fn chat_extraction_tolerates_missing_finish_reason() {
    let mut payload: serde_json::Value = serde_json::from_str(CHAT_PAYLOAD).unwrap();
    payload["choices"][0].as_object_mut().unwrap().remove("finish_reason");

    let reply = parse_completion(&payload.to_string()).unwrap();
    assert!(reply.finish_reason.is_none());
}
