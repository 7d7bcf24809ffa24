use std::fmt;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ExportError, Result};
use crate::truthy;

/// Lowercase hex MD5 of a prompt, used as a stable question identity.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Weather conditions attached to a snapshot. The schema is owned by the
/// weather provider, so the record is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weather(Map<String, Value>);

impl Weather {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn temp_c(&self) -> Option<f64> {
        self.get("tempC").and_then(Value::as_f64)
    }

    pub fn temp_f(&self) -> Option<f64> {
        self.get("tempF").and_then(Value::as_f64)
    }

    pub fn wind_kph(&self) -> Option<f64> {
        self.get("windKPH").and_then(Value::as_f64)
    }

    pub fn wind_mph(&self) -> Option<f64> {
        self.get("windMPH").and_then(Value::as_f64)
    }

    pub fn relative_humidity(&self) -> Option<&str> {
        self.get("relativeHumidity").and_then(Value::as_str)
    }

    /// Short description such as "Partly Cloudy".
    pub fn summary(&self) -> Option<&str> {
        self.get("weather").and_then(Value::as_str)
    }

    pub fn station_id(&self) -> Option<&str> {
        self.get("stationID").and_then(Value::as_str)
    }
}

/// Ambient sound levels sampled for a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Audio(Map<String, Value>);

impl Audio {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn avg(&self) -> Option<f64> {
        self.get("avg").and_then(Value::as_f64)
    }

    pub fn peak(&self) -> Option<f64> {
        self.get("peak").and_then(Value::as_f64)
    }
}

/// Reverse-geocoded address for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Placemark(Map<String, Value>);

impl Placemark {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn locality(&self) -> Option<&str> {
        self.get("locality").and_then(Value::as_str)
    }

    pub fn administrative_area(&self) -> Option<&str> {
        self.get("administrativeArea").and_then(Value::as_str)
    }

    pub fn country(&self) -> Option<&str> {
        self.get("country").and_then(Value::as_str)
    }
}

/// A GPS fix. Only the placemark is decoded; coordinates are read on access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "truthy::record")]
    placemark: Option<Placemark>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Location {
    /// Any key other than `placemark`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.number("latitude")
    }

    pub fn longitude(&self) -> Option<f64> {
        self.number("longitude")
    }

    pub fn altitude(&self) -> Option<f64> {
        self.number("altitude")
    }

    pub fn speed(&self) -> Option<f64> {
        self.number("speed")
    }

    pub fn course(&self) -> Option<f64> {
        self.number("course")
    }

    pub fn horizontal_accuracy(&self) -> Option<f64> {
        self.number("horizontalAccuracy")
    }

    pub fn vertical_accuracy(&self) -> Option<f64> {
        self.number("verticalAccuracy")
    }

    /// Passed through as written by the app.
    pub fn timestamp(&self) -> Option<&Value> {
        self.get("timestamp")
    }

    pub fn placemark(&self) -> Option<&Placemark> {
        self.placemark.as_ref()
    }
}

/// Tag naming which answer field a response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    Token,
    Answer,
    Location,
    Numeric,
    Text,
    None,
}

impl AnswerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Answer => "answer",
            Self::Location => "location",
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::None => "none",
        }
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The answer carried by a response. Values are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    #[serde(rename = "token")]
    Tokens(Value),
    #[serde(rename = "answer")]
    AnsweredOptions(Value),
    Location(Value),
    Numeric(Value),
    Text(Value),
    None,
}

impl Answer {
    pub fn kind(&self) -> AnswerKind {
        match self {
            Self::Tokens(_) => AnswerKind::Token,
            Self::AnsweredOptions(_) => AnswerKind::Answer,
            Self::Location(_) => AnswerKind::Location,
            Self::Numeric(_) => AnswerKind::Numeric,
            Self::Text(_) => AnswerKind::Text,
            Self::None => AnswerKind::None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Tokens(v)
            | Self::AnsweredOptions(v)
            | Self::Location(v)
            | Self::Numeric(v)
            | Self::Text(v) => Some(v),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    question_prompt: Option<String>,
    #[serde(default, deserialize_with = "truthy::value")]
    tokens: Option<Value>,
    #[serde(default, deserialize_with = "truthy::value")]
    answered_options: Option<Value>,
    #[serde(default, deserialize_with = "truthy::value")]
    location_response: Option<Value>,
    #[serde(default, deserialize_with = "truthy::value")]
    numeric_response: Option<Value>,
    #[serde(default, deserialize_with = "truthy::value")]
    text_response: Option<Value>,
}

/// One answered question inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawResponse")]
pub struct Response {
    question: Option<String>,
    answer: Answer,
    #[serde(skip_serializing)]
    tokens: Option<Value>,
    #[serde(skip_serializing)]
    answered_options: Option<Value>,
    #[serde(skip_serializing)]
    location_response: Option<Value>,
    #[serde(skip_serializing)]
    numeric_response: Option<Value>,
    #[serde(skip_serializing)]
    text_response: Option<Value>,
}

impl From<RawResponse> for Response {
    fn from(raw: RawResponse) -> Self {
        // First populated field wins, in this order.
        let answer = if let Some(v) = &raw.tokens {
            Answer::Tokens(v.clone())
        } else if let Some(v) = &raw.answered_options {
            Answer::AnsweredOptions(v.clone())
        } else if let Some(v) = &raw.location_response {
            Answer::Location(v.clone())
        } else if let Some(v) = &raw.numeric_response {
            Answer::Numeric(v.clone())
        } else if let Some(v) = &raw.text_response {
            Answer::Text(v.clone())
        } else {
            Answer::None
        };

        Self {
            question: raw.question_prompt,
            answer,
            tokens: raw.tokens,
            answered_options: raw.answered_options,
            location_response: raw.location_response,
            numeric_response: raw.numeric_response,
            text_response: raw.text_response,
        }
    }
}

impl Response {
    /// The prompt of the question this response answers.
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    pub fn kind(&self) -> AnswerKind {
        self.answer.kind()
    }

    pub fn tokens(&self) -> Option<&Value> {
        self.tokens.as_ref()
    }

    pub fn answered_options(&self) -> Option<&Value> {
        self.answered_options.as_ref()
    }

    pub fn location_response(&self) -> Option<&Value> {
        self.location_response.as_ref()
    }

    pub fn numeric_response(&self) -> Option<&Value> {
        self.numeric_response.as_ref()
    }

    pub fn text_response(&self) -> Option<&Value> {
        self.text_response.as_ref()
    }

    /// Fingerprint of the question prompt.
    pub fn md5(&self) -> Result<String> {
        self.question
            .as_deref()
            .map(fingerprint)
            .ok_or(ExportError::MissingField {
                field: "questionPrompt",
            })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Response({})", self.question.as_deref().unwrap_or(""))
    }
}

/// A question definition from the export's question list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    prompt: Option<String>,
    placeholder_string: Option<String>,
    #[serde(default, deserialize_with = "truthy::flag")]
    allow_multiple_selection: Option<bool>,
}

impl Question {
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn placeholder_string(&self) -> Option<&str> {
        self.placeholder_string.as_deref()
    }

    pub fn allow_multiple_selection(&self) -> Option<bool> {
        self.allow_multiple_selection
    }

    /// Fingerprint of the prompt.
    pub fn md5(&self) -> Result<String> {
        self.prompt
            .as_deref()
            .map(fingerprint)
            .ok_or(ExportError::MissingField { field: "prompt" })
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Question({})", self.prompt.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_fingerprint_known_value() {
        assert_eq!(fingerprint("Hi"), "c1a5298f939e87e8f962a5edfc206918");
    }

    #[test]
    fn test_answer_single_kind() {
        let cases = [
            (json!({"tokens": [{"text": "coffee"}]}), AnswerKind::Token),
            (json!({"answeredOptions": ["Yes"]}), AnswerKind::Answer),
            (json!({"locationResponse": {"text": "Home"}}), AnswerKind::Location),
            (json!({"numericResponse": "3"}), AnswerKind::Numeric),
            (json!({"textResponse": "fine"}), AnswerKind::Text),
            (json!({"questionPrompt": "Unanswered?"}), AnswerKind::None),
        ];

        for (raw, kind) in cases {
            let r = response(raw);
            assert_eq!(r.kind(), kind);
        }
    }

    #[test]
    fn test_answer_priority() {
        let r = response(json!({
            "textResponse": "words",
            "numericResponse": "7",
            "answeredOptions": ["B"],
        }));
        assert_eq!(r.kind(), AnswerKind::Answer);
        assert_eq!(r.answer().value(), Some(&json!(["B"])));
        // The other fields are still reachable.
        assert_eq!(r.text_response(), Some(&json!("words")));

        let r = response(json!({
            "answeredOptions": ["A"],
            "tokens": [{"text": "tea"}],
            "textResponse": "words",
        }));
        assert_eq!(r.kind(), AnswerKind::Token);
        assert_eq!(r.answer().value(), Some(&json!([{"text": "tea"}])));

        let r = response(json!({
            "numericResponse": "4",
            "locationResponse": {"text": "Gym"},
        }));
        assert_eq!(r.kind(), AnswerKind::Location);

        let r = response(json!({"textResponse": "late", "numericResponse": "2"}));
        assert_eq!(r.kind(), AnswerKind::Numeric);
    }

    #[test]
    fn test_response_display() {
        let r = response(json!({"questionPrompt": "Mood?", "textResponse": "ok"}));
        assert_eq!(r.to_string(), "Response(Mood?)");

        let r = response(json!({"textResponse": "ok"}));
        assert_eq!(r.to_string(), "Response()");
    }

    #[test]
    fn test_empty_answer_fields_are_absent() {
        let r = response(json!({"tokens": [], "answeredOptions": null, "textResponse": "ok"}));
        assert_eq!(r.kind(), AnswerKind::Text);
        assert!(r.tokens().is_none());
    }

    #[test]
    fn test_response_md5_requires_prompt() {
        let r = response(json!({"textResponse": "ok"}));
        assert!(matches!(
            r.md5(),
            Err(ExportError::MissingField {
                field: "questionPrompt"
            })
        ));

        let r = response(json!({"questionPrompt": "Hi"}));
        assert_eq!(r.md5().unwrap(), fingerprint("Hi"));
    }

    #[test]
    fn test_question_fields() {
        let q: Question = serde_json::from_value(json!({
            "prompt": "Who are you with?",
            "placeholderString": "Name",
            "allowMultipleSelection": 1,
        }))
        .unwrap();

        assert_eq!(q.prompt(), Some("Who are you with?"));
        assert_eq!(q.placeholder_string(), Some("Name"));
        assert_eq!(q.allow_multiple_selection(), Some(true));
        assert_eq!(q.to_string(), "Question(Who are you with?)");
    }

    #[test]
    fn test_location_placemark() {
        let loc: Location = serde_json::from_value(json!({
            "latitude": 43.65,
            "longitude": -79.38,
            "placemark": {"locality": "Toronto", "country": "Canada", "postalCode": "M5V"},
        }))
        .unwrap();

        let placemark = loc.placemark().unwrap();
        assert_eq!(placemark.locality(), Some("Toronto"));
        assert_eq!(placemark.get("postalCode"), Some(&json!("M5V")));
        assert_eq!(loc.latitude(), Some(43.65));

        let bare: Location = serde_json::from_value(json!({"placemark": {}})).unwrap();
        assert!(bare.placemark().is_none());
    }

    #[test]
    fn test_off_type_numbers_do_not_fail_decoding() {
        let loc: Location = serde_json::from_value(json!({
            "latitude": "43.65",
            "altitude": 76,
            "horizontalAccuracy": 5.0,
        }))
        .unwrap();
        assert!(loc.latitude().is_none());
        assert_eq!(loc.get("latitude"), Some(&json!("43.65")));
        assert_eq!(loc.altitude(), Some(76.0));
        assert_eq!(loc.horizontal_accuracy(), Some(5.0));

        let audio: Audio = serde_json::from_value(json!({"avg": "loud", "peak": -3})).unwrap();
        assert!(audio.avg().is_none());
        assert_eq!(audio.peak(), Some(-3.0));
    }

    #[test]
    fn test_weather_accessors() {
        let w: Weather = serde_json::from_value(json!({
            "tempC": 21.5,
            "weather": "Clear",
            "relativeHumidity": "40%",
            "uv": 3,
        }))
        .unwrap();

        assert_eq!(w.temp_c(), Some(21.5));
        assert_eq!(w.summary(), Some("Clear"));
        assert_eq!(w.relative_humidity(), Some("40%"));
        assert_eq!(w.get("uv"), Some(&json!(3)));
        assert!(w.temp_f().is_none());
    }
}
