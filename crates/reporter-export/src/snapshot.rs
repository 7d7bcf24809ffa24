use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExportError, Result};
use crate::records::{Audio, Location, Response, Weather};
use crate::truthy;

/// What caused a report to be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportImpetus {
    ButtonTapped,
    ButtonTappedWhileAsleep,
    Notification,
    SetToSleep,
    WokeUp,
}

impl ReportImpetus {
    pub fn description(&self) -> &'static str {
        match self {
            Self::ButtonTapped => "Report button tapped",
            Self::ButtonTappedWhileAsleep => "Report button tapped while Reporter is asleep",
            Self::Notification => "Report triggered by notification",
            Self::SetToSleep => "Report triggered by setting app to sleep",
            Self::WokeUp => "Report triggered by waking up app",
        }
    }
}

impl TryFrom<i64> for ReportImpetus {
    type Error = ExportError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::ButtonTapped),
            1 => Ok(Self::ButtonTappedWhileAsleep),
            2 => Ok(Self::Notification),
            3 => Ok(Self::SetToSleep),
            4 => Ok(Self::WokeUp),
            _ => Err(ExportError::UnknownCode {
                field: "reportImpetus",
                code,
            }),
        }
    }
}

/// Network connectivity at the time of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connection {
    Cellular,
    Wifi,
    Disconnected,
}

impl Connection {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Cellular => "Device is connected via cellular network",
            Self::Wifi => "Device is connected via WiFi",
            Self::Disconnected => "Device is not connected",
        }
    }
}

impl TryFrom<i64> for Connection {
    type Error = ExportError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::Cellular),
            1 => Ok(Self::Wifi),
            2 => Ok(Self::Disconnected),
            _ => Err(ExportError::UnknownCode {
                field: "connection",
                code,
            }),
        }
    }
}

/// Read an enumerated code. Integral floats such as `2.0` are accepted.
fn code(value: Option<&Value>, field: &'static str) -> Result<i64> {
    let value = value.ok_or(ExportError::MissingField { field })?;

    value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
        .ok_or_else(|| ExportError::InvalidCode {
            field,
            value: value.clone(),
        })
}

/// One point-in-time capture: device state plus the answers given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    battery: Option<Value>,
    #[serde(default, deserialize_with = "truthy::record")]
    location: Option<Location>,
    steps: Option<Value>,
    date: Option<Value>,
    #[serde(default, deserialize_with = "truthy::record")]
    audio: Option<Audio>,
    sync: Option<Value>,
    connection: Option<Value>,
    background: Option<Value>,
    dwell_status: Option<Value>,
    draft: Option<Value>,
    #[serde(default, deserialize_with = "truthy::record")]
    weather: Option<Weather>,
    report_impetus: Option<Value>,
    #[serde(default, deserialize_with = "truthy::list")]
    responses: Vec<Response>,
}

impl Snapshot {
    /// Battery level as a percentage. A reading of exactly zero is
    /// indistinguishable from a missing one and reports `None`, as does a
    /// reading that is not a number.
    pub fn battery(&self) -> Option<f64> {
        self.battery
            .as_ref()
            .filter(|v| truthy::is_truthy(v))
            .and_then(Value::as_f64)
            .map(|b| b * 100.0)
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Step count, passed through as written by the app.
    pub fn steps(&self) -> Option<&Value> {
        self.steps.as_ref()
    }

    /// Capture time, passed through as written by the app.
    pub fn date(&self) -> Option<&Value> {
        self.date.as_ref()
    }

    pub fn audio(&self) -> Option<&Audio> {
        self.audio.as_ref()
    }

    pub fn sync(&self) -> bool {
        self.sync.as_ref().is_some_and(truthy::is_truthy)
    }

    pub fn connection(&self) -> Option<&Value> {
        self.connection.as_ref()
    }

    pub fn connection_kind(&self) -> Result<Connection> {
        Connection::try_from(code(self.connection.as_ref(), "connection")?)
    }

    pub fn connection_text(&self) -> Result<&'static str> {
        self.connection_kind().map(|c| c.description())
    }

    pub fn background(&self) -> Option<&Value> {
        self.background.as_ref()
    }

    pub fn dwell_status(&self) -> Option<&Value> {
        self.dwell_status.as_ref()
    }

    pub fn draft(&self) -> Option<&Value> {
        self.draft.as_ref()
    }

    pub fn weather(&self) -> Option<&Weather> {
        self.weather.as_ref()
    }

    pub fn report_impetus(&self) -> Option<&Value> {
        self.report_impetus.as_ref()
    }

    pub fn report_impetus_kind(&self) -> Result<ReportImpetus> {
        ReportImpetus::try_from(code(self.report_impetus.as_ref(), "reportImpetus")?)
    }

    pub fn report_impetus_text(&self) -> Result<&'static str> {
        self.report_impetus_kind().map(|r| r.description())
    }

    /// Responses in the order the app recorded them.
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.date {
            Some(Value::String(s)) => write!(f, "Snapshot({})", s),
            Some(other) => write!(f, "Snapshot({})", other),
            None => f.write_str("Snapshot()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::AnswerKind;
    use serde_json::json;

    fn snapshot(value: Value) -> Snapshot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_battery_scaling() {
        assert_eq!(snapshot(json!({"battery": 0.5})).battery(), Some(50.0));
        assert_eq!(snapshot(json!({"battery": 1})).battery(), Some(100.0));
        assert_eq!(snapshot(json!({"battery": 0})).battery(), None);
        assert_eq!(snapshot(json!({"battery": null})).battery(), None);
        assert_eq!(snapshot(json!({})).battery(), None);
    }

    #[test]
    fn test_report_impetus_table() {
        let expected = [
            "Report button tapped",
            "Report button tapped while Reporter is asleep",
            "Report triggered by notification",
            "Report triggered by setting app to sleep",
            "Report triggered by waking up app",
        ];
        for (code, text) in expected.iter().enumerate() {
            let s = snapshot(json!({"reportImpetus": code}));
            assert_eq!(s.report_impetus_text().unwrap(), *text);
        }
    }

    #[test]
    fn test_report_impetus_unknown_code() {
        let s = snapshot(json!({"reportImpetus": 5}));
        assert!(matches!(
            s.report_impetus_text(),
            Err(ExportError::UnknownCode {
                field: "reportImpetus",
                code: 5
            })
        ));

        let s = snapshot(json!({"reportImpetus": -1}));
        assert!(s.report_impetus_text().is_err());

        let s = snapshot(json!({}));
        assert!(matches!(
            s.report_impetus_text(),
            Err(ExportError::MissingField { .. })
        ));
    }

    #[test]
    fn test_connection_table() {
        assert_eq!(
            snapshot(json!({"connection": 0})).connection_text().unwrap(),
            "Device is connected via cellular network"
        );
        assert_eq!(
            snapshot(json!({"connection": 1})).connection_text().unwrap(),
            "Device is connected via WiFi"
        );
        assert_eq!(
            snapshot(json!({"connection": 2})).connection_kind().unwrap(),
            Connection::Disconnected
        );
        assert!(matches!(
            snapshot(json!({"connection": 3})).connection_text(),
            Err(ExportError::UnknownCode { code: 3, .. })
        ));
    }

    #[test]
    fn test_nested_records_absent_when_empty() {
        let s = snapshot(json!({"location": {}, "audio": null, "weather": {}}));
        assert!(s.location().is_none());
        assert!(s.audio().is_none());
        assert!(s.weather().is_none());

        let s = snapshot(json!({"audio": {"avg": -42.5, "peak": -30.0}}));
        let audio = s.audio().unwrap();
        assert_eq!(audio.avg(), Some(-42.5));
        assert_eq!(audio.peak(), Some(-30.0));
    }

    #[test]
    fn test_sync_is_coerced() {
        assert!(snapshot(json!({"sync": 1})).sync());
        assert!(snapshot(json!({"sync": true})).sync());
        assert!(!snapshot(json!({"sync": 0})).sync());
        assert!(!snapshot(json!({})).sync());
    }

    #[test]
    fn test_responses_keep_order() {
        let s = snapshot(json!({
            "date": "2014-03-05T08:00:00-0500",
            "steps": 1200,
            "dwellStatus": 1,
            "responses": [
                {"questionPrompt": "How did you sleep?", "numericResponse": "7"},
                {"questionPrompt": "Where are you?", "locationResponse": {"text": "Work"}},
                {"questionPrompt": "What are you doing?", "tokens": [{"text": "Coding"}]},
            ],
        }));

        let prompts: Vec<_> = s.responses().iter().map(|r| r.question().unwrap()).collect();
        assert_eq!(
            prompts,
            vec!["How did you sleep?", "Where are you?", "What are you doing?"]
        );
        assert_eq!(s.responses()[1].kind(), AnswerKind::Location);
        assert_eq!(s.steps(), Some(&json!(1200)));
        assert_eq!(s.dwell_status(), Some(&json!(1)));
        assert_eq!(s.to_string(), "Snapshot(2014-03-05T08:00:00-0500)");
    }

    #[test]
    fn test_off_type_fields_decode() {
        let s = snapshot(json!({
            "steps": 1200.0,
            "battery": "0.5",
            "connection": "wifi",
            "reportImpetus": 7.0,
        }));

        assert_eq!(s.steps(), Some(&json!(1200.0)));
        assert_eq!(s.battery(), None);
        assert!(matches!(
            s.connection_text(),
            Err(ExportError::InvalidCode {
                field: "connection",
                ..
            })
        ));
        assert!(matches!(
            s.report_impetus_text(),
            Err(ExportError::UnknownCode {
                field: "reportImpetus",
                code: 7
            })
        ));
    }

    #[test]
    fn test_integral_float_codes() {
        let s = snapshot(json!({"reportImpetus": 2.0, "connection": 1.0}));
        assert_eq!(s.report_impetus_kind().unwrap(), ReportImpetus::Notification);
        assert_eq!(s.connection_kind().unwrap(), Connection::Wifi);

        let s = snapshot(json!({"reportImpetus": 1.5}));
        assert!(matches!(
            s.report_impetus_text(),
            Err(ExportError::InvalidCode { .. })
        ));
    }
}
