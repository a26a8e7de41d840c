// Telemetry sample - One timestamped observation of every tracked machine metric
use crate::domain::error::SampleError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub cpu_usage: f64,
    pub ram_usage: f64,
    pub power_usage: f64,
    pub temperature: f64,
}

impl Sample {
    pub fn new(
        timestamp: DateTime<Utc>,
        cpu_usage: f64,
        ram_usage: f64,
        power_usage: f64,
        temperature: f64,
    ) -> Self {
        Self {
            timestamp,
            cpu_usage,
            ram_usage,
            power_usage,
            temperature,
        }
    }

    /// Parse one push-channel record.
    ///
    /// `timestamp` may be an RFC 3339 string or integer epoch milliseconds.
    /// Every metric field must be present and numeric; extra fields are ignored.
    pub fn from_json(raw: &str) -> Result<Self, SampleError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| SampleError::InvalidJson(e.to_string()))?;
        let record = value.as_object().ok_or(SampleError::NotAnObject)?;

        Ok(Self {
            timestamp: parse_timestamp(record)?,
            cpu_usage: numeric_field(record, "cpu_usage")?,
            ram_usage: numeric_field(record, "ram_usage")?,
            power_usage: numeric_field(record, "power_usage")?,
            temperature: numeric_field(record, "temperature")?,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Epoch milliseconds, the unit the time scales work in.
    pub fn time_ms(&self) -> f64 {
        self.timestamp.timestamp_millis() as f64
    }
}

fn parse_timestamp(record: &Map<String, Value>) -> Result<DateTime<Utc>, SampleError> {
    match record.get("timestamp") {
        None | Some(Value::Null) => Err(SampleError::MissingField("timestamp")),
        Some(Value::String(text)) => DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| SampleError::InvalidTimestamp(text.clone())),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| SampleError::InvalidTimestamp(n.to_string())),
        Some(other) => Err(SampleError::InvalidTimestamp(other.to_string())),
    }
}

fn numeric_field(record: &Map<String, Value>, name: &'static str) -> Result<f64, SampleError> {
    match record.get(name) {
        None | Some(Value::Null) => Err(SampleError::MissingField(name)),
        Some(value) => value.as_f64().ok_or(SampleError::NonNumeric(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_record() {
        let raw = r#"{"timestamp":"2024-05-01T12:00:05.250Z","cpu_usage":42.5,"ram_usage":61,"power_usage":250.0,"temperature":55.2}"#;
        let sample = Sample::from_json(raw).unwrap();

        assert_eq!(sample.timestamp.timestamp_millis(), 1_714_564_805_250);
        assert_eq!(sample.cpu_usage, 42.5);
        assert_eq!(sample.ram_usage, 61.0);
        assert_eq!(sample.power_usage, 250.0);
        assert_eq!(sample.temperature, 55.2);
    }

    #[test]
    fn test_parse_epoch_millis_timestamp() {
        let raw = r#"{"timestamp":1000,"cpu_usage":1,"ram_usage":2,"power_usage":3,"temperature":4,"host":"x"}"#;
        let sample = Sample::from_json(raw).unwrap();
        assert_eq!(sample.time_ms(), 1000.0);
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        let raw = r#"{"timestamp":"not-a-date","cpu_usage":1,"ram_usage":2,"power_usage":3,"temperature":4}"#;
        assert_eq!(
            Sample::from_json(raw),
            Err(SampleError::InvalidTimestamp("not-a-date".to_string()))
        );
    }

    #[test]
    fn test_rejects_missing_and_non_numeric_fields() {
        let missing = r#"{"timestamp":"2024-05-01T12:00:00Z","cpu_usage":1,"ram_usage":2,"temperature":4}"#;
        assert_eq!(
            Sample::from_json(missing),
            Err(SampleError::MissingField("power_usage"))
        );

        let text = r#"{"timestamp":"2024-05-01T12:00:00Z","cpu_usage":"high","ram_usage":2,"power_usage":3,"temperature":4}"#;
        assert_eq!(
            Sample::from_json(text),
            Err(SampleError::NonNumeric("cpu_usage"))
        );

        assert_eq!(Sample::from_json("[1,2]"), Err(SampleError::NotAnObject));
        assert!(matches!(
            Sample::from_json("{"),
            Err(SampleError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_json_output_parses_back() {
        let timestamp = DateTime::from_timestamp_millis(1_714_564_800_000).unwrap();
        let sample = Sample::new(timestamp, 10.0, 20.0, 300.0, 45.5);
        let json = sample.to_json().unwrap();

        assert!(json.contains("\"timestamp\":\"2024-05-01T12:00:00Z\""));
        assert_eq!(Sample::from_json(&json).unwrap(), sample);
    }
}
