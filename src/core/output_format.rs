//! Record encoders
//!
//! - Console: tab-separated, human-readable, optionally colored level
//! - Json: one object per line for machine processing

use super::log_entry::LogEntry;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Output format for log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format (default)
    ///
    /// Example: `2025-01-08 10:30:45.123	INFO	api	http/server.rs:42	Request processed	{"requestID":"abc"}`
    #[default]
    Console,

    /// JSON format for machine processing
    ///
    /// Example: `{"timestamp":"2025-01-08 10:30:45.123","level":"INFO","message":"Request processed"}`
    Json,
}

/// Encoder settings carried by a built logger
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    pub format: OutputFormat,
    pub timestamp_format: TimestampFormat,
    /// Color the level in console output
    pub color: bool,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Console => "console",
            OutputFormat::Json => "json",
        }
    }

    /// Encode one entry as a single output line, without the trailing newline.
    pub fn encode(&self, entry: &LogEntry, config: &EncoderConfig) -> String {
        match self {
            OutputFormat::Console => encode_console(entry, config),
            OutputFormat::Json => encode_json(entry, config),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" | "text" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: '{}'", s)),
        }
    }
}

fn level_label(entry: &LogEntry, color: bool) -> String {
    let label = entry.level.to_str();
    #[cfg(feature = "console")]
    if color {
        use colored::Colorize;
        return label.color(entry.level.color_code()).to_string();
    }
    #[cfg(not(feature = "console"))]
    let _ = color;
    label.to_string()
}

fn timestamp_value(entry: &LogEntry, format: &TimestampFormat) -> Value {
    if format.is_numeric() {
        Value::Number(entry.timestamp.timestamp_millis().into())
    } else {
        Value::String(format.format(&entry.timestamp))
    }
}

fn fields_object(entry: &LogEntry) -> Map<String, Value> {
    let mut map = Map::with_capacity(entry.fields.len() + 1);
    if let Some(v) = entry.verbosity {
        map.insert("v".to_string(), Value::Number(v.into()));
    }
    for field in &entry.fields {
        map.insert(field.key.clone(), field.value.to_json_value());
    }
    map
}

fn encode_console(entry: &LogEntry, config: &EncoderConfig) -> String {
    let mut parts = vec![
        config.timestamp_format.format(&entry.timestamp),
        level_label(entry, config.color),
    ];
    if let Some(ref name) = entry.logger_name {
        parts.push(name.clone());
    }
    if let Some(ref caller) = entry.caller {
        parts.push(caller.clone());
    }
    parts.push(entry.message.clone());

    let fields = fields_object(entry);
    if !fields.is_empty() {
        parts.push(Value::Object(fields).to_string());
    }

    let mut line = parts.join("\t");
    if let Some(ref stacktrace) = entry.stacktrace {
        line.push('\n');
        line.push_str(stacktrace.trim_end());
    }
    line
}

fn encode_json(entry: &LogEntry, config: &EncoderConfig) -> String {
    let mut obj = Map::new();
    obj.insert(
        "timestamp".to_string(),
        timestamp_value(entry, &config.timestamp_format),
    );
    obj.insert(
        "level".to_string(),
        Value::String(entry.level.to_str().to_string()),
    );
    if let Some(ref name) = entry.logger_name {
        obj.insert("logger".to_string(), Value::String(name.clone()));
    }
    if let Some(ref caller) = entry.caller {
        obj.insert("caller".to_string(), Value::String(caller.clone()));
    }
    obj.insert("message".to_string(), Value::String(entry.message.clone()));
    obj.extend(fields_object(entry));
    if let Some(ref stacktrace) = entry.stacktrace {
        obj.insert("stacktrace".to_string(), Value::String(stacktrace.clone()));
    }

    Value::Object(obj).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, LogLevel};

    fn config(format: OutputFormat) -> EncoderConfig {
        EncoderConfig {
            format,
            ..EncoderConfig::default()
        }
    }

    #[test]
    fn test_console_format() {
        let entry = LogEntry::new(LogLevel::Info, "Test message")
            .with_logger_name(Some("api.worker"))
            .with_fields(vec![Field::int("job", 7)]);
        let line = OutputFormat::Console.encode(&entry, &config(OutputFormat::Console));

        let columns: Vec<&str> = line.split('\t').collect();
        assert_eq!(columns[1], "INFO");
        assert_eq!(columns[2], "api.worker");
        assert_eq!(columns[3], "Test message");
        assert_eq!(columns[4], r#"{"job":7}"#);
    }

    #[test]
    fn test_json_format_keeps_field_order() {
        let entry = LogEntry::new(LogLevel::Error, "Error occurred")
            .with_fields(vec![Field::string("z", "last"), Field::int("a", 1)]);
        let line = OutputFormat::Json.encode(&entry, &config(OutputFormat::Json));

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "ERROR");
        assert_eq!(parsed["message"], "Error occurred");
        assert!(parsed["timestamp"].is_string());
        assert!(line.find("\"z\"").unwrap() < line.find("\"a\"").unwrap());
    }

    #[test]
    fn test_verbosity_is_encoded() {
        let entry = LogEntry::new(LogLevel::Info, "detail").with_verbosity(Some(2));
        let line = OutputFormat::Json.encode(&entry, &config(OutputFormat::Json));
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["v"], 2);
    }

    #[test]
    fn test_numeric_timestamp() {
        let entry = LogEntry::new(LogLevel::Warn, "w");
        let cfg = EncoderConfig {
            format: OutputFormat::Json,
            timestamp_format: TimestampFormat::UnixMillis,
            color: false,
        };
        let parsed: Value = serde_json::from_str(&OutputFormat::Json.encode(&entry, &cfg)).unwrap();
        assert!(parsed["timestamp"].is_i64());
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("console".parse::<OutputFormat>(), Ok(OutputFormat::Console));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Console);
    }
}
