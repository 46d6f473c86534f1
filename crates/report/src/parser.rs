//! Report payload parsing
//!
//! Payloads come straight from database rows, so numeric ids, ages and
//! flags may arrive as numbers, strings or nulls. The lenient
//! deserializers below accept all of those.

use crate::{ChurchInfo, FamilyGroup, RegisterRow, ReportOptions, Result};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything one report needs: church metadata, options and the records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPayload<T> {
    pub church: ChurchInfo,
    pub options: ReportOptions,
    #[serde(alias = "families", alias = "rows", alias = "members")]
    pub records: Vec<T>,
}

/// Parse a report payload from JSON
pub fn parse_payload<T: DeserializeOwned + Default>(json: &str) -> Result<ReportPayload<T>> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a birthday or wedding payload (`{ church, options, families: [...] }`)
pub fn parse_family_payload(json: &str) -> Result<ReportPayload<FamilyGroup>> {
    parse_payload(json)
}

/// Parse a congregation register payload (`{ church, options, rows: [...] }`)
pub fn parse_register_payload(json: &str) -> Result<ReportPayload<RegisterRow>> {
    parse_payload(json)
}

/// Convert a JSON value to a display string
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Check if a JSON value is truthy ("yes", "1", 1, true)
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y"
        ),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(value_to_string(&Value::deserialize(deserializer)?))
}

pub(crate) fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let text = value_to_string(&Value::deserialize(deserializer)?);
    Ok(Some(text).filter(|s| !s.trim().is_empty()))
}

pub(crate) fn lenient_bool<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

pub(crate) fn lenient_opt_u32<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
