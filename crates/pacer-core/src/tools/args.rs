//! Argument extraction for tool calls.
//!
//! Agents send flat JSON objects whose values are usually strings; numbers
//! and nested JSON are tolerated where a model is likely to send them.

use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use super::ToolError;

fn field<'a>(args: &'a Value, name: &'static str) -> Option<&'a Value> {
    match args.get(name) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    }
}

/// A required, non-blank string argument.
pub fn required_str<'a>(args: &'a Value, name: &'static str) -> Result<&'a str, ToolError> {
    match field(args, name) {
        None => Err(ToolError::MissingArgument(name)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ToolError::MissingArgument(name)),
        Some(Value::String(s)) => Ok(s.trim()),
        Some(other) => Err(ToolError::invalid(name, format!("expected a string, got {other}"))),
    }
}

/// A `YYYY-MM-DD` date argument.
pub fn required_date(args: &Value, name: &'static str) -> Result<NaiveDate, ToolError> {
    let raw = required_str(args, name)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ToolError::invalid(name, format!("{raw:?} is not a YYYY-MM-DD date")))
}

/// Like [`required_date`] but absent means `None`.
pub fn optional_date(args: &Value, name: &'static str) -> Result<Option<NaiveDate>, ToolError> {
    if field(args, name).is_none() {
        return Ok(None);
    }
    required_date(args, name).map(Some)
}

/// A plan id.
pub fn required_uuid(args: &Value, name: &'static str) -> Result<Uuid, ToolError> {
    let raw = required_str(args, name)?;
    Uuid::parse_str(raw).map_err(|_| ToolError::invalid(name, format!("{raw:?} is not a plan id")))
}

/// A JSON document argument, sent either as a JSON-encoded string or
/// inline. Returns the decoded value.
pub fn required_json(args: &Value, name: &'static str) -> Result<Value, ToolError> {
    match field(args, name) {
        None => Err(ToolError::MissingArgument(name)),
        Some(Value::String(s)) => serde_json::from_str(s)
            .map_err(|e| ToolError::invalid(name, format!("malformed JSON: {e}"))),
        Some(v) => Ok(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_argument() {
        let args = json!({"user_id": " user_123 "});
        assert_eq!(required_str(&args, "user_id").unwrap(), "user_123");
    }

    #[test]
    fn missing_null_or_blank_is_missing() {
        for args in [json!({}), json!({"user_id": null}), json!({"user_id": "  "})] {
            let err = required_str(&args, "user_id").unwrap_err();
            assert!(matches!(err, ToolError::MissingArgument("user_id")), "{args}");
        }
    }

    #[test]
    fn non_string_is_invalid() {
        let err = required_str(&json!({"user_id": 5}), "user_id").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { name: "user_id", .. }));
    }

    #[test]
    fn dates() {
        let args = json!({"date": "2026-01-01", "bad": "01/01/2026"});
        assert_eq!(
            required_date(&args, "date").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
        assert!(required_date(&args, "bad").is_err());
        assert_eq!(optional_date(&args, "as_of").unwrap(), None);
    }

    #[test]
    fn plan_ids() {
        let id = Uuid::new_v4();
        let args = json!({"plan_id": id.to_string(), "other": "42"});
        assert_eq!(required_uuid(&args, "plan_id").unwrap(), id);
        let err = required_uuid(&args, "other").unwrap_err();
        assert!(err.to_string().contains("not a plan id"));
    }

    #[test]
    fn json_as_string_or_inline() {
        let inline = json!({"w": [{"date": "2026-01-02"}]});
        let encoded = json!({"w": "[{\"date\": \"2026-01-02\"}]"});
        assert_eq!(
            required_json(&inline, "w").unwrap(),
            required_json(&encoded, "w").unwrap()
        );
        assert!(required_json(&json!({"w": "[oops"}), "w").is_err());
    }
}
