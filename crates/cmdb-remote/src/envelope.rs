//! Table API response envelopes
//!
//! A successful batch is `{"result": [ {..}, .. ]}`, a single record is
//! `{"result": {..}}`, and failures come back as `{"error": {"message": ..}}`.

use serde_json::Value;

use crate::{Error, Result};

/// Parse a batch response into its records
pub fn parse_batch(body: &str) -> Result<Vec<Value>> {
    match unwrap_result(body)? {
        Value::Array(records) => Ok(records),
        other => Err(Error::RemoteService(format!(
            "expected a list of records, received {}",
            kind_of(&other)
        ))),
    }
}

/// Parse a single-record response (the target of a reference link)
pub fn parse_record(body: &str) -> Result<Value> {
    match unwrap_result(body)? {
        record @ Value::Object(_) => Ok(record),
        Value::Array(records) => records
            .into_iter()
            .next()
            .ok_or_else(|| Error::RemoteService("empty result".to_string())),
        other => Err(Error::RemoteService(format!(
            "expected a record, received {}",
            kind_of(&other)
        ))),
    }
}

/// Message of an error envelope, if `body` is one
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| Some(error.to_string()))
}

fn unwrap_result(body: &str) -> Result<Value> {
    let mut value: Value = serde_json::from_str(body)?;
    if let Some(result) = value.get_mut("result") {
        return Ok(result.take());
    }
    if let Some(message) = error_message(body) {
        return Err(Error::RemoteService(message));
    }
    Err(Error::RemoteService(
        "the data received is in an unknown format".to_string(),
    ))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
