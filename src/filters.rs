//! Custom Tera filters available to project templates.

use std::collections::HashMap;

use chrono::NaiveDate;
use tera::{Result, Value};

/// Format an ISO `YYYY-MM-DD` date for display, e.g. "October 31, 2025".
pub(crate) fn localize_date(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("localize_date filter expects a string"))?;
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        tera::Error::msg(format!("localize_date: {s:?} is not a YYYY-MM-DD date: {e}"))
    })?;
    Ok(Value::String(date.format("%B %-d, %Y").to_string()))
}

/// Wrap a value in literal braces for use as a TeX macro argument.
///
/// Template text like `\title{{ exam_name | embrace }}` renders to
/// `\title{Quiz 1}`: the outer braces are consumed as expression delimiters,
/// so the filter puts a literal pair back.
pub(crate) fn embrace(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let inner = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(tera::Error::msg("embrace filter expects a string or number")),
    };
    Ok(Value::String(format!("{{{inner}}}")))
}
