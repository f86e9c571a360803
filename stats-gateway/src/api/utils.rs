use crate::ResponseBody;
use crate::errors::GatewayError;
use crate::matches::{DEFAULT_COUNT, MatchWindow};
use hyper::{Response, StatusCode};
use serde::Serialize;
use shared::http::json_response;
use std::collections::HashMap;
use std::str::FromStr;

/// Decodes a query string. Later duplicates win.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Parses an optional numeric query parameter.
pub fn parse_number<T: FromStr>(
    name: &'static str,
    value: Option<&str>,
    default: T,
) -> Result<T, GatewayError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| GatewayError::InvalidParameter {
            name,
            reason: format!("expected a non-negative integer, got {raw:?}"),
        }),
    }
}

/// `start` and `count` query parameters. `count` is clamped.
pub fn match_window(
    start: Option<&str>,
    count: Option<&str>,
) -> Result<MatchWindow, GatewayError> {
    let start = parse_number("start", start, 0)?;
    let count = parse_number("count", count, DEFAULT_COUNT)?;
    Ok(MatchWindow::new(start, count))
}

/// Serializes a value to a 200 JSON response.
pub fn json_ok<T: Serialize>(value: &T) -> Result<Response<ResponseBody>, GatewayError> {
    let bytes = serde_json::to_vec(value)?;
    Ok(json_response(StatusCode::OK, bytes))
}
