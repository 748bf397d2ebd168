//! Extraction of the "last activity" timestamp from Blockscout markup.
//!
//! The explorer embeds relative-time widgets as
//! `data-from-now="2019-12-08 11:09:47.000000Z"`. JSON-wrapped pages escape
//! the quotes (`data-from-now=\"...\"`); both forms are accepted.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::bytes::Regex;
use std::sync::OnceLock;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"data-from-now=\\?"([^"\\]+)\\?""#).expect("timestamp pattern is valid")
    })
}

/// Find the first embedded timestamp in `body`.
///
/// Returns `None` when no token is present or the token does not parse.
pub fn extract_timestamp(body: &[u8]) -> Option<DateTime<Utc>> {
    let caps = pattern().captures(body)?;
    let token = std::str::from_utf8(&caps[1]).ok()?;
    let parsed = parse_timestamp(token);
    if parsed.is_none() {
        log::warn!("Ignoring unparsable timestamp token '{}'", token);
    }
    parsed
}

/// Parse `YYYY-MM-DD HH:MM:SS.ffffff` with an optional trailing `Z`, as UTC
pub fn parse_timestamp(token: &str) -> Option<DateTime<Utc>> {
    let token = token.trim();
    let token = token.strip_suffix('Z').unwrap_or(token);
    NaiveDateTime::parse_from_str(token, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
