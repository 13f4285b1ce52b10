//! Lenient field deserializers.
//!
//! Text fields accept numbers and booleans and keep their textual form. Dates
//! accept RFC 3339, naive date-times, bare `YYYY-MM-DD` dates (midnight UTC)
//! and epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::{Deserializer, Error};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum TextToken {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl TextToken {
    fn into_text(self) -> String {
        match self {
            TextToken::Text(text) => text,
            TextToken::Integer(n) => n.to_string(),
            TextToken::Float(n) => n.to_string(),
            TextToken::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberToken {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateToken {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextToken>::deserialize(deserializer)?.map(TextToken::into_text))
}

/// A list of text tokens; `null` reads as an empty list.
pub fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TextToken>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(TextToken::into_text)
        .collect())
}

pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberToken>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberToken::Number(n)) => Ok(Some(n)),
        Some(NumberToken::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid number: {}", text))),
    }
}

pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Some(date_time.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn from_millis<E: Error>(millis: i64) -> Result<Option<DateTime<Utc>>, E> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(Some)
        .ok_or_else(|| E::custom(format!("date out of range: {}", millis)))
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<DateToken>::deserialize(deserializer)? {
        None => Ok(None),
        Some(DateToken::Millis(millis)) => from_millis(millis),
        Some(DateToken::FractionalMillis(millis)) => from_millis(millis as i64),
        Some(DateToken::Text(text)) => parse_date(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date: {}", text))),
    }
}

/// Absent stays `None` (with `#[serde(default)]`); an explicit `null` is an error.
pub fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)?
        .map(Some)
        .ok_or_else(|| D::Error::custom("must not be null"))
}
