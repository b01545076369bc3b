use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;

use super::{DateExtractor, Extraction};

static WHATSAPP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^IMG-(\d{4})(\d{2})(\d{2})-WA(\d{4,})").unwrap());

/// WhatsApp media naming: `IMG-YYYYMMDD-WA` followed by a per-day sequence
/// number of at least four digits; anything after the digits (extension,
/// duplicate marker) is ignored. The sequence number doubles as a seconds
/// offset from midnight so files sharing a date keep their send order, and
/// it may run past 86399 into the following days.
pub struct WhatsAppMedia;

impl DateExtractor for WhatsAppMedia {
    fn try_extract(&self, filename: &str) -> Extraction {
        let Some(caps) = WHATSAPP_RE.captures(filename) else {
            return Extraction::NoMatch;
        };
        match derive(&caps) {
            Ok(dt) => Extraction::Dated(dt),
            Err(detail) => Extraction::Invalid(detail),
        }
    }
}

fn derive(caps: &regex::Captures<'_>) -> Result<NaiveDateTime, String> {
    let year: i32 = caps[1].parse().map_err(|_| "unreadable year".to_string())?;
    let month: u32 = caps[2].parse().map_err(|_| "unreadable month".to_string())?;
    let day: u32 = caps[3].parse().map_err(|_| "unreadable day".to_string())?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("no such calendar date: {year:04}-{month:02}-{day:02}"))?;

    let seconds: i64 = caps[4]
        .parse()
        .map_err(|_| format!("sequence number {} out of range", &caps[4]))?;
    let offset = TimeDelta::try_seconds(seconds)
        .ok_or_else(|| format!("sequence number {seconds} out of range"))?;

    date.and_time(NaiveTime::MIN)
        .checked_add_signed(offset)
        .ok_or_else(|| format!("sequence number {seconds} out of range"))
}
