//! Response parsing for the time-calculation service.
//!
//! The service returns `{"code": 200, "data": ...}` where `data` is a list
//! of day entries for calendar lookups and a single entry for timestamp
//! lookups. Each entry carries a `timings` object keyed by marker wire name
//! and a `date.gregorian` block identifying the day.

use crate::error::{Result, TimesError};
use crate::types::{DailyPrayerTimes, Marker};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::collections::HashMap;

/// Top-level response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub code: Option<u16>,
    pub data: T,
}

/// One day as returned by the service, before validation.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawDay {
    #[serde(default)]
    pub timings: HashMap<String, String>,
    pub date: RawDate,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawDate {
    pub gregorian: RawGregorian,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawGregorian {
    pub day: String,
    pub month: RawMonth,
    pub year: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawMonth {
    pub number: u32,
}

impl RawDay {
    /// Calendar date of this entry.
    pub fn date(&self) -> Result<NaiveDate> {
        let g = &self.date.gregorian;
        let day: u32 = g
            .day
            .trim()
            .parse()
            .map_err(|_| TimesError::MalformedResponse(format!("bad day: {:?}", g.day)))?;
        let year: i32 = g
            .year
            .trim()
            .parse()
            .map_err(|_| TimesError::MalformedResponse(format!("bad year: {:?}", g.year)))?;
        NaiveDate::from_ymd_opt(year, g.month.number, day).ok_or_else(|| {
            TimesError::MalformedResponse(format!(
                "invalid date {year}-{}-{day}",
                g.month.number
            ))
        })
    }

    /// Whether this entry describes `date`.
    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.date().is_ok_and(|d| d == date)
    }

    /// Validate all six timings and build the typed record.
    pub fn to_times(&self) -> Result<DailyPrayerTimes> {
        let date = self.date()?;
        let field = |marker: Marker| -> Result<NaiveTime> {
            let raw = self.timings.get(marker.wire_name()).ok_or_else(|| {
                TimesError::MalformedResponse(format!("missing {}", marker.wire_name()))
            })?;
            parse_time_of_day(raw).ok_or_else(|| {
                TimesError::MalformedResponse(format!("bad {}: {raw:?}", marker.wire_name()))
            })
        };
        Ok(DailyPrayerTimes {
            date,
            dawn: field(Marker::Dawn)?,
            sunrise: field(Marker::Sunrise)?,
            midday: field(Marker::Midday)?,
            afternoon: field(Marker::Afternoon)?,
            sunset: field(Marker::Sunset)?,
            night: field(Marker::Night)?,
        })
    }
}

/// Parse the significant `HH:MM` prefix of a timing string.
///
/// Only the first five characters count, so `"05:12 (EET)"` parses as
/// 05:12. Hours must be 00-23 and minutes 00-59, both two digits.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let head = raw.trim_start().get(..5)?;
    let bytes = head.as_bytes();
    if bytes[2] != b':' {
        return None;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let hour = u32::from(digits[0] - b'0') * 10 + u32::from(digits[1] - b'0');
    let minute = u32::from(digits[2] - b'0') * 10 + u32::from(digits[3] - b'0');
    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Decode a calendar (month) payload into raw day entries.
pub(crate) fn decode_month(body: &str) -> Result<Vec<RawDay>> {
    let envelope: Envelope<Vec<RawDay>> = serde_json::from_str(body)
        .map_err(|e| TimesError::MalformedResponse(format!("calendar payload: {e}")))?;
    check_code(envelope.code)?;
    Ok(envelope.data)
}

/// Decode a single-day payload.
pub(crate) fn decode_day(body: &str) -> Result<RawDay> {
    let envelope: Envelope<RawDay> = serde_json::from_str(body)
        .map_err(|e| TimesError::MalformedResponse(format!("timings payload: {e}")))?;
    check_code(envelope.code)?;
    Ok(envelope.data)
}

/// Every entry of a month, or an error if any one is incomplete.
pub(crate) fn month_times(days: &[RawDay]) -> Result<Vec<DailyPrayerTimes>> {
    if days.is_empty() {
        return Err(TimesError::MalformedResponse("empty calendar".into()));
    }
    days.iter().map(RawDay::to_times).collect()
}

/// The single entry of a month matching `date`.
///
/// Zero or several matches are both treated as malformed.
pub(crate) fn select_day(days: &[RawDay], date: NaiveDate) -> Result<DailyPrayerTimes> {
    let mut matches = days.iter().filter(|d| d.is_for(date));
    let first = matches
        .next()
        .ok_or_else(|| TimesError::MalformedResponse(format!("no entry for {date}")))?;
    if matches.next().is_some() {
        return Err(TimesError::MalformedResponse(format!(
            "multiple entries for {date}"
        )));
    }
    first.to_times()
}

fn check_code(code: Option<u16>) -> Result<()> {
    match code {
        None | Some(200) => Ok(()),
        Some(other) => Err(TimesError::MalformedResponse(format!(
            "service reported code {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn day_json(day: u32, fajr: &str) -> String {
        format!(
            r#"{{"timings":{{"Fajr":"{fajr}","Sunrise":"06:20 (EET)","Dhuhr":"12:30 (EET)","Asr":"15:45 (EET)","Maghrib":"18:10 (EET)","Isha":"19:30 (EET)","Midnight":"00:10 (EET)"}},
               "date":{{"gregorian":{{"date":"{day:02}-03-2025","day":"{day:02}","month":{{"number":3,"en":"March"}},"year":"2025"}}}}}}"#
        )
    }

    #[test]
    fn parses_plain_and_suffixed_times() {
        assert_eq!(parse_time_of_day("05:00"), NaiveTime::from_hms_opt(5, 0, 0));
        assert_eq!(
            parse_time_of_day("18:10 (EET)"),
            NaiveTime::from_hms_opt(18, 10, 0)
        );
        assert_eq!(parse_time_of_day("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(parse_time_of_day("00:00"), NaiveTime::from_hms_opt(0, 0, 0));
    }

    #[test]
    fn rejects_malformed_times() {
        for raw in ["", "5:00", "24:00", "12:60", "ab:cd", "12-30", "1230x", "\u{e9}\u{e9}:00"] {
            assert!(parse_time_of_day(raw).is_none(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn decodes_single_day_with_all_fields() {
        let body = format!(r#"{{"code":200,"status":"OK","data":{}}}"#, day_json(1, "05:00 (EET)"));
        let times = decode_day(&body).unwrap().to_times().unwrap();
        assert_eq!(times.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(times.dawn, NaiveTime::from_hms_opt(5, 0, 0).unwrap());
        assert_eq!(times.night, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    #[test]
    fn missing_field_is_malformed_not_partial() {
        let body = r#"{"code":200,"data":{"timings":{"Fajr":"05:00","Sunrise":"06:20","Dhuhr":"12:30","Asr":"15:45","Maghrib":"18:10"},
            "date":{"gregorian":{"day":"01","month":{"number":3},"year":"2025"}}}}"#;
        let err = decode_day(body).unwrap().to_times().unwrap_err();
        assert!(err.to_string().contains("missing Isha"));
    }

    #[test]
    fn unparseable_field_is_malformed() {
        let body = format!(r#"{{"code":200,"data":{}}}"#, day_json(1, "late"));
        let err = decode_day(&body).unwrap().to_times().unwrap_err();
        assert!(err.to_string().contains("bad Fajr"));
    }

    #[test]
    fn non_200_code_is_malformed() {
        let body = format!(r#"{{"code":400,"data":{}}}"#, day_json(1, "05:00"));
        assert!(decode_day(&body).is_err());
    }

    #[test]
    fn error_string_payload_is_malformed() {
        let body = r#"{"code":400,"status":"BAD_REQUEST","data":"Please specify a city"}"#;
        assert!(decode_month(body).is_err());
    }

    #[test]
    fn select_day_picks_matching_entry() {
        let body = format!(
            r#"{{"code":200,"data":[{},{},{}]}}"#,
            day_json(1, "05:00"),
            day_json(2, "04:59"),
            day_json(3, "04:58")
        );
        let days = decode_month(&body).unwrap();
        let picked = select_day(&days, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()).unwrap();
        assert_eq!(picked.dawn, NaiveTime::from_hms_opt(4, 59, 0).unwrap());
    }

    #[test]
    fn select_day_rejects_missing_and_duplicate_dates() {
        let body = format!(
            r#"{{"code":200,"data":[{},{}]}}"#,
            day_json(1, "05:00"),
            day_json(1, "05:01")
        );
        let days = decode_month(&body).unwrap();
        assert!(select_day(&days, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).is_err());
        assert!(select_day(&days, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()).is_err());
    }

    #[test]
    fn month_with_one_bad_day_is_unavailable() {
        let body = format!(
            r#"{{"code":200,"data":[{},{}]}}"#,
            day_json(1, "05:00"),
            day_json(2, "??")
        );
        let days = decode_month(&body).unwrap();
        assert!(month_times(&days).is_err());
        // The intact day is still selectable on its own.
        assert!(select_day(&days, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).is_ok());
    }
}
