//! Parsing of typed date input and short relative labels for display.

use crate::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, Weekday};

const WEEKDAYS: [(&str, &str, Weekday); 7] = [
    ("monday", "mon", Weekday::Monday),
    ("tuesday", "tue", Weekday::Tuesday),
    ("wednesday", "wed", Weekday::Wednesday),
    ("thursday", "thu", Weekday::Thursday),
    ("friday", "fri", Weekday::Friday),
    ("saturday", "sat", Weekday::Saturday),
    ("sunday", "sun", Weekday::Sunday),
];

/// Parses a due or start date typed by a user.
///
/// Supports:
/// - RFC 3339 timestamps
/// - `YYYY-MM-DD` (midnight in `now`'s offset)
/// - `YYYY-MM-DD HH:MM` and `YYYY-MM-DD HH:MM:SS`
/// - `today`, `tomorrow`, `yesterday` (keeping `now`'s time of day)
/// - `in 3d`, `in 2w`, `in 4h`, `2d ago`
/// - weekday names and `next <weekday>`
pub fn parse_when(input: &str, now: OffsetDateTime) -> Result<OffsetDateTime, AppError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("date is required"));
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed);
    }

    let lowered = trimmed.to_ascii_lowercase();
    if let Some(relative) = parse_relative(&lowered, now)? {
        return Ok(relative);
    }

    let date_format = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(trimmed, &date_format) {
        return Ok(date.with_time(Time::MIDNIGHT).assume_offset(now.offset()));
    }

    let spaced = trimmed.replacen('T', " ", 1);
    let minutes_format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    let seconds_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    PrimitiveDateTime::parse(&spaced, &minutes_format)
        .or_else(|_| PrimitiveDateTime::parse(&spaced, &seconds_format))
        .map(|local| local.assume_offset(now.offset()))
        .map_err(|_| AppError::invalid_input(format!("unrecognized date '{trimmed}'")))
}

fn out_of_range() -> AppError {
    AppError::invalid_input("date out of range")
}

fn shift(now: OffsetDateTime, span: Duration) -> Result<OffsetDateTime, AppError> {
    now.checked_add(span).ok_or_else(out_of_range)
}

/// `Ok(None)` means the input is not a relative form at all.
fn parse_relative(input: &str, now: OffsetDateTime) -> Result<Option<OffsetDateTime>, AppError> {
    match input {
        "today" | "now" => return Ok(Some(now)),
        "tomorrow" => return shift(now, Duration::DAY).map(Some),
        "yesterday" => return shift(now, -Duration::DAY).map(Some),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix("in ") {
        return match parse_span(rest)? {
            Some(span) => shift(now, span).map(Some),
            None => Ok(None),
        };
    }
    if let Some(rest) = input.strip_suffix(" ago") {
        return match parse_span(rest)? {
            Some(span) => shift(now, -span).map(Some),
            None => Ok(None),
        };
    }

    let (name, skip_week) = match input.strip_prefix("next ") {
        Some(name) => (name, true),
        None => (input, false),
    };
    let Some((_, _, weekday)) = WEEKDAYS
        .iter()
        .find(|(long, short, _)| name == *long || name == *short)
    else {
        return Ok(None);
    };
    let ahead = i64::from(weekday.number_days_from_monday())
        - i64::from(now.weekday().number_days_from_monday());
    let mut days = ahead.rem_euclid(7);
    if skip_week {
        days += 7;
    }
    shift(now, Duration::days(days)).map(Some)
}

fn parse_span(raw: &str) -> Result<Option<Duration>, AppError> {
    let raw = raw.trim();
    let Some((split, _)) = raw.char_indices().last() else {
        return Ok(None);
    };
    let (count, unit) = raw.split_at(split);
    let Ok(count) = count.trim().parse::<i64>() else {
        return Ok(None);
    };
    if count < 0 {
        return Ok(None);
    }
    let seconds_per_unit: i64 = match unit {
        "h" => 3_600,
        "d" => 86_400,
        "w" => 604_800,
        _ => return Ok(None),
    };
    count
        .checked_mul(seconds_per_unit)
        .map(|seconds| Some(Duration::seconds(seconds)))
        .ok_or_else(out_of_range)
}

/// Short label for a due date relative to today: `today`, `tomorrow`,
/// `in 3d`, `2d late`, or `-` when undated.
pub fn describe_due(due: Option<OffsetDateTime>, now: OffsetDateTime) -> String {
    let Some(due) = due else {
        return "-".to_string();
    };
    let days = (due.to_offset(now.offset()).date() - now.date()).whole_days();
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        days if days > 1 => format!("in {days}d"),
        days => format!("{}d late", -days),
    }
}

/// `2026-03-18 10:00` in `now`'s offset.
pub fn format_local(at: OffsetDateTime, now: OffsetDateTime) -> String {
    let local = at.to_offset(now.offset());
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    local
        .format(&format)
        .unwrap_or_else(|_| local.date().to_string())
}

#[cfg(test)]
mod tests {
    use super::{describe_due, format_local, parse_when};
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    // A Wednesday.
    const NOW: OffsetDateTime = datetime!(2026-03-18 10:15 +05:30);

    #[test]
    fn parses_absolute_forms() {
        assert_eq!(
            parse_when("2026-03-20T09:00:00Z", NOW).unwrap(),
            datetime!(2026-03-20 09:00 UTC)
        );
        assert_eq!(
            parse_when("2026-03-20", NOW).unwrap(),
            datetime!(2026-03-20 00:00 +05:30)
        );
        assert_eq!(
            parse_when("2026-03-20 17:30", NOW).unwrap(),
            datetime!(2026-03-20 17:30 +05:30)
        );
        assert_eq!(
            parse_when("2026-03-20 17:30:45", NOW).unwrap(),
            datetime!(2026-03-20 17:30:45 +05:30)
        );
    }

    #[test]
    fn parses_relative_forms() {
        assert_eq!(parse_when("today", NOW).unwrap(), NOW);
        assert_eq!(parse_when("Tomorrow", NOW).unwrap(), NOW + Duration::days(1));
        assert_eq!(parse_when("yesterday", NOW).unwrap(), NOW - Duration::days(1));
        assert_eq!(parse_when("in 3d", NOW).unwrap(), NOW + Duration::days(3));
        assert_eq!(parse_when("in 2h", NOW).unwrap(), NOW + Duration::hours(2));
        assert_eq!(parse_when("in 1w", NOW).unwrap(), NOW + Duration::weeks(1));
        assert_eq!(parse_when("2d ago", NOW).unwrap(), NOW - Duration::days(2));
    }

    #[test]
    fn parses_weekdays() {
        assert_eq!(parse_when("friday", NOW).unwrap(), NOW + Duration::days(2));
        assert_eq!(parse_when("wed", NOW).unwrap(), NOW);
        assert_eq!(parse_when("next wed", NOW).unwrap(), NOW + Duration::days(7));
        assert_eq!(parse_when("next mon", NOW).unwrap(), NOW + Duration::days(12));
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "soon", "in d", "in -2d", "2026-13-01", "in 3y"] {
            let err = parse_when(input, NOW).unwrap_err();
            assert_eq!(err.code(), "invalid_input", "{input:?}");
        }
    }

    #[test]
    fn huge_spans_are_rejected_instead_of_overflowing() {
        for input in ["in 99999999d", "99999999w ago", "in 9223372036854775807h"] {
            let err = parse_when(input, NOW).unwrap_err();
            assert_eq!(err.code(), "invalid_input", "{input:?}");
            assert_eq!(err.message(), "date out of range", "{input:?}");
        }
    }

    #[test]
    fn describes_due_relative_to_today() {
        assert_eq!(describe_due(None, NOW), "-");
        assert_eq!(describe_due(Some(NOW + Duration::hours(5)), NOW), "today");
        assert_eq!(describe_due(Some(NOW + Duration::days(1)), NOW), "tomorrow");
        assert_eq!(describe_due(Some(NOW + Duration::days(3)), NOW), "in 3d");
        assert_eq!(describe_due(Some(NOW - Duration::days(2)), NOW), "2d late");
    }

    #[test]
    fn formats_in_the_offset_of_now() {
        assert_eq!(
            format_local(datetime!(2026-03-18 04:45 UTC), NOW),
            "2026-03-18 10:15"
        );
    }
}
