//! RFC 3339 date-time parsing and formatting (`xsd:dateTime`).
//!
//! Converts between RFC 3339 strings and microseconds since the Unix epoch
//! (UTC) plus the original offset in minutes, so a parsed value formats back
//! in the timezone it was written in.

use crate::util::LexicalError;

const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
const MICROSECONDS_PER_MINUTE: i64 = 60 * MICROSECONDS_PER_SECOND;
const MICROSECONDS_PER_HOUR: i64 = 60 * MICROSECONDS_PER_MINUTE;
const MICROSECONDS_PER_DAY: i64 = 24 * MICROSECONDS_PER_HOUR;

fn invalid(what: &str, input: &str) -> LexicalError {
    LexicalError::new(format!("invalid {} in date-time: {}", what, input))
}

/// Parses a timezone offset string (Z, +HH:MM, -HH:MM) and returns offset in minutes.
fn parse_timezone_offset(offset: &str) -> Result<i16, LexicalError> {
    if offset == "Z" || offset == "z" {
        return Ok(0);
    }

    if offset.len() != 6 || offset.as_bytes()[3] != b':' {
        return Err(invalid("timezone offset", offset));
    }

    let sign = match offset.as_bytes()[0] {
        b'+' => 1i16,
        b'-' => -1i16,
        _ => return Err(invalid("timezone offset", offset)),
    };

    let hours: i16 = offset[1..3].parse().map_err(|_| invalid("timezone offset", offset))?;
    let minutes: i16 = offset[4..6].parse().map_err(|_| invalid("timezone offset", offset))?;

    // +24:00 / -24:00 is the only offset with hour 24
    if hours > 24 || (hours == 24 && minutes != 0) || minutes > 59 {
        return Err(invalid("timezone offset", offset));
    }

    Ok(sign * (hours * 60 + minutes))
}

/// Formats an offset in minutes as a timezone string (Z, +HH:MM, -HH:MM).
fn format_timezone_offset(offset_min: i16) -> String {
    if offset_min == 0 {
        return "Z".to_string();
    }

    let sign = if offset_min >= 0 { '+' } else { '-' };
    let abs_offset = offset_min.abs();
    format!("{}{:02}:{:02}", sign, abs_offset / 60, abs_offset % 60)
}

/// Parses fractional seconds and returns microseconds (truncated past 6 digits).
fn parse_fractional_seconds(frac: &str) -> i64 {
    let mut padded = frac.to_string();
    while padded.len() < 6 {
        padded.push('0');
    }
    padded.truncate(6);
    padded.parse().unwrap_or(0)
}

/// Formats microseconds as fractional seconds, omitting if zero.
fn format_fractional_seconds(us: i64) -> String {
    if us == 0 {
        return String::new();
    }
    let digits = format!("{:06}", us);
    format!(".{}", digits.trim_end_matches('0'))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Days since Unix epoch for a civil date (Howard Hinnant's algorithm).
fn date_to_days(year: i32, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let m = if month <= 2 { month as i64 + 9 } else { month as i64 - 3 };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32;
    let doy = (153 * m as u32 + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;

    era * 146097 + doe as i64 - 719468
}

/// Converts days since Unix epoch to (year, month, day).
fn days_to_date(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };

    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Parses an RFC 3339 date-time and returns microseconds since the Unix
/// epoch (UTC) and the written offset in minutes.
///
/// A missing offset is read as UTC.
pub fn parse_datetime_rfc3339(input: &str) -> Result<(i64, i16), LexicalError> {
    // Byte slicing below relies on every position being a char boundary.
    if !input.is_ascii() || input.len() < 19 {
        return Err(invalid("shape", input));
    }

    let bytes = input.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid("date", input));
    }
    if !matches!(bytes[10], b'T' | b't' | b' ') {
        return Err(invalid("separator", input));
    }
    if bytes[13] != b':' || bytes[16] != b':' {
        return Err(invalid("time", input));
    }

    let year: i32 = input[..4].parse().map_err(|_| invalid("year", input))?;
    let month: u32 = input[5..7].parse().map_err(|_| invalid("month", input))?;
    let day: u32 = input[8..10].parse().map_err(|_| invalid("day", input))?;

    if !(1..=12).contains(&month) {
        return Err(invalid("month", input));
    }
    if day < 1 || day > days_in_month(year, month) {
        return Err(invalid("day", input));
    }

    let hours: i64 = input[11..13].parse().map_err(|_| invalid("hours", input))?;
    let minutes: i64 = input[14..16].parse().map_err(|_| invalid("minutes", input))?;
    let seconds: i64 = input[17..19].parse().map_err(|_| invalid("seconds", input))?;

    if hours > 23 {
        return Err(invalid("hours", input));
    }
    if minutes > 59 {
        return Err(invalid("minutes", input));
    }
    if seconds > 59 {
        return Err(invalid("seconds", input));
    }

    let rest = &input[19..];
    let (microseconds, offset_str) = if let Some(frac_rest) = rest.strip_prefix('.') {
        let frac_end = frac_rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(frac_rest.len());
        if frac_end == 0 {
            return Err(invalid("fractional seconds", input));
        }
        let tz = &frac_rest[frac_end..];
        (
            parse_fractional_seconds(&frac_rest[..frac_end]),
            if tz.is_empty() { None } else { Some(tz) },
        )
    } else if rest.is_empty() {
        (0, None)
    } else {
        (0, Some(rest))
    };

    let offset_min = match offset_str {
        Some(s) => parse_timezone_offset(s)?,
        None => 0,
    };

    let local_micros = date_to_days(year, month, day) * MICROSECONDS_PER_DAY
        + hours * MICROSECONDS_PER_HOUR
        + minutes * MICROSECONDS_PER_MINUTE
        + seconds * MICROSECONDS_PER_SECOND
        + microseconds;

    // local time = UTC + offset
    let epoch_micros = local_micros - offset_min as i64 * MICROSECONDS_PER_MINUTE;

    Ok((epoch_micros, offset_min))
}

/// Formats microseconds since the Unix epoch as an RFC 3339 date-time in
/// the given offset.
pub fn format_datetime_rfc3339(epoch_micros: i64, offset_min: i16) -> String {
    let local_us = epoch_micros + offset_min as i64 * MICROSECONDS_PER_MINUTE;

    let days = local_us.div_euclid(MICROSECONDS_PER_DAY);
    let time_micros = local_us.rem_euclid(MICROSECONDS_PER_DAY);

    let (year, month, day) = days_to_date(days);

    let hours = time_micros / MICROSECONDS_PER_HOUR;
    let minutes = (time_micros % MICROSECONDS_PER_HOUR) / MICROSECONDS_PER_MINUTE;
    let seconds = (time_micros % MICROSECONDS_PER_MINUTE) / MICROSECONDS_PER_SECOND;
    let microseconds = time_micros % MICROSECONDS_PER_SECOND;

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}{}",
        year,
        month,
        day,
        hours,
        minutes,
        seconds,
        format_fractional_seconds(microseconds),
        format_timezone_offset(offset_min)
    )
}
