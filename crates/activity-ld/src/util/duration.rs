//! `xsd:duration` parsing and formatting (`-PnYnMnDTnHnMnS`).

use crate::model::Duration;
use crate::util::LexicalError;

const MICROSECONDS_PER_SECOND: u64 = 1_000_000;

fn invalid(input: &str) -> LexicalError {
    LexicalError::new(format!("invalid xsd:duration: {}", input))
}

/// Parses an `xsd:duration` string.
///
/// Components must appear in designator order, at least one component is
/// required, and only seconds may carry a fraction (truncated to
/// microseconds).
pub fn parse_duration(input: &str) -> Result<Duration, LexicalError> {
    let (negative, body) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let body = body.strip_prefix('P').ok_or_else(|| invalid(input))?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return Err(invalid(input));
            }
            (date, Some(time))
        }
        None => (body, None),
    };

    let mut duration = Duration {
        negative,
        ..Duration::default()
    };
    let mut seen_any = false;

    // Date designators, in order.
    let mut rest = date_part;
    for (designator, field) in [
        ('Y', &mut duration.years),
        ('M', &mut duration.months),
        ('D', &mut duration.days),
    ] {
        if let Some((number, tail)) = take_component(rest, designator) {
            *field = number.parse().map_err(|_| invalid(input))?;
            rest = tail;
            seen_any = true;
        }
    }
    if !rest.is_empty() {
        return Err(invalid(input));
    }

    if let Some(time) = time_part {
        let mut rest = time;
        let mut seen_time = false;
        for (designator, field) in [('H', &mut duration.hours), ('M', &mut duration.minutes)] {
            if let Some((number, tail)) = take_component(rest, designator) {
                *field = number.parse().map_err(|_| invalid(input))?;
                rest = tail;
                seen_time = true;
            }
        }
        if let Some(number) = rest.strip_suffix('S') {
            duration.micros = parse_seconds(number).ok_or_else(|| invalid(input))?;
            rest = "";
            seen_time = true;
        }
        if !rest.is_empty() || !seen_time {
            return Err(invalid(input));
        }
        seen_any = true;
    }

    if !seen_any {
        return Err(invalid(input));
    }
    Ok(duration)
}

/// Splits `"12Mrest"` into `("12", "rest")` when the leading digits are
/// followed by `designator`.
fn take_component(input: &str, designator: char) -> Option<(&str, &str)> {
    let digits = input.find(|c: char| !c.is_ascii_digit())?;
    if digits == 0 || !input[digits..].starts_with(designator) {
        return None;
    }
    Some((&input[..digits], &input[digits + 1..]))
}

fn parse_seconds(number: &str) -> Option<u64> {
    let (whole, frac) = match number.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (number, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if number.contains('.') && (frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let seconds: u64 = whole.parse().ok()?;
    let mut padded: String = frac.chars().take(6).collect();
    while padded.len() < 6 {
        padded.push('0');
    }
    let micros: u64 = padded.parse().ok()?;
    seconds.checked_mul(MICROSECONDS_PER_SECOND)?.checked_add(micros)
}

/// Formats a duration, omitting zero components (`PT0S` when all are zero).
pub fn format_duration(duration: &Duration) -> String {
    let mut out = String::new();
    if duration.negative {
        out.push('-');
    }
    out.push('P');

    for (value, designator) in [
        (duration.years, 'Y'),
        (duration.months, 'M'),
        (duration.days, 'D'),
    ] {
        if value != 0 {
            out.push_str(&format!("{}{}", value, designator));
        }
    }

    let has_time = duration.hours != 0 || duration.minutes != 0 || duration.micros != 0;
    if has_time {
        out.push('T');
        if duration.hours != 0 {
            out.push_str(&format!("{}H", duration.hours));
        }
        if duration.minutes != 0 {
            out.push_str(&format!("{}M", duration.minutes));
        }
        if duration.micros != 0 {
            let whole = duration.micros / MICROSECONDS_PER_SECOND;
            let frac = duration.micros % MICROSECONDS_PER_SECOND;
            if frac == 0 {
                out.push_str(&format!("{}S", whole));
            } else {
                let digits = format!("{:06}", frac);
                out.push_str(&format!("{}.{}S", whole, digits.trim_end_matches('0')));
            }
        }
    } else if out.ends_with('P') {
        out.push_str("T0S");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_components() {
        let d = parse_duration("P1Y2M3DT4H5M6S").unwrap();
        assert_eq!(
            (d.years, d.months, d.days, d.hours, d.minutes, d.micros),
            (1, 2, 3, 4, 5, 6_000_000)
        );
        assert!(!d.negative);

        let d = parse_duration("PT2H").unwrap();
        assert_eq!(d.hours, 2);

        let d = parse_duration("-PT1.5S").unwrap();
        assert!(d.negative);
        assert_eq!(d.micros, 1_500_000);
    }

    #[test]
    fn test_duration_month_vs_minute() {
        assert_eq!(parse_duration("P5M").unwrap().months, 5);
        assert_eq!(parse_duration("PT5M").unwrap().minutes, 5);
    }

    #[test]
    fn test_duration_roundtrip() {
        for input in ["P1Y", "PT2H30M", "P3DT0.25S", "-P1Y2M", "PT0S", "P1DT1H1M1S"] {
            let formatted = format_duration(&parse_duration(input).unwrap());
            assert_eq!(formatted, input, "roundtrip failed for {}", input);
        }
    }

    #[test]
    fn test_invalid_durations() {
        for input in ["", "P", "PT", "1Y", "P1H", "PT1Y", "P1M2Y", "PT1.S", "P-1D", "PT1,5S", "P1YT"] {
            assert!(parse_duration(input).is_err(), "expected error for {:?}", input);
        }
    }
}
