use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a workout length into minutes: `45`, `45m`, `1h`, `1h30m`.
pub fn parse_minutes(input: &str) -> Result<u32> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(anyhow!("Empty duration string"));
    }
    if let Ok(minutes) = input.parse::<u32>() {
        return Ok(minutes);
    }

    let mut total: u32 = 0;
    let mut digits = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let num: u32 = digits
            .parse()
            .map_err(|_| anyhow!("Invalid duration number in '{}'", input))?;
        digits.clear();
        let minutes = match c {
            'h' => num.checked_mul(60),
            'm' => Some(num),
            _ => return Err(anyhow!("Unknown duration unit: {}", c)),
        };
        total = minutes
            .and_then(|m| total.checked_add(m))
            .ok_or_else(|| anyhow!("Duration '{}' is too long", input))?;
    }
    if !digits.is_empty() {
        return Err(anyhow!("Missing unit after '{}' in '{}'", digits, input));
    }
    Ok(total)
}

/// Parses a non-negative whole number such as a calorie count.
pub fn parse_count(input: &str) -> Result<u32> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| anyhow!("'{}' is not a non-negative whole number", input))
}

/// Parses the date of a workout relative to the local clock.
pub fn parse_log_date(input: &str) -> Result<NaiveDateTime> {
    parse_log_date_at(input, Local::now().naive_local())
}

/// Accepts `today`, `yesterday`, `-3d`, `-1w`, `2024-05-01` (noon) and
/// `2024-05-01 18:30`. Keywords keep the time of day of `now`.
pub fn parse_log_date_at(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let input = input.trim();

    // 1. Reserved keywords
    match input.to_lowercase().as_str() {
        "today" | "tod" | "now" => return Ok(now),
        "yesterday" | "yest" => {
            return now
                .checked_sub_signed(Duration::days(1))
                .ok_or_else(|| anyhow!("Date before {} is out of range", now))
        }
        _ => {}
    }

    // 2. Relative format (-Nd, -Nw)
    if let Some(rest) = input.strip_prefix('-') {
        if let Some(unit) = rest.chars().last().filter(|_| rest.chars().count() >= 2) {
            let num_str = &rest[..rest.len() - unit.len_utf8()];
            let count: i64 = num_str
                .parse()
                .map_err(|_| anyhow!("Invalid relative format"))?;
            let delta = match unit {
                'd' => Duration::try_days(count),
                'w' => Duration::try_weeks(count),
                _ => return Err(anyhow!("Unknown unit in relative time: {}", unit)),
            };
            return delta
                .and_then(|delta| now.checked_sub_signed(delta))
                .ok_or_else(|| anyhow!("Relative date '{}' is out of range", input));
        }
    }

    // 3. Fallback to standard formats
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(d.and_time(noon()));
    }

    Err(anyhow!("Could not parse date: {}", input))
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(18, 15, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("45").unwrap(), 45);
        assert_eq!(parse_minutes("45m").unwrap(), 45);
        assert_eq!(parse_minutes("1h").unwrap(), 60);
        assert_eq!(parse_minutes("1H30m").unwrap(), 90);
        assert!(parse_minutes("").is_err());
        assert!(parse_minutes("1h30").is_err());
        assert!(parse_minutes("10s").is_err());
        assert!(parse_minutes("-5").is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(" 250 ").unwrap(), 250);
        assert!(parse_count("-1").is_err());
        assert!(parse_count("12.5").is_err());
    }

    #[test]
    fn test_parse_log_date_keywords() {
        assert_eq!(parse_log_date_at("today", anchor()).unwrap(), anchor());
        assert_eq!(
            parse_log_date_at("yest", anchor()).unwrap(),
            date(2024, 5, 9, 18, 15)
        );
        assert_eq!(
            parse_log_date_at("-3d", anchor()).unwrap(),
            date(2024, 5, 7, 18, 15)
        );
        assert_eq!(
            parse_log_date_at("-1w", anchor()).unwrap(),
            date(2024, 5, 3, 18, 15)
        );
    }

    #[test]
    fn test_parse_log_date_formats() {
        assert_eq!(
            parse_log_date_at("2024-05-01", anchor()).unwrap(),
            date(2024, 5, 1, 12, 0)
        );
        assert_eq!(
            parse_log_date_at("2024-05-01 06:45", anchor()).unwrap(),
            date(2024, 5, 1, 6, 45)
        );
        assert!(parse_log_date_at("someday", anchor()).is_err());
        assert!(parse_log_date_at("-3x", anchor()).is_err());
    }

    #[test]
    fn test_parse_log_date_absolute() {
        assert_eq!(
            parse_log_date("2024-05-01 06:45").unwrap(),
            date(2024, 5, 1, 6, 45)
        );
    }

    #[test]
    fn test_parse_log_date_rejects_out_of_range_and_odd_units() {
        assert!(parse_log_date_at("-999999999d", anchor()).is_err());
        assert!(parse_log_date_at("-999999999999w", anchor()).is_err());
        assert!(parse_log_date_at("-3é", anchor()).is_err());
        assert!(parse_log_date_at("-é", anchor()).is_err());
        assert_eq!(
            parse_log_date_at("-0d", anchor()).unwrap(),
            anchor()
        );
    }
}
