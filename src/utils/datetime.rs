//! XMP Date/Time utilities
//!
//! XMP stores dates in an ISO 8601 profile that allows partial values
//! (`YYYY`, `YYYY-MM`, ...) and an optional time zone. Values crossing the
//! engine boundary always carry an explicit [`TimeZone`].

use crate::core::error::{XmpError, XmpResult};
use chrono::{Datelike, Local, Timelike};
use std::fmt;
use std::str::FromStr;

/// Time zone of an XMP date/time
///
/// A zero offset is always represented as [`TimeZone::Utc`], never as
/// `East`/`West` with zero magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeZone {
    /// Coordinated universal time
    Utc,
    /// Ahead of UTC
    East { hours: u8, minutes: u8 },
    /// Behind UTC
    West { hours: u8, minutes: u8 },
}

impl TimeZone {
    /// Build a zone from a signed offset in seconds
    ///
    /// Seconds below a whole minute are dropped.
    pub fn from_offset_seconds(seconds: i32) -> Self {
        let magnitude = seconds.unsigned_abs();
        let hours = (magnitude / 3600).min(23) as u8;
        let minutes = ((magnitude % 3600) / 60) as u8;
        if hours == 0 && minutes == 0 {
            TimeZone::Utc
        } else if seconds > 0 {
            TimeZone::East { hours, minutes }
        } else {
            TimeZone::West { hours, minutes }
        }
    }

    /// Build a zone from a UTC offset expressed as a fraction of a day
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpbridge::utils::datetime::TimeZone;
    ///
    /// assert_eq!(TimeZone::from_day_fraction(0.25), TimeZone::East { hours: 6, minutes: 0 });
    /// assert_eq!(TimeZone::from_day_fraction(0.0), TimeZone::Utc);
    /// ```
    pub fn from_day_fraction(fraction: f64) -> Self {
        Self::from_offset_seconds((fraction * 86_400.0).round() as i32)
    }

    /// Signed offset from UTC in seconds
    pub fn offset_seconds(self) -> i32 {
        match self {
            TimeZone::Utc => 0,
            TimeZone::East { hours, minutes } => i32::from(hours) * 3600 + i32::from(minutes) * 60,
            TimeZone::West { hours, minutes } => {
                -(i32::from(hours) * 3600 + i32::from(minutes) * 60)
            }
        }
    }

    fn parse_offset(s: &str) -> XmpResult<Self> {
        let (sign, body) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => {
                return Err(XmpError::BadValue(format!(
                    "Invalid timezone offset: {}",
                    s
                )))
            }
        };
        let (hours, minutes) = match body.split_once(':') {
            Some((h, m)) => (h, m),
            None if body.len() == 4 && body.is_ascii() => body.split_at(2),
            None => (body, "0"),
        };
        let hours: u8 = parse_field(hours, "timezone hour")?;
        let minutes: u8 = parse_field(minutes, "timezone minute")?;
        if hours > 23 || minutes > 59 {
            return Err(XmpError::BadValue(
                "Timezone offset is out of range".to_string(),
            ));
        }
        Ok(Self::from_offset_seconds(
            sign * (i32::from(hours) * 3600 + i32::from(minutes) * 60),
        ))
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZone::Utc => write!(f, "Z"),
            TimeZone::East { hours, minutes } => write!(f, "+{:02}:{:02}", hours, minutes),
            TimeZone::West { hours, minutes } => write!(f, "-{:02}:{:02}", hours, minutes),
        }
    }
}

/// XMP Date/Time structure
///
/// Represents a date/time value with optional components.
/// XMP supports partial dates (e.g., just year, or year-month).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmpDateTime {
    /// Year (can be negative for BCE dates)
    pub year: i32,
    /// Month (1-12, 0 means not set)
    pub month: u8,
    /// Day (1-31, 0 means not set)
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
    /// Whether date components are present
    pub has_date: bool,
    /// Whether time components are present
    pub has_time: bool,
    /// Time zone, if the value carries one
    pub time_zone: Option<TimeZone>,
}

impl XmpDateTime {
    /// Create a new empty XMP date/time
    pub fn new() -> Self {
        Self::default()
    }

    /// Current local time with its UTC offset
    pub fn now() -> Self {
        let now = Local::now();
        let mut dt = Self::new();
        dt.has_date = true;
        dt.has_time = true;
        dt.year = now.year();
        dt.month = now.month() as u8;
        dt.day = now.day() as u8;
        dt.hour = now.hour() as u8;
        dt.minute = now.minute() as u8;
        dt.second = now.second().min(59) as u8;
        dt.nanosecond = now.nanosecond() % 1_000_000_000;
        dt.time_zone = Some(TimeZone::from_offset_seconds(
            now.offset().local_minus_utc(),
        ));
        dt
    }

    /// Parse an XMP date/time string
    ///
    /// Accepted shapes: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, optionally followed
    /// by `Thh:mm`, `Thh:mm:ss` or `Thh:mm:ss.fff` and a zone (`Z`,
    /// `+hh:mm`, `-hh:mm`). A bare time (`Thh:mm` or `hh:mm:ss`) is also
    /// accepted. Out-of-range month and day values are clamped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpbridge::utils::datetime::{TimeZone, XmpDateTime};
    ///
    /// let dt = XmpDateTime::parse("2023-12-25T10:30:00+08:00").unwrap();
    /// assert_eq!(dt.year, 2023);
    /// assert_eq!(dt.time_zone, Some(TimeZone::East { hours: 8, minutes: 0 }));
    /// ```
    pub fn parse(s: &str) -> XmpResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(XmpError::BadValue("Empty date/time string".to_string()));
        }

        let (date_part, time_part) = match s.find('T') {
            Some(0) => (None, Some(&s[1..])),
            Some(pos) => (Some(&s[..pos]), Some(&s[pos + 1..])),
            None if s.contains(':') => (None, Some(s)),
            None => (Some(s), None),
        };

        let mut dt = Self::new();
        if let Some(date) = date_part {
            dt.parse_date(date)?;
        }
        if let Some(time) = time_part {
            dt.parse_time(time)?;
        }
        Ok(dt)
    }

    fn parse_date(&mut self, date: &str) -> XmpResult<()> {
        let (negative, body) = match date.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, date),
        };
        let mut fields = body.split('-');

        let year: i32 = parse_field(fields.next().unwrap_or(""), "year")?;
        self.year = if negative { -year } else { year };
        self.has_date = true;

        if let Some(month) = fields.next() {
            let month: u8 = parse_field(month, "month")?;
            self.month = month.clamp(1, 12);
        }
        if let Some(day) = fields.next() {
            let day: u8 = parse_field(day, "day")?;
            self.day = day.clamp(1, 31);
        }
        if fields.next().is_some() {
            return Err(XmpError::BadValue(
                "Invalid date string, extra characters at end".to_string(),
            ));
        }
        Ok(())
    }

    fn parse_time(&mut self, time: &str) -> XmpResult<()> {
        let (clock, zone) = if let Some(clock) = time.strip_suffix('Z') {
            (clock, Some(TimeZone::Utc))
        } else if let Some(pos) = time.rfind(|c| c == '+' || c == '-') {
            (&time[..pos], Some(TimeZone::parse_offset(&time[pos..])?))
        } else {
            (time, None)
        };

        let mut fields = clock.split(':');
        let hour: u8 = parse_field(fields.next().unwrap_or(""), "hour")?;
        let minute: u8 = parse_field(
            fields.next().ok_or_else(|| {
                XmpError::BadValue("Invalid date string, expected ':' after hour".to_string())
            })?,
            "minute",
        )?;
        self.hour = hour.min(23);
        self.minute = minute.min(59);

        if let Some(seconds) = fields.next() {
            let (whole, fraction) = match seconds.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (seconds, None),
            };
            let second: u8 = parse_field(whole, "second")?;
            self.second = second.min(59);
            if let Some(fraction) = fraction {
                self.nanosecond = parse_fraction(fraction)?;
            }
        }
        if fields.next().is_some() {
            return Err(XmpError::BadValue(
                "Invalid time string, extra characters at end".to_string(),
            ));
        }

        self.has_time = true;
        self.time_zone = zone;
        Ok(())
    }

    /// Format an XMP date/time to string
    ///
    /// Partial dates keep their precision; fractional seconds drop trailing
    /// zeros.
    pub fn format(&self) -> String {
        let mut result = String::new();

        if self.has_date {
            if self.year < 0 {
                result.push('-');
            }
            let year = self.year.unsigned_abs();
            if self.month == 0 {
                result.push_str(&format!("{:04}", year));
            } else if self.day == 0 {
                result.push_str(&format!("{:04}-{:02}", year, self.month));
            } else {
                result.push_str(&format!("{:04}-{:02}-{:02}", year, self.month, self.day));
            }
        }

        if self.has_time {
            result.push('T');
            result.push_str(&format!(
                "{:02}:{:02}:{:02}",
                self.hour, self.minute, self.second
            ));
            if self.nanosecond != 0 {
                let fraction = format!("{:09}", self.nanosecond);
                result.push('.');
                result.push_str(fraction.trim_end_matches('0'));
            }
            if let Some(zone) = self.time_zone {
                result.push_str(&zone.to_string());
            }
        }

        result
    }

    /// Validate the date/time values
    pub fn validate(&self) -> XmpResult<()> {
        if self.has_date {
            if self.month > 12 {
                return Err(XmpError::BadValue("Month is out of range".to_string()));
            }
            if self.day > 31 {
                return Err(XmpError::BadValue("Day is out of range".to_string()));
            }
        }
        if self.has_time
            && (self.hour > 23
                || self.minute > 59
                || self.second > 59
                || self.nanosecond >= 1_000_000_000)
        {
            return Err(XmpError::BadValue("Time is out of range".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for XmpDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for XmpDateTime {
    type Err = XmpError;

    fn from_str(s: &str) -> XmpResult<Self> {
        Self::parse(s)
    }
}

fn parse_field<T: FromStr>(s: &str, what: &str) -> XmpResult<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(XmpError::BadValue(format!("Invalid {} in date string", what)));
    }
    s.parse()
        .map_err(|_| XmpError::BadValue(format!("Invalid {} value", what)))
}

fn parse_fraction(s: &str) -> XmpResult<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(XmpError::BadValue(
            "Invalid fractional second value".to_string(),
        ));
    }
    let digits: String = s.chars().chain(std::iter::repeat('0')).take(9).collect();
    digits
        .parse()
        .map_err(|_| XmpError::BadValue("Invalid fractional second value".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_only() {
        let dt = XmpDateTime::parse("2023").unwrap();
        assert_eq!(dt.year, 2023);
        assert_eq!(dt.month, 0);
        assert!(dt.has_date);
        assert!(!dt.has_time);
    }

    #[test]
    fn test_parse_full_date() {
        let dt = XmpDateTime::parse("2023-12-25").unwrap();
        assert_eq!((dt.year, dt.month, dt.day), (2023, 12, 25));
        assert!(!dt.has_time);
    }

    #[test]
    fn test_parse_with_timezone() {
        let dt = XmpDateTime::parse("2023-12-25T10:30:00Z").unwrap();
        assert_eq!(dt.time_zone, Some(TimeZone::Utc));

        let dt = XmpDateTime::parse("2023-12-25T10:30:00-05:30").unwrap();
        assert_eq!(
            dt.time_zone,
            Some(TimeZone::West {
                hours: 5,
                minutes: 30
            })
        );

        let dt = XmpDateTime::parse("2023-12-25T10:30:00+00:00").unwrap();
        assert_eq!(dt.time_zone, Some(TimeZone::Utc));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let dt = XmpDateTime::parse("2023-12-25T10:30:05.123Z").unwrap();
        assert_eq!(dt.second, 5);
        assert_eq!(dt.nanosecond, 123_000_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(XmpDateTime::parse("").is_err());
        assert!(XmpDateTime::parse("20x3").is_err());
        assert!(XmpDateTime::parse("2023-12-25T10").is_err());
        assert!(XmpDateTime::parse("2023-12-25-01").is_err());
        assert!(XmpDateTime::parse("2024-01-02T03:04+a\u{e9}1").is_err());
        assert!(XmpDateTime::parse("2024-01-02T03:04+\u{e9}\u{e9}").is_err());
    }

    #[test]
    fn test_format_negative_year() {
        let mut dt = XmpDateTime::new();
        dt.has_date = true;
        dt.year = -500;
        assert_eq!(dt.format(), "-0500");
        dt.month = 3;
        dt.day = 1;
        assert_eq!(dt.format(), "-0500-03-01");
        assert_eq!(XmpDateTime::parse("-0500-03-01").unwrap().format(), "-0500-03-01");
    }

    #[test]
    fn test_format_round_trip() {
        for text in [
            "2023",
            "2023-12",
            "2023-12-25",
            "2023-12-25T10:30:00",
            "2023-12-25T10:30:00Z",
            "2023-12-25T10:30:00+08:00",
            "2023-12-25T10:30:00.123Z",
        ] {
            let dt = XmpDateTime::parse(text).unwrap();
            assert_eq!(dt.format(), text);
        }
    }

    #[test]
    fn test_day_fraction_offsets() {
        assert_eq!(TimeZone::from_day_fraction(0.0), TimeZone::Utc);
        assert_eq!(
            TimeZone::from_day_fraction(-5.0 / 24.0),
            TimeZone::West {
                hours: 5,
                minutes: 0
            }
        );
        assert_eq!(
            TimeZone::from_day_fraction(5.5 / 24.0),
            TimeZone::East {
                hours: 5,
                minutes: 30
            }
        );
        // Under a minute rounds to UTC rather than a zero-magnitude East
        assert_eq!(TimeZone::from_offset_seconds(30), TimeZone::Utc);
    }

    #[test]
    fn test_now_has_zone() {
        let now = XmpDateTime::now();
        assert!(now.has_date && now.has_time);
        assert!(now.time_zone.is_some());
        assert!(now.validate().is_ok());
    }
}
